pub mod geography;
pub mod quote;
pub mod rate_plan;
