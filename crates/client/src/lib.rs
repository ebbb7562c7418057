pub mod desk;
pub mod http;

pub use desk::{calculate, load_catalog, submit, CatalogLoad, CatalogSource};
pub use http::HttpPricingService;
