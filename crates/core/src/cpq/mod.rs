pub mod catalog;
pub mod request;
pub mod response;
pub mod rules;
pub mod selection;
