pub mod config;
pub mod cpq;
pub mod domain;
pub mod errors;
pub mod service;
pub mod session;

pub use config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};
pub use cpq::catalog::Catalog;
pub use cpq::request::build_request;
pub use cpq::response::{format_price, map_response, MappingError};
pub use cpq::rules::{rules_for, DurationRule, Field, FieldRuleSet};
pub use cpq::selection::{SelectionError, SelectionState};
pub use domain::geography::{GeographyRow, TIER1_USA_COUNTRY};
pub use domain::quote::{CalcResponse, QuoteRequest, QuoteResult, RequestDuration, SummaryLine};
pub use domain::rate_plan::{Level, RatePlanType};
pub use errors::{ErrorKind, QuoteError};
pub use service::{PricingService, ServiceError, GENERIC_CALCULATION_FAILURE};
pub use session::{CalculationOutcome, DisplayState, PendingCalculation, QuoteSession};
