use async_trait::async_trait;
use thiserror::Error;

use crate::domain::geography::GeographyRow;
use crate::domain::quote::{CalcResponse, QuoteRequest};

/// Operator-facing text when the service gave no reason of its own.
pub const GENERIC_CALCULATION_FAILURE: &str = "Calculation failed";

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ServiceError {
    #[error("pricing service unreachable: {0}")]
    Transport(String),
    /// The service answered with an `{error}` body; the text is shown verbatim.
    #[error("pricing service rejected the request: {0}")]
    Rejected(String),
    #[error("pricing service returned status {status}")]
    Status { status: u16 },
    #[error("pricing service payload could not be decoded: {0}")]
    Decode(String),
}

impl ServiceError {
    pub fn user_message(&self) -> String {
        match self {
            Self::Rejected(message) => message.clone(),
            Self::Transport(_) | Self::Status { .. } | Self::Decode(_) => {
                GENERIC_CALCULATION_FAILURE.to_string()
            }
        }
    }
}

/// Boundary to the external pricing service.
#[async_trait]
pub trait PricingService: Send + Sync {
    async fn fetch_pricebook(&self) -> Result<Vec<GeographyRow>, ServiceError>;

    async fn fetch_tier1_cities(&self) -> Result<Vec<String>, ServiceError>;

    async fn calculate(&self, request: &QuoteRequest) -> Result<CalcResponse, ServiceError>;
}
