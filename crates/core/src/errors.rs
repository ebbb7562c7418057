use thiserror::Error;

use crate::cpq::response::MappingError;
use crate::cpq::selection::SelectionError;
use crate::service::{ServiceError, GENERIC_CALCULATION_FAILURE};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum QuoteError {
    #[error("catalog unavailable: {0}")]
    CatalogUnavailable(#[source] ServiceError),
    #[error(transparent)]
    ValidationRejected(#[from] SelectionError),
    #[error("calculation failed: {0}")]
    CalculationFailed(#[source] ServiceError),
    #[error("malformed calculation response: {0}")]
    MalformedResponse(#[from] MappingError),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    CatalogUnavailable,
    ValidationRejected,
    CalculationFailed,
    MalformedResponse,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CatalogUnavailable => "catalog_unavailable",
            Self::ValidationRejected => "validation_rejected",
            Self::CalculationFailed => "calculation_failed",
            Self::MalformedResponse => "malformed_response",
        }
    }
}

impl QuoteError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::CatalogUnavailable(_) => ErrorKind::CatalogUnavailable,
            Self::ValidationRejected(_) => ErrorKind::ValidationRejected,
            Self::CalculationFailed(_) => ErrorKind::CalculationFailed,
            Self::MalformedResponse(_) => ErrorKind::MalformedResponse,
        }
    }

    /// Text shown to the operator. Service rejections pass through verbatim.
    pub fn user_message(&self) -> String {
        match self {
            Self::CatalogUnavailable(_) => {
                "Price book could not be loaded; geography selection is unavailable.".to_string()
            }
            Self::ValidationRejected(error) => error.to_string(),
            Self::CalculationFailed(error) => error.user_message(),
            Self::MalformedResponse(_) => GENERIC_CALCULATION_FAILURE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::cpq::response::MappingError;
    use crate::cpq::rules::Field;
    use crate::cpq::selection::SelectionError;
    use crate::errors::{ErrorKind, QuoteError};
    use crate::service::ServiceError;

    #[test]
    fn service_rejection_surfaces_literal_text() {
        let error = QuoteError::CalculationFailed(ServiceError::Rejected("Invalid country".into()));

        assert_eq!(error.kind(), ErrorKind::CalculationFailed);
        assert_eq!(error.user_message(), "Invalid country");
    }

    #[test]
    fn malformed_response_reads_like_a_calculation_failure() {
        let error = QuoteError::from(MappingError::MissingField("finalPrice"));

        assert_eq!(error.kind(), ErrorKind::MalformedResponse);
        assert_eq!(error.user_message(), "Calculation failed");
        assert!(error.to_string().contains("finalPrice"));
    }

    #[test]
    fn validation_rejection_names_the_field() {
        let error = QuoteError::from(SelectionError::NotCoercible {
            field: Field::Quantity,
            raw: "abc".to_string(),
            expected: "whole number",
        });

        assert_eq!(error.kind().as_str(), "validation_rejected");
        assert!(error.user_message().contains("quantity"));
    }

    #[test]
    fn catalog_unavailable_keeps_transport_cause() {
        let error = QuoteError::CatalogUnavailable(ServiceError::Transport("refused".into()));
        let source = std::error::Error::source(&error).map(ToString::to_string);

        assert_eq!(error.kind(), ErrorKind::CatalogUnavailable);
        assert_eq!(source.as_deref(), Some("pricing service unreachable: refused"));
    }
}
