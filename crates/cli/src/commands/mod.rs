pub mod catalog;
pub mod config;
pub mod doctor;
pub mod quote;
pub mod rules;

use pricebook_core::config::{AppConfig, LoadOptions};
use pricebook_core::errors::{ErrorKind, QuoteError};
use serde::Serialize;
use tokio::runtime::Runtime;

pub const EXIT_CONFIG: u8 = 2;
pub const EXIT_RUNTIME_INIT: u8 = 3;
pub const EXIT_CALCULATION_FAILED: u8 = 4;
pub const EXIT_MALFORMED_RESPONSE: u8 = 5;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
}

impl CommandResult {
    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    pub fn from_quote_error(command: &str, error: &QuoteError) -> Self {
        let exit_code = match error.kind() {
            ErrorKind::MalformedResponse => EXIT_MALFORMED_RESPONSE,
            ErrorKind::CatalogUnavailable
            | ErrorKind::ValidationRejected
            | ErrorKind::CalculationFailed => EXIT_CALCULATION_FAILED,
        };
        Self::failure(command, error.kind().as_str(), error.user_message(), exit_code)
    }

    /// Plain or pretty-JSON rendering of a successful command.
    pub fn rendered<T: Serialize>(command: &str, json: bool, report: &T, human: String) -> Self {
        if !json {
            return Self { exit_code: 0, output: human };
        }
        match serde_json::to_string_pretty(report) {
            Ok(output) => Self { exit_code: 0, output },
            Err(error) => Self::failure(command, "serialization", error.to_string(), 1),
        }
    }
}

pub(crate) fn load_config(
    command: &str,
    options: &LoadOptions,
) -> Result<AppConfig, CommandResult> {
    AppConfig::load(options.clone()).map_err(|error| {
        CommandResult::failure(
            command,
            "config_validation",
            format!("configuration issue: {error}"),
            EXIT_CONFIG,
        )
    })
}

pub(crate) fn runtime(command: &str) -> Result<Runtime, CommandResult> {
    tokio::runtime::Builder::new_current_thread().enable_all().build().map_err(|error| {
        CommandResult::failure(
            command,
            "runtime_init",
            format!("failed to initialize async runtime: {error}"),
            EXIT_RUNTIME_INIT,
        )
    })
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

#[cfg(test)]
mod tests {
    use pricebook_core::cpq::response::MappingError;
    use pricebook_core::errors::QuoteError;
    use pricebook_core::service::ServiceError;
    use serde_json::Value;

    use super::CommandResult;

    #[test]
    fn quote_errors_map_to_exit_codes() {
        let rejected =
            QuoteError::CalculationFailed(ServiceError::Rejected("Invalid country".to_string()));
        let malformed = QuoteError::from(MappingError::MissingField("currency"));

        let rejected = CommandResult::from_quote_error("quote", &rejected);
        let malformed = CommandResult::from_quote_error("quote", &malformed);

        assert_eq!(rejected.exit_code, 4);
        assert_eq!(malformed.exit_code, 5);
        let payload: Value = serde_json::from_str(&rejected.output).expect("json");
        assert_eq!(payload["message"], "Invalid country");
        assert_eq!(payload["error_class"], "calculation_failed");
    }

    #[test]
    fn human_rendering_skips_serialization() {
        let result = CommandResult::rendered("rules", false, &(), "plain text".to_string());
        assert_eq!(result.output, "plain text");
        assert_eq!(result.exit_code, 0);
    }
}
