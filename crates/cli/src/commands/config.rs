use std::env;
use std::fs;
use std::path::Path;

use pricebook_core::config::{resolve_config_path, AppConfig, ConfigOverrides, LoadOptions};
use toml::Value;

use crate::commands::{CommandResult, EXIT_CONFIG};

struct ConfigField {
    key_path: &'static str,
    env_keys: &'static [&'static str],
    overridden: bool,
    value: String,
}

pub fn run(options: &LoadOptions) -> CommandResult {
    let config = match AppConfig::load(options.clone()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult {
                exit_code: EXIT_CONFIG,
                output: format!("config validation failed: {error}"),
            }
        }
    };

    let config_file_path = resolve_config_path(options.config_path.as_deref());
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let mut lines = vec![
        "effective config (source precedence: override > env > file > default):".to_string()
    ];
    for field in fields(&config, &options.overrides) {
        let source = if field.overridden {
            "override".to_string()
        } else {
            field_source(
                field.key_path,
                field.env_keys,
                config_file_doc.as_ref(),
                config_file_path.as_deref(),
            )
        };
        lines.push(render_line(field.key_path, &field.value, source));
    }

    CommandResult { exit_code: 0, output: lines.join("\n") }
}

fn fields(config: &AppConfig, overrides: &ConfigOverrides) -> [ConfigField; 4] {
    [
        ConfigField {
            key_path: "service.base_url",
            env_keys: &["PRICEBOOK_SERVICE_BASE_URL", "PRICEBOOK_API_BASE_URL"],
            overridden: overrides.service_base_url.is_some(),
            value: config.service.base_url.clone(),
        },
        ConfigField {
            key_path: "service.timeout_secs",
            env_keys: &["PRICEBOOK_SERVICE_TIMEOUT_SECS"],
            overridden: overrides.service_timeout_secs.is_some(),
            value: config.service.timeout_secs.to_string(),
        },
        ConfigField {
            key_path: "logging.level",
            env_keys: &["PRICEBOOK_LOGGING_LEVEL", "PRICEBOOK_LOG_LEVEL"],
            overridden: overrides.log_level.is_some(),
            value: config.logging.level.clone(),
        },
        ConfigField {
            key_path: "logging.format",
            env_keys: &["PRICEBOOK_LOGGING_FORMAT", "PRICEBOOK_LOG_FORMAT"],
            overridden: overrides.log_format.is_some(),
            value: config.logging.format.to_string(),
        },
    ]
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    let env_key = env_keys
        .iter()
        .find(|key| env::var(key).map(|value| !value.trim().is_empty()).unwrap_or(false));
    if let Some(env_key) = env_key {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}
