use chrono::Utc;
use pricebook_client::HttpPricingService;
use pricebook_core::config::{AppConfig, LoadOptions};
use pricebook_core::service::PricingService;
use serde::Serialize;

use crate::commands::{runtime, CommandResult, EXIT_CALCULATION_FAILED, EXIT_CONFIG};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checked_at: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(options: &LoadOptions, json_output: bool) -> CommandResult {
    let report = build_report(options);
    let exit_code = exit_code(&report);

    let output = if json_output {
        serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        })
    } else {
        render_human(&report)
    };

    CommandResult { exit_code, output }
}

fn exit_code(report: &DoctorReport) -> u8 {
    let failed = |name: &str| {
        report.checks.iter().any(|check| check.name == name && check.status == CheckStatus::Fail)
    };
    if failed("config_validation") {
        EXIT_CONFIG
    } else if report.overall_status == CheckStatus::Fail {
        EXIT_CALCULATION_FAILED
    } else {
        0
    }
}

fn build_report(options: &LoadOptions) -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(options.clone()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: format!("configuration loaded; service at `{}`", config.service.base_url),
            });
            checks.extend(check_service(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            for name in ["pricebook_reachability", "tier1_reachability"] {
                checks.push(DoctorCheck {
                    name,
                    status: CheckStatus::Skipped,
                    details: "skipped because configuration did not load".to_string(),
                });
            }
        }
    }

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checked_at: Utc::now().to_rfc3339(), checks }
}

fn check_service(config: &AppConfig) -> Vec<DoctorCheck> {
    let failed_both = |details: String| {
        ["pricebook_reachability", "tier1_reachability"]
            .into_iter()
            .map(|name| DoctorCheck { name, status: CheckStatus::Fail, details: details.clone() })
            .collect::<Vec<_>>()
    };

    let runtime = match runtime("doctor") {
        Ok(runtime) => runtime,
        Err(result) => return failed_both(result.output),
    };
    let service = match HttpPricingService::from_config(&config.service) {
        Ok(service) => service,
        Err(error) => return failed_both(format!("failed to build pricing client: {error}")),
    };

    runtime.block_on(async {
        let (rows, cities) = tokio::join!(service.fetch_pricebook(), service.fetch_tier1_cities());

        let pricebook = match rows {
            Ok(rows) => DoctorCheck {
                name: "pricebook_reachability",
                status: CheckStatus::Pass,
                details: format!("{} geography rows loaded", rows.len()),
            },
            Err(error) => DoctorCheck {
                name: "pricebook_reachability",
                status: CheckStatus::Fail,
                details: error.to_string(),
            },
        };
        let tier1 = match cities {
            Ok(cities) => DoctorCheck {
                name: "tier1_reachability",
                status: CheckStatus::Pass,
                details: format!("{} tier-1 cities loaded", cities.len()),
            },
            Err(error) => DoctorCheck {
                name: "tier1_reachability",
                status: CheckStatus::Fail,
                details: error.to_string(),
            },
        };

        vec![pricebook, tier1]
    })
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
