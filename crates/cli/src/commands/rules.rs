use pricebook_core::cpq::rules::{rules_for, DurationRule, Field, FieldRuleSet};
use pricebook_core::domain::rate_plan::RatePlanType;
use serde::Serialize;

use crate::commands::CommandResult;

const COMMAND: &str = "rules";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RulesReport {
    label: &'static str,
    #[serde(flatten)]
    rules: FieldRuleSet,
    visible_fields: Vec<Field>,
}

pub fn run(rate_type: RatePlanType, country: Option<&str>, json: bool) -> CommandResult {
    let rules = rules_for(rate_type, country);
    let report =
        RulesReport { label: rate_type.label(), rules, visible_fields: rules.visible_fields() };

    CommandResult::rendered(COMMAND, json, &report, render_human(&report))
}

fn render_human(report: &RulesReport) -> String {
    let rules = &report.rules;
    let levels: Vec<&str> = rules.levels.iter().map(|level| level.as_str()).collect();
    let fields: Vec<&str> = report.visible_fields.iter().map(|field| field.as_str()).collect();

    [
        format!("{} ({})", rules.rate_type, report.label),
        format!("- levels: {} (default {})", levels.join(", "), rules.default_level),
        format!("- duration: {}", describe_duration(rules.duration)),
        format!("- backfill: {}", yes_no(rules.backfill)),
        format!("- city: {}", yes_no(rules.city)),
        format!("- fields: {}", fields.join(", ")),
    ]
    .join("\n")
}

fn describe_duration(rule: DurationRule) -> String {
    match rule {
        DurationRule::Months { min, max: Some(max) } => format!("months {min}..={max}"),
        DurationRule::Months { min, max: None } => format!("months >= {min}"),
        DurationRule::Days { min } => format!("days >= {min}"),
        DurationRule::PerDispatch => "per dispatch".to_string(),
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}
