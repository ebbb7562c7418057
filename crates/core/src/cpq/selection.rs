use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use crate::cpq::catalog::Catalog;
use crate::cpq::rules::{rules_for, DurationRule, Field, FieldRuleSet};
use crate::domain::rate_plan::{Level, RatePlanType};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("`{raw}` is not a valid {expected} for {field}")]
    NotCoercible { field: Field, raw: String, expected: &'static str },
    #[error("{field} value `{raw}` is out of range ({constraint})")]
    OutOfRange { field: Field, raw: String, constraint: String },
    #[error("`{value}` is not a selectable {field}")]
    NotSelectable { field: Field, value: String },
}

impl SelectionError {
    pub fn field(&self) -> Field {
        match self {
            Self::NotCoercible { field, .. }
            | Self::OutOfRange { field, .. }
            | Self::NotSelectable { field, .. } => *field,
        }
    }
}

/// Operator choices. Values for fields irrelevant to the current plan are kept
/// so switching plans back and forth restores prior input.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionState {
    pub region: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub level: Level,
    pub rate_type: RatePlanType,
    pub with_backfill: bool,
    pub quantity: u32,
    pub months: u32,
    pub days: u32,
    pub distance_km: Decimal,
    pub is_weekend: bool,
    pub is_out_of_hours: bool,
    pub cancelled_within_24h: bool,
    pub access_denied: bool,
    pub transition_cost: Decimal,
}

impl Default for SelectionState {
    fn default() -> Self {
        Self {
            region: None,
            country: None,
            city: None,
            level: Level::L1,
            rate_type: RatePlanType::Yearly,
            with_backfill: true,
            quantity: 1,
            months: 12,
            days: 1,
            distance_km: Decimal::ZERO,
            is_weekend: false,
            is_out_of_hours: false,
            cancelled_within_24h: false,
            access_denied: false,
            transition_cost: Decimal::ZERO,
        }
    }
}

impl SelectionState {
    pub fn rules(&self) -> FieldRuleSet {
        rules_for(self.rate_type, self.country.as_deref())
    }

    pub fn set_rate_type(&mut self, rate_type: RatePlanType) {
        self.rate_type = rate_type;
        self.level = self.rules().coerce_level(self.level);
    }

    /// Parses `raw` into the field's type and stores it. On error nothing changes.
    pub fn set_field(
        &mut self,
        field: Field,
        raw: &str,
        catalog: &Catalog,
    ) -> Result<(), SelectionError> {
        let value = raw.trim();
        match field {
            Field::Region => {
                self.region = optional_choice(field, value, |region| catalog.has_region(region))?;
                let outside_region = match (self.region.as_deref(), self.country.as_deref()) {
                    (Some(region), Some(country)) => {
                        !catalog.find_country(country).is_some_and(|row| row.region == region)
                    }
                    _ => false,
                };
                if outside_region {
                    self.country = None;
                    self.city = None;
                }
            }
            Field::Country => {
                let region = self.region.as_deref();
                self.country = optional_choice(field, value, |country| {
                    catalog
                        .find_country(country)
                        .is_some_and(|row| region.map_or(true, |region| row.region == region))
                })?;
            }
            Field::City => {
                self.city = optional_choice(field, value, |city| catalog.has_tier1_city(city))?;
            }
            Field::Level => {
                let level = Level::from_str(value).map_err(|_| not_coercible(field, raw, "level"))?;
                if !self.rules().allows_level(level) {
                    return Err(SelectionError::NotSelectable { field, value: value.to_string() });
                }
                self.level = level;
            }
            Field::RateType => {
                let rate_type = RatePlanType::from_str(value)
                    .map_err(|_| not_coercible(field, raw, "rate plan type"))?;
                self.set_rate_type(rate_type);
            }
            Field::WithBackfill => self.with_backfill = parse_flag(field, raw)?,
            Field::Quantity => {
                let quantity = parse_count(field, raw)?;
                if quantity < 1 {
                    return Err(out_of_range(field, raw, "must be at least 1"));
                }
                self.quantity = quantity;
            }
            Field::Months => {
                let months = parse_count(field, raw)?;
                let bounds = match self.rules().duration {
                    rule @ DurationRule::Months { .. } => rule,
                    _ => DurationRule::Months { min: 1, max: None },
                };
                if !bounds.accepts(months) {
                    return Err(out_of_range(field, raw, &describe_bounds(bounds)));
                }
                self.months = months;
            }
            Field::Days => {
                let days = parse_count(field, raw)?;
                if !(DurationRule::Days { min: 1 }).accepts(days) {
                    return Err(out_of_range(field, raw, "must be at least 1"));
                }
                self.days = days;
            }
            Field::DistanceKm => self.distance_km = parse_non_negative(field, raw)?,
            Field::TransitionCost => self.transition_cost = parse_non_negative(field, raw)?,
            Field::IsWeekend => self.is_weekend = parse_flag(field, raw)?,
            Field::IsOutOfHours => self.is_out_of_hours = parse_flag(field, raw)?,
            Field::CancelledWithin24h => self.cancelled_within_24h = parse_flag(field, raw)?,
            Field::AccessDenied => self.access_denied = parse_flag(field, raw)?,
        }
        Ok(())
    }
}

fn optional_choice(
    field: Field,
    value: &str,
    selectable: impl Fn(&str) -> bool,
) -> Result<Option<String>, SelectionError> {
    if value.is_empty() {
        return Ok(None);
    }
    if !selectable(value) {
        return Err(SelectionError::NotSelectable { field, value: value.to_string() });
    }
    Ok(Some(value.to_string()))
}

fn parse_count(field: Field, raw: &str) -> Result<u32, SelectionError> {
    match raw.trim().parse::<i64>() {
        Ok(value) if value < 0 => Err(out_of_range(field, raw, "must not be negative")),
        Ok(value) => u32::try_from(value).map_err(|_| out_of_range(field, raw, "too large")),
        Err(_) => Err(not_coercible(field, raw, "whole number")),
    }
}

fn parse_non_negative(field: Field, raw: &str) -> Result<Decimal, SelectionError> {
    let value =
        Decimal::from_str(raw.trim()).map_err(|_| not_coercible(field, raw, "number"))?;
    if value.is_sign_negative() && !value.is_zero() {
        return Err(out_of_range(field, raw, "must not be negative"));
    }
    Ok(value)
}

fn parse_flag(field: Field, raw: &str) -> Result<bool, SelectionError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(not_coercible(field, raw, "boolean")),
    }
}

fn describe_bounds(rule: DurationRule) -> String {
    match rule {
        DurationRule::Months { min, max: Some(max) } => format!("must be in range {min}..={max}"),
        DurationRule::Months { min, max: None } | DurationRule::Days { min } => {
            format!("must be at least {min}")
        }
        DurationRule::PerDispatch => "not applicable".to_string(),
    }
}

fn not_coercible(field: Field, raw: &str, expected: &'static str) -> SelectionError {
    SelectionError::NotCoercible { field, raw: raw.to_string(), expected }
}

fn out_of_range(field: Field, raw: &str, constraint: &str) -> SelectionError {
    SelectionError::OutOfRange { field, raw: raw.to_string(), constraint: constraint.to_string() }
}
