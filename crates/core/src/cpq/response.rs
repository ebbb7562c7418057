use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::Value;
use thiserror::Error;

use crate::domain::quote::{CalcResponse, QuoteResult};
use crate::domain::rate_plan::RatePlanType;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum MappingError {
    #[error("calculation response is missing `{0}`")]
    MissingField(&'static str),
    #[error("calculation response field `{field}` has unusable value `{value}`")]
    InvalidField { field: &'static str, value: String },
}

pub fn map_response(response: &CalcResponse) -> Result<QuoteResult, MappingError> {
    let rate_type_text = required_text("rateType", response.rate_type.as_deref())?;
    let rate_type = RatePlanType::from_str(&rate_type_text)
        .map_err(|_| MappingError::InvalidField { field: "rateType", value: rate_type_text })?;

    let duration = match rate_type {
        RatePlanType::Yearly | RatePlanType::ProjectShort | RatePlanType::ProjectLong => {
            Some(format!("{} months", required_scalar("months", response.months.as_ref())?))
        }
        RatePlanType::Daily | RatePlanType::HalfDay => {
            Some(format!("{} days", required_scalar("days", response.days.as_ref())?))
        }
        RatePlanType::Dispatch | RatePlanType::DispatchImac => None,
    };

    let backfill = (rate_type == RatePlanType::Yearly).then(|| {
        if backfill_flag(response.with_backfill.as_ref()) {
            "With Backfill".to_string()
        } else {
            "Without Backfill".to_string()
        }
    });

    let currency = required_text("currency", response.currency.as_deref())?;
    let amount = parse_amount(response.final_price.as_ref())?;

    Ok(QuoteResult {
        region: required_echo("region", response.region.as_deref())?,
        country: required_echo("country", response.country.as_deref())?,
        city: response
            .city
            .as_deref()
            .map(str::trim)
            .filter(|city| !city.is_empty())
            .map(String::from),
        rate_type,
        level: required_echo("level", response.level.as_deref())?,
        backfill,
        quantity: required_scalar("quantity", response.quantity.as_ref())?,
        duration,
        distance_km: required_scalar("distance", response.distance.as_ref())?,
        payment_terms: response
            .payment_terms
            .clone()
            .ok_or(MappingError::MissingField("paymentTerms"))?,
        final_price: format_price(amount, &currency),
        currency,
    })
}

/// `<CUR> <amount>` with comma-grouped thousands. Digits after the decimal
/// point are kept exactly as the service sent them.
pub fn format_price(amount: Decimal, currency: &str) -> String {
    format!("{currency} {}", group_thousands(&amount.to_string()))
}

fn group_thousands(plain: &str) -> String {
    let (sign, unsigned) = match plain.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", plain),
    };
    let (whole, fraction) = match unsigned.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (index, digit) in whole.chars().enumerate() {
        if index > 0 && (whole.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    match fraction {
        Some(fraction) => format!("{sign}{grouped}.{fraction}"),
        None => format!("{sign}{grouped}"),
    }
}

fn parse_amount(value: Option<&Value>) -> Result<Decimal, MappingError> {
    let text = match value {
        Some(Value::Number(number)) => number.to_string(),
        Some(Value::String(text)) if !text.trim().is_empty() => text.trim().to_string(),
        Some(other) => {
            let value = other.to_string();
            return Err(MappingError::InvalidField { field: "finalPrice", value });
        }
        None => return Err(MappingError::MissingField("finalPrice")),
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|_| MappingError::InvalidField { field: "finalPrice", value: text })
}

fn backfill_flag(value: Option<&Value>) -> bool {
    match value {
        Some(Value::String(text)) => text == "true",
        Some(Value::Bool(flag)) => *flag,
        _ => false,
    }
}

/// Echoes only need to be present; an empty string is rendered as sent.
fn required_echo(field: &'static str, value: Option<&str>) -> Result<String, MappingError> {
    value.map(|text| text.trim().to_string()).ok_or(MappingError::MissingField(field))
}

fn required_text(field: &'static str, value: Option<&str>) -> Result<String, MappingError> {
    value
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(String::from)
        .ok_or(MappingError::MissingField(field))
}

/// Echoed scalars may arrive as numbers or as the query-string text.
fn required_scalar(field: &'static str, value: Option<&Value>) -> Result<String, MappingError> {
    match value {
        Some(Value::Number(number)) => Ok(number.to_string()),
        Some(Value::String(text)) if !text.trim().is_empty() => Ok(text.trim().to_string()),
        Some(Value::Null) | None => Err(MappingError::MissingField(field)),
        Some(other) => Err(MappingError::InvalidField { field, value: other.to_string() }),
    }
}
