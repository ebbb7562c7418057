use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::domain::rate_plan::{Level, RatePlanType};

/// Duration dimension of a request. A request carries at most one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestDuration {
    Months(u32),
    Days(u32),
}

/// Canonical payload sent to `GET /api/calc`.
///
/// The JSON rendering mirrors the wire contract: `city` is always present
/// (explicit `null` when the country does not price by city), `withBackfill`
/// is text, and the duration appears under `months` or `days` only.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    pub country: String,
    pub city: Option<String>,
    pub level: Level,
    pub rate_type: RatePlanType,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "serialize_flag_text")]
    pub with_backfill: Option<bool>,
    pub quantity: u32,
    #[serde(flatten)]
    pub duration: Option<RequestDuration>,
    #[serde(rename = "distance")]
    pub distance_km: Decimal,
    pub is_weekend: bool,
    pub is_out_of_hours: bool,
    #[serde(rename = "cancelled")]
    pub cancelled_within_24h: bool,
    pub access_denied: bool,
    pub transition_cost: Decimal,
}

impl QuoteRequest {
    pub fn months(&self) -> Option<u32> {
        match self.duration {
            Some(RequestDuration::Months(months)) => Some(months),
            _ => None,
        }
    }

    pub fn days(&self) -> Option<u32> {
        match self.duration {
            Some(RequestDuration::Days(days)) => Some(days),
            _ => None,
        }
    }

    /// Query parameters in wire order. An absent city is still transmitted,
    /// as an empty value.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("country", self.country.clone()),
            ("city", self.city.clone().unwrap_or_default()),
            ("level", self.level.to_string()),
            ("rateType", self.rate_type.to_string()),
        ];
        if let Some(with_backfill) = self.with_backfill {
            pairs.push(("withBackfill", flag_text(with_backfill).to_string()));
        }
        pairs.push(("quantity", self.quantity.to_string()));
        match self.duration {
            Some(RequestDuration::Months(months)) => pairs.push(("months", months.to_string())),
            Some(RequestDuration::Days(days)) => pairs.push(("days", days.to_string())),
            None => {}
        }
        pairs.extend([
            ("distance", self.distance_km.to_string()),
            ("isWeekend", self.is_weekend.to_string()),
            ("isOutOfHours", self.is_out_of_hours.to_string()),
            ("cancelled", self.cancelled_within_24h.to_string()),
            ("accessDenied", self.access_denied.to_string()),
            ("transitionCost", self.transition_cost.to_string()),
        ]);
        pairs
    }
}

fn flag_text(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

fn serialize_flag_text<S>(value: &Option<bool>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(flag) => serializer.serialize_str(flag_text(*flag)),
        None => serializer.serialize_none(),
    }
}

/// Raw `GET /api/calc` body. Every field is optional at this layer; the
/// response mapper decides which ones are required.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalcResponse {
    pub region: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub rate_type: Option<String>,
    pub level: Option<String>,
    pub with_backfill: Option<Value>,
    pub quantity: Option<Value>,
    pub months: Option<Value>,
    pub days: Option<Value>,
    pub distance: Option<Value>,
    pub payment_terms: Option<String>,
    pub currency: Option<String>,
    pub final_price: Option<Value>,
    pub error: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SummaryLine {
    pub label: &'static str,
    pub value: String,
}

/// Display-ready summary of one successful calculation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct QuoteResult {
    pub region: String,
    pub country: String,
    pub city: Option<String>,
    pub rate_type: RatePlanType,
    pub level: String,
    pub backfill: Option<String>,
    pub quantity: String,
    pub duration: Option<String>,
    pub distance_km: String,
    pub payment_terms: String,
    pub currency: String,
    pub final_price: String,
}

impl QuoteResult {
    /// Result lines in display order, with suppressed lines left out.
    pub fn lines(&self) -> Vec<SummaryLine> {
        let mut lines = vec![
            SummaryLine { label: "Region", value: self.region.clone() },
            SummaryLine { label: "Country", value: self.country.clone() },
        ];
        if let Some(city) = &self.city {
            lines.push(SummaryLine { label: "City", value: city.clone() });
        }
        lines.push(SummaryLine { label: "Rate Type", value: self.rate_type.to_string() });
        lines.push(SummaryLine { label: "Level", value: self.level.clone() });
        if let Some(backfill) = &self.backfill {
            lines.push(SummaryLine { label: "Backfill", value: backfill.clone() });
        }
        lines.push(SummaryLine { label: "Quantity", value: self.quantity.clone() });
        if let Some(duration) = &self.duration {
            lines.push(SummaryLine { label: "Duration", value: duration.clone() });
        }
        lines.push(SummaryLine { label: "Distance", value: format!("{} km", self.distance_km) });
        lines.push(SummaryLine { label: "Payment Terms", value: self.payment_terms.clone() });
        lines.push(SummaryLine { label: "Final Price", value: self.final_price.clone() });
        lines
    }
}
