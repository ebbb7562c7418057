use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RatePlanType {
    #[default]
    #[serde(rename = "yearly")]
    Yearly,
    #[serde(rename = "daily")]
    Daily,
    #[serde(rename = "halfday")]
    HalfDay,
    #[serde(rename = "dispatch")]
    Dispatch,
    #[serde(rename = "dispatchIMAC")]
    DispatchImac,
    #[serde(rename = "projectShort")]
    ProjectShort,
    #[serde(rename = "projectLong")]
    ProjectLong,
}

impl RatePlanType {
    pub const ALL: [RatePlanType; 7] = [
        Self::Yearly,
        Self::Daily,
        Self::HalfDay,
        Self::Dispatch,
        Self::DispatchImac,
        Self::ProjectShort,
        Self::ProjectLong,
    ];

    /// Wire name understood by the pricing service.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Yearly => "yearly",
            Self::Daily => "daily",
            Self::HalfDay => "halfday",
            Self::Dispatch => "dispatch",
            Self::DispatchImac => "dispatchIMAC",
            Self::ProjectShort => "projectShort",
            Self::ProjectLong => "projectLong",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Yearly => "Yearly (Managed Service)",
            Self::Daily => "Full Day (8 hrs)",
            Self::HalfDay => "Half Day (4 hrs)",
            Self::Dispatch => "Dispatch Ticket SLA",
            Self::DispatchImac => "Dispatch IMAC SLA",
            Self::ProjectShort => "Project (Short Term, up to 3 months)",
            Self::ProjectLong => "Project (Long Term, 3+ months)",
        }
    }
}

impl fmt::Display for RatePlanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("unknown rate plan type `{0}`")]
pub struct UnknownRatePlan(pub String);

impl FromStr for RatePlanType {
    type Err = UnknownRatePlan;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Self::ALL
            .into_iter()
            .find(|plan| plan.as_str() == trimmed)
            .ok_or_else(|| UnknownRatePlan(trimmed.to_string()))
    }
}

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Level {
    #[default]
    L1,
    L2,
    L3,
    L4,
    L5,
}

impl Level {
    pub const ALL: [Level; 5] = [Self::L1, Self::L2, Self::L3, Self::L4, Self::L5];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::L1 => "L1",
            Self::L2 => "L2",
            Self::L3 => "L3",
            Self::L4 => "L4",
            Self::L5 => "L5",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("unknown level `{0}` (expected L1..L5)")]
pub struct UnknownLevel(pub String);

impl FromStr for Level {
    type Err = UnknownLevel;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|level| level.as_str() == normalized)
            .ok_or_else(|| UnknownLevel(value.trim().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::{Level, RatePlanType};

    #[test]
    fn rate_plan_wire_names_parse_back() {
        for plan in RatePlanType::ALL {
            assert_eq!(plan.as_str().parse::<RatePlanType>(), Ok(plan));
        }
    }

    #[test]
    fn rate_plan_names_are_case_sensitive() {
        assert!("dispatchimac".parse::<RatePlanType>().is_err());
        assert!("Yearly".parse::<RatePlanType>().is_err());
    }

    #[test]
    fn rate_plan_serializes_with_wire_name() {
        let encoded = serde_json::to_string(&RatePlanType::DispatchImac).expect("serialize");
        assert_eq!(encoded, "\"dispatchIMAC\"");
    }

    #[test]
    fn level_parse_accepts_lowercase_and_rejects_out_of_range() {
        assert_eq!(" l3 ".parse::<Level>(), Ok(Level::L3));
        assert!("L6".parse::<Level>().is_err());
    }
}
