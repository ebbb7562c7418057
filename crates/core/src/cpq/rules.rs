use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use crate::domain::geography::is_tier1_country;
use crate::domain::rate_plan::{Level, RatePlanType};

const ALL_LEVELS: &[Level] = &[Level::L1, Level::L2, Level::L3, Level::L4, Level::L5];
const ENGAGEMENT_LEVELS: &[Level] = &[Level::L1, Level::L2, Level::L3];
const YEARLY_MAX_MONTHS: u32 = 12;

/// Every input the operator can edit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Region,
    Country,
    City,
    Level,
    RateType,
    WithBackfill,
    Quantity,
    Months,
    Days,
    DistanceKm,
    IsWeekend,
    IsOutOfHours,
    CancelledWithin24h,
    AccessDenied,
    TransitionCost,
}

impl Field {
    pub const ALL: [Field; 15] = [
        Self::Region,
        Self::Country,
        Self::City,
        Self::Level,
        Self::RateType,
        Self::WithBackfill,
        Self::Quantity,
        Self::Months,
        Self::Days,
        Self::DistanceKm,
        Self::IsWeekend,
        Self::IsOutOfHours,
        Self::CancelledWithin24h,
        Self::AccessDenied,
        Self::TransitionCost,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Region => "region",
            Self::Country => "country",
            Self::City => "city",
            Self::Level => "level",
            Self::RateType => "rateType",
            Self::WithBackfill => "withBackfill",
            Self::Quantity => "quantity",
            Self::Months => "months",
            Self::Days => "days",
            Self::DistanceKm => "distanceKm",
            Self::IsWeekend => "isWeekend",
            Self::IsOutOfHours => "isOutOfHours",
            Self::CancelledWithin24h => "cancelledWithin24h",
            Self::AccessDenied => "accessDenied",
            Self::TransitionCost => "transitionCost",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("unknown field `{0}`")]
pub struct UnknownField(pub String);

impl FromStr for Field {
    type Err = UnknownField;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        // wire names for the two fields whose query key differs
        match trimmed {
            "distance" => return Ok(Self::DistanceKm),
            "cancelled" => return Ok(Self::CancelledWithin24h),
            _ => {}
        }
        Self::ALL
            .into_iter()
            .find(|field| field.as_str() == trimmed)
            .ok_or_else(|| UnknownField(trimmed.to_string()))
    }
}

/// Which duration input a plan uses, and its bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "unit", rename_all = "snake_case")]
pub enum DurationRule {
    Months { min: u32, max: Option<u32> },
    Days { min: u32 },
    /// Dispatch SLAs are priced per visit and carry no duration.
    PerDispatch,
}

impl DurationRule {
    pub fn field(self) -> Option<Field> {
        match self {
            Self::Months { .. } => Some(Field::Months),
            Self::Days { .. } => Some(Field::Days),
            Self::PerDispatch => None,
        }
    }

    pub fn accepts(self, value: u32) -> bool {
        match self {
            Self::Months { min, max } => value >= min && max.map_or(true, |max| value <= max),
            Self::Days { min } => value >= min,
            Self::PerDispatch => false,
        }
    }

    /// Pulls a stored value into this rule's bounds.
    pub fn clamp(self, value: u32) -> u32 {
        match self {
            Self::Months { min, max } => {
                let value = value.max(min);
                max.map_or(value, |max| value.min(max))
            }
            Self::Days { min } => value.max(min),
            Self::PerDispatch => value,
        }
    }
}

/// Relevance and validity decisions for one rate plan and country.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldRuleSet {
    pub rate_type: RatePlanType,
    pub levels: &'static [Level],
    pub default_level: Level,
    pub backfill: bool,
    pub duration: DurationRule,
    pub city: bool,
}

pub fn rules_for(rate_type: RatePlanType, country: Option<&str>) -> FieldRuleSet {
    let (levels, backfill, duration) = match rate_type {
        RatePlanType::Yearly => (
            ALL_LEVELS,
            true,
            DurationRule::Months { min: 1, max: Some(YEARLY_MAX_MONTHS) },
        ),
        RatePlanType::Daily | RatePlanType::HalfDay => {
            (ENGAGEMENT_LEVELS, false, DurationRule::Days { min: 1 })
        }
        RatePlanType::Dispatch | RatePlanType::DispatchImac => {
            (ALL_LEVELS, false, DurationRule::PerDispatch)
        }
        RatePlanType::ProjectShort | RatePlanType::ProjectLong => {
            (ALL_LEVELS, false, DurationRule::Months { min: 1, max: None })
        }
    };

    FieldRuleSet {
        rate_type,
        levels,
        default_level: Level::L1,
        backfill,
        duration,
        city: country.is_some_and(is_tier1_country),
    }
}

impl FieldRuleSet {
    pub fn is_relevant(&self, field: Field) -> bool {
        match field {
            Field::Region
            | Field::Country
            | Field::Level
            | Field::RateType
            | Field::Quantity
            | Field::DistanceKm
            | Field::IsWeekend
            | Field::IsOutOfHours
            | Field::CancelledWithin24h
            | Field::AccessDenied
            | Field::TransitionCost => true,
            Field::City => self.city,
            Field::WithBackfill => self.backfill,
            Field::Months | Field::Days => self.duration.field() == Some(field),
        }
    }

    /// Fields the presentation layer must expose, in form order.
    pub fn visible_fields(&self) -> Vec<Field> {
        Field::ALL.into_iter().filter(|field| self.is_relevant(*field)).collect()
    }

    pub fn allows_level(&self, level: Level) -> bool {
        self.levels.contains(&level)
    }

    pub fn coerce_level(&self, level: Level) -> Level {
        if self.allows_level(level) {
            level
        } else {
            self.default_level
        }
    }
}
