use serde::{Deserialize, Serialize};

/// The only country that prices at city level.
pub const TIER1_USA_COUNTRY: &str = "United States of America (Tier 1)";

/// One pricebook row as returned by `GET /api/pricebook`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GeographyRow {
    #[serde(rename = "Region")]
    pub region: String,
    #[serde(rename = "Country")]
    pub country: String,
}

impl GeographyRow {
    pub fn new(region: impl Into<String>, country: impl Into<String>) -> Self {
        Self { region: region.into(), country: country.into() }
    }
}

pub fn is_tier1_country(country: &str) -> bool {
    country == TIER1_USA_COUNTRY
}
