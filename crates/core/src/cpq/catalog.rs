use std::collections::HashSet;

use crate::domain::geography::GeographyRow;

/// Immutable geography snapshot for one session.
///
/// Built once from the pricebook rows and the tier-1 city list. Consumers
/// borrow it; nothing mutates it after construction.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Catalog {
    rows: Vec<GeographyRow>,
    regions: Vec<String>,
    tier1_cities: Vec<String>,
}

impl Catalog {
    /// Countries must be unique; repeated countries after the first row are dropped.
    pub fn new(rows: Vec<GeographyRow>, tier1_cities: Vec<String>) -> Self {
        let mut seen_countries = HashSet::new();
        let rows: Vec<GeographyRow> =
            rows.into_iter().filter(|row| seen_countries.insert(row.country.clone())).collect();

        let mut regions: Vec<String> = Vec::new();
        for row in &rows {
            if !regions.iter().any(|region| region == &row.region) {
                regions.push(row.region.clone());
            }
        }

        Self { rows, regions, tier1_cities }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() && self.tier1_cities.is_empty()
    }

    pub fn rows(&self) -> &[GeographyRow] {
        &self.rows
    }

    /// Distinct regions in first-occurrence order.
    pub fn regions(&self) -> &[String] {
        &self.regions
    }

    pub fn tier1_cities(&self) -> &[String] {
        &self.tier1_cities
    }

    pub fn has_region(&self, region: &str) -> bool {
        self.regions.iter().any(|known| known == region)
    }

    pub fn find_country(&self, country: &str) -> Option<&GeographyRow> {
        self.rows.iter().find(|row| row.country == country)
    }

    pub fn has_tier1_city(&self, city: &str) -> bool {
        self.tier1_cities.iter().any(|known| known == city)
    }

    /// Countries selectable under an optional region filter, in catalog order.
    pub fn countries_in(&self, region: Option<&str>) -> Vec<&str> {
        self.rows
            .iter()
            .filter(|row| region.map_or(true, |region| row.region == region))
            .map(|row| row.country.as_str())
            .collect()
    }
}
