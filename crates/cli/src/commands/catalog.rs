use pricebook_client::{load_catalog, HttpPricingService};
use pricebook_core::config::LoadOptions;
use pricebook_core::cpq::catalog::Catalog;
use serde::Serialize;

use crate::commands::{load_config, runtime, CommandResult, EXIT_RUNTIME_INIT};

const COMMAND: &str = "catalog";

#[derive(Debug, Serialize)]
pub struct CatalogReport<'a> {
    pub regions: &'a [String],
    pub region_filter: Option<&'a str>,
    pub countries: Vec<&'a str>,
    pub tier1_cities: &'a [String],
    pub unavailable: Vec<String>,
}

pub fn run(options: &LoadOptions, region: Option<&str>, json: bool) -> CommandResult {
    let config = match load_config(COMMAND, options) {
        Ok(config) => config,
        Err(result) => return result,
    };
    let runtime = match runtime(COMMAND) {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };
    let service = match HttpPricingService::from_config(&config.service) {
        Ok(service) => service,
        Err(error) => {
            return CommandResult::failure(
                COMMAND,
                "runtime_init",
                format!("failed to build pricing client: {error}"),
                EXIT_RUNTIME_INIT,
            );
        }
    };

    let load = runtime.block_on(load_catalog(&service));
    let unavailable = load
        .unavailable
        .iter()
        .map(|(source, error)| format!("{}: {error}", source.as_str()))
        .collect();
    let report = build_report(&load.catalog, region, unavailable);

    CommandResult::rendered(COMMAND, json, &report, render_human(&report))
}

pub fn build_report<'a>(
    catalog: &'a Catalog,
    region: Option<&'a str>,
    unavailable: Vec<String>,
) -> CatalogReport<'a> {
    CatalogReport {
        regions: catalog.regions(),
        region_filter: region,
        countries: catalog.countries_in(region),
        tier1_cities: catalog.tier1_cities(),
        unavailable,
    }
}

fn render_human(report: &CatalogReport<'_>) -> String {
    let mut lines = Vec::new();
    for source in &report.unavailable {
        lines.push(format!("warning: catalog source unavailable ({source})"));
    }

    lines.push(format!("regions: {}", join_or_none(report.regions.iter().map(String::as_str))));
    let heading = match report.region_filter {
        Some(region) => format!("countries in {region}:"),
        None => "countries:".to_string(),
    };
    lines.push(heading);
    lines.extend(report.countries.iter().map(|country| format!("- {country}")));
    lines.push(format!(
        "tier-1 cities: {}",
        join_or_none(report.tier1_cities.iter().map(String::as_str))
    ));

    lines.join("\n")
}

fn join_or_none<'a>(values: impl Iterator<Item = &'a str>) -> String {
    let joined = values.collect::<Vec<_>>().join(", ");
    if joined.is_empty() {
        "<none>".to_string()
    } else {
        joined
    }
}
