use clap::Args;
use pricebook_client::{calculate, load_catalog, HttpPricingService};
use pricebook_core::config::LoadOptions;
use pricebook_core::cpq::rules::Field;
use pricebook_core::domain::quote::{QuoteRequest, QuoteResult};
use pricebook_core::domain::rate_plan::Level;
use pricebook_core::session::{CalculationOutcome, QuoteSession};
use serde::Serialize;

use crate::commands::{
    load_config, runtime, CommandResult, EXIT_CALCULATION_FAILED, EXIT_RUNTIME_INIT,
};

const COMMAND: &str = "quote";

#[derive(Debug, Clone, Default, Args)]
pub struct QuoteArgs {
    #[arg(long, help = "Region filter for the country selector")]
    pub region: Option<String>,
    #[arg(long)]
    pub country: Option<String>,
    #[arg(long, help = "Tier-1 city (only applies to the Tier 1 USA country)")]
    pub city: Option<String>,
    #[arg(long, help = "Staffing level L1..L5")]
    pub level: Option<String>,
    #[arg(long, help = "Rate-plan type; defaults to yearly")]
    pub rate_type: Option<String>,
    #[arg(long, help = "Include backfill (yearly only): true or false")]
    pub backfill: Option<String>,
    #[arg(long)]
    pub quantity: Option<String>,
    #[arg(long)]
    pub months: Option<String>,
    #[arg(long)]
    pub days: Option<String>,
    #[arg(long = "distance", help = "Travel distance in km")]
    pub distance_km: Option<String>,
    #[arg(long)]
    pub weekend: bool,
    #[arg(long)]
    pub out_of_hours: bool,
    #[arg(long, help = "Cancelled within 24 hours")]
    pub cancelled: bool,
    #[arg(long)]
    pub access_denied: bool,
    #[arg(long)]
    pub transition_cost: Option<String>,
    #[arg(long, help = "Build the request without calling the calculation endpoint")]
    pub dry_run: bool,
    #[arg(long, help = "Emit machine-readable JSON output")]
    pub json: bool,
}

impl QuoteArgs {
    /// Edits in application order. The rate type goes first so level and
    /// duration edits are judged against the chosen plan.
    pub fn edits(&self) -> Vec<(Field, String)> {
        let valued = [
            (Field::RateType, &self.rate_type),
            (Field::Region, &self.region),
            (Field::Country, &self.country),
            (Field::City, &self.city),
            (Field::Level, &self.level),
            (Field::WithBackfill, &self.backfill),
            (Field::Quantity, &self.quantity),
            (Field::Months, &self.months),
            (Field::Days, &self.days),
            (Field::DistanceKm, &self.distance_km),
            (Field::TransitionCost, &self.transition_cost),
        ];
        let flags = [
            (Field::IsWeekend, self.weekend),
            (Field::IsOutOfHours, self.out_of_hours),
            (Field::CancelledWithin24h, self.cancelled),
            (Field::AccessDenied, self.access_denied),
        ];

        valued
            .into_iter()
            .filter_map(|(field, value)| value.clone().map(|value| (field, value)))
            .chain(
                flags
                    .into_iter()
                    .filter(|(_, set)| *set)
                    .map(|(field, _)| (field, "true".to_string())),
            )
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IgnoredEdit {
    pub field: Field,
    pub value: String,
    pub reason: String,
}

/// What the selectors offer for the final selection.
#[derive(Debug, Serialize)]
pub struct SelectorOptions<'c> {
    pub levels: &'static [Level],
    pub countries: Vec<&'c str>,
    pub cities: &'c [String],
}

impl<'c> SelectorOptions<'c> {
    pub fn of(session: &QuoteSession<'c>) -> Self {
        Self {
            levels: session.level_options(),
            countries: session.country_options(),
            cities: session.city_options(),
        }
    }
}

#[derive(Debug, Serialize)]
struct QuoteReport<'a> {
    request: &'a QuoteRequest,
    options: &'a SelectorOptions<'a>,
    ignored: &'a [IgnoredEdit],
    catalog_degraded: bool,
    result: Option<&'a QuoteResult>,
}

/// Applies edits in order; a rejected edit leaves the prior value in place.
pub fn apply_edits(session: &mut QuoteSession<'_>, args: &QuoteArgs) -> Vec<IgnoredEdit> {
    args.edits()
        .into_iter()
        .filter_map(|(field, value)| {
            session
                .set_field(field, &value)
                .err()
                .map(|error| IgnoredEdit { field, value, reason: error.to_string() })
        })
        .collect()
}

pub fn run(options: &LoadOptions, args: &QuoteArgs) -> CommandResult {
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

    runtime.block_on(async {
        let load = load_catalog(&service).await;
        let mut session = QuoteSession::new(&load.catalog);
        let ignored = apply_edits(&mut session, args);
        let request = session.request();
        let options = SelectorOptions::of(&session);

        if args.dry_run {
            let report = QuoteReport {
                request: &request,
                options: &options,
                ignored: &ignored,
                catalog_degraded: load.is_degraded(),
                result: None,
            };
            let human = render_request(&request, &options, &ignored);
            return CommandResult::rendered(COMMAND, args.json, &report, human);
        }

        match calculate(&mut session, &service).await {
            CalculationOutcome::Displayed => {
                let result = session.result();
                let report = QuoteReport {
                    request: &request,
                    options: &options,
                    ignored: &ignored,
                    catalog_degraded: load.is_degraded(),
                    result,
                };
                let human =
                    result.map(|result| render_result(result, &ignored)).unwrap_or_default();
                CommandResult::rendered(COMMAND, args.json, &report, human)
            }
            CalculationOutcome::Failed(error) => CommandResult::from_quote_error(COMMAND, &error),
            CalculationOutcome::Superseded => CommandResult::failure(
                COMMAND,
                "superseded",
                "calculation was superseded",
                EXIT_CALCULATION_FAILED,
            ),
        }
    })
}

fn render_request(
    request: &QuoteRequest,
    options: &SelectorOptions<'_>,
    ignored: &[IgnoredEdit],
) -> String {
    let mut lines = vec!["request (not sent):".to_string()];
    lines.extend(
        request.query_pairs().into_iter().map(|(key, value)| format!("- {key} = {value}")),
    );
    let levels: Vec<&str> = options.levels.iter().map(|level| level.as_str()).collect();
    lines.push(format!("levels offered: {}", join_or_none(&levels)));
    lines.push(format!("countries offered: {}", join_or_none(&options.countries)));
    let cities: Vec<&str> = options.cities.iter().map(String::as_str).collect();
    lines.push(format!("cities offered: {}", join_or_none(&cities)));
    lines.extend(render_ignored(ignored));
    lines.join("\n")
}

fn join_or_none(values: &[&str]) -> String {
    if values.is_empty() {
        "(none)".to_string()
    } else {
        values.join(", ")
    }
}

fn render_result(result: &QuoteResult, ignored: &[IgnoredEdit]) -> String {
    let mut lines: Vec<String> =
        result.lines().into_iter().map(|line| format!("{}: {}", line.label, line.value)).collect();
    lines.extend(render_ignored(ignored));
    lines.join("\n")
}

fn render_ignored(ignored: &[IgnoredEdit]) -> impl Iterator<Item = String> + '_ {
    ignored.iter().map(|edit| format!("ignored {} = `{}`: {}", edit.field, edit.value, edit.reason))
}
