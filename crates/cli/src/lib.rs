pub mod commands;
pub mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use pricebook_core::config::{ConfigOverrides, LoadOptions, LogFormat};
use pricebook_core::domain::rate_plan::RatePlanType;

#[derive(Debug, Parser)]
#[command(
    name = "pricebook",
    about = "Price Book quote configuration CLI",
    long_about = "Configure service-pricing quotes against the Price Book pricing service, \
                  inspect the catalog and rate-plan rules, and check readiness.",
    after_help = "Examples:\n  pricebook quote --country Germany --rate-type daily --days 5\n  \
                  pricebook catalog --region EMEA\n  pricebook rules --rate-type dispatch\n  \
                  pricebook --base-url http://pricing:5000 doctor --json"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Path to a pricebook.toml config file")]
    config: Option<PathBuf>,
    #[arg(long, global = true, help = "Pricing service base URL (overrides file and env)")]
    base_url: Option<String>,
    #[arg(long, global = true, help = "Pricing service request timeout in seconds")]
    timeout_secs: Option<u64>,
    #[arg(long, global = true, help = "Log level: trace, debug, info, warn or error")]
    log_level: Option<String>,
    #[arg(long, global = true, help = "Log format: compact, pretty or json")]
    log_format: Option<LogFormat>,
    #[command(subcommand)]
    command: Command,
}

impl Cli {
    fn load_options(&self) -> LoadOptions {
        LoadOptions {
            config_path: self.config.clone(),
            overrides: ConfigOverrides {
                service_base_url: self.base_url.clone(),
                service_timeout_secs: self.timeout_secs,
                log_level: self.log_level.clone(),
                log_format: self.log_format,
            },
            ..LoadOptions::default()
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Build a quote from field edits and calculate it with the pricing service")]
    Quote(commands::quote::QuoteArgs),
    #[command(about = "List regions, countries, and tier-1 cities loaded from the price book")]
    Catalog {
        #[arg(long, help = "Only list countries in this region")]
        region: Option<String>,
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Show which fields and values apply to a rate-plan type")]
    Rules {
        #[arg(
            long,
            help = "Rate-plan type (yearly, daily, halfday, dispatch, dispatchIMAC, \
                    projectShort, projectLong)"
        )]
        rate_type: RatePlanType,
        #[arg(long, help = "Country, used to decide whether a city applies")]
        country: Option<String>,
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "Validate config and pricing service reachability")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let options = cli.load_options();

    if let Err(error) = logging::init_from_options(&options) {
        eprintln!("logging setup failed: {error}");
    }

    let result = match cli.command {
        Command::Quote(args) => commands::quote::run(&options, &args),
        Command::Catalog { region, json } => {
            commands::catalog::run(&options, region.as_deref(), json)
        }
        Command::Rules { rate_type, country, json } => {
            commands::rules::run(rate_type, country.as_deref(), json)
        }
        Command::Config => commands::config::run(&options),
        Command::Doctor { json } => commands::doctor::run(&options, json),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
