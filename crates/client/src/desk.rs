use pricebook_core::cpq::catalog::Catalog;
use pricebook_core::domain::quote::CalcResponse;
use pricebook_core::errors::QuoteError;
use pricebook_core::service::{PricingService, ServiceError};
use pricebook_core::session::{CalculationOutcome, DisplayState, PendingCalculation, QuoteSession};
use tracing::{debug, info, warn};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CatalogSource {
    Pricebook,
    Tier1Cities,
}

impl CatalogSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pricebook => "pricebook",
            Self::Tier1Cities => "tier1",
        }
    }
}

/// Result of the one-shot startup read. A failed source leaves its half of
/// the catalog empty.
#[derive(Debug)]
pub struct CatalogLoad {
    pub catalog: Catalog,
    pub unavailable: Vec<(CatalogSource, QuoteError)>,
}

impl CatalogLoad {
    pub fn is_degraded(&self) -> bool {
        !self.unavailable.is_empty()
    }
}

pub async fn load_catalog<S>(service: &S) -> CatalogLoad
where
    S: PricingService + ?Sized,
{
    let correlation_id = Uuid::new_v4().to_string();
    info!(
        event_name = "catalog.load.start",
        correlation_id = %correlation_id,
        "loading price book and tier-1 cities"
    );

    let (rows, cities) = tokio::join!(service.fetch_pricebook(), service.fetch_tier1_cities());

    let mut unavailable = Vec::new();
    let rows = degrade(CatalogSource::Pricebook, rows, &correlation_id, &mut unavailable);
    let cities = degrade(CatalogSource::Tier1Cities, cities, &correlation_id, &mut unavailable);

    let catalog = Catalog::new(rows, cities);
    info!(
        event_name = "catalog.load.completed",
        correlation_id = %correlation_id,
        countries = catalog.rows().len(),
        regions = catalog.regions().len(),
        tier1_cities = catalog.tier1_cities().len(),
        degraded = !unavailable.is_empty(),
        "catalog ready"
    );

    CatalogLoad { catalog, unavailable }
}

fn degrade<T: Default>(
    source: CatalogSource,
    loaded: Result<T, ServiceError>,
    correlation_id: &str,
    unavailable: &mut Vec<(CatalogSource, QuoteError)>,
) -> T {
    match loaded {
        Ok(value) => value,
        Err(error) => {
            warn!(
                event_name = "catalog.load.unavailable",
                correlation_id = %correlation_id,
                source = source.as_str(),
                error = %error,
                "catalog source unavailable; continuing without it"
            );
            unavailable.push((source, QuoteError::CatalogUnavailable(error)));
            T::default()
        }
    }
}

/// Sends an already-issued calculation. Completion is left to the caller so
/// several calculations can be in flight against one session.
pub async fn submit<S>(
    service: &S,
    pending: &PendingCalculation,
    correlation_id: &str,
) -> Result<CalcResponse, ServiceError>
where
    S: PricingService + ?Sized,
{
    info!(
        event_name = "quote.calculation.start",
        correlation_id = %correlation_id,
        sequence = pending.sequence,
        rate_type = %pending.request.rate_type,
        level = %pending.request.level,
        country = %pending.request.country,
        "calculation submitted"
    );
    service.calculate(&pending.request).await
}

pub async fn calculate<S>(session: &mut QuoteSession<'_>, service: &S) -> CalculationOutcome
where
    S: PricingService + ?Sized,
{
    let correlation_id = Uuid::new_v4().to_string();
    let pending = session.begin_calculation();
    let response = submit(service, &pending, &correlation_id).await;
    let outcome = session.complete_calculation(pending.sequence, response);
    log_outcome(&outcome, session.display(), pending.sequence, &correlation_id);
    outcome
}

fn log_outcome(
    outcome: &CalculationOutcome,
    display: &DisplayState,
    sequence: u64,
    correlation_id: &str,
) {
    match outcome {
        CalculationOutcome::Displayed => {
            let final_price = match display {
                DisplayState::Result(result) => result.final_price.as_str(),
                DisplayState::Empty | DisplayState::Failed(_) => "",
            };
            info!(
                event_name = "quote.calculation.settled",
                correlation_id = %correlation_id,
                sequence,
                final_price,
                "calculation displayed"
            );
        }
        CalculationOutcome::Failed(error) => warn!(
            event_name = "quote.calculation.failed",
            correlation_id = %correlation_id,
            sequence,
            error_kind = error.kind().as_str(),
            error = %error,
            "calculation failed"
        ),
        CalculationOutcome::Superseded => debug!(
            event_name = "quote.calculation.superseded",
            correlation_id = %correlation_id,
            sequence,
            "stale calculation discarded"
        ),
    }
}
