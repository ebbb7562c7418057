use serde::Serialize;

use crate::cpq::catalog::Catalog;
use crate::cpq::request::build_request;
use crate::cpq::response::map_response;
use crate::cpq::rules::{Field, FieldRuleSet};
use crate::cpq::selection::{SelectionError, SelectionState};
use crate::domain::quote::{CalcResponse, QuoteRequest, QuoteResult};
use crate::domain::rate_plan::{Level, RatePlanType};
use crate::errors::QuoteError;
use crate::service::ServiceError;

/// A calculation that has been issued but not settled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingCalculation {
    pub sequence: u64,
    pub request: QuoteRequest,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum DisplayState {
    Empty,
    Result(QuoteResult),
    Failed(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CalculationOutcome {
    Displayed,
    Failed(QuoteError),
    /// A newer calculation had already settled; this one was discarded.
    Superseded,
}

/// One operator's quote-building session over a borrowed catalog snapshot.
///
/// Each issued calculation gets a sequence number. A completion only reaches
/// the display if it is newer than the last one that settled, so a slow
/// response never overwrites a fresher one.
#[derive(Debug)]
pub struct QuoteSession<'c> {
    catalog: &'c Catalog,
    selection: SelectionState,
    display: DisplayState,
    issued: u64,
    settled: u64,
}

impl<'c> QuoteSession<'c> {
    pub fn new(catalog: &'c Catalog) -> Self {
        Self::with_selection(catalog, SelectionState::default())
    }

    pub fn with_selection(catalog: &'c Catalog, mut selection: SelectionState) -> Self {
        let rate_type = selection.rate_type;
        selection.set_rate_type(rate_type);
        Self { catalog, selection, display: DisplayState::Empty, issued: 0, settled: 0 }
    }

    pub fn catalog(&self) -> &'c Catalog {
        self.catalog
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn rules(&self) -> FieldRuleSet {
        self.selection.rules()
    }

    pub fn display(&self) -> &DisplayState {
        &self.display
    }

    pub fn result(&self) -> Option<&QuoteResult> {
        match &self.display {
            DisplayState::Result(result) => Some(result),
            DisplayState::Empty | DisplayState::Failed(_) => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.display {
            DisplayState::Failed(message) => Some(message),
            DisplayState::Empty | DisplayState::Result(_) => None,
        }
    }

    pub fn set_field(&mut self, field: Field, raw: &str) -> Result<(), SelectionError> {
        self.selection.set_field(field, raw, self.catalog)
    }

    pub fn set_rate_type(&mut self, rate_type: RatePlanType) {
        self.selection.set_rate_type(rate_type);
    }

    pub fn level_options(&self) -> &'static [Level] {
        self.rules().levels
    }

    /// Countries offered by the selector under the current region filter.
    pub fn country_options(&self) -> Vec<&'c str> {
        self.catalog.countries_in(self.selection.region.as_deref())
    }

    /// Tier-1 cities, offered only while the city field is relevant.
    pub fn city_options(&self) -> &'c [String] {
        if self.rules().city {
            self.catalog.tier1_cities()
        } else {
            &[]
        }
    }

    pub fn request(&self) -> QuoteRequest {
        build_request(&self.selection)
    }

    pub fn begin_calculation(&mut self) -> PendingCalculation {
        self.issued += 1;
        PendingCalculation { sequence: self.issued, request: self.request() }
    }

    pub fn complete_calculation(
        &mut self,
        sequence: u64,
        response: Result<CalcResponse, ServiceError>,
    ) -> CalculationOutcome {
        if sequence <= self.settled {
            return CalculationOutcome::Superseded;
        }
        self.settled = sequence;

        let mapped = response
            .map_err(QuoteError::CalculationFailed)
            .and_then(|response| map_response(&response).map_err(QuoteError::from));

        match mapped {
            Ok(result) => {
                self.display = DisplayState::Result(result);
                CalculationOutcome::Displayed
            }
            Err(error) => {
                self.display = DisplayState::Failed(error.user_message());
                CalculationOutcome::Failed(error)
            }
        }
    }
}
