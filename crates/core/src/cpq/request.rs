use crate::cpq::rules::DurationRule;
use crate::cpq::selection::SelectionState;
use crate::domain::quote::{QuoteRequest, RequestDuration};

/// Projects a selection through the rule table into the canonical payload.
///
/// Fields irrelevant to the current plan never reach the request, whatever
/// the state still holds for them. `region` is a selector filter and is never
/// sent.
pub fn build_request(state: &SelectionState) -> QuoteRequest {
    let rules = state.rules();

    let duration = match rules.duration {
        rule @ DurationRule::Months { .. } => {
            Some(RequestDuration::Months(rule.clamp(state.months)))
        }
        rule @ DurationRule::Days { .. } => Some(RequestDuration::Days(rule.clamp(state.days))),
        DurationRule::PerDispatch => None,
    };

    QuoteRequest {
        country: state.country.clone().unwrap_or_default(),
        city: if rules.city { state.city.clone() } else { None },
        level: rules.coerce_level(state.level),
        rate_type: state.rate_type,
        with_backfill: rules.backfill.then_some(state.with_backfill),
        quantity: state.quantity.max(1),
        duration,
        distance_km: state.distance_km,
        is_weekend: state.is_weekend,
        is_out_of_hours: state.is_out_of_hours,
        cancelled_within_24h: state.cancelled_within_24h,
        access_denied: state.access_denied,
        transition_cost: state.transition_cost,
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use serde_json::json;

    use super::build_request;
    use crate::cpq::catalog::Catalog;
    use crate::cpq::rules::Field;
    use crate::cpq::selection::SelectionState;
    use crate::domain::geography::{GeographyRow, TIER1_USA_COUNTRY};
    use crate::domain::quote::RequestDuration;
    use crate::domain::rate_plan::{Level, RatePlanType};

    fn catalog() -> Catalog {
        Catalog::new(
            vec![GeographyRow::new("EMEA", "Germany"), GeographyRow::new("NA", TIER1_USA_COUNTRY)],
            vec!["New York".to_string(), "Seattle".to_string()],
        )
    }

    fn state_for(plan: RatePlanType) -> SelectionState {
        let mut state = SelectionState {
            country: Some("Germany".to_string()),
            months: 6,
            days: 4,
            ..SelectionState::default()
        };
        state.set_rate_type(plan);
        state
    }

    #[test]
    fn months_and_days_follow_the_plan_and_never_coexist() {
        for plan in RatePlanType::ALL {
            let request = build_request(&state_for(plan));
            let expected = match plan {
                RatePlanType::Yearly | RatePlanType::ProjectShort | RatePlanType::ProjectLong => {
                    Some(RequestDuration::Months(6))
                }
                RatePlanType::Daily | RatePlanType::HalfDay => Some(RequestDuration::Days(4)),
                RatePlanType::Dispatch | RatePlanType::DispatchImac => None,
            };
            assert_eq!(request.duration, expected, "duration for {plan}");
            assert!(!(request.months().is_some() && request.days().is_some()));
        }
    }

    #[test]
    fn backfill_is_sent_only_for_yearly() {
        for plan in RatePlanType::ALL {
            let request = build_request(&state_for(plan));
            assert_eq!(request.with_backfill.is_some(), plan == RatePlanType::Yearly, "{plan}");
            let keys: Vec<&str> = request.query_pairs().iter().map(|(key, _)| *key).collect();
            assert_eq!(keys.contains(&"withBackfill"), plan == RatePlanType::Yearly);
        }
    }

    #[test]
    fn stale_city_is_never_sent_outside_tier1() {
        let catalog = catalog();
        let mut state = SelectionState::default();
        state.set_field(Field::Country, TIER1_USA_COUNTRY, &catalog).expect("country");
        state.set_field(Field::City, "Seattle", &catalog).expect("city");
        assert_eq!(build_request(&state).city.as_deref(), Some("Seattle"));

        state.set_field(Field::Country, "Germany", &catalog).expect("country");
        let request = build_request(&state);

        assert_eq!(request.city, None);
        assert!(request.query_pairs().contains(&("city", String::new())));
        assert_eq!(serde_json::to_value(&request).expect("json")["city"], json!(null));
    }

    #[test]
    fn yearly_months_outside_bounds_are_clamped_on_the_way_out() {
        let catalog = catalog();
        let mut state = SelectionState::default();
        state.set_rate_type(RatePlanType::ProjectLong);
        state.set_field(Field::Months, "30", &catalog).expect("project months");

        state.set_rate_type(RatePlanType::Yearly);
        assert_eq!(build_request(&state).months(), Some(12));

        state.set_rate_type(RatePlanType::ProjectLong);
        assert_eq!(build_request(&state).months(), Some(30));
    }

    #[test]
    fn region_is_never_part_of_the_payload() {
        let catalog = catalog();
        let mut state = SelectionState::default();
        state.set_field(Field::Region, "EMEA", &catalog).expect("region");
        state.set_field(Field::Country, "Germany", &catalog).expect("country");

        let request = build_request(&state);
        let encoded = serde_json::to_value(&request).expect("json");

        assert!(encoded.get("region").is_none());
        assert!(request.query_pairs().iter().all(|(key, _)| *key != "region"));
    }

    #[test]
    fn germany_daily_scenario_resets_level_and_sends_days_only() {
        let catalog = catalog();
        let mut state = SelectionState::default();
        state.set_field(Field::Country, "Germany", &catalog).expect("country");
        state.set_field(Field::Level, "L4", &catalog).expect("L4 is valid under yearly");
        state.set_field(Field::RateType, "daily", &catalog).expect("rate type");
        state.set_field(Field::Days, "5", &catalog).expect("days");

        assert_eq!(state.level, Level::L1);
        let request = build_request(&state);
        assert_eq!(request.level, Level::L1);
        assert_eq!(request.days(), Some(5));
        assert_eq!(request.months(), None);
        assert_eq!(request.city, None);
        assert_eq!(request.with_backfill, None);
    }

    #[test]
    fn tier1_yearly_scenario_carries_city_months_and_text_backfill() {
        let catalog = catalog();
        let mut state = SelectionState::default();
        state.set_field(Field::Country, TIER1_USA_COUNTRY, &catalog).expect("country");
        state.set_field(Field::City, "New York", &catalog).expect("city");
        state.set_field(Field::RateType, "yearly", &catalog).expect("rate type");
        state.set_field(Field::Months, "6", &catalog).expect("months");
        state.set_field(Field::WithBackfill, "false", &catalog).expect("backfill");
        state.set_field(Field::Quantity, "3", &catalog).expect("quantity");

        let request = build_request(&state);
        assert_eq!(request.city.as_deref(), Some("New York"));
        assert_eq!(request.months(), Some(6));
        assert_eq!(request.days(), None);
        assert_eq!(request.quantity, 3);

        let pairs = request.query_pairs();
        assert!(pairs.contains(&("withBackfill", "false".to_string())));
        assert!(pairs.contains(&("months", "6".to_string())));
        assert!(pairs.iter().all(|(key, _)| *key != "days"));
    }

    #[test]
    fn surcharge_flags_and_amounts_are_always_sent() {
        let mut state = state_for(RatePlanType::Dispatch);
        state.is_weekend = true;
        state.cancelled_within_24h = true;
        state.distance_km = Decimal::new(80, 0);
        state.transition_cost = Decimal::new(2500, 2);

        let pairs = build_request(&state).query_pairs();
        assert!(pairs.contains(&("isWeekend", "true".to_string())));
        assert!(pairs.contains(&("isOutOfHours", "false".to_string())));
        assert!(pairs.contains(&("cancelled", "true".to_string())));
        assert!(pairs.contains(&("accessDenied", "false".to_string())));
        assert!(pairs.contains(&("distance", "80".to_string())));
        assert!(pairs.contains(&("transitionCost", "25.00".to_string())));
    }
}
