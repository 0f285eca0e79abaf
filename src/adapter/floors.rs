// src/adapter/floors.rs

use crate::adapter::REPORTING_CURRENCY;
use crate::model::bid::MediaType;
use crate::model::slot::{FloorQuery, SlotRequest};

/// Resolves the advisory floor for one slot and media type.
///
/// First non-empty source wins: the slot's floor capability (queried with
/// the reporting currency and a wildcard size), then the static custom
/// floor, then zero. A zero from either source counts as absent.
pub fn resolve_floor(slot: &SlotRequest, media_type: MediaType) -> f64 {
    let query = FloorQuery {
        currency: REPORTING_CURRENCY.to_string(),
        media_type,
        size: None,
    };
    let provider_floor = slot
        .floor_provider
        .as_ref()
        .and_then(|provider| provider.floor(&query))
        .map(|info| info.floor);

    provider_floor
        .filter(|floor| *floor != 0.0)
        .or_else(|| slot.params.custom_floor.filter(|floor| *floor != 0.0))
        .unwrap_or(0.0)
        .max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::slot::{FloorInfo, SlotParams};
    use std::sync::Arc;

    fn provider(floor: Option<f64>) -> Arc<dyn crate::model::slot::FloorProvider> {
        Arc::new(move |_query: &FloorQuery| floor.map(|floor| FloorInfo { floor }))
    }

    #[test]
    fn capability_wins_over_larger_static_floor() {
        let slot = SlotRequest {
            params: SlotParams {
                custom_floor: Some(2.0),
                ..Default::default()
            },
            floor_provider: Some(provider(Some(0.42))),
            ..Default::default()
        };
        assert_eq!(resolve_floor(&slot, MediaType::Banner), 0.42);
    }

    #[test]
    fn zero_capability_floor_falls_through() {
        let slot = SlotRequest {
            params: SlotParams {
                custom_floor: Some(1.2),
                ..Default::default()
            },
            floor_provider: Some(provider(Some(0.0))),
            ..Default::default()
        };
        assert_eq!(resolve_floor(&slot, MediaType::Video), 1.2);
    }

    #[test]
    fn missing_capability_uses_static_floor() {
        let slot = SlotRequest {
            params: SlotParams {
                custom_floor: Some(0.8),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(resolve_floor(&slot, MediaType::Banner), 0.8);
    }

    #[test]
    fn no_source_resolves_to_zero() {
        let slot = SlotRequest::default();
        assert_eq!(resolve_floor(&slot, MediaType::Banner), 0.0);

        let declined = SlotRequest {
            floor_provider: Some(provider(None)),
            ..Default::default()
        };
        assert_eq!(resolve_floor(&declined, MediaType::Banner), 0.0);
    }

    #[test]
    fn negative_floor_clamps_to_zero() {
        let slot = SlotRequest {
            floor_provider: Some(provider(Some(-1.0))),
            ..Default::default()
        };
        assert_eq!(resolve_floor(&slot, MediaType::Banner), 0.0);
    }
}
