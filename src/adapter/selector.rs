// src/adapter/selector.rs

use rand::Rng;
use tracing::debug;

use crate::config::ExchangeConfig;
use crate::model::slot::SlotRequest;

/// The two wire protocols. This is a live traffic split, not a feature
/// flag: both paths stay behaviorally correct indefinitely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Legacy,
    Modern,
}

/// Draws one uniform value per batch and routes the whole batch to the
/// modern path when it falls below the sampling rate. The rate comes from
/// the global override, then the first slot's override, then 0.
pub fn choose_protocol<R: Rng + ?Sized>(
    slots: &[SlotRequest],
    cfg: &ExchangeConfig,
    rng: &mut R,
) -> Protocol {
    let rate = cfg
        .test_rate
        .filter(|rate| *rate != 0.0)
        .or_else(|| {
            slots
                .first()
                .and_then(|slot| slot.params.test_rate)
                .filter(|rate| *rate != 0.0)
        })
        .unwrap_or(0.0);

    let protocol = if rng.gen::<f64>() < rate {
        Protocol::Modern
    } else {
        Protocol::Legacy
    };
    debug!(rate, ?protocol, "protocol selected");
    protocol
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::slot::SlotParams;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn zero_rate_always_selects_legacy() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..64 {
            assert_eq!(
                choose_protocol(&[], &ExchangeConfig::default(), &mut rng),
                Protocol::Legacy
            );
        }
    }

    #[test]
    fn full_rate_always_selects_modern() {
        let cfg = ExchangeConfig {
            test_rate: Some(1.0),
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..64 {
            assert_eq!(choose_protocol(&[], &cfg, &mut rng), Protocol::Modern);
        }
    }

    #[test]
    fn slot_override_applies_when_global_unset() {
        let slot = SlotRequest {
            params: SlotParams {
                test_rate: Some(1.0),
                ..Default::default()
            },
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(
            choose_protocol(&[slot], &ExchangeConfig::default(), &mut rng),
            Protocol::Modern
        );
    }
}
