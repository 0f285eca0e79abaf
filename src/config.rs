// src/config.rs

use serde::{Deserialize, Serialize};

/// Process-wide exchange configuration, assembled once by the caller and
/// passed explicitly into every build call.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ExchangeConfig {
    /// Bidder timeout in milliseconds, stamped into the outbound payload (`tmax`).
    pub bidder_timeout: Option<u64>,
    /// Page URL override; when set it wins over the auction referrer.
    pub page_url: Option<String>,
    /// COPPA flag (child-directed treatment).
    pub coppa: bool,
    /// Consent-management API mode (e.g. "iab"); opaque except for the
    /// `iab` check on the legacy path.
    pub cmp_api: Option<String>,
    /// Global modern-protocol sampling rate override (0.0–1.0). When unset,
    /// the per-slot override applies, then 0.0.
    pub test_rate: Option<f64>,
}

impl ExchangeConfig {
    /// Effective page URL for a given auction referrer.
    pub fn page_for(&self, referer: &str) -> String {
        self.page_url.clone().unwrap_or_else(|| referer.to_string())
    }
}
