// src/model/context.rs

use serde::{Deserialize, Serialize};

/// GDPR consent state. The applies-flag and the consent string are carried
/// independently; either may be present without the other.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct GdprConsent {
    pub applies: Option<bool>,
    pub consent_string: Option<String>,
}

/// Auction-wide context shared by every slot in one build call.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct AuctionContext {
    pub auction_id: String,
    /// Referrer / page URL of the auction; overridden by
    /// `ExchangeConfig::page_url` when that is set.
    pub referer: String,
    pub gdpr: Option<GdprConsent>,
    pub us_privacy: Option<String>,
}
