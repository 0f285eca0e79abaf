// src/model/bid.rs

use serde::{Deserialize, Serialize};
use std::fmt;

/// Media type of a slot or a returned bid.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Banner,
    Video,
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaType::Banner => write!(f, "banner"),
            MediaType::Video => write!(f, "video"),
        }
    }
}

/// Creative payload of a normalized bid: inline markup for banners and
/// structured-protocol bids, a VAST URL for legacy video fills.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum AdPayload {
    Markup(String),
    VastUrl(String),
}

/// Advertiser metadata passed through from the exchange when supplied.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct BidMeta {
    pub brand_id: Option<String>,
    pub dsp_id: Option<String>,
    pub advertiser_id: Option<String>,
}

impl BidMeta {
    pub fn is_empty(&self) -> bool {
        self.brand_id.is_none() && self.dsp_id.is_none() && self.advertiser_id.is_none()
    }
}

/// One normalized bid handed to the downstream auction.
///
/// Prices are always full currency units; the legacy protocol's milli-unit
/// revenue fields are converted by the interpreter before this is built.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct NormalizedBid {
    /// Identifier of the slot request this bid fills.
    pub slot_id: String,
    /// Price in full currency units.
    pub cpm: f64,
    pub currency: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub creative_id: Option<String>,
    pub deal_id: Option<String>,
    pub ad: AdPayload,
    /// Validity window in seconds; fixed at 300.
    pub ttl: u32,
    /// Always true: exchange prices are already net.
    pub net_revenue: bool,
    pub media_type: MediaType,
    pub meta: Option<BidMeta>,
}

/// Fixed time-to-live for every returned bid.
pub const BID_TTL_SECONDS: u32 = 300;
