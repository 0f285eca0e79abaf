//! Bid-request translator for the OpenX exchange.
//!
//! Turns publisher-side slot descriptions into exchange wire requests and
//! normalizes whatever the exchange sends back. Two protocols are live at
//! once: the legacy flat-query GET endpoints (`arj` for banner batches,
//! `avjp` for single video slots) and the structured OpenRTB JSON POST
//! endpoint, with a randomized per-batch traffic split between them.
//!
//! The crate performs no I/O. Callers execute the [`ExchangeRequest`]
//! descriptors however they like and feed the response bodies back through
//! [`interpret_response`]. Randomness and time are injected, so a batch is
//! reproducible from a seed and an instant.

pub mod adapter;
pub mod arj;
pub mod config;
pub mod environment;
pub mod model;
pub mod openrtb;

pub use adapter::{
    build_requests, interpret_response, is_slot_eligible, user_syncs, Protocol, SyncOptions,
    SyncType, UserSync, REPORTING_CURRENCY,
};
pub use config::ExchangeConfig;
pub use environment::EnvSnapshot;
pub use model::bid::{AdPayload, BidMeta, MediaType, NormalizedBid, BID_TTL_SECONDS};
pub use model::context::{AuctionContext, GdprConsent};
pub use model::descriptor::{Correlation, ExchangeRequest, HttpMethod, RequestPayload};
pub use model::slot::{
    BannerMedia, FloorInfo, FloorProvider, FloorQuery, MediaTypes, Size, SizeList, SlotParams,
    SlotRequest, SupplyChain, SupplyChainNode, VideoContext, VideoMedia,
};
