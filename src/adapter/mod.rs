// src/adapter/mod.rs

pub mod floors;
pub mod identity;
pub mod selector;
pub mod sync;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde_json::Value;
use tracing::debug;

use crate::arj;
use crate::config::ExchangeConfig;
use crate::environment::EnvSnapshot;
use crate::model::bid::{MediaType, NormalizedBid};
use crate::model::context::AuctionContext;
use crate::model::descriptor::{ExchangeRequest, RequestPayload};
use crate::model::slot::SlotRequest;
use crate::openrtb;

pub use selector::Protocol;
pub use sync::{user_syncs, SyncOptions, SyncType, UserSync};

/// All revenue figures are quoted in this currency.
pub const REPORTING_CURRENCY: &str = "USD";

/// A slot can be routed when it names a delivery domain or a platform id,
/// and a banner slot additionally needs either an ad unit id or at least
/// one size to describe itself with.
pub fn is_slot_eligible(slot: &SlotRequest) -> bool {
    let routable = slot
        .params
        .del_domain
        .as_deref()
        .is_some_and(|d| !d.is_empty())
        || slot
            .params
            .platform
            .as_deref()
            .is_some_and(|p| !p.is_empty());
    if !routable {
        return false;
    }
    let has_unit = slot.params.unit.as_deref().is_some_and(|u| !u.is_empty());
    if slot.media_types.banner.is_some() {
        has_unit
            || slot
                .media_types
                .banner
                .as_ref()
                .is_some_and(|banner| !banner.sizes.is_empty())
    } else {
        has_unit
    }
}

/// Translates a batch of slots into wire requests.
///
/// The protocol is drawn once per batch. Banner slots always share a single
/// request; each video slot gets its own. On the modern path a slot carrying
/// both media declarations is sent on both.
pub fn build_requests<R: Rng + ?Sized>(
    slots: &[SlotRequest],
    ctx: &AuctionContext,
    cfg: &ExchangeConfig,
    env: &EnvSnapshot,
    rng: &mut R,
    now: DateTime<Utc>,
) -> Vec<ExchangeRequest> {
    let eligible: Vec<SlotRequest> = slots
        .iter()
        .filter(|slot| is_slot_eligible(slot))
        .cloned()
        .collect();
    if eligible.is_empty() {
        return Vec::new();
    }

    let protocol = selector::choose_protocol(&eligible, cfg, rng);
    let mut requests = Vec::new();

    match protocol {
        Protocol::Modern => {
            let banner: Vec<SlotRequest> = eligible
                .iter()
                .filter(|slot| {
                    slot.media_types.banner.is_some() || slot.media_types.video.is_none()
                })
                .cloned()
                .collect();
            if !banner.is_empty() {
                requests.push(openrtb::builder::banner_request(&banner, ctx, cfg, env, now));
            }
            for slot in eligible
                .iter()
                .filter(|slot| slot.media_types.video.is_some())
            {
                requests.push(openrtb::builder::video_request(slot, ctx, cfg, env, now));
            }
        }
        Protocol::Legacy => {
            let (video, banner): (Vec<SlotRequest>, Vec<SlotRequest>) =
                eligible.iter().cloned().partition(|slot| {
                    (slot.media_types.video.is_some() && slot.media_types.banner.is_none())
                        || slot.media_type == Some(MediaType::Video)
                });
            if !banner.is_empty() {
                requests.push(arj::builder::banner_request(&banner, ctx, cfg, env, now));
            }
            for slot in &video {
                requests.push(arj::builder::video_request(slot, ctx, cfg, env, now));
            }
        }
    }

    debug!(
        batch = eligible.len(),
        requests = requests.len(),
        ?protocol,
        "batch translated"
    );
    requests
}

/// Routes a raw response body to the interpreter matching the request that
/// produced it.
pub fn interpret_response(body: &Value, request: &ExchangeRequest) -> Vec<NormalizedBid> {
    match &request.payload {
        RequestPayload::OpenRtb(_) => openrtb::interpreter::interpret(body, request),
        RequestPayload::Query(_) => {
            if request.is_video_url() {
                arj::interpreter::interpret_video(body, request)
            } else {
                arj::interpreter::interpret_banner(body, request)
            }
        }
    }
}
