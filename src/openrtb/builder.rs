// src/openrtb/builder.rs

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tracing::debug;

use crate::adapter::floors::resolve_floor;
use crate::adapter::REPORTING_CURRENCY;
use crate::config::ExchangeConfig;
use crate::environment::EnvSnapshot;
use crate::model::bid::MediaType;
use crate::model::context::AuctionContext;
use crate::model::descriptor::{Correlation, ExchangeRequest, HttpMethod, RequestPayload};
use crate::model::slot::{SlotRequest, VideoContext};
use crate::openrtb::request::{
    Banner, BidRequest, Device, Format, Imp, Regs, RegsExt, RequestExt, Site, Source, SourceExt,
    User, UserExt, Video,
};

/// Fixed endpoint of the structured protocol.
pub const REQUEST_URL: &str = "https://rtb.openx.net/openrtbb/prebidjs";

const BIDDER_CONFIG: &str = "hb_pb_ortb";
const BIDDER_VERSION: &str = "1.0";

/// One request for a whole batch of banner slots: one impression per slot.
pub fn banner_request(
    slots: &[SlotRequest],
    ctx: &AuctionContext,
    cfg: &ExchangeConfig,
    env: &EnvSnapshot,
    now: DateTime<Utc>,
) -> ExchangeRequest {
    let mut data = base_request(&slots[0], ctx, cfg, env);
    data.imp = slots
        .iter()
        .map(|slot| Imp {
            id: slot.slot_id.clone(),
            tagid: slot.params.unit.clone(),
            banner: Some(Banner {
                format: slot
                    .media_types
                    .banner
                    .as_ref()
                    .map(|b| b.sizes.iter().map(|s| Format { w: s.w, h: s.h }).collect())
                    .unwrap_or_default(),
                topframe: topframe(env),
            }),
            video: None,
            bidfloor: resolve_floor(slot, MediaType::Banner),
        })
        .collect();
    debug!(imps = data.imp.len(), "built structured banner request");

    descriptor(data, slots.to_vec(), now)
}

/// One request per video slot: a single impression.
pub fn video_request(
    slot: &SlotRequest,
    ctx: &AuctionContext,
    cfg: &ExchangeConfig,
    env: &EnvSnapshot,
    now: DateTime<Utc>,
) -> ExchangeRequest {
    let (w, h) = slot.resolve_video_size();
    let mut video = Video {
        w,
        h,
        topframe: topframe(env),
        ..Default::default()
    };
    if let Some(overrides) = &slot.params.openrtb {
        apply_video_targeting(&mut video, overrides);
    }
    if let Some(config) = &slot.params.video {
        apply_video_targeting(&mut video, config);
    }
    match slot.video_context() {
        Some(VideoContext::Instream) => video.placement = Some(1),
        Some(VideoContext::Outstream) => video.placement = Some(4),
        _ => {}
    }

    let mut data = base_request(slot, ctx, cfg, env);
    data.imp = vec![Imp {
        id: slot.slot_id.clone(),
        tagid: slot.params.unit.clone(),
        banner: None,
        video: Some(video),
        bidfloor: resolve_floor(slot, MediaType::Video),
    }];
    debug!(slot = %slot.slot_id, "built structured video request");

    descriptor(data, vec![slot.clone()], now)
}

fn descriptor(data: BidRequest, slots: Vec<SlotRequest>, now: DateTime<Utc>) -> ExchangeRequest {
    ExchangeRequest {
        method: HttpMethod::Post,
        url: REQUEST_URL.to_string(),
        payload: RequestPayload::OpenRtb(data),
        correlation: Correlation {
            slots,
            captured_at: now,
        },
    }
}

fn topframe(env: &EnvSnapshot) -> u8 {
    if env.in_iframe {
        0
    } else {
        1
    }
}

fn base_request(
    slot: &SlotRequest,
    ctx: &AuctionContext,
    cfg: &ExchangeConfig,
    env: &EnvSnapshot,
) -> BidRequest {
    let mut req = BidRequest {
        id: ctx.auction_id.clone(),
        cur: vec![REPORTING_CURRENCY.to_string()],
        at: 1,
        tmax: cfg.bidder_timeout,
        site: Site {
            page: cfg.page_for(&ctx.referer),
        },
        regs: Regs {
            coppa: u8::from(cfg.coppa),
            ext: None,
        },
        device: Device {
            dnt: u8::from(env.dnt),
            h: env.screen_height,
            w: env.screen_width,
            ua: env.user_agent.clone(),
            language: env.language_prefix(),
        },
        ext: RequestExt {
            bc: slot
                .params
                .bc
                .clone()
                .unwrap_or_else(|| format!("{}_{}", BIDDER_CONFIG, BIDDER_VERSION)),
            platform: slot.params.platform.clone(),
            del_domain: slot.params.del_domain.clone(),
        },
        user: None,
        source: None,
        imp: Vec::new(),
    };

    if let Some(gdpr) = &ctx.gdpr {
        if let Some(applies) = gdpr.applies {
            req.regs.ext.get_or_insert_with(RegsExt::default).gdpr = Some(u8::from(applies));
        }
        if let Some(consent) = &gdpr.consent_string {
            req.user.get_or_insert_with(User::default).ext.consent = Some(consent.clone());
        }
    }
    if let Some(usp) = &ctx.us_privacy {
        req.regs.ext.get_or_insert_with(RegsExt::default).us_privacy = Some(usp.clone());
    }
    if let Some(schain) = &slot.schain {
        req.source = Some(Source {
            ext: SourceExt {
                schain: schain.clone(),
            },
        });
    }
    if let Some(eids) = &slot.eids {
        req.user.get_or_insert_with(User::default).ext.eids = Some(eids.clone());
    }

    req
}

/// Merges recognized video targeting attributes from an override object.
/// Unknown keys and values of the wrong shape are dropped.
fn apply_video_targeting(video: &mut Video, src: &Map<String, Value>) {
    fn take<T: serde::de::DeserializeOwned>(value: &Value) -> Option<T> {
        serde_json::from_value(value.clone()).ok()
    }

    for (key, value) in src {
        match key.as_str() {
            "startdelay" => video.startdelay = take(value).or(video.startdelay),
            "mimes" => video.mimes = take(value).or(video.mimes.take()),
            "minduration" => video.minduration = take(value).or(video.minduration),
            "maxduration" => video.maxduration = take(value).or(video.maxduration),
            "skippable" => video.skippable = take(value).or(video.skippable),
            "playbackmethod" => video.playbackmethod = take(value).or(video.playbackmethod.take()),
            "api" => video.api = take(value).or(video.api.take()),
            "protocols" => video.protocols = take(value).or(video.protocols.take()),
            "boxingallowed" => video.boxingallowed = take(value).or(video.boxingallowed),
            "linearity" => video.linearity = take(value).or(video.linearity),
            "delivery" => video.delivery = take(value).or(video.delivery.take()),
            "protocol" => video.protocol = take(value).or(video.protocol),
            "placement" => video.placement = take(value).or(video.placement),
            "minbitrate" => video.minbitrate = take(value).or(video.minbitrate),
            "maxbitrate" => video.maxbitrate = take(value).or(video.maxbitrate),
            "ext" => video.ext = Some(value.clone()),
            _ => {}
        }
    }
}
