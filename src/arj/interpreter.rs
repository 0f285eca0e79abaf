// src/arj/interpreter.rs

use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::adapter::REPORTING_CURRENCY;
use crate::model::bid::{AdPayload, BidMeta, MediaType, NormalizedBid, BID_TTL_SECONDS};
use crate::model::descriptor::ExchangeRequest;
use crate::arj::response::{ArjResponse, AvjpResponse};

/// Translates a legacy banner (`arj`) response into normalized bids.
///
/// Units are matched to slots by the positional index the exchange embeds
/// in each unit; this is the wire contract and must not be replaced by
/// id-based matching. Units without a revenue field are skipped while
/// their siblings keep their slot association.
pub fn interpret_banner(body: &Value, request: &ExchangeRequest) -> Vec<NormalizedBid> {
    let resp: ArjResponse = match serde_json::from_value(body.clone()) {
        Ok(resp) => resp,
        Err(err) => {
            warn!(%err, "undecodable legacy banner response");
            return Vec::new();
        }
    };
    let units = resp.ads.and_then(|ads| ads.ad).unwrap_or_default();
    let slots = &request.correlation.slots;

    let mut bids = Vec::new();
    for unit in units {
        let Some(idx) = unit.idx else {
            warn!("ad unit without index skipped");
            continue;
        };
        let Some(slot) = slots.get(idx as usize) else {
            warn!(idx, "ad unit index outside slot batch");
            continue;
        };
        let Some(cpm) = unit
            .pub_rev
            .as_deref()
            .filter(|rev| !rev.is_empty())
            .and_then(|rev| rev.trim().parse::<f64>().ok())
            .map(|rev| rev / 1000.0)
        else {
            // No fill for this unit.
            debug!(idx, "ad unit without revenue skipped");
            continue;
        };

        let creative = unit.creative.as_ref().and_then(|creatives| creatives.first());
        let meta = BidMeta {
            brand_id: unit.brand_id.clone(),
            dsp_id: unit.adv_id.clone(),
            advertiser_id: None,
        };
        bids.push(NormalizedBid {
            slot_id: slot.slot_id.clone(),
            cpm,
            currency: unit
                .currency
                .clone()
                .unwrap_or_else(|| REPORTING_CURRENCY.to_string()),
            width: creative.and_then(|c| c.width),
            height: creative.and_then(|c| c.height),
            creative_id: creative.and_then(|c| c.id.clone()),
            deal_id: unit.deal_id.clone(),
            ad: AdPayload::Markup(unit.html.clone().unwrap_or_default()),
            ttl: BID_TTL_SECONDS,
            net_revenue: true,
            media_type: MediaType::Banner,
            meta: if meta.is_empty() { None } else { Some(meta) },
        });
    }
    bids
}

/// Translates a legacy video (`avjp`) response: a single implicit unit,
/// skipped entirely when the VAST URL or the revenue field is empty.
pub fn interpret_video(body: &Value, request: &ExchangeRequest) -> Vec<NormalizedBid> {
    let resp: AvjpResponse = match serde_json::from_value(body.clone()) {
        Ok(resp) => resp,
        Err(err) => {
            warn!(%err, "undecodable legacy video response");
            return Vec::new();
        }
    };
    let Some(slot) = request.correlation.slots.first() else {
        return Vec::new();
    };
    let Some(vast_url) = resp.vast_url.filter(|u| !u.is_empty()) else {
        return Vec::new();
    };
    let Some(cpm) = resp
        .pub_rev
        .as_deref()
        .filter(|rev| !rev.is_empty())
        .and_then(|rev| rev.trim().parse::<f64>().ok())
        .map(|rev| rev / 1000.0)
    else {
        return Vec::new();
    };

    log_vast_diagnostics(&vast_url);

    vec![NormalizedBid {
        slot_id: slot.slot_id.clone(),
        cpm,
        currency: resp
            .currency
            .unwrap_or_else(|| REPORTING_CURRENCY.to_string()),
        width: resp.width,
        height: resp.height,
        creative_id: resp.adid,
        deal_id: None,
        ad: AdPayload::VastUrl(vast_url),
        ttl: BID_TTL_SECONDS,
        net_revenue: true,
        media_type: MediaType::Video,
        meta: None,
    }]
}

/// Surfaces the routing parameters the exchange stamps into the VAST URL.
fn log_vast_diagnostics(vast_url: &str) {
    let Ok(url) = Url::parse(vast_url) else {
        return;
    };
    let mut ph = None;
    let mut colo = None;
    let mut ts = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "ph" => ph = Some(value.into_owned()),
            "colo" => colo = Some(value.into_owned()),
            "ts" => ts = Some(value.into_owned()),
            _ => {}
        }
    }
    debug!(?ph, ?colo, ?ts, "vast routing parameters");
}
