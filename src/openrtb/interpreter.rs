// src/openrtb/interpreter.rs

use serde_json::Value;
use tracing::warn;

use crate::adapter::REPORTING_CURRENCY;
use crate::model::bid::{AdPayload, MediaType, NormalizedBid, BID_TTL_SECONDS};
use crate::model::descriptor::{ExchangeRequest, RequestPayload};
use crate::openrtb::response::BidResponse;

/// Translates a structured seat/bid response into normalized bid records.
///
/// A response carrying a no-bid reason code yields zero bids; so does a body
/// that does not decode.
pub fn interpret(body: &Value, request: &ExchangeRequest) -> Vec<NormalizedBid> {
    if body.get("nbr").is_some() {
        return Vec::new();
    }

    let resp: BidResponse = match serde_json::from_value(body.clone()) {
        Ok(resp) => resp,
        Err(err) => {
            warn!(%err, "undecodable structured bid response");
            return Vec::new();
        }
    };

    let media_type = match &request.payload {
        RequestPayload::OpenRtb(data) => data
            .imp
            .first()
            .map(|imp| {
                if imp.banner.is_some() {
                    MediaType::Banner
                } else {
                    MediaType::Video
                }
            })
            .unwrap_or(MediaType::Banner),
        RequestPayload::Query(_) => MediaType::Banner,
    };
    let currency = resp
        .cur
        .unwrap_or_else(|| REPORTING_CURRENCY.to_string());

    resp.seatbid
        .into_iter()
        .flat_map(|seatbid| seatbid.bid)
        .map(|bid| NormalizedBid {
            slot_id: bid.impid,
            cpm: bid.price,
            currency: currency.clone(),
            width: bid.w,
            height: bid.h,
            creative_id: bid.crid,
            deal_id: bid.dealid,
            ad: AdPayload::Markup(bid.adm.unwrap_or_default()),
            ttl: BID_TTL_SECONDS,
            net_revenue: true,
            media_type,
            meta: None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    use crate::model::descriptor::{Correlation, HttpMethod};
    use crate::openrtb::request::{
        Banner, BidRequest, Device, Imp, Regs, RequestExt, Site,
    };

    fn banner_descriptor() -> ExchangeRequest {
        let data = BidRequest {
            id: "auction-1".to_string(),
            cur: vec!["USD".to_string()],
            at: 1,
            tmax: None,
            site: Site {
                page: "https://example.com".to_string(),
            },
            regs: Regs {
                coppa: 0,
                ext: None,
            },
            device: Device {
                dnt: 0,
                h: 1080,
                w: 1920,
                ua: String::new(),
                language: "en".to_string(),
            },
            ext: RequestExt {
                bc: "hb_pb_ortb_1.0".to_string(),
                platform: None,
                del_domain: None,
            },
            user: None,
            source: None,
            imp: vec![Imp {
                id: "slot-1".to_string(),
                tagid: Some("123".to_string()),
                banner: Some(Banner {
                    format: vec![],
                    topframe: 1,
                }),
                video: None,
                bidfloor: 0.0,
            }],
        };
        ExchangeRequest {
            method: HttpMethod::Post,
            url: crate::openrtb::builder::REQUEST_URL.to_string(),
            payload: RequestPayload::OpenRtb(data),
            correlation: Correlation {
                slots: vec![],
                captured_at: Utc::now(),
            },
        }
    }

    #[test]
    fn no_bid_reason_yields_empty() {
        let body = json!({"nbr": 2});
        assert!(interpret(&body, &banner_descriptor()).is_empty());
    }

    #[test]
    fn seat_bids_are_normalized() {
        let body = json!({
            "cur": "EUR",
            "seatbid": [{"bid": [{
                "impid": "slot-1",
                "price": 1.25,
                "w": 300,
                "h": 250,
                "crid": "creative-9",
                "dealid": "deal-7",
                "adm": "<div>ad</div>"
            }]}]
        });
        let bids = interpret(&body, &banner_descriptor());
        assert_eq!(bids.len(), 1);
        let bid = &bids[0];
        assert_eq!(bid.slot_id, "slot-1");
        assert_eq!(bid.cpm, 1.25);
        assert_eq!(bid.currency, "EUR");
        assert_eq!(bid.width, Some(300));
        assert_eq!(bid.height, Some(250));
        assert_eq!(bid.creative_id.as_deref(), Some("creative-9"));
        assert_eq!(bid.deal_id.as_deref(), Some("deal-7"));
        assert_eq!(bid.ad, AdPayload::Markup("<div>ad</div>".to_string()));
        assert_eq!(bid.ttl, 300);
        assert!(bid.net_revenue);
        assert_eq!(bid.media_type, MediaType::Banner);
    }

    #[test]
    fn currency_defaults_to_reporting_currency() {
        let body = json!({
            "seatbid": [{"bid": [{"impid": "slot-1", "price": 0.5}]}]
        });
        let bids = interpret(&body, &banner_descriptor());
        assert_eq!(bids[0].currency, "USD");
    }

    #[test]
    fn undecodable_body_yields_empty() {
        let body = json!({"seatbid": "not-an-array"});
        assert!(interpret(&body, &banner_descriptor()).is_empty());
    }
}
