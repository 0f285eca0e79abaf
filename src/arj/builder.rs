// src/arj/builder.rs

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

use crate::adapter::identity;
use crate::arj::params::{percent_encode_component, QueryParams};
use crate::config::ExchangeConfig;
use crate::environment::EnvSnapshot;
use crate::model::context::AuctionContext;
use crate::model::descriptor::{Correlation, ExchangeRequest, HttpMethod, RequestPayload};
use crate::model::slot::{SlotRequest, VideoContext};

const BIDDER_CONFIG: &str = "hb_pb";
const BIDDER_VERSION: &str = "3.0.2";

/// Fixed exchange host used whenever a platform id routes the request.
const PLATFORM_BANNER_URL: &str = "https://u.openx.net/w/1.0/arj";
const PLATFORM_VIDEO_URL: &str = "https://u.openx.net/v/1.0/avjp";

/// One GET request for a whole batch of banner slots.
pub fn banner_request(
    slots: &[SlotRequest],
    ctx: &AuctionContext,
    cfg: &ExchangeConfig,
    env: &EnvSnapshot,
    now: DateTime<Utc>,
) -> ExchangeRequest {
    let mut params = common_params(slots, ctx, cfg, env, now);

    params.set(
        "aus",
        slots
            .iter()
            .map(|slot| {
                slot.media_types
                    .banner
                    .as_ref()
                    .map(|banner| {
                        banner
                            .sizes
                            .iter()
                            .map(|size| size.to_string())
                            .collect::<Vec<_>>()
                            .join(",")
                    })
                    .unwrap_or_default()
            })
            .collect::<Vec<_>>()
            .join("|"),
    );
    params.set(
        "divIds",
        slots
            .iter()
            .map(|slot| percent_encode_component(&slot.ad_unit_code))
            .collect::<Vec<_>>()
            .join(","),
    );

    let auids: Vec<&str> = slots
        .iter()
        .map(|slot| slot.params.unit.as_deref().unwrap_or(""))
        .collect();
    if auids.iter().any(|auid| !auid.is_empty()) {
        params.set("auid", auids.join(","));
    }

    if slots.iter().any(|slot| slot.params.do_not_track) {
        params.set("ns", "1");
    }
    if cfg.coppa || slots.iter().any(|slot| slot.params.coppa) {
        params.set("tfcd", "1");
    }

    let mut custom_blocks = Vec::with_capacity(slots.len());
    let mut has_custom_params = false;
    for slot in slots {
        match &slot.params.custom_params {
            Some(custom) => {
                has_custom_params = true;
                custom_blocks.push(encode_custom_params(custom));
            }
            None => custom_blocks.push(String::new()),
        }
    }
    if has_custom_params {
        params.set("tps", custom_blocks.join(","));
    }

    let mut floors = Vec::with_capacity(slots.len());
    let mut has_custom_floor = false;
    for slot in slots {
        match slot.params.custom_floor {
            Some(floor) if floor != 0.0 => {
                has_custom_floor = true;
                // Round to two decimals, then scale to milli-units.
                floors.push(((floor * 100.0).round() as i64 * 10).to_string());
            }
            _ => floors.push("0".to_string()),
        }
    }
    if has_custom_floor {
        params.set("aumfs", floors.join(","));
    }

    let url = if params.contains("ph") {
        PLATFORM_BANNER_URL.to_string()
    } else {
        format!(
            "https://{}/w/1.0/arj",
            slots[0].params.del_domain.as_deref().unwrap_or_default()
        )
    };
    debug!(slots = slots.len(), %url, "built legacy banner request");

    ExchangeRequest {
        method: HttpMethod::Get,
        url,
        payload: RequestPayload::Query(params),
        correlation: Correlation {
            slots: slots.to_vec(),
            captured_at: now,
        },
    }
}

/// One GET request per video slot.
pub fn video_request(
    slot: &SlotRequest,
    ctx: &AuctionContext,
    cfg: &ExchangeConfig,
    env: &EnvSnapshot,
    now: DateTime<Utc>,
) -> ExchangeRequest {
    let mut params = common_params(std::slice::from_ref(slot), ctx, cfg, env, now);
    let (width, height) = slot.resolve_video_size();
    let video_cfg = slot.params.video.clone().unwrap_or_default();

    for (key, value) in &video_cfg {
        if key == "openrtb" {
            // The nested openrtb-style object is re-stamped with the resolved
            // size before serialization; height historically lands on key "v".
            let mut obj = value.as_object().cloned().unwrap_or_default();
            if let Some(w) = width {
                obj.insert("w".to_string(), Value::from(w));
            }
            if let Some(h) = height {
                obj.insert("v".to_string(), Value::from(h));
            }
            params.set(
                "openrtb",
                serde_json::to_string(&Value::Object(obj)).unwrap_or_default(),
            );
        } else if !params.contains(key) && key != "url" {
            params.set(key, render_value(value));
        }
    }

    params.set("auid", slot.params.unit.clone().unwrap_or_default());
    if let Some(vwd) = width
        .map(|w| w.to_string())
        .or_else(|| video_cfg.get("vwd").map(render_value))
    {
        params.set("vwd", vwd);
    }
    if let Some(vht) = height
        .map(|h| h.to_string())
        .or_else(|| video_cfg.get("vht").map(render_value))
    {
        params.set("vht", vht);
    }
    if slot.video_context() == Some(VideoContext::Outstream) {
        params.set("vos", "101");
    }
    if let Some(mimes) = video_cfg.get("mimes") {
        params.set("vmimes", render_value(mimes));
    }

    let url = if params.contains("ph") {
        PLATFORM_VIDEO_URL.to_string()
    } else {
        format!(
            "https://{}/v/1.0/avjp",
            slot.params.del_domain.as_deref().unwrap_or_default()
        )
    };
    debug!(slot = %slot.slot_id, %url, "built legacy video request");

    ExchangeRequest {
        method: HttpMethod::Get,
        url,
        payload: RequestPayload::Query(params),
        correlation: Correlation {
            slots: vec![slot.clone()],
            captured_at: now,
        },
    }
}

/// Shared parameters, built once per batch from the first slot plus the
/// batch-wide fields.
fn common_params(
    slots: &[SlotRequest],
    ctx: &AuctionContext,
    cfg: &ExchangeConfig,
    env: &EnvSnapshot,
    now: DateTime<Utc>,
) -> QueryParams {
    let first = &slots[0];
    let mut params = QueryParams::new();

    params.set("ju", cfg.page_for(&ctx.referer));
    if let Some(charset) = &env.charset {
        params.set("ch", charset.clone());
    }
    params.set("res", env.screen_resolution());
    params.set("ifr", if env.in_iframe { "true" } else { "false" });
    params.set("tz", env.timezone_offset.to_string());
    if let Some(viewport) = env.viewport_dimensions() {
        params.set("tws", viewport);
    }
    params.set("be", "1");
    params.set(
        "bc",
        first
            .params
            .bc
            .clone()
            .unwrap_or_else(|| format!("{}_{}", BIDDER_CONFIG, BIDDER_VERSION)),
    );
    params.set(
        "dddid",
        slots
            .iter()
            .map(|slot| slot.transaction_id.as_str())
            .collect::<Vec<_>>()
            .join(","),
    );
    params.set("nocache", now.timestamp_millis().to_string());

    if let Some(platform) = &first.params.platform {
        params.set("ph", platform.clone());
    }

    if let Some(gdpr) = &ctx.gdpr {
        if let Some(consent) = &gdpr.consent_string {
            params.set("gdpr_consent", consent.clone());
        }
        if let Some(applies) = gdpr.applies {
            params.set("gdpr", if applies { "1" } else { "0" });
        }
        if cfg.cmp_api.as_deref() == Some("iab") {
            params.set("x_gdpr_f", "1");
        }
    }
    if let Some(usp) = &ctx.us_privacy {
        params.set("us_privacy", usp.clone());
    }

    if let Some(user_ids) = &first.user_ids {
        identity::append_user_ids(&mut params, user_ids);
    }
    if let Some(schain) = &first.schain {
        params.set("schain", identity::serialize_supply_chain(schain));
    }

    params
}

/// Encodes one slot's custom-parameter block: lower-cased `key=value` pairs
/// joined by `&`, base64-encoded. Multi-valued entries are comma-joined
/// first; the first `+` becomes `.` and the first `/` becomes `_`.
fn encode_custom_params(custom: &BTreeMap<String, Value>) -> String {
    let pairs: Vec<String> = custom
        .iter()
        .map(|(key, value)| {
            let rendered = render_value(value);
            format!("{}={}", key.to_lowercase(), rendered.to_lowercase())
                .replacen('+', ".", 1)
                .replacen('/', "_", 1)
        })
        .collect();
    BASE64.encode(pairs.join("&"))
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(items) => items
            .iter()
            .map(render_value)
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
        Value::Null => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::slot::{BannerMedia, MediaTypes, Size, SlotParams};
    use serde_json::json;

    fn ctx() -> AuctionContext {
        AuctionContext {
            auction_id: "auction-1".to_string(),
            referer: "https://example.com/page".to_string(),
            ..Default::default()
        }
    }

    fn banner_slot(unit: &str) -> SlotRequest {
        SlotRequest {
            slot_id: format!("slot-{unit}"),
            ad_unit_code: format!("div-{unit}"),
            transaction_id: format!("tx-{unit}"),
            media_types: MediaTypes {
                banner: Some(BannerMedia {
                    sizes: vec![Size::new(300, 250), Size::new(728, 90)],
                }),
                ..Default::default()
            },
            params: SlotParams {
                unit: Some(unit.to_string()),
                del_domain: Some("pub.openx.net".to_string()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn query(req: &ExchangeRequest) -> QueryParams {
        match &req.payload {
            RequestPayload::Query(params) => params.clone(),
            _ => panic!("expected query payload"),
        }
    }

    #[test]
    fn banner_batch_merges_sizes_and_units() {
        let slots = vec![banner_slot("11"), banner_slot("22")];
        let req = banner_request(
            &slots,
            &ctx(),
            &ExchangeConfig::default(),
            &EnvSnapshot::default(),
            Utc::now(),
        );
        let params = query(&req);
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "https://pub.openx.net/w/1.0/arj");
        assert_eq!(params.get("aus"), Some("300x250,728x90|300x250,728x90"));
        assert_eq!(params.get("auid"), Some("11,22"));
        assert_eq!(params.get("divIds"), Some("div-11,div-22"));
        assert_eq!(params.get("dddid"), Some("tx-11,tx-22"));
        assert_eq!(params.get("be"), Some("1"));
        assert_eq!(params.get("bc"), Some("hb_pb_3.0.2"));
    }

    #[test]
    fn platform_id_routes_to_fixed_host() {
        let mut slot = banner_slot("11");
        slot.params.platform = Some("1cabba9e-cafe-3665-beef-f00f00f00f00".to_string());
        let req = banner_request(
            &[slot],
            &ctx(),
            &ExchangeConfig::default(),
            &EnvSnapshot::default(),
            Utc::now(),
        );
        assert_eq!(req.url, PLATFORM_BANNER_URL);
        assert_eq!(
            query(&req).get("ph"),
            Some("1cabba9e-cafe-3665-beef-f00f00f00f00")
        );
    }

    #[test]
    fn auid_omitted_when_every_slot_lacks_a_unit() {
        let mut slot = banner_slot("11");
        slot.params.unit = None;
        let req = banner_request(
            &[slot],
            &ctx(),
            &ExchangeConfig::default(),
            &EnvSnapshot::default(),
            Utc::now(),
        );
        assert!(!query(&req).contains("auid"));
    }

    #[test]
    fn custom_floor_list_is_rounded_and_scaled() {
        let mut with_floor = banner_slot("11");
        with_floor.params.custom_floor = Some(1.5);
        let without_floor = banner_slot("22");
        let req = banner_request(
            &[with_floor, without_floor],
            &ctx(),
            &ExchangeConfig::default(),
            &EnvSnapshot::default(),
            Utc::now(),
        );
        assert_eq!(query(&req).get("aumfs"), Some("1500,0"));
    }

    #[test]
    fn aumfs_omitted_without_any_custom_floor() {
        let req = banner_request(
            &[banner_slot("11")],
            &ctx(),
            &ExchangeConfig::default(),
            &EnvSnapshot::default(),
            Utc::now(),
        );
        assert!(!query(&req).contains("aumfs"));
    }

    #[test]
    fn custom_params_block_is_base64_encoded() {
        let mut slot = banner_slot("11");
        slot.params.custom_params = Some(BTreeMap::from([
            ("KEY1".to_string(), json!("Value+One")),
            ("key2".to_string(), json!(["A", "B"])),
        ]));
        let other = banner_slot("22");
        let req = banner_request(
            &[slot, other],
            &ctx(),
            &ExchangeConfig::default(),
            &EnvSnapshot::default(),
            Utc::now(),
        );
        let tps = query(&req).get("tps").unwrap().to_string();
        let (block, rest) = tps.split_once(',').unwrap();
        assert_eq!(rest, "");
        let decoded = String::from_utf8(BASE64.decode(block).unwrap()).unwrap();
        assert_eq!(decoded, "key1=value.one&key2=a,b");
    }

    #[test]
    fn coppa_flag_from_config_or_slot() {
        let req = banner_request(
            &[banner_slot("11")],
            &ctx(),
            &ExchangeConfig {
                coppa: true,
                ..Default::default()
            },
            &EnvSnapshot::default(),
            Utc::now(),
        );
        assert_eq!(query(&req).get("tfcd"), Some("1"));

        let mut slot = banner_slot("11");
        slot.params.coppa = true;
        let req = banner_request(
            &[slot],
            &ctx(),
            &ExchangeConfig::default(),
            &EnvSnapshot::default(),
            Utc::now(),
        );
        assert_eq!(query(&req).get("tfcd"), Some("1"));
    }

    #[test]
    fn forced_gdpr_marker_in_iab_mode() {
        let mut context = ctx();
        context.gdpr = Some(crate::model::context::GdprConsent {
            applies: Some(false),
            consent_string: Some("CONSENT".to_string()),
        });
        let cfg = ExchangeConfig {
            cmp_api: Some("iab".to_string()),
            ..Default::default()
        };
        let req = banner_request(
            &[banner_slot("11")],
            &context,
            &cfg,
            &EnvSnapshot::default(),
            Utc::now(),
        );
        let params = query(&req);
        assert_eq!(params.get("gdpr"), Some("0"));
        assert_eq!(params.get("gdpr_consent"), Some("CONSENT"));
        assert_eq!(params.get("x_gdpr_f"), Some("1"));
    }

    #[test]
    fn video_request_carries_size_and_outstream_marker() {
        let slot = SlotRequest {
            slot_id: "slot-v".to_string(),
            media_types: MediaTypes {
                video: Some(crate::model::slot::VideoMedia {
                    player_size: Some(Size::new(640, 480)),
                    context: Some(VideoContext::Outstream),
                }),
                ..Default::default()
            },
            params: SlotParams {
                unit: Some("540141567".to_string()),
                del_domain: Some("pub.openx.net".to_string()),
                video: Some(
                    json!({"mimes": ["video/mp4", "video/webm"]})
                        .as_object()
                        .unwrap()
                        .clone(),
                ),
                ..Default::default()
            },
            ..Default::default()
        };
        let req = video_request(
            &slot,
            &ctx(),
            &ExchangeConfig::default(),
            &EnvSnapshot::default(),
            Utc::now(),
        );
        let params = query(&req);
        assert_eq!(req.url, "https://pub.openx.net/v/1.0/avjp");
        assert_eq!(params.get("auid"), Some("540141567"));
        assert_eq!(params.get("vwd"), Some("640"));
        assert_eq!(params.get("vht"), Some("480"));
        assert_eq!(params.get("vos"), Some("101"));
        assert_eq!(params.get("vmimes"), Some("video/mp4,video/webm"));
    }

    #[test]
    fn video_openrtb_object_is_restamped_and_serialized() {
        let slot = SlotRequest {
            slot_id: "slot-v".to_string(),
            sizes: Some(crate::model::slot::SizeList::Flat(Size::new(640, 480))),
            params: SlotParams {
                unit: Some("540141567".to_string()),
                del_domain: Some("pub.openx.net".to_string()),
                video: Some(
                    json!({"openrtb": {"mimes": ["video/mp4"]}})
                        .as_object()
                        .unwrap()
                        .clone(),
                ),
                ..Default::default()
            },
            media_types: MediaTypes {
                video: Some(Default::default()),
                ..Default::default()
            },
            ..Default::default()
        };
        let req = video_request(
            &slot,
            &ctx(),
            &ExchangeConfig::default(),
            &EnvSnapshot::default(),
            Utc::now(),
        );
        let openrtb: Value =
            serde_json::from_str(query(&req).get("openrtb").unwrap()).unwrap();
        assert_eq!(openrtb["w"], 640);
        assert_eq!(openrtb["v"], 480);
        assert_eq!(openrtb["mimes"], json!(["video/mp4"]));
    }

    #[test]
    fn extra_video_config_keys_forwarded_except_url() {
        let slot = SlotRequest {
            slot_id: "slot-v".to_string(),
            media_types: MediaTypes {
                video: Some(Default::default()),
                ..Default::default()
            },
            params: SlotParams {
                unit: Some("540141567".to_string()),
                del_domain: Some("pub.openx.net".to_string()),
                video: Some(
                    json!({"vtest": 1, "url": "https://ignored"})
                        .as_object()
                        .unwrap()
                        .clone(),
                ),
                ..Default::default()
            },
            ..Default::default()
        };
        let req = video_request(
            &slot,
            &ctx(),
            &ExchangeConfig::default(),
            &EnvSnapshot::default(),
            Utc::now(),
        );
        let params = query(&req);
        assert_eq!(params.get("vtest"), Some("1"));
        assert!(!params.contains("url"));
    }
}
