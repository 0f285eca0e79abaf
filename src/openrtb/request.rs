use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::slot::SupplyChain;

/// OpenRTB BidRequest as posted to the structured endpoint.
///
/// Every optional section is a concrete field skipped when absent, so a
/// missing input never creates a partial or empty parent object.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct BidRequest {
    pub id: String,
    pub cur: Vec<String>,
    /// Auction mode marker; always first-price (1).
    pub at: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tmax: Option<u64>,
    pub site: Site,
    pub regs: Regs,
    pub device: Device,
    pub ext: RequestExt,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<Source>,
    pub imp: Vec<Imp>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Site {
    pub page: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Regs {
    pub coppa: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ext: Option<RegsExt>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct RegsExt {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gdpr: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub us_privacy: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Device {
    pub dnt: u8,
    pub h: u32,
    pub w: u32,
    pub ua: String,
    /// Two-letter language prefix.
    pub language: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RequestExt {
    /// Billing code: explicit override or the fixed config-name/version tag.
    pub bc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(rename = "delDomain", skip_serializing_if = "Option::is_none")]
    pub del_domain: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct User {
    pub ext: UserExt,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct UserExt {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eids: Option<Vec<Value>>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Source {
    pub ext: SourceExt,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SourceExt {
    pub schain: SupplyChain,
}

/// One impression entry; exactly one of `banner`/`video` is set.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Imp {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tagid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner: Option<Banner>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video: Option<Video>,
    pub bidfloor: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Banner {
    pub format: Vec<Format>,
    /// 0 when the page is embedded in a frame, else 1.
    pub topframe: u8,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Format {
    pub w: u32,
    pub h: u32,
}

/// Video impression object. Beyond size and frame position, every field is
/// one of the recognized targeting attributes merged in from the slot's
/// video overrides.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Video {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub w: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub h: Option<u32>,
    pub topframe: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placement: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mimes: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minduration: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maxduration: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub startdelay: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skippable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub playbackmethod: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocols: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boxingallowed: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linearity: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minbitrate: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maxbitrate: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ext: Option<Value>,
}
