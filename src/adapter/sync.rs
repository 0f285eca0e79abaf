// src/adapter/sync.rs

use serde_json::Value;

use crate::arj::params::percent_encode_component;
use crate::model::context::GdprConsent;

/// Fixed user-sync endpoint.
pub const SYNC_URL: &str = "https://u.openx.net/w/1.0/pd?ph=2d1251ae-7f3a-47cf-bd2a-2f288854a0ba";

/// Sync mechanisms the caller has enabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncOptions {
    pub iframe_enabled: bool,
    pub pixel_enabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncType {
    Iframe,
    Image,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserSync {
    pub kind: SyncType,
    pub url: String,
}

/// Produces the user-sync descriptor, iframe preferred. A pixel/iframe URL
/// embedded in a prior response replaces the computed default entirely;
/// consent parameters are then not appended.
pub fn user_syncs(
    options: &SyncOptions,
    responses: &[Value],
    gdpr: Option<&GdprConsent>,
    us_privacy: Option<&str>,
) -> Vec<UserSync> {
    if !options.iframe_enabled && !options.pixel_enabled {
        return Vec::new();
    }
    let kind = if options.iframe_enabled {
        SyncType::Iframe
    } else {
        SyncType::Image
    };

    let mut query = Vec::new();
    if let Some(gdpr) = gdpr {
        query.push(format!(
            "gdpr={}",
            u8::from(gdpr.applies == Some(true))
        ));
        query.push(format!(
            "gdpr_consent={}",
            percent_encode_component(gdpr.consent_string.as_deref().unwrap_or(""))
        ));
    }
    if let Some(usp) = us_privacy {
        query.push(format!("us_privacy={}", percent_encode_component(usp)));
    }

    let url = responses
        .first()
        .and_then(|body| body.pointer("/ads/pixels").or_else(|| body.pointer("/pixels")))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| {
            if query.is_empty() {
                SYNC_URL.to_string()
            } else {
                format!("{}&{}", SYNC_URL, query.join("&"))
            }
        });

    vec![UserSync { kind, url }]
}
