// src/model/slot.rs

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::model::bid::MediaType;

/// A single width/height pair.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    pub w: u32,
    pub h: u32,
}

impl Size {
    pub fn new(w: u32, h: u32) -> Self {
        Self { w, h }
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.w, self.h)
    }
}

/// Slot-level size declaration: either one bare `[w, h]` pair or a nested
/// list of pairs. The video builders resolve the bare pair first, then the
/// first nested pair, then the declared player size.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum SizeList {
    Flat(Size),
    Nested(Vec<Size>),
}

/// Video playback context declared by the slot.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VideoContext {
    Instream,
    Outstream,
    #[serde(other)]
    Other,
}

/// Banner media declaration.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct BannerMedia {
    pub sizes: Vec<Size>,
}

/// Video media declaration.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct VideoMedia {
    pub player_size: Option<Size>,
    pub context: Option<VideoContext>,
}

/// Requested media types of one slot. A slot with neither declaration is
/// treated as banner.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct MediaTypes {
    pub banner: Option<BannerMedia>,
    pub video: Option<VideoMedia>,
}

/// One node of the supply-chain descriptor.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct SupplyChainNode {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asi: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hp: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
}

/// Supply-chain descriptor attached to a slot, forwarded verbatim on the
/// structured path and serialized to the compact string form on the legacy
/// path.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct SupplyChain {
    pub ver: String,
    pub complete: u8,
    pub nodes: Vec<SupplyChainNode>,
}

/// Floor query issued to a slot's pluggable floor capability. The size is
/// always the wildcard; per-size floors are not consulted.
#[derive(Debug, Clone)]
pub struct FloorQuery {
    pub currency: String,
    pub media_type: MediaType,
    pub size: Option<Size>,
}

/// Result of a floor query.
#[derive(Debug, Clone, Copy)]
pub struct FloorInfo {
    pub floor: f64,
}

/// Pluggable per-slot floor-price capability. Absence of the capability, or
/// `None` from it, means "no floor from this source".
pub trait FloorProvider: Send + Sync {
    fn floor(&self, query: &FloorQuery) -> Option<FloorInfo>;
}

impl<F> FloorProvider for F
where
    F: Fn(&FloorQuery) -> Option<FloorInfo> + Send + Sync,
{
    fn floor(&self, query: &FloorQuery) -> Option<FloorInfo> {
        self(query)
    }
}

/// Exchange-specific targeting parameters of one slot.
#[derive(Debug, Clone, Default)]
pub struct SlotParams {
    /// Exchange ad-unit identifier.
    pub unit: Option<String>,
    /// Delivery domain, e.g. "pub.openx.net"; routes the legacy request when
    /// no platform id is present.
    pub del_domain: Option<String>,
    /// Platform identifier; takes precedence over the delivery domain and
    /// routes to the fixed exchange host.
    pub platform: Option<String>,
    /// Static floor price in full currency units.
    pub custom_floor: Option<f64>,
    /// Custom targeting key/values, base64-block-encoded on the legacy path.
    pub custom_params: Option<BTreeMap<String, Value>>,
    /// Billing-code override.
    pub bc: Option<String>,
    pub do_not_track: bool,
    pub coppa: bool,
    /// Per-slot modern-protocol sampling rate override.
    pub test_rate: Option<f64>,
    /// Generic pass-through object merged into the outgoing video object,
    /// filtered to the recognized video attributes.
    pub openrtb: Option<Map<String, Value>>,
    /// Dedicated video configuration; wins over `openrtb` on key collision
    /// and feeds the legacy video parameters.
    pub video: Option<Map<String, Value>>,
}

/// One ad-slot's bid request as supplied by the scheduler.
#[derive(Clone, Default)]
pub struct SlotRequest {
    /// Unique slot identifier, echoed back as the normalized bid's slot id.
    pub slot_id: String,
    /// DOM ad-unit code, forwarded URL-encoded on the legacy banner path.
    pub ad_unit_code: String,
    pub transaction_id: String,
    pub media_types: MediaTypes,
    /// Explicit media-type tag; the legacy partition falls back to it when
    /// the media-type declarations are ambiguous.
    pub media_type: Option<MediaType>,
    pub sizes: Option<SizeList>,
    pub params: SlotParams,
    pub schain: Option<SupplyChain>,
    /// Resolved identity assertions forwarded verbatim to `user.ext.eids`.
    pub eids: Option<Vec<Value>>,
    /// Provider-keyed identity results for the legacy query mapping.
    pub user_ids: Option<BTreeMap<String, Value>>,
    pub floor_provider: Option<Arc<dyn FloorProvider>>,
}

impl fmt::Debug for SlotRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlotRequest")
            .field("slot_id", &self.slot_id)
            .field("ad_unit_code", &self.ad_unit_code)
            .field("transaction_id", &self.transaction_id)
            .field("media_types", &self.media_types)
            .field("media_type", &self.media_type)
            .field("sizes", &self.sizes)
            .field("params", &self.params)
            .field("schain", &self.schain)
            .field("eids", &self.eids)
            .field("user_ids", &self.user_ids)
            .field(
                "floor_provider",
                &self.floor_provider.as_ref().map(|_| "<floor provider>"),
            )
            .finish()
    }
}

impl SlotRequest {
    /// Resolved video width/height, by priority: a bare `[w, h]` size pair,
    /// the first nested size pair, then the declared player size.
    pub fn resolve_video_size(&self) -> (Option<u32>, Option<u32>) {
        match &self.sizes {
            Some(SizeList::Flat(size)) => (Some(size.w), Some(size.h)),
            Some(SizeList::Nested(sizes)) if !sizes.is_empty() => {
                (Some(sizes[0].w), Some(sizes[0].h))
            }
            _ => match self.media_types.video.as_ref().and_then(|v| v.player_size) {
                Some(size) => (Some(size.w), Some(size.h)),
                None => (None, None),
            },
        }
    }

    /// Video playback context, when declared.
    pub fn video_context(&self) -> Option<VideoContext> {
        self.media_types.video.as_ref().and_then(|v| v.context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn video_size_prefers_flat_pair() {
        let slot = SlotRequest {
            sizes: Some(SizeList::Flat(Size::new(640, 480))),
            media_types: MediaTypes {
                video: Some(VideoMedia {
                    player_size: Some(Size::new(1280, 720)),
                    context: None,
                }),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(slot.resolve_video_size(), (Some(640), Some(480)));
    }

    #[test]
    fn video_size_takes_first_nested_pair() {
        let slot = SlotRequest {
            sizes: Some(SizeList::Nested(vec![
                Size::new(300, 250),
                Size::new(728, 90),
            ])),
            ..Default::default()
        };
        assert_eq!(slot.resolve_video_size(), (Some(300), Some(250)));
    }

    #[test]
    fn video_size_falls_back_to_player_size() {
        let slot = SlotRequest {
            media_types: MediaTypes {
                video: Some(VideoMedia {
                    player_size: Some(Size::new(1280, 720)),
                    context: None,
                }),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(slot.resolve_video_size(), (Some(1280), Some(720)));
    }

    #[test]
    fn video_size_absent_when_nothing_declared() {
        let slot = SlotRequest::default();
        assert_eq!(slot.resolve_video_size(), (None, None));
    }
}
