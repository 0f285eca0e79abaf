// src/model/descriptor.rs

use chrono::{DateTime, Utc};

use crate::arj::params::QueryParams;
use crate::model::slot::SlotRequest;
use crate::openrtb::request::BidRequest;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// Protocol-specific payload of one outbound request.
#[derive(Debug, Clone)]
pub enum RequestPayload {
    /// Structured JSON body (modern path, POST).
    OpenRtb(BidRequest),
    /// Ordered flat query parameters (legacy path, GET).
    Query(QueryParams),
}

/// Opaque correlation payload: the originating slot request(s) and the
/// capture timestamp, carried so a raw response can be routed back to
/// exactly the slots that produced it.
#[derive(Debug, Clone)]
pub struct Correlation {
    pub slots: Vec<SlotRequest>,
    pub captured_at: DateTime<Utc>,
}

/// One outbound request descriptor handed to the transport layer.
#[derive(Debug, Clone)]
pub struct ExchangeRequest {
    pub method: HttpMethod,
    pub url: String,
    pub payload: RequestPayload,
    pub correlation: Correlation,
}

impl ExchangeRequest {
    /// Whether this descriptor targets the legacy video endpoint.
    pub fn is_video_url(&self) -> bool {
        self.url.ends_with("avjp")
    }
}
