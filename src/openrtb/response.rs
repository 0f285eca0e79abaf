use serde::{Deserialize, Serialize};

/// OpenRTB Bid Response
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct BidResponse {
    #[serde(default)]
    pub seatbid: Vec<SeatBid>,
    pub cur: Option<String>,
    /// No-bid reason code; presence means the whole response carries no bids.
    pub nbr: Option<i64>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SeatBid {
    #[serde(default)]
    pub bid: Vec<Bid>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Bid {
    pub impid: String,
    pub price: f64,
    pub w: Option<u32>,
    pub h: Option<u32>,
    pub crid: Option<String>,
    pub dealid: Option<String>,
    /// Ad markup (HTML or VAST document).
    pub adm: Option<String>,
}
