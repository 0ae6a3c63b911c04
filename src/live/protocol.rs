// src/live/protocol.rs
use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{ItemId, UserId, WireInstant};
use crate::money::Amount;

/// Client → server subscription handshake, sent once per connection.
/// Fire-and-forget: inbound events are accepted without waiting for the
/// server's ack.
#[derive(Debug, Serialize)]
pub struct SubscribeFrame {
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(rename = "itemId")]
    item_id: ItemId,
    #[serde(rename = "userId")]
    user_id: UserId,
}

impl SubscribeFrame {
    pub fn new(item_id: ItemId, user_id: UserId) -> Self {
        SubscribeFrame {
            kind: "SUBSCRIBE",
            item_id,
            user_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LiveBid {
    pub amount: Amount,
    pub bidder_id: UserId,
    pub bidder_name: Option<String>,
    pub bid_time: Option<DateTime<Utc>>,
}

/// Server → client push events the bidding view reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum LiveEvent {
    NewBid(LiveBid),
    AuctionEnded,
    PriceUpdate { current_price: Amount },
    ServerError { message: String },
}

#[derive(Debug, Deserialize)]
struct InboundFrame {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NewBidData {
    amount: Amount,
    #[serde(rename = "bidderId")]
    bidder_id: UserId,
    #[serde(rename = "bidderName", default)]
    bidder_name: Option<String>,
    #[serde(rename = "bidTime", default)]
    bid_time: Option<WireInstant>,
}

#[derive(Debug, Deserialize)]
struct PriceUpdateData {
    #[serde(rename = "currentPrice")]
    current_price: Amount,
}

/// Parses one inbound text frame. `None` for the server's handshake acks
/// and for unknown kinds, which are logged and ignored so newer servers
/// don't break older pages.
pub fn parse_frame(text: &str) -> Option<LiveEvent> {
    let frame: InboundFrame = match serde_json::from_str(text) {
        Ok(frame) => frame,
        Err(err) => {
            debug!("unparsable live frame: {}", err);
            return None;
        }
    };

    match frame.kind.as_str() {
        "NEW_BID" => {
            let data = frame.data?;
            match serde_json::from_value::<NewBidData>(data) {
                Ok(bid) => Some(LiveEvent::NewBid(LiveBid {
                    amount: bid.amount,
                    bidder_id: bid.bidder_id,
                    bidder_name: bid.bidder_name,
                    bid_time: bid.bid_time.and_then(|at| at.resolve()),
                })),
                Err(err) => {
                    warn!("malformed NEW_BID payload: {}", err);
                    None
                }
            }
        }
        "AUCTION_ENDED" => Some(LiveEvent::AuctionEnded),
        "PRICE_UPDATE" => {
            let data = frame.data?;
            match serde_json::from_value::<PriceUpdateData>(data) {
                Ok(update) => Some(LiveEvent::PriceUpdate {
                    current_price: update.current_price,
                }),
                Err(err) => {
                    warn!("malformed PRICE_UPDATE payload: {}", err);
                    None
                }
            }
        }
        "ERROR" => Some(LiveEvent::ServerError {
            message: frame.message.unwrap_or_default(),
        }),
        // Handshake acks carry nothing the view needs
        "CONNECTION_ESTABLISHED" | "SUBSCRIBED" => None,
        other => {
            debug!("ignoring unknown live frame kind: {}", other);
            None
        }
    }
}
