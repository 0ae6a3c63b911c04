// src/rest/types.rs
use serde::{Deserialize, Serialize};

use crate::domain::{
    AuctionSnapshot, AuctionStatus, BidRecord, Bidder, ItemId, UserId, WireInstant,
};
use crate::money::Amount;

/// Body of `GET /items/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemResponse {
    pub id: ItemId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "currentPrice")]
    pub current_price: Amount,
    #[serde(rename = "bidCount", default)]
    pub bid_count: u32,
    #[serde(rename = "highestBidderId", default)]
    pub highest_bidder_id: Option<UserId>,
    #[serde(rename = "highestBidder", default)]
    pub highest_bidder: Option<String>,
    #[serde(rename = "sellerId")]
    pub seller_id: UserId,
    #[serde(rename = "sellerName", default)]
    pub seller_name: Option<String>,
    pub status: String,
    #[serde(rename = "endTime")]
    pub end_time: WireInstant,
}

impl ItemResponse {
    pub fn into_snapshot(self) -> AuctionSnapshot {
        // Anything the backend no longer calls ACTIVE (ended, cancelled)
        // is terminal for the bidding view.
        let status = if self.status == "ACTIVE" {
            AuctionStatus::Active
        } else {
            AuctionStatus::Ended
        };

        // No bids means no leader, whatever stale id the row carries
        let highest_bidder = if self.bid_count == 0 {
            None
        } else {
            self.highest_bidder_id.map(|user_id| Bidder {
                user_id,
                name: self.highest_bidder,
            })
        };

        AuctionSnapshot {
            item_id: self.id,
            name: self.name,
            description: self.description,
            current_price: self.current_price,
            bid_count: self.bid_count,
            highest_bidder,
            seller_id: self.seller_id,
            seller_name: self.seller_name,
            status,
            end_time: self.end_time,
        }
    }
}

/// One element of `GET /auctions/{id}/bids`, and the body returned by a
/// successful `POST /auctions/{id}/bid`.
#[derive(Debug, Clone, Deserialize)]
pub struct BidResponse {
    #[serde(rename = "bidderId")]
    pub bidder_id: UserId,
    #[serde(rename = "bidderName", default)]
    pub bidder_name: Option<String>,
    pub amount: Amount,
    #[serde(rename = "bidTime", default)]
    pub bid_time: Option<WireInstant>,
}

impl BidResponse {
    pub fn into_record(self) -> BidRecord {
        BidRecord {
            bidder_id: self.bidder_id,
            bidder_name: self.bidder_name,
            amount: self.amount,
            bid_time: self.bid_time.and_then(|at| at.resolve()),
        }
    }
}

/// Body of `POST /auctions/{id}/bid`.
#[derive(Debug, Serialize)]
pub struct BidRequest {
    pub amount: Amount,
    #[serde(rename = "bidderId")]
    pub bidder_id: UserId,
}

/// Structured 4xx body: `field` scopes the message to one form input.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Body of `GET /users/{id}`; used to resolve the seller's display name.
#[derive(Debug, Clone, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    #[serde(rename = "firstName", default)]
    pub first_name: Option<String>,
    #[serde(rename = "lastName", default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

impl UserProfile {
    pub fn display_name(&self) -> Option<String> {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => Some(format!("{} {}", first, last)),
            (Some(first), None) => Some(first.clone()),
            (None, Some(last)) => Some(last.clone()),
            (None, None) => self.username.clone(),
        }
    }
}
