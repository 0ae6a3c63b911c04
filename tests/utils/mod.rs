use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};

use auction_bidding_client::domain::{
    AuctionSnapshot, AuctionStatus, BidRecord, Bidder, ItemId, UserId, WireInstant,
};
use auction_bidding_client::money::Amount;
use auction_bidding_client::rest::{Fail, ItemApi, UserProfile};
use auction_bidding_client::session::Session;

// Sample data for tests

pub fn sample_item_id() -> ItemId {
    3
}

pub fn signed_in_user() -> UserId {
    7
}

pub fn rival_bidder() -> UserId {
    9
}

pub fn seller_id() -> UserId {
    2
}

pub fn usd(cents: i64) -> Amount {
    Amount::from_cents(cents)
}

pub fn sample_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 15, 9, 30, 0).unwrap()
}

/// One hour after `sample_now`, in the backend's field-array form.
pub fn sample_end_time() -> WireInstant {
    WireInstant::Fields(vec![2025, 1, 15, 10, 30, 0])
}

pub fn sample_session() -> Session {
    Session::new("test-token", signed_in_user(), "buyer_7")
}

pub fn sample_snapshot() -> AuctionSnapshot {
    AuctionSnapshot {
        item_id: sample_item_id(),
        name: "Antique wall clock".to_string(),
        description: "Early 1900s, keeps decent time".to_string(),
        current_price: usd(1000),
        bid_count: 0,
        highest_bidder: None,
        seller_id: seller_id(),
        seller_name: Some("Sam Seller".to_string()),
        status: AuctionStatus::Active,
        end_time: sample_end_time(),
    }
}

pub fn snapshot_with_leader(price: Amount, bid_count: u32, leader: UserId) -> AuctionSnapshot {
    AuctionSnapshot {
        current_price: price,
        bid_count,
        highest_bidder: Some(Bidder {
            user_id: leader,
            name: Some(format!("buyer_{}", leader)),
        }),
        ..sample_snapshot()
    }
}

pub fn bid(cents: i64, bidder_id: UserId, seconds_after_start: i64) -> BidRecord {
    BidRecord {
        bidder_id,
        bidder_name: Some(format!("buyer_{}", bidder_id)),
        amount: usd(cents),
        bid_time: Some(sample_now() + Duration::seconds(seconds_after_start)),
    }
}

/// In-memory `ItemApi` fed with canned responses; records placed bids.
#[derive(Default)]
pub struct FakeApi {
    pub items: Mutex<VecDeque<Result<AuctionSnapshot, Fail>>>,
    pub histories: Mutex<VecDeque<Result<Vec<BidRecord>, Fail>>>,
    pub bids: Mutex<VecDeque<Result<BidRecord, Fail>>>,
    pub users: Mutex<VecDeque<Result<UserProfile, Fail>>>,
    pub placed: Mutex<Vec<(ItemId, Amount, UserId)>>,
}

impl FakeApi {
    pub fn new() -> Self {
        FakeApi::default()
    }

    pub fn push_item(&self, item: Result<AuctionSnapshot, Fail>) {
        self.items.lock().unwrap().push_back(item);
    }

    pub fn push_history(&self, history: Result<Vec<BidRecord>, Fail>) {
        self.histories.lock().unwrap().push_back(history);
    }

    pub fn push_bid(&self, bid: Result<BidRecord, Fail>) {
        self.bids.lock().unwrap().push_back(bid);
    }

    pub fn push_user(&self, user: Result<UserProfile, Fail>) {
        self.users.lock().unwrap().push_back(user);
    }
}

#[async_trait]
impl ItemApi for FakeApi {
    async fn get_item(&self, _id: ItemId) -> Result<AuctionSnapshot, Fail> {
        self.items
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Fail::Transient("no canned item".to_string())))
    }

    async fn get_bid_history(&self, _id: ItemId) -> Result<Vec<BidRecord>, Fail> {
        self.histories
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn place_bid(
        &self,
        id: ItemId,
        amount: Amount,
        bidder_id: UserId,
    ) -> Result<BidRecord, Fail> {
        self.placed.lock().unwrap().push((id, amount, bidder_id));
        self.bids
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Fail::Transient("no canned bid".to_string())))
    }

    async fn get_user(&self, _id: UserId) -> Result<UserProfile, Fail> {
        self.users
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Fail::Transient("no canned user".to_string())))
    }
}
