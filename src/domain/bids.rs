// src/domain/bids.rs
use chrono::{DateTime, Utc};

use super::core::UserId;
use crate::money::Amount;

/// One entry of an item's bid history.
#[derive(Debug, Clone, PartialEq)]
pub struct BidRecord {
    pub bidder_id: UserId,
    pub bidder_name: Option<String>,
    pub amount: Amount,
    pub bid_time: Option<DateTime<Utc>>,
}

/// Canonical history order: amount descending, ties broken by earliest
/// bid first. The backend is inconsistent about whether it returns
/// arrival order or amount order, so fetched histories are normalised
/// through this before display. `history[0]` is always the current
/// leader.
pub fn sort_history(bids: &mut [BidRecord]) {
    bids.sort_by(|a, b| {
        b.amount
            .cmp(&a.amount)
            .then_with(|| a.bid_time.cmp(&b.bid_time))
    });
}

/// Inserts a live bid while keeping the canonical order: after existing
/// bids of the same amount (they arrived earlier), before the first
/// lower one.
pub fn insert_bid(history: &mut Vec<BidRecord>, bid: BidRecord) {
    let at = history
        .iter()
        .position(|existing| existing.amount < bid.amount)
        .unwrap_or(history.len());
    history.insert(at, bid);
}

pub fn highest(history: &[BidRecord]) -> Option<&BidRecord> {
    history.first()
}
