// src/domain/snapshot.rs
use log::{debug, warn};

use super::core::{ItemId, UserId};
use super::time_remaining::WireInstant;
use crate::money::Amount;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuctionStatus {
    Active,
    Ended,
}

/// Identity of the current leader. Absent exactly when the item has no
/// bids yet.
#[derive(Debug, Clone, PartialEq)]
pub struct Bidder {
    pub user_id: UserId,
    pub name: Option<String>,
}

/// The client's last known state of one auction item.
///
/// `current_price` and `bid_count` never move backwards across updates,
/// and `end_time` is fixed at load; `apply` enforces both.
#[derive(Debug, Clone, PartialEq)]
pub struct AuctionSnapshot {
    pub item_id: ItemId,
    pub name: String,
    pub description: String,
    pub current_price: Amount,
    pub bid_count: u32,
    pub highest_bidder: Option<Bidder>,
    pub seller_id: UserId,
    pub seller_name: Option<String>,
    pub status: AuctionStatus,
    pub end_time: WireInstant,
}

impl AuctionSnapshot {
    pub fn is_ended(&self) -> bool {
        self.status == AuctionStatus::Ended
    }
}

/// A mutation to the snapshot. Poll results, live-channel events and
/// submit responses all arrive through here, in no guaranteed order, so
/// every variant must be safe to apply late, twice, or not at all.
#[derive(Debug, Clone)]
pub enum SnapshotPatch {
    /// Authoritative refetch result.
    FullReplace(AuctionSnapshot),
    /// A bid accepted by the server, pushed over the live channel.
    NewBid {
        amount: Amount,
        bidder_id: UserId,
        bidder_name: Option<String>,
    },
    /// Price-only live update; does not touch bidder or count.
    PriceUpdate { current_price: Amount },
    StatusChange { status: AuctionStatus },
}

/// Holds the snapshot and guards its monotonic invariants. The store is
/// the single source of truth for re-rendering.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    current: Option<AuctionSnapshot>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        SnapshotStore { current: None }
    }

    pub fn current(&self) -> Option<&AuctionSnapshot> {
        self.current.as_ref()
    }

    /// Fills in the seller's display name once the user lookup resolves.
    /// Display-only; not part of the monotonic state.
    pub fn set_seller_name(&mut self, name: String) {
        if let Some(current) = self.current.as_mut() {
            current.seller_name = Some(name);
        }
    }

    /// Applies a patch; returns whether anything changed. Patches that
    /// would move price or bid count backwards, or revive an ended
    /// auction, are dropped as out-of-order deliveries.
    pub fn apply(&mut self, patch: SnapshotPatch) -> bool {
        match patch {
            SnapshotPatch::FullReplace(next) => self.replace(next),
            SnapshotPatch::NewBid {
                amount,
                bidder_id,
                bidder_name,
            } => self.new_bid(amount, bidder_id, bidder_name),
            SnapshotPatch::PriceUpdate { current_price } => self.price_update(current_price),
            SnapshotPatch::StatusChange { status } => self.status_change(status),
        }
    }

    fn replace(&mut self, mut next: AuctionSnapshot) -> bool {
        let current = match self.current.take() {
            None => {
                self.current = Some(next);
                return true;
            }
            Some(current) => current,
        };

        if next.item_id != current.item_id {
            warn!(
                "dropping snapshot for item {} while showing item {}",
                next.item_id, current.item_id
            );
            self.current = Some(current);
            return false;
        }

        let stale = next.current_price < current.current_price
            || next.bid_count < current.bid_count
            || (current.is_ended() && !next.is_ended());
        if stale {
            debug!(
                "dropping stale refetch for item {} ({} < {})",
                next.item_id, next.current_price, current.current_price
            );
            self.current = Some(current);
            return false;
        }

        // The end time is fixed at load, and the seller name may have been
        // resolved by a separate lookup the refetch does not repeat.
        next.end_time = current.end_time.clone();
        if next.seller_name.is_none() {
            next.seller_name = current.seller_name.clone();
        }

        let changed = next != current;
        self.current = Some(next);
        changed
    }

    fn new_bid(&mut self, amount: Amount, bidder_id: UserId, bidder_name: Option<String>) -> bool {
        let current = match self.current.as_mut() {
            Some(current) => current,
            None => {
                warn!("bid event before the snapshot loaded; ignoring");
                return false;
            }
        };

        if current.is_ended() {
            debug!("bid event for ended item {}; ignoring", current.item_id);
            return false;
        }

        if amount <= current.current_price {
            debug!(
                "out-of-order bid {} at or below current {} on item {}; ignoring",
                amount, current.current_price, current.item_id
            );
            return false;
        }

        current.current_price = amount;
        current.highest_bidder = Some(Bidder {
            user_id: bidder_id,
            name: bidder_name,
        });
        current.bid_count += 1;
        true
    }

    fn price_update(&mut self, price: Amount) -> bool {
        let current = match self.current.as_mut() {
            Some(current) => current,
            None => return false,
        };

        if current.is_ended() || price <= current.current_price {
            return false;
        }

        current.current_price = price;
        true
    }

    fn status_change(&mut self, status: AuctionStatus) -> bool {
        let current = match self.current.as_mut() {
            Some(current) => current,
            None => return false,
        };

        match (current.status, status) {
            (AuctionStatus::Active, AuctionStatus::Ended) => {
                current.status = AuctionStatus::Ended;
                true
            }
            (AuctionStatus::Ended, AuctionStatus::Active) => {
                debug!("ignoring ACTIVE after item {} ended", current.item_id);
                false
            }
            _ => false,
        }
    }
}
