mod utils;

use auction_bidding_client::domain::{
    AuctionStatus, Bidder, SnapshotPatch, SnapshotStore, WireInstant,
};
use utils::*;

fn new_bid(cents: i64, bidder: i64) -> SnapshotPatch {
    SnapshotPatch::NewBid {
        amount: usd(cents),
        bidder_id: bidder,
        bidder_name: Some(format!("buyer_{}", bidder)),
    }
}

#[test]
fn a_new_bid_updates_price_bidder_and_count() {
    let mut store = SnapshotStore::new();
    store.apply(SnapshotPatch::FullReplace(sample_snapshot()));

    assert!(store.apply(new_bid(1200, rival_bidder())));

    let current = store.current().unwrap();
    assert_eq!(current.current_price, usd(1200));
    assert_eq!(current.bid_count, 1);
    assert_eq!(
        current.highest_bidder,
        Some(Bidder {
            user_id: rival_bidder(),
            name: Some("buyer_9".to_string()),
        })
    );
}

#[test]
fn a_bid_at_or_below_the_current_price_is_a_no_op() {
    let mut store = SnapshotStore::new();
    store.apply(SnapshotPatch::FullReplace(snapshot_with_leader(
        usd(1200),
        1,
        rival_bidder(),
    )));

    assert!(!store.apply(new_bid(1200, signed_in_user())));
    assert!(!store.apply(new_bid(1100, signed_in_user())));

    let current = store.current().unwrap();
    assert_eq!(current.current_price, usd(1200));
    assert_eq!(current.bid_count, 1);
    assert_eq!(current.highest_bidder.as_ref().unwrap().user_id, rival_bidder());
}

#[test]
fn applying_the_same_bid_twice_equals_applying_it_once() {
    let mut store = SnapshotStore::new();
    store.apply(SnapshotPatch::FullReplace(sample_snapshot()));

    assert!(store.apply(new_bid(1500, rival_bidder())));
    let after_first = store.current().unwrap().clone();

    // Redelivery of the same event is rejected by the monotonic guard
    assert!(!store.apply(new_bid(1500, rival_bidder())));
    assert_eq!(store.current().unwrap(), &after_first);
    assert_eq!(after_first.bid_count, 1);
}

#[test]
fn out_of_order_bids_settle_on_the_higher_price() {
    // Price starts at 10; the $15 event arrives before the $12 one
    let mut store = SnapshotStore::new();
    store.apply(SnapshotPatch::FullReplace(sample_snapshot()));

    assert!(store.apply(new_bid(1500, rival_bidder())));
    assert!(!store.apply(new_bid(1200, signed_in_user())));

    let current = store.current().unwrap();
    assert_eq!(current.current_price, usd(1500));
    assert_eq!(current.bid_count, 1);
    assert_eq!(current.highest_bidder.as_ref().unwrap().user_id, rival_bidder());
}

#[test]
fn ended_is_terminal_for_the_snapshot() {
    let mut store = SnapshotStore::new();
    store.apply(SnapshotPatch::FullReplace(snapshot_with_leader(
        usd(1200),
        1,
        rival_bidder(),
    )));

    assert!(store.apply(SnapshotPatch::StatusChange {
        status: AuctionStatus::Ended,
    }));

    // No bids after the end, and no resurrection
    assert!(!store.apply(new_bid(2000, signed_in_user())));
    assert!(!store.apply(SnapshotPatch::StatusChange {
        status: AuctionStatus::Active,
    }));

    let current = store.current().unwrap();
    assert_eq!(current.status, AuctionStatus::Ended);
    assert_eq!(current.current_price, usd(1200));
}

#[test]
fn a_price_update_moves_price_only() {
    let mut store = SnapshotStore::new();
    store.apply(SnapshotPatch::FullReplace(snapshot_with_leader(
        usd(1200),
        1,
        rival_bidder(),
    )));

    assert!(store.apply(SnapshotPatch::PriceUpdate {
        current_price: usd(1300),
    }));
    assert!(!store.apply(SnapshotPatch::PriceUpdate {
        current_price: usd(1250),
    }));

    let current = store.current().unwrap();
    assert_eq!(current.current_price, usd(1300));
    assert_eq!(current.bid_count, 1);
    assert_eq!(current.highest_bidder.as_ref().unwrap().user_id, rival_bidder());
}

#[test]
fn a_stale_refetch_is_rejected() {
    let mut store = SnapshotStore::new();
    store.apply(SnapshotPatch::FullReplace(snapshot_with_leader(
        usd(1500),
        2,
        rival_bidder(),
    )));

    // A poll response from before the latest bid
    let stale = snapshot_with_leader(usd(1200), 1, signed_in_user());
    assert!(!store.apply(SnapshotPatch::FullReplace(stale)));
    assert_eq!(store.current().unwrap().current_price, usd(1500));

    // A genuinely newer one is accepted
    let fresh = snapshot_with_leader(usd(1600), 3, signed_in_user());
    assert!(store.apply(SnapshotPatch::FullReplace(fresh)));
    assert_eq!(store.current().unwrap().current_price, usd(1600));
}

#[test]
fn a_refetch_cannot_resurrect_an_ended_auction() {
    let mut store = SnapshotStore::new();
    store.apply(SnapshotPatch::FullReplace(sample_snapshot()));
    store.apply(SnapshotPatch::StatusChange {
        status: AuctionStatus::Ended,
    });

    assert!(!store.apply(SnapshotPatch::FullReplace(sample_snapshot())));
    assert_eq!(store.current().unwrap().status, AuctionStatus::Ended);
}

#[test]
fn a_refetch_keeps_the_loaded_end_time_and_resolved_seller() {
    let mut store = SnapshotStore::new();
    store.apply(SnapshotPatch::FullReplace(sample_snapshot()));
    store.set_seller_name("Sam Seller".to_string());

    let mut refetched = sample_snapshot();
    refetched.current_price = usd(1100);
    refetched.bid_count = 1;
    refetched.highest_bidder = Some(Bidder {
        user_id: rival_bidder(),
        name: None,
    });
    refetched.end_time = WireInstant::Text("2031-06-01T00:00:00Z".to_string());
    refetched.seller_name = None;

    assert!(store.apply(SnapshotPatch::FullReplace(refetched)));

    let current = store.current().unwrap();
    assert_eq!(current.end_time, sample_end_time());
    assert_eq!(current.seller_name.as_deref(), Some("Sam Seller"));
    assert_eq!(current.current_price, usd(1100));
}

#[test]
fn a_refetch_for_another_item_is_dropped() {
    let mut store = SnapshotStore::new();
    store.apply(SnapshotPatch::FullReplace(sample_snapshot()));

    let mut other = sample_snapshot();
    other.item_id = sample_item_id() + 1;
    other.current_price = usd(9999);

    assert!(!store.apply(SnapshotPatch::FullReplace(other)));
    assert_eq!(store.current().unwrap().item_id, sample_item_id());
    assert_eq!(store.current().unwrap().current_price, usd(1000));
}

#[test]
fn events_before_the_first_load_are_ignored() {
    let mut store = SnapshotStore::new();
    assert!(!store.apply(new_bid(1500, rival_bidder())));
    assert!(!store.apply(SnapshotPatch::StatusChange {
        status: AuctionStatus::Ended,
    }));
    assert!(store.current().is_none());
}
