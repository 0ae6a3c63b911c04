// src/view/controller.rs
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{debug, warn};
use tokio::sync::{mpsc, watch};
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use super::model::{Banner, BannerKind, HistoryRow, Outcome, View, ViewModel};
use crate::domain::{
    bids, classify, remaining, validate_bid_input, AuctionSnapshot, BidRecord, ItemId,
    SnapshotPatch, SnapshotStore, StatusBucket,
};
use crate::live::{ChannelConfig, ConnectionState, LiveEvent, LiveUpdateChannel};
use crate::money::Amount;
use crate::rest::{Fail, ItemApi};
use crate::session::Session;

/// Countdown re-render cadence.
pub const COUNTDOWN_TICK: Duration = Duration::from_secs(1);
/// Polling cadence; runs for the whole page life as the safety net and
/// becomes the only update source once the live channel fails.
pub const POLL_INTERVAL: Duration = Duration::from_secs(30);
/// How long an expired-session notice stays readable before sign-out.
pub const SIGN_OUT_DELAY: Duration = Duration::from_secs(2);

/// Why the page is finished with the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    /// Clear the session and go to sign-in.
    SignedOut,
    NavigatedAway,
}

#[derive(Debug, Clone, PartialEq)]
enum Phase {
    Loading,
    Ready,
    /// Terminal page-level error (item gone, initial load failed).
    Gone(String),
}

/// Orchestrates the bidding page: initial load, countdown, live events,
/// polling and bid submission, reconciled into the snapshot store and
/// rendered as a `View`.
pub struct BiddingViewController<A: ItemApi> {
    api: Arc<A>,
    session: Session,
    item_id: ItemId,
    store: SnapshotStore,
    history: Vec<BidRecord>,
    phase: Phase,
    submitting: bool,
    field_error: Option<String>,
    banner: Option<Banner>,
    live_state: ConnectionState,
    sign_out_pending: bool,
    end_refetch_done: bool,
}

impl<A: ItemApi + 'static> BiddingViewController<A> {
    pub fn new(api: Arc<A>, session: Session, item_id: ItemId) -> Self {
        BiddingViewController {
            api,
            session,
            item_id,
            store: SnapshotStore::new(),
            history: Vec::new(),
            phase: Phase::Loading,
            submitting: false,
            field_error: None,
            banner: None,
            live_state: ConnectionState::Disconnected,
            sign_out_pending: false,
            end_refetch_done: false,
        }
    }

    pub fn snapshot(&self) -> Option<&AuctionSnapshot> {
        self.store.current()
    }

    pub fn is_ready(&self) -> bool {
        self.phase == Phase::Ready
    }

    pub fn sign_out_pending(&self) -> bool {
        self.sign_out_pending
    }

    /// Initial page load: item and bid history fetched concurrently, and
    /// both must land before the page is ready. A 401 from either
    /// short-circuits straight to sign-out.
    pub async fn load(&mut self) -> Result<(), Exit> {
        let (item, history) = tokio::join!(
            self.api.get_item(self.item_id),
            self.api.get_bid_history(self.item_id)
        );

        let (snapshot, history) = match (item, history) {
            (Err(Fail::Unauthorized), _) | (_, Err(Fail::Unauthorized)) => {
                return Err(Exit::SignedOut);
            }
            (Err(Fail::NotFound), _) | (_, Err(Fail::NotFound)) => {
                self.phase = Phase::Gone("Item not found".to_string());
                return Ok(());
            }
            (Err(err), _) | (_, Err(err)) => {
                warn!("initial load failed: {}", err);
                self.phase = Phase::Gone("Error loading item details".to_string());
                return Ok(());
            }
            (Ok(snapshot), Ok(history)) => (snapshot, history),
        };

        if snapshot.item_id != self.item_id {
            // a response for some other page's item; don't show it
            warn!(
                "loaded snapshot for item {} while expecting {}",
                snapshot.item_id, self.item_id
            );
            self.phase = Phase::Gone("Error loading item details".to_string());
            return Ok(());
        }

        self.store.apply(SnapshotPatch::FullReplace(snapshot));
        self.history = history;
        self.phase = Phase::Ready;

        self.resolve_seller_name().await;
        Ok(())
    }

    /// Fills in the seller's display name with a second lookup. The page
    /// works without it, so every failure is tolerated.
    async fn resolve_seller_name(&mut self) {
        let seller_id = match self.store.current() {
            Some(snapshot) if snapshot.seller_name.is_none() => snapshot.seller_id,
            _ => return,
        };
        match self.api.get_user(seller_id).await {
            Ok(profile) => {
                if let Some(name) = profile.display_name() {
                    self.store.set_seller_name(name);
                }
            }
            Err(err) => debug!("seller lookup failed: {}", err),
        }
    }

    /// Applies one live-channel event. Returns whether anything changed;
    /// out-of-order and post-end events are dropped by the store.
    pub fn on_live_event(&mut self, event: LiveEvent) -> bool {
        match event {
            LiveEvent::NewBid(bid) => {
                let applied = self.store.apply(SnapshotPatch::NewBid {
                    amount: bid.amount,
                    bidder_id: bid.bidder_id,
                    bidder_name: bid.bidder_name.clone(),
                });
                if applied {
                    bids::insert_bid(
                        &mut self.history,
                        BidRecord {
                            bidder_id: bid.bidder_id,
                            bidder_name: bid.bidder_name,
                            amount: bid.amount,
                            bid_time: bid.bid_time,
                        },
                    );
                }
                applied
            }
            LiveEvent::AuctionEnded => self.store.apply(SnapshotPatch::StatusChange {
                status: crate::domain::AuctionStatus::Ended,
            }),
            LiveEvent::PriceUpdate { current_price } => self
                .store
                .apply(SnapshotPatch::PriceUpdate { current_price }),
            LiveEvent::ServerError { message } => {
                warn!("live channel server error: {}", message);
                false
            }
        }
    }

    /// One countdown tick. Returns true when the countdown just hit
    /// "Ended" and a refetch should confirm the terminal state; the
    /// status is never flipped locally, the server stays authoritative.
    pub fn on_tick(&mut self, now: DateTime<Utc>) -> bool {
        let snapshot = match self.store.current() {
            Some(snapshot) => snapshot,
            None => return false,
        };
        if snapshot.is_ended() || self.end_refetch_done {
            return false;
        }
        if remaining(now, &snapshot.end_time).is_ended() {
            self.end_refetch_done = true;
            return true;
        }
        false
    }

    /// Refetches snapshot and history. Transient failures surface as a
    /// banner and are retried only by the next tick, never immediately.
    pub async fn poll(&mut self) -> Result<(), Exit> {
        match self.api.get_item(self.item_id).await {
            Ok(snapshot) => {
                if snapshot.item_id == self.item_id {
                    self.store.apply(SnapshotPatch::FullReplace(snapshot));
                } else {
                    debug!("discarding poll result for item {}", snapshot.item_id);
                }
            }
            Err(Fail::Unauthorized) => return Err(Exit::SignedOut),
            Err(Fail::NotFound) => {
                self.phase = Phase::Gone("Item not found".to_string());
                return Ok(());
            }
            Err(err) => {
                self.banner = Some(Banner {
                    kind: BannerKind::Error,
                    text: err.to_string(),
                });
                return Ok(());
            }
        }

        match self.api.get_bid_history(self.item_id).await {
            Ok(history) => self.history = history,
            // Not worth a banner; the snapshot already refreshed
            Err(err) => debug!("bid history refresh failed: {}", err),
        }
        Ok(())
    }

    /// First half of the single-flight submission. Validates the raw
    /// input and returns the amount to send, or `None` when the input is
    /// invalid (inline error set) or a submission is already in flight
    /// (silently dropped, so double-clicks cannot double-bid).
    pub fn begin_submit(&mut self, raw_input: &str) -> Option<Amount> {
        if self.submitting {
            debug!("bid submission already in flight; dropping");
            return None;
        }
        let snapshot = match self.store.current() {
            Some(snapshot) if !snapshot.is_ended() => snapshot,
            _ => return None,
        };

        self.field_error = None;
        match validate_bid_input(raw_input, snapshot.current_price) {
            Ok(amount) => {
                self.submitting = true;
                Some(amount)
            }
            Err(err) => {
                self.field_error = Some(err.to_string());
                None
            }
        }
    }

    /// Second half of the submission, fed with the REST outcome.
    pub async fn finish_submit(&mut self, outcome: Result<BidRecord, Fail>) -> Result<(), Exit> {
        self.submitting = false;
        match outcome {
            Ok(_) => {
                self.field_error = None;
                self.banner = Some(Banner {
                    kind: BannerKind::Success,
                    text: "Bid placed successfully!".to_string(),
                });
                // resync; the live channel may or may not have beaten us
                self.poll().await
            }
            Err(Fail::Rejected { field, message }) => {
                // server-side rejections land exactly where client-side
                // ones do
                if field.as_deref() == Some("amount") {
                    self.field_error = Some(message);
                } else {
                    self.banner = Some(Banner {
                        kind: BannerKind::Error,
                        text: message,
                    });
                }
                Ok(())
            }
            Err(Fail::Unauthorized) => {
                self.banner = Some(Banner {
                    kind: BannerKind::Error,
                    text: Fail::Unauthorized.to_string(),
                });
                self.sign_out_pending = true;
                Ok(())
            }
            Err(Fail::NotFound) => {
                self.phase = Phase::Gone("Item not found".to_string());
                Ok(())
            }
            Err(err) => {
                self.banner = Some(Banner {
                    kind: BannerKind::Error,
                    text: err.to_string(),
                });
                Ok(())
            }
        }
    }

    pub fn set_live_state(&mut self, state: ConnectionState) {
        self.live_state = state;
    }

    pub fn dismiss_banner(&mut self) {
        self.banner = None;
    }

    pub fn render(&self, now: DateTime<Utc>) -> View {
        let snapshot = match &self.phase {
            Phase::Loading => return View::Loading,
            Phase::Gone(message) => return View::PageError(message.clone()),
            Phase::Ready => match self.store.current() {
                Some(snapshot) => snapshot,
                None => return View::Loading,
            },
        };

        let time = remaining(now, &snapshot.end_time);
        let status = classify(snapshot.is_ended(), &time);

        let outcome = if status == StatusBucket::Ended {
            Some(match &snapshot.highest_bidder {
                None => Outcome::NoBids,
                Some(bidder) if bidder.user_id == self.session.user_id => Outcome::Won {
                    price_label: snapshot.current_price.to_string(),
                },
                Some(bidder) => Outcome::Lost {
                    winner_label: bidder
                        .name
                        .clone()
                        .unwrap_or_else(|| "Unknown".to_string()),
                    price_label: snapshot.current_price.to_string(),
                },
            })
        } else {
            None
        };

        let history = self
            .history
            .iter()
            .enumerate()
            .map(|(index, bid)| HistoryRow {
                bidder_label: bid
                    .bidder_name
                    .clone()
                    .unwrap_or_else(|| "Unknown".to_string()),
                amount_label: bid.amount.to_string(),
                time_label: bid
                    .bid_time
                    .map(|at| at.format("%b %-d, %-I:%M %p").to_string())
                    .unwrap_or_else(|| "Recently".to_string()),
                is_highest: index == 0,
            })
            .collect();

        View::Bidding(ViewModel {
            item_name: snapshot.name.clone(),
            description: snapshot.description.clone(),
            price_label: snapshot.current_price.to_string(),
            bid_count: snapshot.bid_count,
            highest_bidder_label: snapshot
                .highest_bidder
                .as_ref()
                .map(|bidder| {
                    bidder
                        .name
                        .clone()
                        .unwrap_or_else(|| "Unknown".to_string())
                })
                .unwrap_or_else(|| "No bids yet".to_string()),
            seller_label: snapshot
                .seller_name
                .clone()
                .unwrap_or_else(|| "Unknown Seller".to_string()),
            status,
            countdown_label: time.label,
            min_bid_label: snapshot.current_price.plus_cents(1).to_string(),
            history,
            amount_field_error: self.field_error.clone(),
            banner: self.banner.clone(),
            submitting: self.submitting,
            live: self.live_state,
            outcome,
        })
    }

    /// Drives the whole page lifetime in one cooperative loop: countdown
    /// tick, poll tick, live events, amount-field submissions, shutdown.
    /// A frame goes out after every state change. Returning tears down
    /// every timer, and the live channel is closed explicitly so no
    /// reconnect outlives the page.
    pub async fn run(
        mut self,
        channel_config: ChannelConfig,
        frames: mpsc::Sender<View>,
        mut inputs: mpsc::Receiver<String>,
        mut shutdown: watch::Receiver<bool>,
    ) -> Exit {
        if let Err(exit) = self.load().await {
            return exit;
        }
        let _ = frames.send(self.render(Utc::now())).await;

        if !self.is_ready() {
            // terminal page error; hold the view until navigation
            let _ = shutdown.changed().await;
            return Exit::NavigatedAway;
        }

        let (channel, mut live_events) =
            LiveUpdateChannel::open(channel_config, &self.session, self.item_id);
        self.set_live_state(channel.state());

        let mut countdown = interval_at(Instant::now() + COUNTDOWN_TICK, COUNTDOWN_TICK);
        countdown.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut poll = interval_at(Instant::now() + POLL_INTERVAL, POLL_INTERVAL);
        poll.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let (submit_tx, mut submit_rx) = mpsc::channel::<Result<BidRecord, Fail>>(1);
        let mut live_open = true;
        let mut inputs_open = true;

        let exit = loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        break Exit::NavigatedAway;
                    }
                }
                _ = countdown.tick() => {
                    if self.is_ready() {
                        if self.on_tick(Utc::now()) {
                            if let Err(exit) = self.poll().await {
                                break exit;
                            }
                        }
                        let _ = frames.send(self.render(Utc::now())).await;
                    }
                }
                _ = poll.tick() => {
                    if self.is_ready() {
                        if let Err(exit) = self.poll().await {
                            break exit;
                        }
                        let _ = frames.send(self.render(Utc::now())).await;
                    }
                }
                event = live_events.recv(), if live_open => {
                    self.set_live_state(channel.state());
                    match event {
                        Some(event) => {
                            if self.is_ready() && self.on_live_event(event) {
                                let _ = frames.send(self.render(Utc::now())).await;
                            }
                        }
                        None => {
                            // channel task is done (failed or closed);
                            // polling keeps the page alive
                            live_open = false;
                            let _ = frames.send(self.render(Utc::now())).await;
                        }
                    }
                }
                result = submit_rx.recv() => {
                    if let Some(result) = result {
                        if let Err(exit) = self.finish_submit(result).await {
                            break exit;
                        }
                        let _ = frames.send(self.render(Utc::now())).await;
                        if self.sign_out_pending {
                            // leave the notice on screen briefly
                            tokio::time::sleep(SIGN_OUT_DELAY).await;
                            break Exit::SignedOut;
                        }
                    }
                }
                line = inputs.recv(), if inputs_open => {
                    match line {
                        Some(line) => {
                            if let Some(amount) = self.begin_submit(&line) {
                                let api = self.api.clone();
                                let item_id = self.item_id;
                                let bidder_id = self.session.user_id;
                                let tx = submit_tx.clone();
                                tokio::spawn(async move {
                                    let _ = tx.send(api.place_bid(item_id, amount, bidder_id).await).await;
                                });
                            }
                            let _ = frames.send(self.render(Utc::now())).await;
                        }
                        None => inputs_open = false,
                    }
                }
            }
        };

        channel.close().await;
        exit
    }
}
