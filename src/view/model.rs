// src/view/model.rs
use crate::domain::StatusBucket;
use crate::live::ConnectionState;

/// One row of the bid-history panel, leader first.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRow {
    pub bidder_label: String,
    pub amount_label: String,
    pub time_label: String,
    pub is_highest: bool,
}

/// The ended view's verdict for the signed-in user. `Won` is where the
/// renderer offers the payment hand-off.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Won {
        price_label: String,
    },
    Lost {
        winner_label: String,
        price_label: String,
    },
    NoBids,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    Success,
    Error,
}

/// Page-level dismissable message.
#[derive(Debug, Clone, PartialEq)]
pub struct Banner {
    pub kind: BannerKind,
    pub text: String,
}

/// Everything a renderer needs for the bidding page. No DOM or widget
/// types; the controller produces this and the rendering technology is
/// somebody else's problem.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewModel {
    pub item_name: String,
    pub description: String,
    pub price_label: String,
    pub bid_count: u32,
    /// Leader's name, or "No bids yet".
    pub highest_bidder_label: String,
    pub seller_label: String,
    pub status: StatusBucket,
    pub countdown_label: String,
    pub min_bid_label: String,
    pub history: Vec<HistoryRow>,
    /// Inline error at the amount input.
    pub amount_field_error: Option<String>,
    pub banner: Option<Banner>,
    pub submitting: bool,
    pub live: ConnectionState,
    /// Present once the auction is over.
    pub outcome: Option<Outcome>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Loading,
    PageError(String),
    Bidding(ViewModel),
}
