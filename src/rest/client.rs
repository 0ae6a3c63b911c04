// src/rest/client.rs
use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;

use super::types::{ApiErrorBody, BidRequest, BidResponse, ItemResponse, UserProfile};
use crate::domain::{bids, AuctionSnapshot, BidRecord, ItemId, UserId};
use crate::money::Amount;
use crate::session::Session;

/// Outcome taxonomy for every backend call.
///
/// `Unauthorized` and `NotFound` are terminal for the page;
/// `Rejected` is recoverable by correcting the input; `Transient` is
/// recoverable by waiting for the next poll tick; the failed request
/// itself is never retried immediately.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Fail {
    #[error("Session expired. Please log in again.")]
    Unauthorized,

    #[error("Item not found")]
    NotFound,

    #[error("{message}")]
    Rejected {
        field: Option<String>,
        message: String,
    },

    #[error("Error connecting to server. Please try again.")]
    Transient(String),
}

impl From<reqwest::Error> for Fail {
    fn from(err: reqwest::Error) -> Self {
        Fail::Transient(err.to_string())
    }
}

/// The item/bid endpoints the bidding view consumes. A trait so the
/// controller can run against an in-memory fake in tests.
#[async_trait]
pub trait ItemApi: Send + Sync {
    async fn get_item(&self, id: ItemId) -> Result<AuctionSnapshot, Fail>;
    async fn get_bid_history(&self, id: ItemId) -> Result<Vec<BidRecord>, Fail>;
    async fn place_bid(
        &self,
        id: ItemId,
        amount: Amount,
        bidder_id: UserId,
    ) -> Result<BidRecord, Fail>;
    async fn get_user(&self, id: UserId) -> Result<UserProfile, Fail>;
}

/// Authenticated client for the storefront's REST API.
pub struct RestClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl RestClient {
    pub fn new(base_url: impl Into<String>, session: &Session) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        RestClient {
            http: reqwest::Client::new(),
            base_url,
            token: session.token.clone(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl ItemApi for RestClient {
    async fn get_item(&self, id: ItemId) -> Result<AuctionSnapshot, Fail> {
        let response = self
            .http
            .get(self.url(&format!("/items/{}", id)))
            .bearer_auth(&self.token)
            .send()
            .await?;

        match response.status() {
            StatusCode::UNAUTHORIZED => Err(Fail::Unauthorized),
            StatusCode::NOT_FOUND => Err(Fail::NotFound),
            status if status.is_success() => {
                Ok(response.json::<ItemResponse>().await?.into_snapshot())
            }
            status => Err(Fail::Transient(format!("GET /items/{} -> {}", id, status))),
        }
    }

    async fn get_bid_history(&self, id: ItemId) -> Result<Vec<BidRecord>, Fail> {
        let response = self
            .http
            .get(self.url(&format!("/auctions/{}/bids", id)))
            .bearer_auth(&self.token)
            .send()
            .await?;

        match response.status() {
            StatusCode::UNAUTHORIZED => Err(Fail::Unauthorized),
            StatusCode::NOT_FOUND => Err(Fail::NotFound),
            status if status.is_success() => {
                let mut history: Vec<BidRecord> = response
                    .json::<Vec<BidResponse>>()
                    .await?
                    .into_iter()
                    .map(BidResponse::into_record)
                    .collect();
                bids::sort_history(&mut history);
                Ok(history)
            }
            status => Err(Fail::Transient(format!(
                "GET /auctions/{}/bids -> {}",
                id, status
            ))),
        }
    }

    async fn place_bid(
        &self,
        id: ItemId,
        amount: Amount,
        bidder_id: UserId,
    ) -> Result<BidRecord, Fail> {
        let response = self
            .http
            .post(self.url(&format!("/auctions/{}/bid", id)))
            .bearer_auth(&self.token)
            .json(&BidRequest { amount, bidder_id })
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(Fail::Unauthorized);
        }
        if status == StatusCode::NOT_FOUND {
            return Err(Fail::NotFound);
        }
        if status.is_success() {
            return Ok(response.json::<BidResponse>().await?.into_record());
        }

        if status.is_client_error() {
            // The server scopes validation failures to a field so the
            // message can land at the amount input instead of a banner.
            let body = response.json::<ApiErrorBody>().await?;
            return Err(Fail::Rejected {
                field: body.field,
                message: body
                    .message
                    .unwrap_or_else(|| "Failed to place bid".to_string()),
            });
        }

        Err(Fail::Transient(format!(
            "POST /auctions/{}/bid -> {}",
            id, status
        )))
    }

    async fn get_user(&self, id: UserId) -> Result<UserProfile, Fail> {
        let response = self
            .http
            .get(self.url(&format!("/users/{}", id)))
            .bearer_auth(&self.token)
            .send()
            .await?;

        match response.status() {
            StatusCode::UNAUTHORIZED => Err(Fail::Unauthorized),
            StatusCode::NOT_FOUND => Err(Fail::NotFound),
            status if status.is_success() => Ok(response.json::<UserProfile>().await?),
            status => Err(Fail::Transient(format!("GET /users/{} -> {}", id, status))),
        }
    }
}
