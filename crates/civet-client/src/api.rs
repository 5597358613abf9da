// SPDX-License-Identifier: AGPL-3.0
// Civet Client - HTTP client for the Civet REST API
//
// Every request carries the bearer token (when one is cached) and a
// Platform header identifying the frontend.

use crate::sync::SplitSyncRequest;
use civet_core::{
    AppConfig, AppError, Friend, FriendTotals, Outing, Receipt, ReceiptSummary, TokenProvider,
};
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Client for the Civet backend
pub struct ApiClient {
    http: Client,
    base_url: String,
    platform: String,
    token: Arc<dyn TokenProvider>,
}

#[derive(Serialize)]
struct CreateOutingRequest<'a> {
    name: &'a str,
}

#[derive(Deserialize)]
struct CreatedOuting {
    id: String,
}

#[derive(Serialize)]
struct AddFriendRequest<'a> {
    name: &'a str,
    receipt_id: &'a str,
    user_id: Option<&'a str>,
}

#[derive(Deserialize)]
struct CreatedFriend {
    #[serde(rename = "friendId")]
    friend_id: String,
}

impl ApiClient {
    pub fn new(config: &AppConfig, token: Arc<dyn TokenProvider>) -> Result<Self, AppError> {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| AppError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            platform: config.platform.clone(),
            token,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut request = self
            .http
            .request(method, self.url(path))
            .header("Platform", self.platform.as_str());

        if let Some(token) = self.token.token() {
            request = request.bearer_auth(token);
        }

        request
    }

    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        what: &str,
    ) -> Result<T, AppError> {
        let response = request.send().await.map_err(|e| {
            if e.is_connect() {
                AppError::ConnectionRefused(format!("Cannot reach server - {}", e))
            } else if e.is_timeout() {
                AppError::Network(format!("Request timed out: {}", what))
            } else {
                AppError::Network(format!("{} failed: {}", what, e))
            }
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Network(format!(
                "{} failed: server returned {} {}",
                what, status, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Serialization(format!("Failed to parse {}: {}", what, e)))
    }

    /// `GET outing` - all outings for the authenticated user
    pub async fn list_outings(&self) -> Result<Vec<Outing>, AppError> {
        self.send_json(self.request(Method::GET, "outing"), "list outings")
            .await
    }

    /// `POST outing` - create an outing, returning its id
    pub async fn create_outing(&self, name: &str) -> Result<String, AppError> {
        let created: CreatedOuting = self
            .send_json(
                self.request(Method::POST, "outing")
                    .json(&CreateOutingRequest { name }),
                "create outing",
            )
            .await?;
        Ok(created.id)
    }

    /// `GET outing/{id}/receipts` - receipt summaries for an outing
    pub async fn outing_receipts(&self, outing_id: &str) -> Result<Vec<ReceiptSummary>, AppError> {
        self.send_json(
            self.request(Method::GET, &format!("outing/{}/receipts", outing_id)),
            "list receipts",
        )
        .await
    }

    /// `GET outing/{id}/friends` - server-computed per-friend totals across
    /// the whole outing
    pub async fn outing_friend_totals(
        &self,
        outing_id: &str,
    ) -> Result<Vec<FriendTotals>, AppError> {
        self.send_json(
            self.request(Method::GET, &format!("outing/{}/friends", outing_id)),
            "fetch outing totals",
        )
        .await
    }

    /// `GET receipt/item/{id}` - full receipt with items, fees and splits
    pub async fn receipt(&self, receipt_id: &str) -> Result<Receipt, AppError> {
        self.send_json(
            self.request(Method::GET, &format!("receipt/item/{}", receipt_id)),
            "fetch receipt",
        )
        .await
    }

    /// `GET receipt/{id}/friends` - friends attached to a receipt
    pub async fn receipt_friends(&self, receipt_id: &str) -> Result<Vec<Friend>, AppError> {
        self.send_json(
            self.request(Method::GET, &format!("receipt/{}/friends", receipt_id)),
            "fetch friends",
        )
        .await
    }

    /// `POST receipt/friends` - add a friend to a receipt, returning the new
    /// friend id. Duplicate names are allowed; the server decides dedup.
    pub async fn add_friend(
        &self,
        receipt_id: &str,
        name: &str,
        user_id: Option<&str>,
    ) -> Result<String, AppError> {
        let created: CreatedFriend = self
            .send_json(
                self.request(Method::POST, "receipt/friends")
                    .json(&AddFriendRequest {
                        name,
                        receipt_id,
                        user_id,
                    }),
                "add friend",
            )
            .await?;
        Ok(created.friend_id)
    }

    /// `POST receipt/friends/split` - replace all split assignments for a
    /// receipt with the carried state
    pub async fn replace_splits(&self, request: &SplitSyncRequest) -> Result<(), AppError> {
        let response = self
            .request(Method::POST, "receipt/friends/split")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    AppError::ConnectionRefused(format!("Cannot reach server - {}", e))
                } else {
                    AppError::Network(format!("Split sync failed: {}", e))
                }
            })?;

        if !response.status().is_success() {
            return Err(AppError::Network(format!(
                "Split sync failed: server returned {}",
                response.status()
            )));
        }

        Ok(())
    }
}
