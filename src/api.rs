// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Client for the trading-data API that owns accounts, credentials and
//! exchange connectivity.

use crate::config::Config;
use crate::models::{
    Account, Balance, IncomeRecord, Order, PositionRisk, Snapshot, TradeHistoryItem,
};
use crate::session::Session;
use crate::utils::http_client;
use reqwest::Url;
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("{message} (HTTP {status})")]
    RequestFailed { status: u16, message: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("invalid API url '{0}'")]
    InvalidUrl(String),
}

/// The two calls income aggregation depends on.
#[allow(async_fn_in_trait)]
pub trait IncomeSource {
    async fn fetch_accounts(&self, session: &Session) -> Result<Vec<Account>, ApiError>;

    async fn fetch_income(
        &self,
        session: &Session,
        account_id: &str,
    ) -> Result<Vec<IncomeRecord>, ApiError>;
}

#[allow(async_fn_in_trait)]
pub trait BalanceSource {
    async fn fetch_balance(&self, session: &Session, account_id: &str)
    -> Result<Balance, ApiError>;
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl ApiClient {
    pub fn new(
        http: reqwest::Client,
        base_url: &str,
        api_key: Option<String>,
    ) -> Result<Self, ApiError> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        let parsed = Url::parse(&base_url).map_err(|_| ApiError::InvalidUrl(base_url.clone()))?;
        if parsed.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(base_url));
        }
        Ok(ApiClient {
            http,
            base_url,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        })
    }

    pub fn from_config(cfg: &Config) -> anyhow::Result<Self> {
        let http = http_client(cfg.request_timeout())?;
        Ok(Self::new(http, &cfg.api_url, cfg.api_key.clone())?)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Base URL plus `segments`, each percent-encoded as one path segment.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let invalid = || ApiError::InvalidUrl(self.base_url.clone());
        let mut url = Url::parse(&self.base_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        session: &Session,
        segments: &[&str],
        query: &[(&str, String)],
        fallback: &str,
    ) -> Result<T, ApiError> {
        let token = session.token()?;
        let url = self.endpoint(segments)?;
        debug!(path = url.path(), "GET");
        let mut req = self.http.get(url).bearer_auth(token);
        if !query.is_empty() {
            req = req.query(query);
        }
        if let Some(key) = &self.api_key {
            req = req.query(&[("api_key", key)]);
        }
        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::RequestFailed {
                status: status.as_u16(),
                message: error_message(&body, fallback),
            });
        }
        Ok(resp.json::<T>().await?)
    }

    pub async fn trade_accounts(&self, session: &Session) -> Result<Vec<Account>, ApiError> {
        self.get_json(
            session,
            &["api", "v1", "trade-accounts"],
            &[],
            "Failed to fetch trade accounts",
        )
        .await
    }

    pub async fn trade_account(&self, session: &Session, id: &str) -> Result<Account, ApiError> {
        self.get_json(
            session,
            &["api", "v1", "trade-accounts", id],
            &[],
            "Failed to fetch trade account",
        )
        .await
    }

    pub async fn income(&self, session: &Session, id: &str) -> Result<Vec<IncomeRecord>, ApiError> {
        self.get_json(
            session,
            &["api", "v1", "binance", "income", id],
            &[],
            "Failed to fetch income",
        )
        .await
    }

    pub async fn balance(&self, session: &Session, id: &str) -> Result<Balance, ApiError> {
        self.get_json(
            session,
            &["api", "v1", "binance", "balance", id],
            &[],
            "Failed to fetch balance",
        )
        .await
    }

    pub async fn current_positions(
        &self,
        session: &Session,
        id: &str,
    ) -> Result<Vec<PositionRisk>, ApiError> {
        self.get_json(
            session,
            &["api", "v1", "binance", "current-position", id],
            &[],
            "Failed to fetch current position",
        )
        .await
    }

    pub async fn open_orders(&self, session: &Session, id: &str) -> Result<Vec<Order>, ApiError> {
        self.get_json(
            session,
            &["api", "v1", "binance", "open-orders", id],
            &[],
            "Failed to fetch open orders",
        )
        .await
    }

    pub async fn trade_history(
        &self,
        session: &Session,
        id: &str,
        symbol: &str,
    ) -> Result<Vec<TradeHistoryItem>, ApiError> {
        self.get_json(
            session,
            &["api", "v1", "binance", "trade-history", id],
            &[("symbol", symbol.to_string())],
            "Failed to fetch trade history",
        )
        .await
    }

    pub async fn snapshots(
        &self,
        session: &Session,
        id: &str,
        start_time: i64,
        end_time: i64,
    ) -> Result<Vec<Snapshot>, ApiError> {
        self.get_json(
            session,
            &["api", "v1", "binance", "snapshot", id],
            &[
                ("startTime", start_time.to_string()),
                ("endTime", end_time.to_string()),
            ],
            "Failed to fetch snapshots",
        )
        .await
    }
}

impl IncomeSource for ApiClient {
    async fn fetch_accounts(&self, session: &Session) -> Result<Vec<Account>, ApiError> {
        self.trade_accounts(session).await
    }

    async fn fetch_income(
        &self,
        session: &Session,
        account_id: &str,
    ) -> Result<Vec<IncomeRecord>, ApiError> {
        self.income(session, account_id).await
    }
}

impl BalanceSource for ApiClient {
    async fn fetch_balance(&self, session: &Session, account_id: &str) -> Result<Balance, ApiError> {
        self.balance(session, account_id).await
    }
}

/// Pull the human-readable reason out of an error body. Exchange routes use
/// `error`, account routes use `message`.
pub fn error_message(body: &str, fallback: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .or_else(|| v.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_owned)
        })
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_prefers_error_then_message() {
        assert_eq!(
            error_message(r#"{"error":"Invalid API-key"}"#, "x"),
            "Invalid API-key"
        );
        assert_eq!(
            error_message(r#"{"message":"Unauthorized"}"#, "x"),
            "Unauthorized"
        );
        assert_eq!(
            error_message("<html>502</html>", "Failed to fetch income"),
            "Failed to fetch income"
        );
        assert_eq!(error_message(r#"{"error":""}"#, "fallback"), "fallback");
    }

    #[test]
    fn client_rejects_bad_base_url() {
        let http = reqwest::Client::new();
        assert!(matches!(
            ApiClient::new(http.clone(), "not a url", None),
            Err(ApiError::InvalidUrl(_))
        ));
        let c = ApiClient::new(http, "http://localhost:8000/", Some(" ".into())).unwrap();
        assert_eq!(c.base_url(), "http://localhost:8000");
        assert!(c.api_key.is_none());
        assert!(matches!(
            ApiClient::new(reqwest::Client::new(), "mailto:ops@example.com", None),
            Err(ApiError::InvalidUrl(_))
        ));
    }

    #[test]
    fn account_id_stays_one_path_segment() {
        let c = ApiClient::new(reqwest::Client::new(), "http://localhost:8000/", None).unwrap();
        let url = c
            .endpoint(&["api", "v1", "binance", "income", "a/b?c#d"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8000/api/v1/binance/income/a%2Fb%3Fc%23d"
        );
        assert_eq!(url.query(), None);

        let prefixed = ApiClient::new(reqwest::Client::new(), "https://h.example/proxy/", None)
            .unwrap()
            .endpoint(&["api", "v1", "trade-accounts"])
            .unwrap();
        assert_eq!(prefixed.as_str(), "https://h.example/proxy/api/v1/trade-accounts");
    }

    #[tokio::test]
    async fn missing_token_fails_before_any_request() {
        let c = ApiClient::new(reqwest::Client::new(), "http://127.0.0.1:9", None).unwrap();
        let err = c.income(&Session::default(), "1").await.unwrap_err();
        assert!(matches!(err, ApiError::NotAuthenticated));
    }
}
