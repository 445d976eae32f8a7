use std::fmt::{Debug, Formatter};

use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{error, info, instrument, warn};

use crate::{
    error::ApiError,
    leaderboard::{sample_page, LeaderboardView},
    types::{
        DistributionRecord, HistoryResponse, LeaderboardPage, LeaderboardQuery, RecordStatus,
        SaveAirdropRequest, SaveAirdropResponse, UpdateStatusRequest,
    },
    Result,
};

pub const IDEMPOTENCY_HEADER: &str = "Idempotency-Key";

/// Typed client for the persistence backend.
#[derive(Clone)]
pub struct AirdropApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl Debug for AirdropApiClient {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AirdropApiClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl AirdropApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Store a confirmed distribution. The transaction hash doubles as the
    /// idempotency key, so a resent record cannot create a duplicate row on a
    /// backend that honours it.
    #[instrument(skip(self, request), fields(tx_hash = %request.tx_hash), err)]
    pub async fn record_distribution(&self, request: &SaveAirdropRequest) -> Result<()> {
        let response = self
            .http
            .post(self.url("/api/airdrops"))
            .header(IDEMPOTENCY_HEADER, &request.tx_hash)
            .json(request)
            .send()
            .await?;

        let body: SaveAirdropResponse = parse(response).await?;
        if !body.success {
            return Err(ApiError::Rejected(
                body.error
                    .unwrap_or_else(|| "Failed to save airdrop data".to_string()),
            ));
        }
        info!("airdrop data saved");
        Ok(())
    }

    #[instrument(skip(self), err)]
    pub async fn update_status(&self, tx_hash: &str, status: RecordStatus) -> Result<()> {
        let response = self
            .http
            .patch(self.url(&format!("/api/airdrops/{tx_hash}")))
            .json(&UpdateStatusRequest { status })
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    /// Distributions sent by `wallet_address`, as ordered by the backend. A
    /// wallet with no history yields an empty list.
    #[instrument(skip(self))]
    pub async fn fetch_history(&self, wallet_address: &str) -> Result<Vec<DistributionRecord>> {
        let response = self
            .http
            .get(self.url(&format!("/api/airdrops/history/{wallet_address}")))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(vec![]);
        }
        let history: HistoryResponse = parse(response).await?;
        Ok(history.data)
    }

    #[instrument(skip(self))]
    pub async fn fetch_leaderboard(&self, query: &LeaderboardQuery) -> Result<LeaderboardPage> {
        let response = self
            .http
            .get(self.url("/api/leaderboard"))
            .query(query)
            .send()
            .await?;
        parse(response).await
    }

    /// Like [`Self::fetch_leaderboard`], but never fails: on error the sample
    /// page is returned and the reason is kept in `fallback`.
    pub async fn leaderboard_view(&self, query: &LeaderboardQuery) -> LeaderboardView {
        match self.fetch_leaderboard(query).await {
            Ok(page) => LeaderboardView {
                page,
                fallback: None,
            },
            Err(e) => {
                warn!("leaderboard unavailable, using sample data: {}", e);
                LeaderboardView {
                    page: sample_page(query),
                    fallback: Some(e.to_string()),
                }
            }
        }
    }
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    error!("backend returned {}: {}", status, body);
    Err(ApiError::StatusError {
        status: status.as_u16(),
        body,
    })
}

async fn parse<T: DeserializeOwned>(response: Response) -> Result<T> {
    let bytes = check_status(response).await?.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}
