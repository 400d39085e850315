// HTTP client for the property management API
//
// Two read-only endpoints are consumed:
//
// - `GET /api/tenants/`
// - `GET /api/transactions/?tenant_id=<id>`
//
// Any non-2xx status, transport failure, or undecodable body is reported as
// an `ApiError`. Transaction records are validated one by one so a bad
// amount or date is reported with the offending record's position and id.

use crate::config::ApiConfig;
use crate::ledger::{try_aggregate, TotalsOverflow};
use crate::model::{RecordError, Tenant, TenantId, Transaction};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

/// Read access to tenants and their ledgers.
///
/// The dashboard talks to this trait so it can be driven by a fake in tests.
#[async_trait]
pub trait LedgerApi: Send + Sync {
    async fn list_tenants(&self) -> Result<Vec<Tenant>, ApiError>;

    async fn list_transactions(&self, tenant_id: TenantId) -> Result<Vec<Transaction>, ApiError>;
}

/// Errors from talking to the API
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid API base URL {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Request to {url} timed out")]
    Timeout { url: String },

    #[error("Could not reach {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP error! status: {status}")]
    Status { url: String, status: u16 },

    #[error("Unexpected response from {url}: {reason}")]
    Decode { url: String, reason: String },

    #[error("Transaction {} at position {index} is invalid: {source}", describe_id(.id))]
    InvalidRecord {
        index: usize,
        id: Option<i64>,
        #[source]
        source: RecordError,
    },

    #[error("Transaction amounts are out of range: {0}")]
    TotalsOutOfRange(#[source] TotalsOverflow),
}

fn describe_id(id: &Option<i64>) -> String {
    match id {
        Some(id) => format!("#{}", id),
        None => "without id".to_string(),
    }
}

/// reqwest-backed implementation of [`LedgerApi`]
#[derive(Debug, Clone)]
pub struct HttpLedgerClient {
    client: Client,
    base_url: Url,
}

impl HttpLedgerClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let base_url = normalize_base_url(&config.base_url)?;
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(ApiError::Client)?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path)
            .map_err(|e| ApiError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let url_text = url.to_string();
        debug!(url = %url_text, "GET");

        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ApiError::Timeout { url: url_text.clone() }
                } else {
                    ApiError::Transport {
                        url: url_text.clone(),
                        source: e,
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(url = %url_text, status = status.as_u16(), "API returned error status");
            return Err(ApiError::Status {
                url: url_text,
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::Timeout { url: url_text.clone() }
            } else {
                ApiError::Transport {
                    url: url_text.clone(),
                    source: e,
                }
            }
        })?;

        serde_json::from_slice(&body).map_err(|e| ApiError::Decode {
            url: url_text,
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl LedgerApi for HttpLedgerClient {
    async fn list_tenants(&self) -> Result<Vec<Tenant>, ApiError> {
        let url = self.endpoint("api/tenants/")?;
        self.get_json(url, &[]).await
    }

    async fn list_transactions(&self, tenant_id: TenantId) -> Result<Vec<Transaction>, ApiError> {
        let url = self.endpoint("api/transactions/")?;
        let records: Vec<Value> = self
            .get_json(url, &[("tenant_id", tenant_id.to_string())])
            .await?;
        parse_transactions(records)
    }
}

/// Validate every record; the first invalid one fails the whole batch, and
/// so does a batch whose totals cannot be represented.
pub fn parse_transactions(records: Vec<Value>) -> Result<Vec<Transaction>, ApiError> {
    let transactions = records
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            let id = record.get("id").and_then(Value::as_i64);
            Transaction::from_json(record)
                .map_err(|source| ApiError::InvalidRecord { index, id, source })
        })
        .collect::<Result<Vec<_>, _>>()?;

    try_aggregate(&transactions).map_err(ApiError::TotalsOutOfRange)?;
    Ok(transactions)
}

/// Parse the configured base URL, requiring http(s) and a trailing slash so
/// endpoint paths join underneath any path prefix.
pub fn normalize_base_url(raw: &str) -> Result<Url, ApiError> {
    let trimmed = raw.trim();
    let mut url = Url::parse(trimmed).map_err(|e| ApiError::InvalidBaseUrl {
        url: trimmed.to_string(),
        reason: e.to_string(),
    })?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ApiError::InvalidBaseUrl {
            url: trimmed.to_string(),
            reason: format!("unsupported scheme {:?}", url.scheme()),
        });
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}
