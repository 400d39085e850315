// Fixture API
//
// Serves the two read-only endpoints from a JSON document loaded once at
// startup:
//
//   { "tenants": [{ "id": 1, "name": "...", "unit": "..." }],
//     "transactions": [{ "tenant_id": 1, "id": 10, "date": "...", ... }] }
//
// Transaction records are served as-is (minus `tenant_id`), so a fixture can
// carry malformed amounts to exercise the client's validation.

use crate::model::{Tenant, TenantId};
use anyhow::{Context, Result};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Fixture {
    #[serde(default)]
    pub tenants: Vec<Tenant>,
    #[serde(default)]
    pub transactions: Vec<Map<String, Value>>,
}

impl Fixture {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read fixture {:?}", path))?;
        let fixture: Fixture = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse fixture {:?}", path))?;
        info!(
            "Loaded fixture with {} tenants and {} transactions",
            fixture.tenants.len(),
            fixture.transactions.len()
        );
        Ok(fixture)
    }

    /// Records belonging to `tenant_id`, in fixture order, without the
    /// `tenant_id` field.
    pub fn transactions_for(&self, tenant_id: TenantId) -> Vec<Value> {
        self.transactions
            .iter()
            .filter(|record| record.get("tenant_id").and_then(Value::as_i64) == Some(tenant_id))
            .map(|record| {
                let mut record = record.clone();
                record.remove("tenant_id");
                Value::Object(record)
            })
            .collect()
    }
}

/// Shared application state
#[derive(Clone)]
struct AppState {
    fixture: Arc<Fixture>,
}

/// Build the API router. Both endpoints answer with and without the trailing
/// slash.
pub fn router(fixture: Fixture) -> Router {
    let state = AppState {
        fixture: Arc::new(fixture),
    };

    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/tenants", get(list_tenants))
        .route("/tenants/", get(list_tenants))
        .route("/transactions", get(list_transactions))
        .route("/transactions/", get(list_transactions))
        .with_state(state);

    Router::new().nest("/api", api_routes)
}

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// GET /api/tenants/ - All tenants
async fn list_tenants(State(state): State<AppState>) -> impl IntoResponse {
    debug!("Serving {} tenants", state.fixture.tenants.len());
    Json(state.fixture.tenants.clone())
}

/// GET /api/transactions/?tenant_id=<id> - One tenant's transactions
async fn list_transactions(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    let tenant_id = match params.get("tenant_id").map(|raw| raw.trim().parse::<TenantId>()) {
        Some(Ok(id)) => id,
        Some(Err(_)) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "tenant_id must be an integer" })),
            )
                .into_response();
        }
        None => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "tenant_id is required" })),
            )
                .into_response();
        }
    };

    let records = state.fixture.transactions_for(tenant_id);
    debug!(tenant_id, "Serving {} transactions", records.len());
    (StatusCode::OK, Json(records)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    fn fixture() -> Fixture {
        serde_json::from_value(json!({
            "tenants": [
                { "id": 1, "name": "Ann Ortiz", "unit": "101" },
                { "id": 2, "name": "Ben Park", "unit": "202" }
            ],
            "transactions": [
                { "tenant_id": 1, "id": 10, "date": "2024-01-01", "description": "Rent", "type": "charge", "amount": "1200.00" },
                { "tenant_id": 2, "id": 20, "date": "2024-01-02", "description": "Rent", "type": "charge", "amount": "950.00" },
                { "tenant_id": 1, "id": 11, "date": "2024-01-05", "description": "Check", "type": "payment", "amount": "1200.00" }
            ]
        }))
        .unwrap()
    }

    async fn get(uri: &str) -> (StatusCode, Value) {
        let response = router(fixture())
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_lists_tenants_in_order() {
        let (status, body) = get("/api/tenants/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["name"], "Ann Ortiz");
        assert_eq!(body[1]["id"], 2);

        let (status, _) = get("/api/tenants").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_filters_transactions_by_tenant() {
        let (status, body) = get("/api/transactions/?tenant_id=1").await;
        assert_eq!(status, StatusCode::OK);

        let records = body.as_array().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["id"], 10);
        assert_eq!(records[1]["id"], 11);
        assert!(records[0].get("tenant_id").is_none());
    }

    #[tokio::test]
    async fn test_unknown_tenant_is_empty() {
        let (status, body) = get("/api/transactions/?tenant_id=99").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn test_bad_tenant_id_is_rejected() {
        let (status, _) = get("/api/transactions/").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = get("/api/transactions/?tenant_id=abc").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "tenant_id must be an integer");
    }
}
