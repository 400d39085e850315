// HTTP-level tests for the API client against an in-process axum server

use axum::{
    extract::Query,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;
use tenant_ledger::client::{ApiError, HttpLedgerClient, LedgerApi};
use tenant_ledger::config::ApiConfig;
use tenant_ledger::model::{RecordError, TransactionKind};

async fn spawn(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn client(base_url: String) -> HttpLedgerClient {
    client_with_timeout(base_url, 5)
}

fn client_with_timeout(base_url: String, request_timeout_secs: u64) -> HttpLedgerClient {
    HttpLedgerClient::new(&ApiConfig {
        base_url,
        request_timeout_secs,
    })
    .unwrap()
}

async fn tenants() -> Json<Value> {
    Json(json!([
        { "id": 3, "name": "Cara Lin", "unit": "3A" },
        { "id": 1, "name": "Abe Moss", "unit": "1F" }
    ]))
}

/// Echoes the tenant id back in the description so tests can see the query.
async fn transactions(Query(params): Query<HashMap<String, String>>) -> impl IntoResponse {
    match params.get("tenant_id") {
        Some(id) => Json(json!([
            { "id": 1, "date": "2024-04-01", "description": format!("tenant {}", id), "type": "Charge", "amount": "1500.00", "memo": "ignored" },
            { "id": 2, "date": "2024-04-03", "description": "ACH", "type": "payment", "amount": 1499.5 }
        ]))
        .into_response(),
        None => StatusCode::BAD_REQUEST.into_response(),
    }
}

#[tokio::test]
async fn test_lists_tenants_in_server_order() {
    let addr = spawn(Router::new().route("/api/tenants/", get(tenants))).await;

    let result = client(format!("http://{}", addr)).list_tenants().await.unwrap();

    let ids: Vec<i64> = result.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![3, 1]);
    assert_eq!(result[0].name, "Cara Lin");
    assert_eq!(result[1].unit, "1F");
}

#[tokio::test]
async fn test_server_error_is_status_error() {
    let app = Router::new().route(
        "/api/tenants/",
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );
    let addr = spawn(app).await;

    let err = client(format!("http://{}", addr)).list_tenants().await.unwrap_err();

    assert!(matches!(err, ApiError::Status { status: 500, .. }));
    assert_eq!(err.to_string(), "HTTP error! status: 500");
}

#[tokio::test]
async fn test_transactions_are_filtered_by_tenant_query() {
    let addr = spawn(Router::new().route("/api/transactions/", get(transactions))).await;

    let result = client(format!("http://{}", addr))
        .list_transactions(42)
        .await
        .unwrap();

    assert_eq!(result.len(), 2);
    assert_eq!(result[0].description, "tenant 42");
    assert_eq!(result[0].kind, TransactionKind::Charge);
    assert_eq!(result[0].amount, Decimal::new(150000, 2));
    assert_eq!(result[1].kind, TransactionKind::Payment);
    assert_eq!(result[1].amount, Decimal::new(14995, 1));
}

#[tokio::test]
async fn test_invalid_amount_fails_the_fetch() {
    let app = Router::new().route(
        "/api/transactions/",
        get(|| async {
            Json(json!([
                { "id": 1, "date": "2024-04-01", "description": "Rent", "type": "charge", "amount": "12.00" },
                { "id": 7, "date": "2024-04-02", "description": "Fee", "type": "charge", "amount": "twelve" }
            ]))
        }),
    );
    let addr = spawn(app).await;

    let err = client(format!("http://{}", addr))
        .list_transactions(1)
        .await
        .unwrap_err();

    match err {
        ApiError::InvalidRecord { index, id, source } => {
            assert_eq!(index, 1);
            assert_eq!(id, Some(7));
            assert!(matches!(source, RecordError::InvalidAmount(_)));
        }
        other => panic!("expected InvalidRecord, got {:?}", other),
    }
}

#[tokio::test]
async fn test_non_json_body_is_decode_error() {
    let app = Router::new().route("/api/tenants/", get(|| async { "<html>maintenance</html>" }));
    let addr = spawn(app).await;

    let err = client(format!("http://{}", addr)).list_tenants().await.unwrap_err();

    assert!(matches!(err, ApiError::Decode { .. }));
}

#[tokio::test]
async fn test_base_url_path_prefix_is_kept() {
    let app = Router::new().nest("/pm", Router::new().route("/api/tenants/", get(tenants)));
    let addr = spawn(app).await;

    // With and without the trailing slash
    for base in [format!("http://{}/pm", addr), format!("http://{}/pm/", addr)] {
        let result = client(base).list_tenants().await.unwrap();
        assert_eq!(result.len(), 2);
    }
}

#[tokio::test]
async fn test_unreachable_server_is_transport_error() {
    // Bind then drop to get a port nothing listens on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client(format!("http://{}", addr)).list_tenants().await.unwrap_err();

    assert!(matches!(err, ApiError::Transport { .. }));
}

#[tokio::test]
async fn test_slow_server_is_timeout_error() {
    let app = Router::new().route(
        "/api/tenants/",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(3)).await;
            Json(json!([]))
        }),
    );
    let addr = spawn(app).await;

    let err = client_with_timeout(format!("http://{}", addr), 1)
        .list_tenants()
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Timeout { .. }), "got {:?}", err);
    assert!(err.to_string().contains("timed out"));
}
