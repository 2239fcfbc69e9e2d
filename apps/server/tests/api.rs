use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use fxlens_rates::MockTransport;
use fxlens_server::{api::app_router, build_state_with, config::Config};
use serde_json::{json, Value};
use tempfile::{tempdir, TempDir};
use tower::ServiceExt;

const USD_URL: &str = "https://open.er-api.com/v6/latest/USD";

struct TestApp {
    router: Router,
    transport: Arc<MockTransport>,
    _dir: TempDir,
}

async fn build_test_app() -> TestApp {
    let dir = tempdir().unwrap();
    let config = Config {
        listen_addr: "127.0.0.1:0".parse().unwrap(),
        db_path: dir.path().join("test.db").to_string_lossy().to_string(),
        cors_allow: vec!["*".to_string()],
        request_timeout: Duration::from_secs(30),
        provider_timeout: Duration::from_secs(5),
    };
    let transport = Arc::new(MockTransport::new());
    transport.respond(
        USD_URL,
        json!({ "result": "success", "rates": { "USD": 1, "EUR": 0.92, "JPY": 150 } }),
    );
    let state = build_state_with(&config, transport.clone()).await.unwrap();
    TestApp {
        router: app_router(state, &config),
        transport,
        _dir: dir,
    }
}

async fn send(app: &TestApp, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };
    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn health_reports_ok() {
    let app = build_test_app().await;
    let (status, body) = send(&app, Method::GET, "/api/v1/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["cachedRateTables"], 0);
}

#[tokio::test]
async fn settings_round_trip_and_validation() {
    let app = build_test_app().await;

    let (status, body) = send(&app, Method::GET, "/api/v1/settings", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["mode"], "auto");
    assert_eq!(body["targetCurrency"], "USD");

    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/v1/settings",
        Some(json!({ "targetCurrency": "eur", "decimalPlaces": 3 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["targetCurrency"], "EUR");
    assert_eq!(body["decimalPlaces"], 3);

    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/v1/settings",
        Some(json!({ "decimalPlaces": 20 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = send(&app, Method::GET, "/api/v1/settings", None).await;
    assert_eq!(body["decimalPlaces"], 3);
}

#[tokio::test]
async fn rates_are_cached_and_unavailable_is_503() {
    let app = build_test_app().await;

    let (status, body) = send(&app, Method::GET, "/api/v1/rates/usd", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["baseCurrency"], "USD");
    assert_eq!(body["rates"]["EUR"], 0.92);

    send(&app, Method::GET, "/api/v1/rates/USD", None).await;
    assert_eq!(app.transport.calls(), 1);

    send(&app, Method::GET, "/api/v1/rates/USD?force=true", None).await;
    assert_eq!(app.transport.calls(), 2);

    let (status, _) = send(&app, Method::GET, "/api/v1/rates/XYZ", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let (status, _) = send(&app, Method::GET, "/api/v1/rates/US", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, summary) = send(&app, Method::GET, "/api/v1/rates/cache", None).await;
    assert_eq!(summary["cachedCount"], 1);

    let (status, _) = send(&app, Method::DELETE, "/api/v1/rates/cache", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, summary) = send(&app, Method::GET, "/api/v1/rates/cache", None).await;
    assert_eq!(summary["cachedCount"], 0);
}

#[tokio::test]
async fn convert_single_and_batch() {
    let app = build_test_app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/convert",
        Some(json!({ "amount": 100, "from": "USD", "to": "EUR" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["targetAmount"].as_f64(), Some(92.0));

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/convert",
        Some(json!({ "amount": 100, "from": "GBP", "to": "EUR" })),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/convert",
        Some(json!({ "amount": -1, "from": "USD", "to": "EUR" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    send(
        &app,
        Method::PUT,
        "/api/v1/settings",
        Some(json!({ "targetCurrency": "JPY", "decimalPlaces": 0 })),
    )
    .await;
    let (status, rows) = send(
        &app,
        Method::POST,
        "/api/v1/convert/batch",
        Some(json!({ "input": "$10\n\nno number\n$2.50" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let converted: Vec<&str> = rows
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["converted"].as_str().unwrap())
        .collect();
    assert_eq!(converted, vec!["¥ 1,500", "¥ 375"]);
}

#[tokio::test]
async fn annotate_and_extract() {
    let app = build_test_app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/annotate",
        Some(json!({
            "html": "<p>Only $10 today</p>",
            "settings": { "targetCurrency": "EUR" }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let html = body["html"].as_str().unwrap();
    assert!(html.contains(r#"<span class="currency-conversion-inline""#));
    assert!(html.contains(" (€9.20)</span> today</p>"));
    assert_eq!(body["report"]["annotationsInserted"], 1);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/extract",
        Some(json!({ "text": "USD 5 and 7€ or 12.50", "impliedCurrency": "gbp" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let mut codes: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["currencyCode"].as_str().unwrap())
        .collect();
    codes.sort_unstable();
    assert_eq!(codes, vec!["EUR", "GBP", "USD"]);
}
