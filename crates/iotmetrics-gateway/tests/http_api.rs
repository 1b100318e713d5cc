//! In-process HTTP tests for the metric API and exposition endpoint.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use iotmetrics_gateway::{app_state::AppState, config, router::build_router};

fn app() -> Router {
    let cfg = config::load_from_str(
        r#"
version: 1
metrics:
  histogram_boundaries: [0, 5, 10]
"#,
    )
    .unwrap();
    build_router(AppState::new(cfg).unwrap())
}

async fn post(app: &Router, body: &str) -> (StatusCode, Value) {
    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/metrics")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn get_text(app: &Router, uri: &str) -> (StatusCode, String, String) {
    let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let ctype = resp
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string())
        .unwrap_or_default();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, ctype, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn get_json(app: &Router, uri: &str) -> Value {
    let (status, _, body) = get_text(app, uri).await;
    assert_eq!(status, StatusCode::OK);
    serde_json::from_str(&body).unwrap()
}

#[tokio::test]
async fn submit_echoes_submission() {
    let app = app();
    let (status, body) = post(
        &app,
        r#"{"metric_name":"queue_length","instrument_type":"updowncounter","value":5,"unit":"items","attributes":{"queue":"processing"}}"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["metric_name"], json!("queue_length"));
    assert_eq!(body["data"]["instrument_type"], json!("updowncounter"));
    assert_eq!(body["data"]["value"], json!(5.0));
    assert_eq!(body["data"]["unit"], json!("items"));
    assert_eq!(body["data"]["attributes"], json!({"queue": "processing"}));
    assert!(body["data"]["timestamp"].as_u64().unwrap() > 0);
}

#[tokio::test]
async fn counters_accumulate_in_exposition() {
    let app = app();
    for v in [1, 2] {
        let (status, _) = post(
            &app,
            &format!(
                r#"{{"metric_name":"http_requests_total","instrument_type":"counter","value":{v},"description":"Total requests","attributes":{{"method":"GET"}}}}"#
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, ctype, text) = get_text(&app, "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ctype, "text/plain; version=0.0.4; charset=utf-8");
    assert!(text.starts_with("# OpenTelemetry IoT Metrics API - Custom Export\n"));
    assert!(text.contains("# HELP http_requests_total Total requests\n"));
    assert!(text.contains("# TYPE http_requests_total counter\n"));
    assert!(text.contains("http_requests_total{method=\"GET\"} 3\n"));
}

#[tokio::test]
async fn histogram_exposition_uses_configured_boundaries() {
    let app = app();
    for v in [2, 7, 2] {
        let (status, _) = post(
            &app,
            &format!(r#"{{"metric_name":"rt","instrument_type":"histogram","value":{v}}}"#),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, _, text) = get_text(&app, "/metrics").await;
    for line in [
        "rt_bucket{le=\"0\"} 0",
        "rt_bucket{le=\"5\"} 2",
        "rt_bucket{le=\"10\"} 3",
        "rt_bucket{le=\"+Inf\"} 3",
        "rt_count 3",
        "rt_sum 11",
    ] {
        assert!(text.lines().any(|l| l == line), "missing {line} in\n{text}");
    }
}

#[tokio::test]
async fn negative_counter_is_rejected_without_mutation() {
    let app = app();
    let (status, body) = post(
        &app,
        r#"{"metric_name":"c","instrument_type":"counter","value":-1}"#,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["code"], json!(400));
    assert!(body["error"].as_str().unwrap().contains("non-negative"));
    assert!(body["timestamp"].is_u64());

    let list = get_json(&app, "/api/metrics/list").await;
    assert_eq!(list["total_instruments"], json!(0));
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let app = app();
    let (status, body) = post(&app, "{not json").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid JSON"));
}

#[tokio::test]
async fn missing_field_is_bad_request() {
    let app = app();
    let (status, body) = post(&app, r#"{"metric_name":"m","value":1}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("missing required field: instrument_type"));
}

#[tokio::test]
async fn kind_mismatch_is_bad_request_and_keeps_original() {
    let app = app();
    let (status, _) = post(
        &app,
        r#"{"metric_name":"jobs","instrument_type":"counter","value":4}"#,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = post(
        &app,
        r#"{"metric_name":"jobs","instrument_type":"gauge","value":1}"#,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], json!(400));

    let list = get_json(&app, "/api/metrics/list").await;
    assert_eq!(list["instruments"]["jobs"]["instrument_type"], json!("counter"));
    assert_eq!(list["instruments"]["jobs"]["value"], json!(4.0));

    let (_, _, text) = get_text(&app, "/metrics").await;
    assert!(text.contains("# TYPE jobs counter\njobs 4\n"));
}

#[tokio::test]
async fn sanitized_name_collisions_are_bad_requests() {
    let app = app();
    for body in [
        r#"{"metric_name":"m.x","instrument_type":"gauge","value":1}"#,
        r#"{"metric_name":"c","instrument_type":"counter","value":1,"attributes":{"dev.id":"7"}}"#,
    ] {
        let (status, _) = post(&app, body).await;
        assert_eq!(status, StatusCode::OK);
    }

    for body in [
        r#"{"metric_name":"m_x","instrument_type":"counter","value":1}"#,
        r#"{"metric_name":"c","instrument_type":"counter","value":2,"attributes":{"dev_id":"7"}}"#,
        r#"{"metric_name":"g","instrument_type":"gauge","value":1,"attributes":{"a-b":"1","a_b":"2"}}"#,
        r#"{"metric_name":"h","instrument_type":"histogram","value":1,"attributes":{"le":"x"}}"#,
    ] {
        let (status, resp) = post(&app, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(resp["success"], json!(false));
    }

    let (_, _, text) = get_text(&app, "/metrics").await;
    assert_eq!(text.matches("# TYPE m_x").count(), 1);
    assert!(text.contains("# TYPE c counter\nc{dev_id=\"7\"} 1\n\n"));
    assert!(!text.contains("# TYPE g "));
    assert!(!text.contains("# TYPE h "));
}

#[tokio::test]
async fn status_counts_instruments() {
    let app = app();
    for body in [
        r#"{"metric_name":"a","instrument_type":"counter","value":1}"#,
        r#"{"metric_name":"b","instrument_type":"gauge","value":1}"#,
        r#"{"metric_name":"c","instrument_type":"gauge","value":1}"#,
    ] {
        assert_eq!(post(&app, body).await.0, StatusCode::OK);
    }
    let status = get_json(&app, "/api/status").await;
    assert_eq!(status["status"], json!("running"));
    assert_eq!(
        status["registered_instruments"],
        json!({"counters": 1, "updowncounters": 0, "histograms": 0, "gauges": 2})
    );
}

#[tokio::test]
async fn health_and_info() {
    let app = app();
    let health = get_json(&app, "/health").await;
    assert_eq!(health["status"], json!("healthy"));
    assert_eq!(
        health["supported_instruments"],
        json!(["counter", "updowncounter", "histogram", "gauge"])
    );

    let info = get_json(&app, "/metrics/info").await;
    assert_eq!(info["metrics_url"], json!("http://0.0.0.0:8080/metrics"));
}

#[tokio::test]
async fn cors_headers_and_preflight() {
    let app = app();
    let req = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/metrics")
        .body(Body::empty())
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert_eq!(
        resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "*"
    );
    assert_eq!(
        resp.headers().get(header::ACCESS_CONTROL_ALLOW_METHODS).unwrap(),
        "GET, POST, PUT, DELETE, OPTIONS"
    );

    let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(
        resp.headers().get(header::ACCESS_CONTROL_ALLOW_HEADERS).unwrap(),
        "Content-Type, Authorization"
    );
}
