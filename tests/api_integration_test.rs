// API integration tests that drive the Axum router with real HTTP requests

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt; // For `.collect()`
use rain_bulletin_service::api::{create_router, AppState};
use rain_bulletin_service::config::ThresholdDefaults;
use serde_json::{json, Value};
use tower::ServiceExt; // For `oneshot`

use common::{test_service, BOGOR, CIAWI, DRAMAGA};

fn create_test_app() -> Router {
    create_router(AppState {
        report_service: test_service(),
        defaults: ThresholdDefaults::default(),
    })
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

fn march_request() -> Value {
    json!({
        "config": { "year": 2025, "month": 3, "window": "ten-day-first" },
        "sources": [
            {
                "name": "first.csv",
                "rows": [
                    { "station_name": "STAKLIM BOGOR", "timestamp": "2025-03-01", "rainfall": 12.4 },
                    { "station_name": "Pos Hujan Ciawi", "timestamp": "2025-03-01", "rainfall": "8888" },
                    { "station_name": "Pos Hujan Ciawi", "timestamp": "not a date", "rainfall": 1 }
                ]
            },
            {
                "name": "second.csv",
                "rows": [
                    { "station_name": "STAKLIM BOGOR", "timestamp": "2025-03-01", "rainfall": 50 },
                    { "station_name": "Darmaga", "timestamp": "2025-03-10", "rainfall": null }
                ]
            }
        ]
    })
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(json["status"], "healthy");
}

#[tokio::test]
async fn test_stations_endpoint_lists_catalog_order() {
    let app = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/stations")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(json["total_stations"], 3);
    assert_eq!(json["stations"][0]["name"], BOGOR);
    assert_eq!(json["stations"][2]["name"], DRAMAGA);
    assert!(json["stations"][1]["coordinate"].is_null());
}

#[tokio::test]
async fn test_create_report() {
    let app = create_test_app();

    let response = app
        .oneshot(post_json("/api/v1/reports", march_request()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();

    assert_eq!(json["dropped_rows"], 1);
    assert_eq!(json["warnings"].as_array().unwrap().len(), 1);

    let report = &json["report"];
    assert_eq!(report["stations"], json!([BOGOR, CIAWI, DRAMAGA]));
    assert_eq!(report["display"]["rows"].as_array().unwrap().len(), 10);
    // First source wins the duplicate Bogor reading
    assert_eq!(report["display"]["rows"][0]["values"], json!(["12.4", "0", "x"]));
    assert_eq!(report["numeric"]["rows"][0]["values"], json!([12.4, 0.1, null]));
    // Present but unreadable
    assert_eq!(report["display"]["rows"][9]["values"][2], "x");
    assert_eq!(report["dashboard"]["thresholds"]["heavy_mm"], 20.0);
}

#[tokio::test]
async fn test_create_report_month_without_rows() {
    let app = create_test_app();
    let mut request = march_request();
    request["config"]["month"] = json!(4);

    let response = app
        .oneshot(post_json("/api/v1/reports", request))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert!(json["error"].as_str().unwrap().contains("2025-04"));
}

#[tokio::test]
async fn test_create_report_invalid_threshold() {
    let app = create_test_app();
    let mut request = march_request();
    request["config"]["heavy_threshold"] = json!(-1.0);

    let response = app
        .oneshot(post_json("/api/v1/reports", request))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_create_report_table_as_csv() {
    let app = create_test_app();

    let response = app
        .oneshot(post_json(
            "/api/v1/reports/rain_horizontal_display.csv",
            march_request(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/csv; charset=utf-8"
    );
    let body = String::from_utf8(body_bytes(response).await).unwrap();
    let mut lines = body.lines();
    assert_eq!(lines.next(), Some(format!("TGL,{BOGOR},{CIAWI},{DRAMAGA}").as_str()));
    assert_eq!(lines.next(), Some("1,12.4,0,x"));
}

#[tokio::test]
async fn test_create_report_unknown_table() {
    let app = create_test_app();

    let response = app
        .oneshot(post_json("/api/v1/reports/rainfall_totals", march_request()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
