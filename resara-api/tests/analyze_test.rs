use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use resara_api::{app, state::AppState};
use resara_config::PricingConfig;
use resara_pricing::{HeuristicModel, Optimizer};
use std::sync::Arc;
use tower::ServiceExt;

fn test_app() -> axum::Router {
    let optimizer = Arc::new(Optimizer::new(PricingConfig::default(), Arc::new(HeuristicModel)));
    app(AppState { optimizer })
}

fn analyze_request(data_type: &str, csv_data: &str) -> Request<Body> {
    let body = serde_json::json!({
        "data_type": data_type,
        "csv_data": csv_data,
    });
    Request::builder()
        .method("POST")
        .uri("/api/analyze")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("valid request")
}

async fn response_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}

const INVENTORY_CSV: &str = "\
gift_card_id,gift_card_type,face_value,current_price,days_in_inventory,is_digital,brand_popularity
GC-INV-1,Amazon,100,95.00,12,1,85
GC-INV-2,Target,50,45.00,40,0,70
";

#[tokio::test]
async fn test_unknown_data_type_rejected_before_processing() {
    let response = test_app()
        .oneshot(analyze_request("telemetry", INVENTORY_CSV))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert_eq!(body["error"], "unknown data type: telemetry");
}

#[tokio::test]
async fn test_inventory_analysis_returns_priced_rows() {
    let response = test_app()
        .oneshot(analyze_request("inventory", INVENTORY_CSV))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["data_type"], "inventory");

    let results = body["results"].as_array().expect("results array");
    assert_eq!(results.len(), 2);

    let first = &results[0];
    assert_eq!(first["record_id"], "GC-INV-1");
    assert_eq!(first["brand"], "Amazon");
    assert_eq!(first["status"], "OK");
    assert!(first["recommended_price"].is_string() || first["recommended_price"].is_number());
    assert_eq!(first["breakdown"]["baseline_source"], "heuristic:brand-base");
    assert!(first["breakdown"]["inventory_age"].is_number());
}

#[tokio::test]
async fn test_malformed_row_is_isolated() {
    let csv = "\
gift_card_id,gift_card_type,face_value,current_price,days_in_inventory,is_digital,brand_popularity
GC-INV-1,Amazon,100,95.00,12,1,85
GC-INV-2,Target,,45.00,40,0,70
";
    let response = test_app()
        .oneshot(analyze_request("inventory", csv))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    let results = body["results"].as_array().expect("results array");
    assert_eq!(results.len(), 2);

    assert_eq!(results[0]["status"], "OK");
    assert_eq!(results[1]["status"], "ERRORED");
    assert_eq!(results[1]["reason"], "missing required field: face_value");
    assert!(results[1]["recommended_price"].is_null());
}

#[tokio::test]
async fn test_missing_required_column_is_a_client_error() {
    let csv = "brand,current_price\nAmazon,95.00\n";
    let response = test_app()
        .oneshot(analyze_request("inventory", csv))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert_eq!(
        body["error"],
        "inventory payload missing required column: face_value"
    );
}

#[tokio::test]
async fn test_competitor_analysis_undercuts_lowest_quote() {
    let csv = "\
brand,face_value,competitor1_price,competitor2_price,competitor3_price
Amazon,100,94.50,90.00,96.00
";
    let response = test_app()
        .oneshot(analyze_request("competitor", csv))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    let first = &body["results"][0];
    assert_eq!(first["status"], "OK");
    assert_eq!(first["breakdown"]["competitor_override"], true);

    // 90.00 undercut by the default 1% margin
    let price: f64 = first["recommended_price"]
        .as_str()
        .map(|s| s.parse().expect("decimal string"))
        .or_else(|| first["recommended_price"].as_f64())
        .expect("priced row");
    assert!((price - 89.10).abs() < 1e-9, "got {price}");
}
