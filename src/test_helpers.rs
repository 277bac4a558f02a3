/// Shared helpers for driving the router in tests.
///
/// Experiments are created through the API exactly as a client would, so
/// the helpers double as a smoke test of the request/response shapes.
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;

/// Extract response body as JSON for testing
pub async fn extract_response_body(response: axum::response::Response) -> (StatusCode, Value) {
    use axum::body::to_bytes;

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read response body");
    let body: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

/// Send a request with an optional JSON body and decode the response
pub async fn send_json(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(payload) => builder
            .header("content-type", "application/json")
            .body(Body::from(payload.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    extract_response_body(response).await
}

/// Create a test experiment with default parameters
pub async fn create_test_experiment(app: &Router) -> Result<(i64, Value), String> {
    create_test_experiment_with_params(app, "Test Experiment", "cardboard", "2024-01-01").await
}

/// Create a test experiment with customizable parameters
pub async fn create_test_experiment_with_params(
    app: &Router,
    name: &str,
    substrate_type: &str,
    inoculation_date: &str,
) -> Result<(i64, Value), String> {
    create_test_experiment_from(
        app,
        json!({
            "name": name,
            "substrate_type": substrate_type,
            "inoculation_date": inoculation_date,
            "substrate_weight_kg": 1.0,
            "container_type": "bag"
        }),
    )
    .await
}

/// Create a test experiment from a raw JSON body
pub async fn create_test_experiment_from(
    app: &Router,
    experiment_data: Value,
) -> Result<(i64, Value), String> {
    let (status, body) = send_json(app, "POST", "/api/experiments", Some(experiment_data)).await;

    if status == StatusCode::CREATED {
        let experiment_id = body["id"].as_i64().unwrap();
        Ok((experiment_id, body))
    } else {
        Err(format!("Failed to create experiment: Status {status}, Body: {body}"))
    }
}

/// Record a harvest for an experiment
pub async fn create_test_harvest(
    app: &Router,
    experiment_id: i64,
    harvest_date: &str,
    fresh_weight_grams: f64,
) -> Result<(i64, Value), String> {
    let harvest_data = json!({
        "experiment_id": experiment_id,
        "harvest_date": harvest_date,
        "fresh_weight_grams": fresh_weight_grams
    });

    let (status, body) = send_json(app, "POST", "/api/harvests", Some(harvest_data)).await;

    if status == StatusCode::CREATED {
        let harvest_id = body["id"].as_i64().unwrap();
        Ok((harvest_id, body))
    } else {
        Err(format!("Failed to create harvest: Status {status}, Body: {body}"))
    }
}
