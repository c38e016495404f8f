//! AWS Lambda handler for hydrogen project evaluations and sensitivity sweeps
//!
//! Accepts either a direct invocation payload or a Lambda Function URL event
//! whose `body` carries the request JSON. Requests are tagged by `kind`:
//!
//! ```json
//! {"kind": "evaluate", "project": {...}, "incentives": {...}, "selling_price_per_kg": 15.0}
//! {"kind": "sweep", "project": {...}, "sweep": {"target": "lcoh", "axis": "electricity_cost"},
//!  "range": {"start": 20.0, "stop": 100.0, "samples": 9}}
//! ```

use hydrogen_economics::{
    DomainError, EngineConfig, Evaluation, ProjectInputs, Scenario, ScenarioRunner,
    SensitivitySweepRunner, SweepPoint, SweepRange, SweepTarget,
};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Instant;

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum EngineRequest {
    Evaluate(Scenario),
    Sweep(SweepRequest),
}

#[derive(Debug, Deserialize)]
struct SweepRequest {
    /// Base plant (default: reference plant)
    #[serde(default)]
    project: ProjectInputs,

    sweep: SweepTarget,

    range: SweepRange,
}

#[derive(Debug, Serialize)]
struct EvaluateResponse {
    results: Evaluation,
    display: Evaluation,
    execution_time_ms: u64,
}

#[derive(Debug, Serialize)]
struct SweepResponse {
    x_label: &'static str,
    y_label: &'static str,
    samples: usize,
    points: Vec<SweepPoint>,
    execution_time_ms: u64,
}

fn cors_headers() -> Value {
    json!({
        "Content-Type": "application/json",
        "Access-Control-Allow-Origin": "*",
        "Access-Control-Allow-Methods": "POST, OPTIONS",
        "Access-Control-Allow-Headers": "Content-Type",
    })
}

fn http_response(status: u16, body: String) -> Value {
    json!({
        "statusCode": status,
        "headers": cors_headers(),
        "body": body,
        "isBase64Encoded": false,
    })
}

fn error_response(status: u16, message: &str, field: Option<&str>) -> Value {
    let body = match field {
        Some(field) => json!({ "error": message, "field": field }),
        None => json!({ "error": message }),
    };
    http_response(status, body.to_string())
}

fn domain_error_response(e: &DomainError) -> Value {
    log::warn!("Rejected request: {}", e);
    error_response(400, &e.to_string(), Some(e.field()))
}

/// HTTP method of a Function URL (or API Gateway) event, if this is one
fn request_method(payload: &Value) -> Option<&str> {
    payload
        .pointer("/requestContext/http/method")
        .or_else(|| payload.get("httpMethod"))
        .and_then(Value::as_str)
}

/// Extract the request JSON from an HTTP envelope, or take the payload as-is
fn request_body(payload: Value) -> Result<Value, String> {
    let is_envelope = payload.get("requestContext").is_some()
        || payload.get("body").is_some_and(Value::is_string);
    if !is_envelope {
        return Ok(payload);
    }

    if payload.get("isBase64Encoded").and_then(Value::as_bool) == Some(true) {
        return Err("Base64-encoded bodies are not supported".to_string());
    }

    match payload.get("body").and_then(Value::as_str) {
        Some(text) if !text.trim().is_empty() => {
            serde_json::from_str(text).map_err(|e| format!("Invalid JSON: {}", e))
        }
        _ => Ok(json!({})),
    }
}

async fn handler(event: LambdaEvent<Value>) -> Result<Value, Error> {
    let start = Instant::now();
    let payload = event.payload;

    // Handle CORS preflight
    if request_method(&payload) == Some("OPTIONS") {
        return Ok(http_response(200, String::new()));
    }

    let body = match request_body(payload) {
        Ok(body) => body,
        Err(msg) => return Ok(error_response(400, &msg, None)),
    };

    let request: EngineRequest = match serde_json::from_value(body) {
        Ok(r) => r,
        Err(e) => return Ok(error_response(400, &format!("Invalid request: {}", e), None)),
    };

    let config = EngineConfig::from_env();

    match request {
        EngineRequest::Evaluate(scenario) => {
            log::info!("Evaluate request: {}", scenario.name.as_deref().unwrap_or("unnamed"));
            let runner = ScenarioRunner::with_config(config);
            let results = match runner.evaluate(&scenario) {
                Ok(evaluation) => evaluation,
                Err(e) => return Ok(domain_error_response(&e)),
            };
            let response = EvaluateResponse {
                display: results.rounded(runner.config()),
                results,
                execution_time_ms: start.elapsed().as_millis() as u64,
            };
            Ok(http_response(200, serde_json::to_string(&response)?))
        }
        EngineRequest::Sweep(request) => {
            let runner = SensitivitySweepRunner::new(config);
            let sweep = match runner.sweep(&request.project, request.sweep, request.range) {
                Ok(sweep) => sweep,
                Err(e) => return Ok(domain_error_response(&e)),
            };
            let points = match sweep.run() {
                Ok(points) => points,
                Err(e) => return Ok(domain_error_response(&e)),
            };
            let response = SweepResponse {
                x_label: sweep.target().x_label(),
                y_label: sweep.target().y_label(),
                samples: points.len(),
                points,
                execution_time_ms: start.elapsed().as_millis() as u64,
            };
            Ok(http_response(200, serde_json::to_string(&response)?))
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    run(service_fn(handler)).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body_of(response: &Value) -> Value {
        serde_json::from_str(response["body"].as_str().unwrap()).unwrap()
    }

    async fn invoke(payload: Value) -> Value {
        let event = LambdaEvent::new(payload, lambda_runtime::Context::default());
        handler(event).await.unwrap()
    }

    #[tokio::test]
    async fn test_evaluate_direct() {
        let response = invoke(json!({
            "kind": "evaluate",
            "project": ProjectInputs::default(),
        }))
        .await;

        assert_eq!(response["statusCode"], 200);
        let body = body_of(&response);
        assert_eq!(body["display"]["lcoh"]["lcoh_per_kg"], 5.68);
        assert_eq!(body["display"]["incentives"]["total_per_kg"], 4.5);
    }

    #[tokio::test]
    async fn test_function_url_envelope() {
        let request = json!({
            "kind": "sweep",
            "sweep": {"target": "lcoh", "axis": "electricity_cost"},
            "range": {"start": 20.0, "stop": 100.0, "samples": 5},
        });
        let response = invoke(json!({
            "requestContext": {"http": {"method": "POST"}},
            "body": request.to_string(),
            "isBase64Encoded": false,
        }))
        .await;

        assert_eq!(response["statusCode"], 200);
        let body = body_of(&response);
        assert_eq!(body["samples"], 5);
        assert_eq!(body["x_label"], "electricity_cost_per_mwh");
        assert_eq!(body["points"][0]["x"], 20.0);
        assert_eq!(body["points"][4]["x"], 100.0);
    }

    #[tokio::test]
    async fn test_preflight() {
        let response = invoke(json!({
            "requestContext": {"http": {"method": "OPTIONS"}},
        }))
        .await;
        assert_eq!(response["statusCode"], 200);
        assert_eq!(response["headers"]["Access-Control-Allow-Origin"], "*");
    }

    #[tokio::test]
    async fn test_domain_error_names_field() {
        let mut project = ProjectInputs::default();
        project.capacity_factor_pct = 120.0;
        let response = invoke(json!({"kind": "evaluate", "project": project})).await;

        assert_eq!(response["statusCode"], 400);
        assert_eq!(body_of(&response)["field"], "capacity_factor_pct");
    }

    #[tokio::test]
    async fn test_bad_sweep_range() {
        let response = invoke(json!({
            "kind": "sweep",
            "sweep": {"target": "lcoh", "axis": "plant_size"},
            "range": {"start": 10.0, "stop": 10.0, "samples": 3},
        }))
        .await;

        assert_eq!(response["statusCode"], 400);
        assert_eq!(body_of(&response)["field"], "sweep_range");
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let response = invoke(json!({
            "requestContext": {"http": {"method": "POST"}},
            "body": "{not json",
        }))
        .await;
        assert_eq!(response["statusCode"], 400);
        assert!(body_of(&response)["error"].as_str().unwrap().starts_with("Invalid JSON"));
    }
}
