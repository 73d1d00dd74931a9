//! AWS Lambda handler for savings projections
//!
//! Accepts a list of accounts via JSON and returns each account's projection
//! series and goal outcome, plus portfolio totals. Accounts must pass the same
//! form rules as the account editor before they are projected.
//!
//! Supports Lambda Function URLs for direct HTTP access.

use chrono::{DateTime, Utc};
use lambda_http::{run, service_fn, Body, Request, Response};
use lambda_runtime::Error;
use serde::{Deserialize, Serialize};

use savings_projection::account::{validate_account, AccountRecord};
use savings_projection::format::projection_summary;
use savings_projection::portfolio::{AccountProjection, ComparisonRow, TimelineRow};
use savings_projection::projection::DEFAULT_PROJECTION_MONTHS;
use savings_projection::settings::MAX_DEFAULT_PROJECTION_MONTHS;
use savings_projection::{Account, PortfolioRunner, ProjectionConfig, ProjectionEngine};

/// Input for a projection request
#[derive(Debug, Deserialize)]
pub struct ProjectionRequest {
    /// Accounts to project; `created_at` defaults to the reference time
    pub accounts: Vec<AccountRecord>,

    /// Months to project (default: 36)
    #[serde(default = "default_projection_months")]
    pub projection_months: u32,

    /// Reference time for the projection (default: now)
    #[serde(default)]
    pub reference_time: Option<DateTime<Utc>>,

    /// Display currency for the narrative summaries
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_projection_months() -> u32 { DEFAULT_PROJECTION_MONTHS }
fn default_currency() -> String { "USD".to_string() }

#[derive(Debug, Serialize)]
pub struct AccountResponse {
    #[serde(flatten)]
    pub projection: AccountProjection,
    pub summary: String,
}

/// Output from the projection
#[derive(Debug, Serialize)]
pub struct ProjectionResponse {
    pub projection_months: u32,
    pub reference_time: DateTime<Utc>,
    pub accounts: Vec<AccountResponse>,
    pub total_value: f64,
    pub total_contributions: f64,
    pub total_interest: f64,
    pub comparison: Vec<ComparisonRow>,
    pub timeline: Vec<TimelineRow>,
    pub execution_time_ms: u64,
}

fn cors(builder: lambda_http::http::response::Builder) -> lambda_http::http::response::Builder {
    builder
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Methods", "POST, OPTIONS")
        .header("Access-Control-Allow-Headers", "Content-Type")
}

fn error_response(status: u16, message: &str) -> Result<Response<Body>, Error> {
    let body = serde_json::json!({ "error": message }).to_string();
    Ok(cors(Response::builder())
        .status(status)
        .header("Content-Type", "application/json")
        .body(Body::Text(body))?)
}

fn json_response(body: &ProjectionResponse) -> Result<Response<Body>, Error> {
    Ok(cors(Response::builder())
        .status(200)
        .header("Content-Type", "application/json")
        .body(Body::Text(serde_json::to_string(body)?))?)
}

/// Turn request records into accounts, applying the account form rules
fn build_accounts(records: Vec<AccountRecord>, reference_time: DateTime<Utc>) -> Result<Vec<Account>, String> {
    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            let name = record.name.clone();
            let account = Account::from_record(record, reference_time)
                .map_err(|e| format!("Invalid account {} ({:?}): {}", index, name, e))?;
            validate_account(&account, reference_time)
                .map_err(|e| format!("Invalid account {} ({:?}): {}", index, name, e))?;
            Ok(account)
        })
        .collect()
}

/// Lambda handler function
async fn handler(event: Request) -> Result<Response<Body>, Error> {
    let start = std::time::Instant::now();

    // Handle CORS preflight
    if event.method().as_str() == "OPTIONS" {
        return Ok(cors(Response::builder()).status(200).body(Body::Empty)?);
    }

    let body_str = match event.body() {
        Body::Text(s) => s.clone(),
        Body::Binary(b) => String::from_utf8_lossy(b).to_string(),
        Body::Empty => "{}".to_string(),
    };

    let request: ProjectionRequest = match serde_json::from_str(&body_str) {
        Ok(r) => r,
        Err(e) => return error_response(400, &format!("Invalid request: {}", e)),
    };

    if request.projection_months > MAX_DEFAULT_PROJECTION_MONTHS {
        return error_response(
            400,
            &format!("projection_months cannot exceed {}", MAX_DEFAULT_PROJECTION_MONTHS),
        );
    }

    let reference_time = request.reference_time.unwrap_or_else(Utc::now);
    let accounts = match build_accounts(request.accounts, reference_time) {
        Ok(accounts) => accounts,
        Err(message) => return error_response(400, &message),
    };

    let engine = ProjectionEngine::new(ProjectionConfig {
        default_projection_months: request.projection_months,
        reference_time,
    });
    let runner = PortfolioRunner::new(engine);

    let projections = runner.run(&accounts, request.projection_months);
    let portfolio = savings_projection::portfolio::summarize(
        &accounts,
        &projections,
        request.projection_months,
        reference_time,
    );

    let accounts = projections
        .into_iter()
        .map(|projection| {
            let summary = projection_summary(&projection.series, &projection.goal, &request.currency);
            AccountResponse { projection, summary }
        })
        .collect();

    let response = ProjectionResponse {
        projection_months: request.projection_months,
        reference_time,
        accounts,
        total_value: portfolio.total_value,
        total_contributions: portfolio.total_contributions,
        total_interest: portfolio.total_interest,
        comparison: portfolio.accounts,
        timeline: portfolio.timeline,
        execution_time_ms: start.elapsed().as_millis() as u64,
    };

    json_response(&response)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    run(service_fn(handler)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use lambda_http::http;

    fn post(body: &str) -> Request {
        http::Request::builder()
            .method("POST")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn body_json(response: &Response<Body>) -> serde_json::Value {
        match response.body() {
            Body::Text(text) => serde_json::from_str(text).unwrap(),
            other => panic!("expected text body, got {:?}", other),
        }
    }

    const REFERENCE: &str = r#""reference_time":"2025-01-01T00:00:00Z""#;

    #[tokio::test]
    async fn test_preflight() {
        let request = http::Request::builder().method("OPTIONS").body(Body::Empty).unwrap();
        let response = handler(request).await.unwrap();

        assert_eq!(response.status().as_u16(), 200);
        assert_eq!(response.headers()["Access-Control-Allow-Origin"], "*");
    }

    #[tokio::test]
    async fn test_bad_json() {
        let response = handler(post("{not json")).await.unwrap();
        assert_eq!(response.status().as_u16(), 400);
        assert!(body_json(&response)["error"].as_str().unwrap().starts_with("Invalid request"));
    }

    #[tokio::test]
    async fn test_months_limit() {
        let body = format!(r#"{{"accounts":[],"projection_months":601,{}}}"#, REFERENCE);
        let response = handler(post(&body)).await.unwrap();
        assert_eq!(response.status().as_u16(), 400);
    }

    #[tokio::test]
    async fn test_far_target_date_rejected() {
        let body = format!(
            r#"{{"accounts":[{{"name":"Forever","starting_balance":100,"interest_rate":0.05,
                "goal":{{"type":"target_date","value":"+200000-01-01"}}}}],{}}}"#,
            REFERENCE
        );
        let response = handler(post(&body)).await.unwrap();

        assert_eq!(response.status().as_u16(), 400);
        let error = body_json(&response)["error"].as_str().unwrap().to_string();
        assert!(error.contains("Forever") && error.contains("50 years"), "{}", error);
    }

    #[tokio::test]
    async fn test_form_rules_apply() {
        let body = format!(
            r#"{{"accounts":[{{"name":"Risky","starting_balance":100,"interest_rate":0.8}}],{}}}"#,
            REFERENCE
        );
        let response = handler(post(&body)).await.unwrap();
        assert_eq!(response.status().as_u16(), 400);
    }

    #[tokio::test]
    async fn test_projects_valid_accounts() {
        let body = format!(
            r#"{{"accounts":[
                {{"name":"Trip","starting_balance":1000,"interest_rate":0.05,"monthly_contribution":100,
                  "goal":{{"type":"target_date","value":"2027-01-01"}}}},
                {{"name":"House","starting_balance":5000,"interest_rate":0.04,
                  "goal":{{"type":"target_amount","value":20000}}}}
            ],"projection_months":12,{}}}"#,
            REFERENCE
        );
        let response = handler(post(&body)).await.unwrap();
        assert_eq!(response.status().as_u16(), 200);

        let json = body_json(&response);
        let accounts = json["accounts"].as_array().unwrap();
        assert_eq!(accounts.len(), 2);
        assert_eq!(accounts[0]["series"]["points"].as_array().unwrap().len(), 13);
        assert!(accounts[0]["goal"]["final_amount"].as_f64().unwrap().is_finite());
        assert_eq!(accounts[1]["goal"]["achievable"], true);
        assert!(json["total_value"].as_f64().unwrap() > 6_000.0);
    }
}
