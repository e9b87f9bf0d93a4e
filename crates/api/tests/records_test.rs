//! Router tests for the budget and forecast endpoints over the in-memory store.

use std::str::FromStr;
use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use chrono::{TimeZone, Utc};
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use planbook_api::{AppState, create_router};
use planbook_core::service::PlanningService;
use planbook_core::store::MemoryStore;
use planbook_core::temporal::{FixedClock, TemporalContext};
use planbook_shared::{JwtConfig, JwtService, PlanningConfig};

struct TestApp {
    router: Router,
    jwt: Arc<JwtService>,
}

impl TestApp {
    fn new() -> Self {
        let config = PlanningConfig::default();
        let clock = FixedClock(Utc.with_ymd_and_hms(2025, 6, 15, 9, 0, 0).unwrap());
        let planning = PlanningService::new(
            Arc::new(MemoryStore::new()),
            TemporalContext::from_config(Arc::new(clock), &config),
            config,
        );
        let jwt = Arc::new(JwtService::new(JwtConfig {
            secret: "router-test-secret".to_string(),
            access_token_expires_minutes: 15,
        }));
        let router = create_router(AppState {
            planning: Arc::new(planning),
            jwt_service: Arc::clone(&jwt),
        });
        Self { router, jwt }
    }

    fn token(&self, role: &str, department: Option<&str>) -> String {
        self.jwt
            .generate_access_token(Uuid::now_v7(), role, department)
            .unwrap()
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn create(&self, token: &str, kind: &str, body: Value) -> Value {
        let (status, record) = self
            .send(Method::POST, &format!("/api/v1/{kind}"), Some(token), Some(body))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{record}");
        record
    }
}

fn line(customer: &str) -> Value {
    json!({
        "customer": customer,
        "item": "Widget",
        "category": "Hardware",
        "brand": "Contoso"
    })
}

fn decimal(value: &Value) -> Decimal {
    Decimal::from_str(value.as_str().expect("decimal as string")).unwrap()
}

#[tokio::test]
async fn test_health_is_public() {
    let app = TestApp::new();
    let (status, body) = app.send(Method::GET, "/api/v1/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["planning_year"], 2025);
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let app = TestApp::new();
    let (status, body) = app.send(Method::GET, "/api/v1/budgets", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "UNAUTHORIZED");

    let (status, _) = app
        .send(Method::GET, "/api/v1/budgets", Some("not-a-jwt"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_budget_serializes_record() {
    let app = TestApp::new();
    let token = app.token("salesman", Some("Sales"));

    let mut body = line("Acme");
    body["yearly_values"] = json!({ "2025": { "budget": 1000 } });
    body["monthly_values"] = json!({ "2025": { "0": "80.5" } });
    let record = app.create(&token, "budgets", body).await;

    assert_eq!(record["kind"], "budget");
    assert_eq!(record["status"], "draft");
    assert_eq!(record["current_year"], 2025);
    assert_eq!(record["target_year"], 2026);
    assert_eq!(decimal(&record["current_year_amount"]), dec!(1000));
    assert_eq!(decimal(&record["yearly_values"]["2025"]["budget"]), dec!(1000));
    assert_eq!(decimal(&record["monthly_values"]["2025"]["0"]), dec!(80.5));
    assert!(record["created_at"].as_str().unwrap().starts_with("2025-06-15T09:00:00"));
}

#[tokio::test]
async fn test_unknown_payload_field_is_validation_error() {
    let app = TestApp::new();
    let token = app.token("salesman", None);

    let mut body = line("Acme");
    body["status"] = json!("approved");
    let (status, error) = app
        .send(Method::POST, "/api/v1/budgets", Some(&token), Some(body))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_invalid_amount_is_rejected() {
    let app = TestApp::new();
    let token = app.token("salesman", None);

    let mut body = line("Acme");
    body["current_year_amount"] = json!("-5");
    let (status, error) = app
        .send(Method::POST, "/api/v1/budgets", Some(&token), Some(body))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"], "INVALID_AMOUNT");
}

#[tokio::test]
async fn test_duplicate_create_is_conflict() {
    let app = TestApp::new();
    let token = app.token("salesman", None);
    app.create(&token, "budgets", line("Acme")).await;

    let (status, error) = app
        .send(Method::POST, "/api/v1/budgets", Some(&token), Some(line("Acme")))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error["error"], "DUPLICATE_RECORD");
}

#[tokio::test]
async fn test_supply_chain_cannot_create() {
    let app = TestApp::new();
    let token = app.token("supply_chain", Some("Sales"));
    let (status, error) = app
        .send(Method::POST, "/api/v1/forecasts", Some(&token), Some(line("Acme")))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error["error"], "PERMISSION_DENIED");
}

#[tokio::test]
async fn test_other_users_record_is_not_found() {
    let app = TestApp::new();
    let owner = app.token("salesman", Some("Sales"));
    let other = app.token("salesman", Some("Sales"));
    let record = app.create(&owner, "budgets", line("Acme")).await;
    let uri = format!("/api/v1/budgets/{}", record["id"].as_str().unwrap());

    let (status, error) = app.send(Method::GET, &uri, Some(&other), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error["error"], "NOT_FOUND");

    let (status, _) = app.send(Method::GET, &uri, Some(&owner), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_budget_is_not_served_as_forecast() {
    let app = TestApp::new();
    let token = app.token("admin", None);
    let record = app.create(&token, "budgets", line("Acme")).await;
    let uri = format!("/api/v1/forecasts/{}", record["id"].as_str().unwrap());

    let (status, _) = app.send(Method::GET, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_submitted_record_is_locked_for_salesman() {
    let app = TestApp::new();
    let token = app.token("salesman", Some("Sales"));
    let record = app.create(&token, "budgets", line("Acme")).await;
    let uri = format!("/api/v1/budgets/{}", record["id"].as_str().unwrap());

    let (status, submitted) = app
        .send(
            Method::POST,
            &format!("{uri}/status"),
            Some(&token),
            Some(json!({ "status": "submitted" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(submitted["status"], "submitted");
    assert!(submitted["submitted_at"].is_string());

    let (status, error) = app
        .send(
            Method::PATCH,
            &uri,
            Some(&token),
            Some(json!({ "current_year_amount": 10 })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error["error"], "PERMISSION_DENIED");
}

#[tokio::test]
async fn test_invalid_transition() {
    let app = TestApp::new();
    let token = app.token("manager", Some("Sales"));
    let record = app.create(&token, "forecasts", line("Acme")).await;
    let uri = format!("/api/v1/forecasts/{}/status", record["id"].as_str().unwrap());

    let (status, error) = app
        .send(Method::POST, &uri, Some(&token), Some(json!({ "status": "approved" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"], "INVALID_TRANSITION");

    let (status, error) = app
        .send(Method::POST, &uri, Some(&token), Some(json!({ "status": "archived" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_manager_approves_and_scores_forecast() {
    let app = TestApp::new();
    let salesman = app.token("salesman", Some("Sales"));
    let manager = app.token("manager", Some("Sales"));

    let mut body = line("Acme");
    body["current_year_amount"] = json!(200);
    let record = app.create(&salesman, "forecasts", body).await;
    let uri = format!("/api/v1/forecasts/{}", record["id"].as_str().unwrap());

    let (status, _) = app
        .send(
            Method::POST,
            &format!("{uri}/status"),
            Some(&salesman),
            Some(json!({ "status": "pending" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, approved) = app
        .send(
            Method::POST,
            &format!("{uri}/status"),
            Some(&manager),
            Some(json!({ "status": "approved" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(approved["status"], "approved");
    assert!(approved["approved_by"].is_string());

    let (status, scored) = app
        .send(
            Method::POST,
            &format!("{uri}/actual"),
            Some(&manager),
            Some(json!({ "amount": "180" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(decimal(&scored["accuracy_score"]), dec!(90));
    assert_eq!(scored["confidence_level"], "high");
    assert_eq!(decimal(&scored["yearly_values"]["2025"]["actual"]), dec!(180));

    let (status, error) = app.send(Method::DELETE, &uri, Some(&salesman), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error["error"], "PERMISSION_DENIED");
}

#[tokio::test]
async fn test_set_month_bounds() {
    let app = TestApp::new();
    let token = app.token("salesman", None);
    let record = app.create(&token, "budgets", line("Acme")).await;
    let uri = format!("/api/v1/budgets/{}/months/2025", record["id"].as_str().unwrap());

    let (status, updated) = app
        .send(
            Method::PUT,
            &format!("{uri}/11"),
            Some(&token),
            Some(json!({ "amount": 42 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(decimal(&updated["monthly_values"]["2025"]["11"]), dec!(42));

    let (status, error) = app
        .send(
            Method::PUT,
            &format!("{uri}/12"),
            Some(&token),
            Some(json!({ "amount": 42 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_delete_draft() {
    let app = TestApp::new();
    let token = app.token("salesman", None);
    let record = app.create(&token, "budgets", line("Acme")).await;
    let uri = format!("/api/v1/budgets/{}", record["id"].as_str().unwrap());

    let (status, body) = app.send(Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, _) = app.send(Method::GET, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_pages_and_filters() {
    let app = TestApp::new();
    let token = app.token("salesman", None);
    for customer in ["Acme Corp", "Acme Labs", "Globex"] {
        app.create(&token, "budgets", line(customer)).await;
    }

    let (status, page) = app
        .send(Method::GET, "/api/v1/budgets?per_page=2", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["data"].as_array().unwrap().len(), 2);
    assert_eq!(page["meta"]["total"], 3);
    assert_eq!(page["meta"]["has_next"], true);

    let (_, page) = app
        .send(
            Method::GET,
            "/api/v1/budgets?customer=acme&status=draft&year=2025",
            Some(&token),
            None,
        )
        .await;
    assert_eq!(page["meta"]["total"], 2);

    let (status, error) = app
        .send(Method::GET, "/api/v1/budgets?status=bogus", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_filter_options() {
    let app = TestApp::new();
    let token = app.token("salesman", None);
    app.create(&token, "forecasts", line("Zeta")).await;
    app.create(&token, "forecasts", line("Acme")).await;

    let (status, options) = app
        .send(Method::GET, "/api/v1/forecasts/filters", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(options["customers"], json!(["Acme", "Zeta"]));
    assert_eq!(options["statuses"], json!(["draft"]));
    assert_eq!(options["available_years"][0], 2021);
}
