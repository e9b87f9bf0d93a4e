//! Database seeder for Planbook development and testing.
//!
//! Seeds a handful of budgets and forecasts for a fixed sales team and prints
//! bearer tokens for each team member.
//!
//! Usage: cargo run --bin seeder

use std::sync::Arc;

use serde_json::json;
use uuid::Uuid;

use planbook_core::error::PlanningError;
use planbook_core::policy::{Actor, Role};
use planbook_core::record::{ForecastMethod, PlanningRecord, RecordKind};
use planbook_core::service::{CreateRecordInput, PlanningService};
use planbook_core::temporal::TemporalContext;
use planbook_core::workflow::PlanningStatus;
use planbook_db::PlanningRepository;
use planbook_shared::{AppConfig, JwtConfig, JwtService, UserId};

/// Admin user ID (consistent for all seeds)
const ADMIN_ID: &str = "00000000-0000-0000-0000-000000000001";
/// Sales manager user ID
const MANAGER_ID: &str = "00000000-0000-0000-0000-000000000002";
/// Salesman user ID
const SALESMAN_ID: &str = "00000000-0000-0000-0000-000000000003";

const DEPARTMENT: &str = "Sales";

struct Team {
    admin: Actor,
    manager: Actor,
    salesman: Actor,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().expect("Failed to load configuration");

    println!("Connecting to database...");
    let db = planbook_db::connect(&config.database)
        .await
        .expect("Failed to connect to database");

    let temporal = TemporalContext::system(&config.planning);
    let service = PlanningService::new(
        Arc::new(PlanningRepository::new(db)),
        temporal,
        config.planning,
    );
    let team = Team {
        admin: Actor::new(user_id(ADMIN_ID), Role::Admin, None),
        manager: Actor::new(user_id(MANAGER_ID), Role::Manager, Some(DEPARTMENT)),
        salesman: Actor::new(user_id(SALESMAN_ID), Role::Salesman, Some(DEPARTMENT)),
    };

    println!("Seeding budgets...");
    seed_budgets(&service, &team).await;

    println!("Seeding forecasts...");
    seed_forecasts(&service, &team).await;

    println!("Issuing development tokens...");
    print_tokens(&config, &team);

    println!("Seeding complete!");
}

fn user_id(raw: &str) -> UserId {
    UserId::from_uuid(Uuid::parse_str(raw).expect("seed user ids are valid UUIDs"))
}

fn line(customer: &str, item: &str, category: &str, brand: &str) -> CreateRecordInput {
    CreateRecordInput {
        customer: Some(customer.to_string()),
        item: Some(item.to_string()),
        category: Some(category.to_string()),
        brand: Some(brand.to_string()),
        ..CreateRecordInput::default()
    }
}

/// Creates a record, treating an existing one as already seeded.
async fn create(
    service: &PlanningService,
    actor: &Actor,
    kind: RecordKind,
    input: CreateRecordInput,
) -> Option<PlanningRecord> {
    let label = format!(
        "{} / {}",
        input.customer.as_deref().unwrap_or_default(),
        input.item.as_deref().unwrap_or_default()
    );
    match service.create(actor, kind, input).await {
        Ok(record) => {
            println!("  Created {} {label}", kind.as_str());
            Some(record)
        }
        Err(PlanningError::DuplicateRecord) => {
            println!("  {} {label} already exists, skipping...", kind.as_str());
            None
        }
        Err(e) => {
            eprintln!("Failed to create {} {label}: {e}", kind.as_str());
            None
        }
    }
}

/// Walks a record to the given status, submitting first.
async fn advance(
    service: &PlanningService,
    team: &Team,
    record: &PlanningRecord,
    target: PlanningStatus,
) -> Option<PlanningRecord> {
    let submitted = service
        .transition_status(&team.salesman, record.kind(), record.id, PlanningStatus::Submitted)
        .await;
    let result = match (submitted, target) {
        (Ok(record), PlanningStatus::Submitted) => Ok(record),
        (Ok(record), _) => {
            service
                .transition_status(&team.manager, record.kind(), record.id, target)
                .await
        }
        (Err(e), _) => Err(e),
    };
    match result {
        Ok(record) => Some(record),
        Err(e) => {
            eprintln!("Failed to move {} to {}: {e}", record.id, target.as_str());
            None
        }
    }
}

async fn seed_budgets(service: &PlanningService, team: &Team) {
    let year = service.temporal().current_year();

    let mut hardware = line("Acme Corp", "Industrial Pump", "Hardware", "Contoso");
    hardware.current_year_amount = Some(json!("120000.00"));
    hardware.next_year_amount = Some(json!("135000.00"));
    hardware.stock = Some(40);
    hardware.monthly_values.insert(
        year,
        (1..=11).map(|month| (month, json!("10000.00"))).collect(),
    );
    if let Some(record) = create(service, &team.salesman, RecordKind::Budget, hardware).await
        && let Some(approved) = advance(service, team, &record, PlanningStatus::Approved).await
    {
        match service
            .record_actual(&team.manager, RecordKind::Budget, approved.id, &json!("98000.00"))
            .await
        {
            Ok(record) => println!(
                "  Recorded actual, utilization {}%",
                record.utilization().unwrap_or_default()
            ),
            Err(e) => eprintln!("Failed to record actual: {e}"),
        }
    }

    let mut service_plan = line("Globex", "Maintenance Plan", "Services", "Fabrikam");
    service_plan.current_year_amount = Some(json!(48000));
    service_plan.git = Some(json!("7500.00"));
    if let Some(record) = create(service, &team.salesman, RecordKind::Budget, service_plan).await {
        advance(service, team, &record, PlanningStatus::Submitted).await;
    }

    let mut draft = line("Initech", "Spare Parts Kit", "Hardware", "Contoso");
    draft.current_year_amount = Some(json!(15000));
    create(service, &team.manager, RecordKind::Budget, draft).await;

    let mut central = line("Umbrella", "Fleet Contract", "Services", "Northwind");
    central.year = Some(year + 1);
    central.current_year_amount = Some(json!(250000));
    central.next_year_amount = Some(json!(260000));
    create(service, &team.admin, RecordKind::Budget, central).await;
}

async fn seed_forecasts(service: &PlanningService, team: &Team) {
    let mut pumps = line("Acme Corp", "Industrial Pump", "Hardware", "Contoso");
    pumps.current_year_amount = Some(json!(200000));
    pumps.forecast_method = Some(ForecastMethod::Arima);
    if let Some(record) = create(service, &team.salesman, RecordKind::Forecast, pumps).await
        && let Some(approved) = advance(service, team, &record, PlanningStatus::Approved).await
    {
        match service
            .record_actual(&team.manager, RecordKind::Forecast, approved.id, &json!(180000))
            .await
        {
            Ok(record) => {
                if let Some(details) = record.forecast_details() {
                    println!(
                        "  Scored forecast accuracy {}% ({})",
                        details.accuracy_score,
                        details.confidence_level.as_str()
                    );
                }
            }
            Err(e) => eprintln!("Failed to record actual: {e}"),
        }
    }

    let mut plans = line("Globex", "Maintenance Plan", "Services", "Fabrikam");
    plans.current_year_amount = Some(json!(52000));
    plans.forecast_method = Some(ForecastMethod::Linear);
    if let Some(record) = create(service, &team.salesman, RecordKind::Forecast, plans).await {
        advance(service, team, &record, PlanningStatus::Rejected).await;
    }
}

fn print_tokens(config: &AppConfig, team: &Team) {
    let expires_minutes = i64::try_from(config.jwt.access_token_expiry_secs / 60)
        .expect("token expiry fits in i64");
    let jwt = JwtService::new(JwtConfig {
        secret: config.jwt.secret.clone(),
        access_token_expires_minutes: expires_minutes,
    });

    for actor in [&team.admin, &team.manager, &team.salesman] {
        let token = jwt
            .generate_access_token(
                actor.id.into_inner(),
                actor.role.as_str(),
                actor.department.as_deref(),
            )
            .expect("Failed to sign token");
        println!("  {} ({}): {token}", actor.role.as_str(), actor.id);
    }
}
