//! Planbook API Server
//!
//! Main entry point for the Planbook backend service.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use planbook_api::{AppState, create_router};
use planbook_core::service::PlanningService;
use planbook_core::temporal::TemporalContext;
use planbook_db::{PlanningRepository, connect};
use planbook_shared::{AppConfig, JwtConfig, JwtService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "planbook=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load()?;

    // Connect to database
    let db = connect(&config.database).await?;
    info!("Connected to database");

    // Create JWT service
    let jwt_config = JwtConfig {
        secret: config.jwt.secret.clone(),
        access_token_expires_minutes: i64::try_from(config.jwt.access_token_expiry_secs / 60)?,
    };
    let jwt_service = JwtService::new(jwt_config);

    // Planning service over the database store
    let temporal = TemporalContext::system(&config.planning);
    info!(
        current_year = temporal.current_year(),
        first_year = config.planning.first_year,
        horizon_years = config.planning.horizon_years,
        "Planning calendar configured"
    );
    let planning = PlanningService::new(
        Arc::new(PlanningRepository::new(db)),
        temporal,
        config.planning,
    );

    // Create application state
    let state = AppState {
        planning: Arc::new(planning),
        jwt_service: Arc::new(jwt_service),
    };

    // Create router
    let app = create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
