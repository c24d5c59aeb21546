//! Scholaris API Server
//!
//! Main entry point for the Scholaris backend service.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use scholaris_api::{AppState, HttpSettings, create_router};
use scholaris_core::auth::{SessionAuthority, SessionPolicy};
use scholaris_core::fees::{LogNotifier, PaymentLedger};
use scholaris_core::provisioning::Provisioner;
use scholaris_db::{
    AuthEventRepository, PaymentRepository, SchoolRepository, SessionRepository, UserRepository,
    connect_with,
};
use scholaris_shared::AppConfig;
use scholaris_shared::config::LoggingConfig;

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "scholaris=debug,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);

    if logging.json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Periodically deletes sessions that can no longer be resolved.
fn spawn_session_sweeper(sessions: SessionRepository, policy: SessionPolicy, every: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            match sessions.purge_expired(&policy, Utc::now()).await {
                Ok(0) => {}
                Ok(removed) => info!(removed, "Purged expired sessions"),
                Err(e) => warn!(error = %e, "Session purge failed"),
            }
        }
    });
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;
    init_tracing(&config.logging);

    let db = connect_with(&config.database).await?;
    info!("Connected to database");

    let timezone = config.ledger.tz()?;
    let policy = SessionPolicy::from_config(&config.session);
    info!(
        timezone = %timezone,
        idle_timeout_secs = config.session.idle_timeout_secs,
        absolute_timeout_secs = config.session.absolute_timeout_secs,
        "Ledger and session policy configured"
    );

    let sessions = SessionRepository::new(db.clone());
    spawn_session_sweeper(
        sessions.clone(),
        policy,
        Duration::from_secs(config.session.purge_interval_secs.max(1)),
    );

    let users = Arc::new(UserRepository::new(db.clone()));
    let authority = SessionAuthority::new(
        users.clone(),
        Arc::new(sessions),
        Arc::new(AuthEventRepository::new(db.clone())),
        policy,
    );
    let ledger = PaymentLedger::new(
        Arc::new(PaymentRepository::new(db.clone())),
        Arc::new(LogNotifier),
        timezone,
    );
    let provisioner = Provisioner::new(Arc::new(SchoolRepository::new(db.clone())), users);

    let state = AppState {
        authority,
        ledger,
        provisioner,
        settings: Arc::new(HttpSettings::from_config(&config)),
    };

    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
