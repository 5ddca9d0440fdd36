//! Unigate Server — application entry point.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use unigate_auth::service::AccountService;
use unigate_auth::{InMemoryLoginAttemptTracker, SmtpOtpSender};
use unigate_db::DbManager;
use unigate_db::repository::{SurrealProfileRepository, SurrealUserRepository};

mod config;
mod error;
mod handlers;
mod routes;
mod state;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    let config = config::ServerConfig::from_env();
    tracing::info!("Starting unigate server...");

    let manager = DbManager::connect(&config.db).await?;
    unigate_db::run_migrations(manager.client()).await?;

    let db = manager.client().clone();
    let users = match &config.auth.pepper {
        Some(pepper) => SurrealUserRepository::with_pepper(db.clone(), pepper.clone()),
        None => SurrealUserRepository::new(db.clone()),
    };
    let profiles = SurrealProfileRepository::new(db);
    let mailer = SmtpOtpSender::new(&config.smtp)?;
    let attempts = InMemoryLoginAttemptTracker::new(config.auth.max_failed_login_attempts);
    let accounts = AccountService::new(users, profiles, mailer, attempts, config.auth.clone());

    let state = Arc::new(state::AppState { accounts });
    let router = routes::build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, router).await?;

    Ok(())
}
