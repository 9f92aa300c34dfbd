//! Tier-Up API composition root.

#![forbid(unsafe_code)]

mod api_config;
mod api_router;
mod api_services;
mod dto;
mod error;
mod extract;
mod handlers;
mod middleware;
mod state;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use tierup_core::AppError;
use tierup_infrastructure::{Argon2PasswordHasher, JwtIdentityTokenService};
use tracing::info;

use crate::api_config::{ApiConfig, init_tracing};
use crate::api_router::build_router;
use crate::api_services::{
    RepositorySet, bootstrap_admin, build_app_state, connect_and_migrate,
};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ApiConfig::load()?;
    let pool = connect_and_migrate(&config.database_url).await?;

    if config.migrate_only {
        info!("database migrations applied successfully");
        return Ok(());
    }

    let token_service = Arc::new(JwtIdentityTokenService::new(
        config.jwt_secret.as_bytes(),
        config.jwt_ttl,
    )?);
    let app_state = build_app_state(
        RepositorySet::postgres(&pool),
        Arc::new(Argon2PasswordHasher::new()),
        token_service,
    )
    .await?;
    bootstrap_admin(
        &app_state,
        &config.admin_role_name,
        config.bootstrap_admin_user_id,
    )
    .await?;

    let app = build_router(app_state, &config.frontend_url)?;
    let address = config.socket_address()?;
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(%address, "tierup-api listening");

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("api server error: {error}")))
}
