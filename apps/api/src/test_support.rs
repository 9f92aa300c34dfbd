//! In-memory application state for handler and router tests.

use std::sync::Arc;

use chrono::Duration;
use tierup_infrastructure::{Argon2PasswordHasher, JwtIdentityTokenService};

use crate::api_services::{RepositorySet, build_app_state};
use crate::state::AppState;

const TEST_SECRET: &[u8] = b"tierup-test-secret-0123456789abcdef";

pub async fn test_state() -> AppState {
    let hasher = match Argon2PasswordHasher::with_cost(1024, 1, 1) {
        Ok(hasher) => hasher,
        Err(error) => panic!("test hasher should build: {error}"),
    };
    let tokens = match JwtIdentityTokenService::new(TEST_SECRET, Duration::hours(1)) {
        Ok(tokens) => tokens,
        Err(error) => panic!("test token service should build: {error}"),
    };

    match build_app_state(RepositorySet::in_memory(), Arc::new(hasher), Arc::new(tokens)).await {
        Ok(state) => state,
        Err(error) => panic!("test state should build: {error}"),
    }
}
