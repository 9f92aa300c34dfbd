//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod argon2_password_hasher;
mod in_memory_policy_repository;
mod in_memory_role_repository;
mod in_memory_user_repository;
mod jwt_identity_token_service;
mod postgres_policy_repository;
mod postgres_role_repository;
mod postgres_user_repository;

#[cfg(test)]
mod test_database;

pub use argon2_password_hasher::Argon2PasswordHasher;
pub use in_memory_policy_repository::InMemoryPolicyRepository;
pub use in_memory_role_repository::InMemoryRoleRepository;
pub use in_memory_user_repository::InMemoryUserRepository;
pub use jwt_identity_token_service::{
    JwtIdentityTokenService, MAX_TOKEN_TTL_HOURS, MIN_SECRET_BYTES,
};
pub use postgres_policy_repository::PostgresPolicyRepository;
pub use postgres_role_repository::PostgresRoleRepository;
pub use postgres_user_repository::PostgresUserRepository;
