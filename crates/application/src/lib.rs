//! Application services and ports.

#![forbid(unsafe_code)]

mod directory_ports;
mod identity_ports;
mod policy_engine;
mod policy_ports;
mod policy_store;
mod role_assignment_service;
mod role_service;
mod user_service;

#[cfg(test)]
mod test_support;

pub use directory_ports::{
    NewUser, RoleInput, RoleRepository, UserProfileUpdate, UserRecord, UserRepository,
};
pub use identity_ports::{IdentityTokenService, IssuedToken, PasswordHasher};
pub use policy_engine::PolicyEngine;
pub use policy_ports::PolicyRepository;
pub use policy_store::PolicyStore;
pub use role_assignment_service::RoleAssignmentService;
pub use role_service::{RoleService, SaveRoleInput};
pub use user_service::{
    LoginResult, RegisterUserInput, UpdateProfileInput, UserProfile, UserService,
};
