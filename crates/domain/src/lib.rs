//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod pagination;
mod policy;
mod policy_model;
mod role;
mod user;

pub use pagination::{DEFAULT_PAGE, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, Page, PageRequest};
pub use policy::{
    GroupingField, GroupingRule, POLICY_ACTION_MAX_LENGTH, POLICY_RESOURCE_MAX_LENGTH,
    POLICY_SUBJECT_MAX_LENGTH, PolicyField, PolicyRule, WILDCARD, action_matches,
    resource_matches,
};
pub use policy_model::{PolicyModel, PurgedRules};
pub use role::{
    ROLE_DESCRIPTION_MAX_LENGTH, ROLE_DISPLAY_NAME_MAX_LENGTH, ROLE_NAME_MAX_LENGTH,
    ROLE_NAME_MIN_LENGTH, Role, RoleId, RoleName,
};
pub use user::{
    EmailAddress, PASSWORD_MAX_LENGTH, PASSWORD_MIN_LENGTH, USERNAME_MAX_LENGTH,
    USERNAME_MIN_LENGTH, UserId, UserStatus, Username, validate_password,
};
