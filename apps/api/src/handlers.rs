use axum::Json;
use axum::extract::{Extension, State};

use tierup_core::AuthenticatedSubject;
use tierup_domain::{RoleId, UserId};

use crate::dto::ApiEnvelope;
use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::state::AppState;

pub mod account;
pub mod assignments;
pub mod health;
pub mod permissions;
pub mod roles;

type EnvelopeResult<T> = ApiResult<Json<ApiEnvelope<T>>>;
