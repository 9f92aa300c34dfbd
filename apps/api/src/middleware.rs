use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;
use tierup_core::{AppError, AuthenticatedSubject};
use tracing::{debug, error};

use crate::error::ApiResult;
use crate::state::AppState;

/// Resolves the bearer token into an [`AuthenticatedSubject`] request
/// extension. Missing, malformed and expired tokens end the request with 401.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(bearer_token)
        .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?;

    let subject = state.token_service.validate(token)?;

    request.extensions_mut().insert(subject);
    Ok(next.run(request).await)
}

/// Enforces `(subject, path, method)` against the policy engine. Must run
/// after [`require_auth`].
pub async fn require_permission(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    let Some(subject) = request.extensions().get::<AuthenticatedSubject>() else {
        error!(path = %request.uri().path(), "permission gate reached without an authenticated subject");
        return Err(AppError::Internal("authorization gate misconfigured".to_owned()).into());
    };

    let policy_subject = subject.policy_subject();
    let path = request.uri().path();
    let method = request.method().as_str();

    if !state.policy_engine.enforce(&policy_subject, path, method)? {
        debug!(subject = %policy_subject, %path, %method, "permission denied");
        return Err(AppError::Forbidden("permission denied".to_owned()).into());
    }

    Ok(next.run(request).await)
}

fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::bearer_token;

    #[test]
    fn bearer_scheme_is_case_insensitive() {
        assert_eq!(bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(bearer_token("bearer  abc "), Some("abc"));
        assert_eq!(bearer_token("Basic abc"), None);
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("abc"), None);
    }
}
