use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use tierup_domain::PageRequest;

/// Success envelope shared by every endpoint.
#[derive(Debug, Serialize)]
pub struct ApiEnvelope<T> {
    pub code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiEnvelope<T> {
    /// Wraps a payload in a `200` envelope.
    #[must_use]
    pub fn success(data: T) -> Self {
        Self {
            code: StatusCode::OK.as_u16(),
            message: "success".to_owned(),
            data: Some(data),
        }
    }
}

impl ApiEnvelope<()> {
    /// A `200` envelope without payload.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            code: StatusCode::OK.as_u16(),
            message: "success".to_owned(),
            data: None,
        }
    }
}

/// Health response payload.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Whether an idempotent write changed stored state.
#[derive(Debug, Serialize)]
pub struct ChangeResponse {
    pub changed: bool,
}

/// Raw pagination query. Unparseable values fall back to defaults.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
    pub page_size: Option<String>,
}

impl PageQuery {
    /// Normalises the query into a page request.
    #[must_use]
    pub fn to_page_request(&self) -> PageRequest {
        let parse = |value: &Option<String>| value.as_deref().and_then(|raw| raw.trim().parse().ok());
        PageRequest::new(parse(&self.page), parse(&self.page_size))
    }
}
