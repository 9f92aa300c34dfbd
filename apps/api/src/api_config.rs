use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use chrono::Duration;
use tierup_core::AppError;
use tierup_infrastructure::{MAX_TOKEN_TTL_HOURS, MIN_SECRET_BYTES};
use tracing_subscriber::EnvFilter;

/// Runtime configuration read from the environment.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_ttl: Duration,
    pub api_host: String,
    pub api_port: u16,
    pub frontend_url: String,
    pub admin_role_name: String,
    pub bootstrap_admin_user_id: Option<i64>,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let migrate_only = env::args().nth(1).as_deref() == Some("migrate");
        Self::from_lookup(migrate_only, |name| env::var(name).ok())
    }

    fn from_lookup(
        migrate_only: bool,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, AppError> {
        let required = |name: &str| {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| AppError::Validation(format!("{name} is required")))
        };

        let database_url = required("DATABASE_URL")?;
        let jwt_secret = if migrate_only {
            lookup("JWT_SECRET").unwrap_or_default()
        } else {
            let secret = required("JWT_SECRET")?;
            if secret.len() < MIN_SECRET_BYTES {
                return Err(AppError::Validation(format!(
                    "JWT_SECRET must be at least {MIN_SECRET_BYTES} bytes"
                )));
            }
            secret
        };

        let jwt_ttl_hours = parsed(&lookup, "JWT_TTL_HOURS", 24_i64)?;
        let jwt_ttl = Some(jwt_ttl_hours)
            .filter(|hours| (1..=MAX_TOKEN_TTL_HOURS).contains(hours))
            .and_then(Duration::try_hours)
            .ok_or_else(|| {
                AppError::Validation(format!(
                    "JWT_TTL_HOURS must be between 1 and {MAX_TOKEN_TTL_HOURS}"
                ))
            })?;

        let bootstrap_admin_user_id = lookup("BOOTSTRAP_ADMIN_USER_ID")
            .filter(|value| !value.trim().is_empty())
            .map(|value| {
                value.trim().parse::<i64>().map_err(|error| {
                    AppError::Validation(format!("invalid BOOTSTRAP_ADMIN_USER_ID: {error}"))
                })
            })
            .transpose()?;

        Ok(Self {
            migrate_only,
            database_url,
            jwt_secret,
            jwt_ttl,
            api_host: lookup("API_HOST").unwrap_or_else(|| "127.0.0.1".to_owned()),
            api_port: parsed(&lookup, "API_PORT", 3001_u16)?,
            frontend_url: lookup("FRONTEND_URL")
                .unwrap_or_else(|| "http://localhost:3000".to_owned()),
            admin_role_name: lookup("ADMIN_ROLE_NAME")
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| "admin".to_owned()),
            bootstrap_admin_user_id,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

fn parsed<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name).filter(|value| !value.trim().is_empty()) {
        Some(value) => value
            .trim()
            .parse::<T>()
            .map_err(|error| AppError::Validation(format!("invalid {name}: {error}"))),
        None => Ok(default),
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}
