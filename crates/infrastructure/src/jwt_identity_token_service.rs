//! HS256 identity tokens.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use tierup_application::{IdentityTokenService, IssuedToken};
use tierup_core::{AppError, AppResult, AuthenticatedSubject};

/// Shortest accepted signing secret in bytes.
pub const MIN_SECRET_BYTES: usize = 32;

/// Longest accepted token lifetime in hours.
pub const MAX_TOKEN_TTL_HOURS: i64 = 24 * 366;

#[derive(Debug, Serialize, Deserialize)]
struct IdentityClaims {
    sub: String,
    name: String,
    iat: i64,
    exp: i64,
}

/// Stateless identity token adapter backed by `jsonwebtoken`.
#[derive(Clone)]
pub struct JwtIdentityTokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl JwtIdentityTokenService {
    /// Creates the service. Secrets shorter than [`MIN_SECRET_BYTES`],
    /// non-positive lifetimes and lifetimes beyond [`MAX_TOKEN_TTL_HOURS`]
    /// are rejected.
    pub fn new(secret: &[u8], ttl: Duration) -> AppResult<Self> {
        if secret.len() < MIN_SECRET_BYTES {
            return Err(AppError::Validation(format!(
                "token secret must be at least {MIN_SECRET_BYTES} bytes"
            )));
        }

        if ttl <= Duration::zero() {
            return Err(AppError::Validation(
                "token lifetime must be positive".to_owned(),
            ));
        }

        if ttl.num_hours() > MAX_TOKEN_TTL_HOURS {
            return Err(AppError::Validation(format!(
                "token lifetime must not exceed {MAX_TOKEN_TTL_HOURS} hours"
            )));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl,
        })
    }

    fn sign(&self, claims: &IdentityClaims) -> AppResult<String> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|error| AppError::Internal(format!("failed to sign identity token: {error}")))
    }
}

impl IdentityTokenService for JwtIdentityTokenService {
    fn issue(&self, subject_id: i64, subject_name: &str) -> AppResult<IssuedToken> {
        let issued_at = Utc::now();
        let expires_at = issued_at
            .checked_add_signed(self.ttl)
            .ok_or_else(|| AppError::Internal("token expiry is out of range".to_owned()))?
            .timestamp();
        let token = self.sign(&IdentityClaims {
            sub: subject_id.to_string(),
            name: subject_name.to_owned(),
            iat: issued_at.timestamp(),
            exp: expires_at,
        })?;

        Ok(IssuedToken { token, expires_at })
    }

    fn validate(&self, token: &str) -> AppResult<AuthenticatedSubject> {
        let data = decode::<IdentityClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|error| {
                tracing::debug!(error = %error, "identity token rejected");
                AppError::Unauthorized("invalid or expired token".to_owned())
            })?;

        let subject_id = data
            .claims
            .sub
            .parse::<i64>()
            .map_err(|_| AppError::Unauthorized("invalid or expired token".to_owned()))?;

        Ok(AuthenticatedSubject::new(subject_id, data.claims.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";

    fn service() -> AppResult<JwtIdentityTokenService> {
        JwtIdentityTokenService::new(SECRET, Duration::hours(24))
    }

    #[test]
    fn issued_token_validates_to_same_subject() -> AppResult<()> {
        let service = service()?;
        let issued = service.issue(42, "alice")?;

        let subject = service.validate(&issued.token)?;

        assert_eq!(subject.subject_id(), 42);
        assert_eq!(subject.display_name(), "alice");
        assert!(issued.expires_at > Utc::now().timestamp());
        Ok(())
    }

    #[test]
    fn expired_token_is_unauthorized() -> AppResult<()> {
        let service = service()?;
        let now = Utc::now().timestamp();
        let token = service.sign(&IdentityClaims {
            sub: "7".to_owned(),
            name: "bob".to_owned(),
            iat: now - 120,
            exp: now - 1,
        })?;

        assert!(matches!(
            service.validate(&token),
            Err(AppError::Unauthorized(_))
        ));
        Ok(())
    }

    #[test]
    fn tampered_token_is_unauthorized() -> AppResult<()> {
        let service = service()?;
        let issued = service.issue(1, "carol")?;
        let mut tampered = issued.token;
        tampered.push('x');

        assert!(matches!(
            service.validate(&tampered),
            Err(AppError::Unauthorized(_))
        ));
        assert!(matches!(
            service.validate("not.a.token"),
            Err(AppError::Unauthorized(_))
        ));
        Ok(())
    }

    #[test]
    fn token_signed_with_other_secret_is_unauthorized() -> AppResult<()> {
        let other =
            JwtIdentityTokenService::new(b"ffffffffffffffffffffffffffffffff", Duration::hours(1))?;
        let issued = other.issue(3, "dave")?;

        assert!(matches!(
            service()?.validate(&issued.token),
            Err(AppError::Unauthorized(_))
        ));
        Ok(())
    }

    #[test]
    fn non_numeric_subject_is_unauthorized() -> AppResult<()> {
        let service = service()?;
        let token = service.sign(&IdentityClaims {
            sub: "admin".to_owned(),
            name: "eve".to_owned(),
            iat: Utc::now().timestamp(),
            exp: Utc::now().timestamp() + 60,
        })?;

        assert!(matches!(
            service.validate(&token),
            Err(AppError::Unauthorized(_))
        ));
        Ok(())
    }

    #[test]
    fn short_secret_and_empty_lifetime_are_rejected() {
        assert!(matches!(
            JwtIdentityTokenService::new(b"short", Duration::hours(1)),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            JwtIdentityTokenService::new(SECRET, Duration::zero()),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn lifetime_beyond_maximum_is_rejected() -> AppResult<()> {
        assert!(matches!(
            JwtIdentityTokenService::new(SECRET, Duration::hours(MAX_TOKEN_TTL_HOURS + 1)),
            Err(AppError::Validation(_))
        ));

        let longest =
            JwtIdentityTokenService::new(SECRET, Duration::hours(MAX_TOKEN_TTL_HOURS))?;
        let issued = longest.issue(5, "frank")?;
        assert_eq!(longest.validate(&issued.token)?.subject_id(), 5);
        Ok(())
    }
}
