use tracing::info;

use tierup_core::{AppError, AppResult};
use tierup_domain::UserStatus;

use super::{LoginResult, UserService};

const INVALID_CREDENTIALS: &str = "invalid username or password";

impl UserService {
    /// Verifies credentials and issues an identity token.
    ///
    /// Unknown usernames still pay for one hash so response time does not
    /// reveal whether the account exists.
    pub async fn login(&self, username: &str, password: &str) -> AppResult<LoginResult> {
        let Some(user) = self
            .user_repository
            .find_by_username(username.trim())
            .await?
        else {
            let _ = self.password_hasher.hash_password(password);
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_owned()));
        };

        if !self
            .password_hasher
            .verify_password(password, &user.password_hash)?
        {
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_owned()));
        }

        if user.status == UserStatus::Disabled {
            return Err(AppError::Forbidden("account is disabled".to_owned()));
        }

        let token = self
            .token_service
            .issue(user.id.value(), user.username.as_str())?;

        info!(user_id = %user.id, "user logged in");
        Ok(LoginResult { token, user })
    }
}
