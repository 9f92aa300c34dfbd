use tracing::info;

use tierup_core::{AppError, AppResult};
use tierup_domain::{EmailAddress, Username, validate_password};

use crate::NewUser;

use super::{RegisterUserInput, UserRecord, UserService};

impl UserService {
    /// Registers an active user with a hashed password.
    pub async fn register(&self, input: RegisterUserInput) -> AppResult<UserRecord> {
        let username = Username::new(input.username)?;
        let email = EmailAddress::new(input.email)?;
        validate_password(&input.password)?;

        if self
            .user_repository
            .find_by_username(username.as_str())
            .await?
            .is_some()
        {
            return Err(AppError::Conflict("username already exists".to_owned()));
        }

        if self
            .user_repository
            .find_by_email(email.as_str())
            .await?
            .is_some()
        {
            return Err(AppError::Conflict("email already exists".to_owned()));
        }

        let password_hash = self.password_hasher.hash_password(&input.password)?;
        let user = self
            .user_repository
            .create(NewUser {
                username: username.as_str().to_owned(),
                password_hash,
                nickname: input.nickname.trim().to_owned(),
                email: email.into(),
                phone: input.phone.trim().to_owned(),
            })
            .await?;

        info!(user_id = %user.id, username = user.username.as_str(), "user registered");
        Ok(user)
    }
}
