use tracing::info;

use tierup_core::{AppError, AppResult};
use tierup_domain::{UserId, validate_password};

use super::UserService;

impl UserService {
    /// Changes the caller's password after verifying the current one.
    pub async fn change_password(
        &self,
        user_id: UserId,
        current_password: &str,
        new_password: &str,
    ) -> AppResult<()> {
        let user = self.find_user(user_id).await?;

        if !self
            .password_hasher
            .verify_password(current_password, &user.password_hash)?
        {
            return Err(AppError::Validation(
                "current password is incorrect".to_owned(),
            ));
        }

        validate_password(new_password)?;

        let new_hash = self.password_hasher.hash_password(new_password)?;
        self.user_repository
            .update_password(user_id, &new_hash)
            .await?;

        info!(user_id = %user_id, "password changed");
        Ok(())
    }
}
