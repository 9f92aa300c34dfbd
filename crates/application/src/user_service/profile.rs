use tierup_core::{AppError, AppResult};
use tierup_domain::{EmailAddress, UserId};

use crate::UserProfileUpdate;

use super::{UpdateProfileInput, UserProfile, UserRecord, UserService};

const NICKNAME_MAX_LENGTH: usize = 50;
const PHONE_MAX_LENGTH: usize = 20;
const AVATAR_MAX_LENGTH: usize = 255;

impl UserService {
    /// Returns a user with its relational roles.
    pub async fn profile(&self, user_id: UserId) -> AppResult<UserProfile> {
        let user = self.find_user(user_id).await?;
        let roles = self.role_repository.list_for_user(user_id).await?;

        Ok(UserProfile { user, roles })
    }

    /// Updates the caller's own profile fields.
    pub async fn update_profile(
        &self,
        user_id: UserId,
        input: UpdateProfileInput,
    ) -> AppResult<UserRecord> {
        let current = self.find_user(user_id).await?;

        let email = match input.email {
            Some(email) => {
                let email = EmailAddress::new(email)?;
                if email.as_str() != current.email {
                    let owner = self.user_repository.find_by_email(email.as_str()).await?;
                    if owner.is_some_and(|owner| owner.id != user_id) {
                        return Err(AppError::Conflict("email already exists".to_owned()));
                    }
                }
                Some(String::from(email))
            }
            None => None,
        };

        let update = UserProfileUpdate {
            nickname: bounded("nickname", input.nickname, NICKNAME_MAX_LENGTH)?,
            email,
            phone: bounded("phone", input.phone, PHONE_MAX_LENGTH)?,
            avatar: bounded("avatar", input.avatar, AVATAR_MAX_LENGTH)?,
        };

        self.user_repository.update_profile(user_id, &update).await
    }

    pub(super) async fn find_user(&self, user_id: UserId) -> AppResult<UserRecord> {
        self.user_repository
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user {user_id} not found")))
    }
}

fn bounded(field: &str, value: Option<String>, max_length: usize) -> AppResult<Option<String>> {
    let Some(value) = value else {
        return Ok(None);
    };

    let trimmed = value.trim();
    if trimmed.chars().count() > max_length {
        return Err(AppError::Validation(format!(
            "{field} must not exceed {max_length} characters"
        )));
    }

    Ok(Some(trimmed.to_owned()))
}
