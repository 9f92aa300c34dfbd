use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use tierup_application::{NewUser, UserProfileUpdate, UserRecord, UserRepository};
use tierup_core::{AppError, AppResult};
use tierup_domain::{UserId, UserStatus};

#[derive(Debug, Default)]
struct UserTable {
    next_id: i64,
    rows: BTreeMap<UserId, UserRecord>,
}

impl UserTable {
    fn email_taken(&self, email: &str, except: Option<UserId>) -> bool {
        self.rows
            .values()
            .any(|user| Some(user.id) != except && user.email.eq_ignore_ascii_case(email))
    }
}

/// In-memory user repository with the same uniqueness rules as the
/// relational schema.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    table: RwLock<UserTable>,
}

impl InMemoryUserRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the account status of a stored user.
    pub async fn set_status(&self, user_id: UserId, status: UserStatus) -> AppResult<()> {
        let mut table = self.table.write().await;
        let user = table
            .rows
            .get_mut(&user_id)
            .ok_or_else(|| AppError::NotFound(format!("user {user_id} not found")))?;
        user.status = status;
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<UserRecord>> {
        Ok(self.table.read().await.rows.get(&user_id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<UserRecord>> {
        Ok(self
            .table
            .read()
            .await
            .rows
            .values()
            .find(|user| user.username == username)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserRecord>> {
        Ok(self
            .table
            .read()
            .await
            .rows
            .values()
            .find(|user| user.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn create(&self, user: NewUser) -> AppResult<UserRecord> {
        let mut table = self.table.write().await;

        if table.rows.values().any(|row| row.username == user.username) {
            return Err(AppError::Conflict(format!(
                "username '{}' is already taken",
                user.username
            )));
        }
        if table.email_taken(&user.email, None) {
            return Err(AppError::Conflict(format!(
                "email '{}' is already registered",
                user.email
            )));
        }

        table.next_id += 1;
        let record = UserRecord {
            id: UserId::new(table.next_id),
            username: user.username,
            password_hash: user.password_hash,
            nickname: user.nickname,
            email: user.email.to_ascii_lowercase(),
            phone: user.phone,
            avatar: String::new(),
            status: UserStatus::Active,
        };
        table.rows.insert(record.id, record.clone());

        Ok(record)
    }

    async fn update_profile(
        &self,
        user_id: UserId,
        update: &UserProfileUpdate,
    ) -> AppResult<UserRecord> {
        let mut table = self.table.write().await;

        if let Some(email) = update.email.as_deref()
            && table.email_taken(email, Some(user_id))
        {
            return Err(AppError::Conflict(format!(
                "email '{email}' is already registered"
            )));
        }

        let user = table
            .rows
            .get_mut(&user_id)
            .ok_or_else(|| AppError::NotFound(format!("user {user_id} not found")))?;

        if let Some(nickname) = &update.nickname {
            user.nickname.clone_from(nickname);
        }
        if let Some(email) = &update.email {
            user.email = email.to_ascii_lowercase();
        }
        if let Some(phone) = &update.phone {
            user.phone.clone_from(phone);
        }
        if let Some(avatar) = &update.avatar {
            user.avatar.clone_from(avatar);
        }

        Ok(user.clone())
    }

    async fn update_password(&self, user_id: UserId, password_hash: &str) -> AppResult<()> {
        let mut table = self.table.write().await;
        let user = table
            .rows
            .get_mut(&user_id)
            .ok_or_else(|| AppError::NotFound(format!("user {user_id} not found")))?;
        password_hash.clone_into(&mut user.password_hash);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tierup_application::{NewUser, UserProfileUpdate, UserRepository};
    use tierup_core::AppError;
    use tierup_domain::{UserId, UserStatus};

    use super::InMemoryUserRepository;

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser {
            username: username.to_owned(),
            password_hash: "hash".to_owned(),
            nickname: String::new(),
            email: email.to_owned(),
            phone: String::new(),
        }
    }

    #[tokio::test]
    async fn email_uniqueness_ignores_case() {
        let repository = InMemoryUserRepository::new();
        let Ok(alice) = repository
            .create(new_user("alice", "Alice@Example.com"))
            .await
        else {
            panic!("first user should be created");
        };
        assert_eq!(alice.email, "alice@example.com");

        let duplicate = repository
            .create(new_user("alice2", "ALICE@example.com"))
            .await;
        assert!(matches!(duplicate, Err(AppError::Conflict(_))));

        let Ok(bob) = repository.create(new_user("bob", "bob@example.com")).await else {
            panic!("second user should be created");
        };
        let taken = repository
            .update_profile(
                bob.id,
                &UserProfileUpdate {
                    email: Some("alice@EXAMPLE.com".to_owned()),
                    ..UserProfileUpdate::default()
                },
            )
            .await;
        assert!(matches!(taken, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn status_override_requires_existing_user() {
        let repository = InMemoryUserRepository::new();
        let Ok(user) = repository.create(new_user("carol", "carol@example.com")).await else {
            panic!("user should be created");
        };

        assert!(repository.set_status(user.id, UserStatus::Disabled).await.is_ok());
        assert!(matches!(
            repository.find_by_id(user.id).await,
            Ok(Some(ref stored)) if stored.status == UserStatus::Disabled
        ));
        assert!(matches!(
            repository.set_status(UserId::new(99), UserStatus::Active).await,
            Err(AppError::NotFound(_))
        ));
    }
}
