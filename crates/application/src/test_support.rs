//! Hand-written port fakes shared by service tests.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use tierup_core::{AppError, AppResult, AuthenticatedSubject};
use tierup_domain::{
    GroupingRule, Page, PageRequest, PolicyRule, PurgedRules, Role, RoleId, UserId, UserStatus,
};

use crate::{
    IdentityTokenService, IssuedToken, NewUser, PasswordHasher, PolicyEngine, PolicyRepository,
    PolicyStore, RoleInput, RoleRepository, UserProfileUpdate, UserRecord, UserRepository,
};

fn injected(operation: &str) -> AppError {
    AppError::Internal(format!("injected {operation} failure"))
}

async fn pause_if_requested(flag: &AtomicBool) {
    if flag.load(Ordering::SeqCst) {
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
    }
}

fn take_failure(counter: &AtomicUsize) -> bool {
    counter
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |remaining| {
            remaining.checked_sub(1)
        })
        .is_ok()
}

#[derive(Default)]
pub(crate) struct FakePolicyRepository {
    pub(crate) policies: Mutex<BTreeSet<PolicyRule>>,
    pub(crate) groupings: Mutex<BTreeSet<GroupingRule>>,
    pub(crate) grouping_failures: AtomicUsize,
    pub(crate) fail_rename: AtomicBool,
    pub(crate) fail_bulk_insert: AtomicBool,
}

#[async_trait]
impl PolicyRepository for FakePolicyRepository {
    async fn load_policies(&self) -> AppResult<Vec<PolicyRule>> {
        Ok(self.policies.lock().await.iter().cloned().collect())
    }

    async fn load_groupings(&self) -> AppResult<Vec<GroupingRule>> {
        Ok(self.groupings.lock().await.iter().cloned().collect())
    }

    async fn insert_policy(&self, rule: &PolicyRule) -> AppResult<bool> {
        Ok(self.policies.lock().await.insert(rule.clone()))
    }

    async fn delete_policy(&self, rule: &PolicyRule) -> AppResult<bool> {
        Ok(self.policies.lock().await.remove(rule))
    }

    async fn insert_grouping(&self, rule: &GroupingRule) -> AppResult<bool> {
        if take_failure(&self.grouping_failures) {
            return Err(injected("grouping insert"));
        }
        Ok(self.groupings.lock().await.insert(rule.clone()))
    }

    async fn delete_grouping(&self, rule: &GroupingRule) -> AppResult<bool> {
        if take_failure(&self.grouping_failures) {
            return Err(injected("grouping delete"));
        }
        Ok(self.groupings.lock().await.remove(rule))
    }

    async fn rename_subject(&self, old: &str, new: &str) -> AppResult<()> {
        if self.fail_rename.load(Ordering::SeqCst) {
            return Err(injected("rename"));
        }

        let mut policies = self.policies.lock().await;
        let renamed: Vec<PolicyRule> = policies
            .iter()
            .filter(|rule| rule.subject() == old)
            .cloned()
            .collect();
        for rule in renamed {
            policies.remove(&rule);
            policies.insert(rule.with_subject(new));
        }

        let mut groupings = self.groupings.lock().await;
        let moved: Vec<GroupingRule> = groupings
            .iter()
            .filter(|rule| rule.role() == old || rule.user() == old)
            .cloned()
            .collect();
        for rule in moved {
            groupings.remove(&rule);
            let user = if rule.user() == old { new } else { rule.user() };
            let role = if rule.role() == old { new } else { rule.role() };
            if let Ok(renamed) = GroupingRule::new(user, role) {
                groupings.insert(renamed);
            }
        }
        Ok(())
    }

    async fn delete_rules(&self, rules: &PurgedRules) -> AppResult<()> {
        let mut policies = self.policies.lock().await;
        for rule in &rules.policies {
            policies.remove(rule);
        }
        let mut groupings = self.groupings.lock().await;
        for rule in &rules.groupings {
            groupings.remove(rule);
        }
        Ok(())
    }

    async fn insert_rules(&self, rules: &PurgedRules) -> AppResult<()> {
        if self.fail_bulk_insert.load(Ordering::SeqCst) {
            return Err(injected("bulk insert"));
        }
        self.policies
            .lock()
            .await
            .extend(rules.policies.iter().cloned());
        self.groupings
            .lock()
            .await
            .extend(rules.groupings.iter().cloned());
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct FakeUserRepository {
    pub(crate) users: Mutex<Vec<UserRecord>>,
    next_id: AtomicI64,
}

impl FakeUserRepository {
    pub(crate) async fn seed(&self, username: &str, status: UserStatus) -> UserId {
        let id = UserId::new(self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        self.users.lock().await.push(UserRecord {
            id,
            username: username.to_owned(),
            password_hash: "hashed:secret-pass".to_owned(),
            nickname: String::new(),
            email: format!("{username}@example.com"),
            phone: String::new(),
            avatar: String::new(),
            status,
        });
        id
    }
}

#[async_trait]
impl UserRepository for FakeUserRepository {
    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<UserRecord>> {
        Ok(self
            .users
            .lock()
            .await
            .iter()
            .find(|user| user.id == user_id)
            .cloned())
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<UserRecord>> {
        Ok(self
            .users
            .lock()
            .await
            .iter()
            .find(|user| user.username == username)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserRecord>> {
        Ok(self
            .users
            .lock()
            .await
            .iter()
            .find(|user| user.email == email)
            .cloned())
    }

    async fn create(&self, user: NewUser) -> AppResult<UserRecord> {
        let record = UserRecord {
            id: UserId::new(self.next_id.fetch_add(1, Ordering::SeqCst) + 1),
            username: user.username,
            password_hash: user.password_hash,
            nickname: user.nickname,
            email: user.email,
            phone: user.phone,
            avatar: String::new(),
            status: UserStatus::Active,
        };
        self.users.lock().await.push(record.clone());
        Ok(record)
    }

    async fn update_profile(
        &self,
        user_id: UserId,
        update: &UserProfileUpdate,
    ) -> AppResult<UserRecord> {
        let mut users = self.users.lock().await;
        let user = users
            .iter_mut()
            .find(|user| user.id == user_id)
            .ok_or_else(|| AppError::NotFound(format!("user {user_id} not found")))?;

        if let Some(nickname) = &update.nickname {
            user.nickname.clone_from(nickname);
        }
        if let Some(email) = &update.email {
            user.email.clone_from(email);
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
        let mut users = self.users.lock().await;
        let user = users
            .iter_mut()
            .find(|user| user.id == user_id)
            .ok_or_else(|| AppError::NotFound(format!("user {user_id} not found")))?;
        password_hash.clone_into(&mut user.password_hash);
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct FakeRoleRepository {
    pub(crate) roles: Mutex<Vec<Role>>,
    pub(crate) user_roles: Mutex<BTreeSet<(UserId, RoleId)>>,
    pub(crate) fail_update_after: Mutex<Option<usize>>,
    pub(crate) fail_delete: AtomicBool,
    pub(crate) fail_user_role_removal: AtomicBool,
    pub(crate) yield_after_user_role_insert: AtomicBool,
    next_id: AtomicI64,
}

impl FakeRoleRepository {
    pub(crate) async fn seed(&self, id: i64, name: &str) -> Role {
        let role = Role {
            id: RoleId::new(id),
            name: tierup_domain::RoleName::new(name)
                .unwrap_or_else(|error| panic!("invalid role name: {error}")),
            display_name: name.to_owned(),
            description: String::new(),
        };
        self.next_id.fetch_max(id, Ordering::SeqCst);
        self.roles.lock().await.push(role.clone());
        role
    }
}

#[async_trait]
impl RoleRepository for FakeRoleRepository {
    async fn find_by_id(&self, role_id: RoleId) -> AppResult<Option<Role>> {
        Ok(self
            .roles
            .lock()
            .await
            .iter()
            .find(|role| role.id == role_id)
            .cloned())
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Role>> {
        Ok(self
            .roles
            .lock()
            .await
            .iter()
            .find(|role| role.name.as_str() == name)
            .cloned())
    }

    async fn create(&self, input: &RoleInput) -> AppResult<Role> {
        let role = Role {
            id: RoleId::new(self.next_id.fetch_add(1, Ordering::SeqCst) + 1),
            name: input.name.clone(),
            display_name: input.display_name.clone(),
            description: input.description.clone(),
        };
        self.roles.lock().await.push(role.clone());
        Ok(role)
    }

    async fn update(&self, role_id: RoleId, input: &RoleInput) -> AppResult<Role> {
        if let Some(remaining) = self.fail_update_after.lock().await.as_mut() {
            if *remaining == 0 {
                return Err(injected("role update"));
            }
            *remaining -= 1;
        }

        let mut roles = self.roles.lock().await;
        let role = roles
            .iter_mut()
            .find(|role| role.id == role_id)
            .ok_or_else(|| AppError::NotFound(format!("role {role_id} not found")))?;
        role.name = input.name.clone();
        role.display_name.clone_from(&input.display_name);
        role.description.clone_from(&input.description);
        Ok(role.clone())
    }

    async fn delete(&self, role_id: RoleId) -> AppResult<bool> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(injected("role delete"));
        }

        let mut roles = self.roles.lock().await;
        let before = roles.len();
        roles.retain(|role| role.id != role_id);
        self.user_roles
            .lock()
            .await
            .retain(|(_, stored_role_id)| *stored_role_id != role_id);
        Ok(roles.len() != before)
    }

    async fn list(&self, page: PageRequest) -> AppResult<Page<Role>> {
        let roles = self.roles.lock().await;
        let offset = usize::try_from(page.offset()).unwrap_or_default();
        let limit = usize::try_from(page.limit()).unwrap_or_default();

        Ok(Page {
            list: roles.iter().skip(offset).take(limit).cloned().collect(),
            total: i64::try_from(roles.len()).unwrap_or_default(),
            page: page.page(),
            page_size: page.page_size(),
        })
    }

    async fn list_for_user(&self, user_id: UserId) -> AppResult<Vec<Role>> {
        let user_roles = self.user_roles.lock().await;
        Ok(self
            .roles
            .lock()
            .await
            .iter()
            .filter(|role| user_roles.contains(&(user_id, role.id)))
            .cloned()
            .collect())
    }

    async fn add_user_role(&self, user_id: UserId, role_id: RoleId) -> AppResult<bool> {
        let inserted = self.user_roles.lock().await.insert((user_id, role_id));
        pause_if_requested(&self.yield_after_user_role_insert).await;
        Ok(inserted)
    }

    async fn remove_user_role(&self, user_id: UserId, role_id: RoleId) -> AppResult<bool> {
        if self.fail_user_role_removal.load(Ordering::SeqCst) {
            return Err(injected("user_roles delete"));
        }
        Ok(self.user_roles.lock().await.remove(&(user_id, role_id)))
    }
}

pub(crate) struct FakePasswordHasher;

impl PasswordHasher for FakePasswordHasher {
    fn hash_password(&self, password: &str) -> AppResult<String> {
        Ok(format!("hashed:{password}"))
    }

    fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool> {
        Ok(hash == format!("hashed:{password}"))
    }
}

pub(crate) struct FakeTokenService;

impl IdentityTokenService for FakeTokenService {
    fn issue(&self, subject_id: i64, subject_name: &str) -> AppResult<IssuedToken> {
        Ok(IssuedToken {
            token: format!("{subject_id}:{subject_name}"),
            expires_at: 0,
        })
    }

    fn validate(&self, token: &str) -> AppResult<AuthenticatedSubject> {
        let (id, name) = token
            .split_once(':')
            .ok_or_else(|| AppError::Unauthorized("malformed token".to_owned()))?;
        let id = id
            .parse()
            .map_err(|_| AppError::Unauthorized("malformed token".to_owned()))?;
        Ok(AuthenticatedSubject::new(id, name))
    }
}

pub(crate) fn policy_store(repository: Arc<FakePolicyRepository>) -> PolicyStore {
    PolicyStore::new(repository, PolicyEngine::new())
}
