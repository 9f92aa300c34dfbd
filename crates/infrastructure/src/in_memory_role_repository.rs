use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use tokio::sync::RwLock;

use tierup_application::{RoleInput, RoleRepository};
use tierup_core::{AppError, AppResult};
use tierup_domain::{Page, PageRequest, Role, RoleId, UserId};

#[derive(Debug, Default)]
struct RoleTables {
    next_id: i64,
    roles: BTreeMap<RoleId, Role>,
    user_roles: BTreeSet<(UserId, RoleId)>,
}

impl RoleTables {
    fn name_taken(&self, name: &str, except: Option<RoleId>) -> bool {
        self.roles
            .values()
            .any(|role| Some(role.id) != except && role.name.as_str() == name)
    }
}

/// In-memory role and `user_roles` repository.
#[derive(Debug, Default)]
pub struct InMemoryRoleRepository {
    tables: RwLock<RoleTables>,
}

impl InMemoryRoleRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn name_conflict(input: &RoleInput) -> AppError {
    AppError::Conflict(format!("role '{}' already exists", input.name.as_str()))
}

#[async_trait]
impl RoleRepository for InMemoryRoleRepository {
    async fn find_by_id(&self, role_id: RoleId) -> AppResult<Option<Role>> {
        Ok(self.tables.read().await.roles.get(&role_id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Role>> {
        Ok(self
            .tables
            .read()
            .await
            .roles
            .values()
            .find(|role| role.name.as_str() == name)
            .cloned())
    }

    async fn create(&self, input: &RoleInput) -> AppResult<Role> {
        let mut tables = self.tables.write().await;
        if tables.name_taken(input.name.as_str(), None) {
            return Err(name_conflict(input));
        }

        tables.next_id += 1;
        let role = Role {
            id: RoleId::new(tables.next_id),
            name: input.name.clone(),
            display_name: input.display_name.clone(),
            description: input.description.clone(),
        };
        tables.roles.insert(role.id, role.clone());

        Ok(role)
    }

    async fn update(&self, role_id: RoleId, input: &RoleInput) -> AppResult<Role> {
        let mut tables = self.tables.write().await;
        if tables.name_taken(input.name.as_str(), Some(role_id)) {
            return Err(name_conflict(input));
        }

        let role = tables
            .roles
            .get_mut(&role_id)
            .ok_or_else(|| AppError::NotFound(format!("role {role_id} not found")))?;
        role.name = input.name.clone();
        role.display_name.clone_from(&input.display_name);
        role.description.clone_from(&input.description);

        Ok(role.clone())
    }

    async fn delete(&self, role_id: RoleId) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        tables
            .user_roles
            .retain(|(_, assigned_role)| *assigned_role != role_id);
        Ok(tables.roles.remove(&role_id).is_some())
    }

    async fn list(&self, page: PageRequest) -> AppResult<Page<Role>> {
        let tables = self.tables.read().await;
        let skip = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let take = usize::try_from(page.limit()).unwrap_or_default();

        Ok(Page {
            list: tables.roles.values().skip(skip).take(take).cloned().collect(),
            total: i64::try_from(tables.roles.len()).unwrap_or(i64::MAX),
            page: page.page(),
            page_size: page.page_size(),
        })
    }

    async fn list_for_user(&self, user_id: UserId) -> AppResult<Vec<Role>> {
        let tables = self.tables.read().await;
        Ok(tables
            .user_roles
            .iter()
            .filter(|(assigned_user, _)| *assigned_user == user_id)
            .filter_map(|(_, role_id)| tables.roles.get(role_id).cloned())
            .collect())
    }

    async fn add_user_role(&self, user_id: UserId, role_id: RoleId) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        if !tables.roles.contains_key(&role_id) {
            return Err(AppError::NotFound(format!("role {role_id} not found")));
        }
        Ok(tables.user_roles.insert((user_id, role_id)))
    }

    async fn remove_user_role(&self, user_id: UserId, role_id: RoleId) -> AppResult<bool> {
        Ok(self
            .tables
            .write()
            .await
            .user_roles
            .remove(&(user_id, role_id)))
    }
}

#[cfg(test)]
mod tests {
    use tierup_application::{RoleInput, RoleRepository};
    use tierup_domain::{PageRequest, RoleName, UserId};

    use super::InMemoryRoleRepository;

    fn input(name: &str) -> RoleInput {
        RoleInput {
            name: match RoleName::new(name) {
                Ok(name) => name,
                Err(error) => panic!("invalid role name: {error}"),
            },
            display_name: name.to_owned(),
            description: String::new(),
        }
    }

    #[tokio::test]
    async fn delete_cascades_to_memberships() {
        let repository = InMemoryRoleRepository::new();
        let Ok(role) = repository.create(&input("editor")).await else {
            panic!("role should be created");
        };
        let user = UserId::new(7);

        assert!(matches!(repository.add_user_role(user, role.id).await, Ok(true)));
        assert!(matches!(repository.delete(role.id).await, Ok(true)));
        assert!(
            repository
                .list_for_user(user)
                .await
                .unwrap_or_default()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn list_pages_in_id_order() {
        let repository = InMemoryRoleRepository::new();
        for name in ["alpha", "beta", "gamma"] {
            assert!(repository.create(&input(name)).await.is_ok());
        }

        let page = repository.list(PageRequest::new(Some(2), Some(2))).await;

        let Ok(page) = page else {
            panic!("list should succeed");
        };
        assert_eq!(page.total, 3);
        assert_eq!(page.list.len(), 1);
        assert_eq!(page.list[0].name.as_str(), "gamma");
    }
}
