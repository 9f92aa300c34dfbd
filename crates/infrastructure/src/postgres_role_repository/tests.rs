use tierup_application::{NewUser, RoleInput, RoleRepository, UserRepository};
use tierup_core::AppError;
use tierup_domain::{PageRequest, RoleName, UserId};

use crate::PostgresUserRepository;
use crate::test_database::{test_pool, unique};

use super::PostgresRoleRepository;

fn role_input(name: &str) -> RoleInput {
    RoleInput {
        name: match RoleName::new(name) {
            Ok(name) => name,
            Err(error) => panic!("invalid role name: {error}"),
        },
        display_name: name.to_owned(),
        description: "test role".to_owned(),
    }
}

async fn create_user(users: &PostgresUserRepository) -> UserId {
    let username = unique("member");
    let created = users
        .create(NewUser {
            username: username.clone(),
            password_hash: "$argon2id$placeholder".to_owned(),
            nickname: String::new(),
            email: format!("{username}@example.com"),
            phone: String::new(),
        })
        .await;

    match created {
        Ok(user) => user.id,
        Err(error) => panic!("user should be created: {error}"),
    }
}

#[tokio::test]
async fn create_rename_and_delete_role() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresRoleRepository::new(pool);
    let name = unique("editor");

    let Ok(created) = repository.create(&role_input(&name)).await else {
        panic!("role should be created");
    };
    let duplicate = repository.create(&role_input(&name)).await;
    assert!(matches!(duplicate, Err(AppError::Conflict(_))));

    let renamed = unique("author");
    let updated = repository.update(created.id, &role_input(&renamed)).await;
    assert!(matches!(updated, Ok(ref role) if role.name.as_str() == renamed));

    assert!(matches!(repository.delete(created.id).await, Ok(true)));
    assert!(matches!(repository.delete(created.id).await, Ok(false)));
    assert!(matches!(repository.find_by_id(created.id).await, Ok(None)));
}

#[tokio::test]
async fn list_reports_total_and_page() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresRoleRepository::new(pool);
    assert!(repository.create(&role_input(&unique("lister"))).await.is_ok());

    let page = repository.list(PageRequest::new(Some(1), Some(1))).await;

    assert!(page.is_ok());
    let Ok(page) = page else { return };
    assert!(page.total >= 1);
    assert_eq!(page.list.len(), 1);
    assert_eq!(page.page_size, 1);
}

#[tokio::test]
async fn user_role_association_is_idempotent() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let users = PostgresUserRepository::new(pool.clone());
    let repository = PostgresRoleRepository::new(pool);
    let user_id = create_user(&users).await;
    let Ok(role) = repository.create(&role_input(&unique("member_role"))).await else {
        panic!("role should be created");
    };

    assert!(matches!(repository.add_user_role(user_id, role.id).await, Ok(true)));
    assert!(matches!(repository.add_user_role(user_id, role.id).await, Ok(false)));
    assert_eq!(
        repository
            .list_for_user(user_id)
            .await
            .map(|roles| roles.len())
            .unwrap_or_default(),
        1
    );

    assert!(matches!(repository.remove_user_role(user_id, role.id).await, Ok(true)));
    assert!(matches!(repository.remove_user_role(user_id, role.id).await, Ok(false)));
}

#[tokio::test]
async fn assigning_missing_user_is_not_found() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresRoleRepository::new(pool);
    let Ok(role) = repository.create(&role_input(&unique("orphan"))).await else {
        panic!("role should be created");
    };

    let result = repository.add_user_role(UserId::new(i64::MAX), role.id).await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}
