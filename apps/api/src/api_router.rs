use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post, put};
use tierup_core::AppError;
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{handlers, middleware};

mod cors;


use cors::build_cors_layer;

pub fn build_router(app_state: AppState, frontend_url: &str) -> Result<Router, AppError> {
    Ok(routes(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer(frontend_url)?))
}

fn routes(app_state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/api/v1/health", get(handlers::health::health_handler))
        .route(
            "/api/v1/register",
            post(handlers::account::register_handler),
        )
        .route("/api/v1/login", post(handlers::account::login_handler));

    let account_routes = Router::new()
        .route(
            "/api/v1/user/info",
            get(handlers::account::profile_handler)
                .put(handlers::account::update_profile_handler),
        )
        .route(
            "/api/v1/user/password",
            put(handlers::account::change_password_handler),
        )
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_auth,
        ));

    // Layers wrap outward: authentication runs before the permission gate.
    let rbac_routes = Router::new()
        .route(
            "/api/v1/user/{id}/role",
            post(handlers::assignments::assign_role_handler)
                .delete(handlers::assignments::remove_role_handler),
        )
        .route(
            "/api/v1/user/{id}/roles",
            get(handlers::assignments::list_user_roles_handler),
        )
        .route("/api/v1/role", post(handlers::roles::create_role_handler))
        .route(
            "/api/v1/role/{id}",
            get(handlers::roles::get_role_handler)
                .put(handlers::roles::update_role_handler)
                .delete(handlers::roles::delete_role_handler),
        )
        .route("/api/v1/roles", get(handlers::roles::list_roles_handler))
        .route(
            "/api/v1/permission",
            post(handlers::permissions::add_permission_handler)
                .delete(handlers::permissions::remove_permission_handler),
        )
        .route(
            "/api/v1/role-permissions/{name}",
            get(handlers::permissions::role_permissions_handler),
        )
        .route(
            "/api/v1/role-members/{name}",
            get(handlers::permissions::role_members_handler),
        )
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_permission,
        ))
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_auth,
        ));

    Router::new()
        .merge(public_routes)
        .merge(account_routes)
        .merge(rbac_routes)
        .with_state(app_state)
}
