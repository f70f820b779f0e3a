use std::sync::Arc;

use axum::{
    routing::{get, patch},
    Extension, Router,
};

use crate::api::rest::handlers;
use crate::domain::service::Service;

/// Mount the users REST API under `/api/users`.
pub fn register_routes(router: Router, service: Arc<Service>) -> Router {
    let users = Router::new()
        .route(
            "/api/users",
            get(handlers::list_users).post(handlers::create_user),
        )
        .route(
            "/api/users/{id}",
            get(handlers::get_user)
                .put(handlers::update_user)
                .delete(handlers::delete_user),
        )
        .route("/api/users/{id}/deactivate", patch(handlers::deactivate_user))
        .layer(Extension(service));

    router.merge(users)
}
