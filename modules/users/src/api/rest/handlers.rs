use std::sync::Arc;

use axum::{http::StatusCode, response::Json, Extension};
use tracing::{error, info, warn};

use crate::api::rest::dto::{UserDto, UserReq};
use crate::api::rest::error::{ApiError, ErrorBody, FieldErrors};
use crate::api::rest::extract::{ApiPath, ValidatedJson};
use crate::domain::error::DomainError;
use crate::domain::service::Service;

/// Log a failed service call at a level that matches its HTTP class.
fn log_failure(op: &str, e: &DomainError) {
    match e {
        DomainError::Database { .. } => error!("Failed to {op}: {e}"),
        _ => warn!("Failed to {op}: {e}"),
    }
}

/// Create a new user
#[utoipa::path(
    post,
    path = "/api/users",
    tag = "users",
    operation_id = "users.create_user",
    request_body(content = UserReq, description = "User to create; id is ignored"),
    responses(
        (status = 201, description = "Created user", body = UserDto),
        (status = 400, description = "Invalid fields", body = FieldErrors),
        (status = 500, description = "Internal Server Error", body = ErrorBody),
    )
)]
pub async fn create_user(
    Extension(svc): Extension<Arc<Service>>,
    ValidatedJson(req): ValidatedJson<UserReq>,
) -> Result<(StatusCode, Json<UserDto>), ApiError> {
    info!("Creating user with email: {}", req.email);

    match svc.create(req.into()).await {
        Ok(user) => Ok((StatusCode::CREATED, Json(UserDto::from(user)))),
        Err(e) => {
            log_failure("create user", &e);
            Err(e.into())
        }
    }
}

/// Get a specific user by ID
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    tag = "users",
    operation_id = "users.get_user",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "User found", body = UserDto),
        (status = 404, description = "Not Found", body = ErrorBody),
        (status = 500, description = "Internal Server Error", body = ErrorBody),
    )
)]
pub async fn get_user(
    Extension(svc): Extension<Arc<Service>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<UserDto>, ApiError> {
    info!("Getting user with id: {}", id);

    match svc.get_by_id(id).await {
        Ok(user) => Ok(Json(UserDto::from(user))),
        Err(e) => {
            log_failure(&format!("get user {id}"), &e);
            Err(e.into())
        }
    }
}

/// List all users
#[utoipa::path(
    get,
    path = "/api/users",
    tag = "users",
    operation_id = "users.list_users",
    responses(
        (status = 200, description = "All users ordered by id", body = [UserDto]),
        (status = 500, description = "Internal Server Error", body = ErrorBody),
    )
)]
pub async fn list_users(
    Extension(svc): Extension<Arc<Service>>,
) -> Result<Json<Vec<UserDto>>, ApiError> {
    info!("Listing users");

    match svc.get_all().await {
        Ok(users) => Ok(Json(users.into_iter().map(UserDto::from).collect())),
        Err(e) => {
            log_failure("list users", &e);
            Err(e.into())
        }
    }
}

/// Replace name, email and active of an existing user
#[utoipa::path(
    put,
    path = "/api/users/{id}",
    tag = "users",
    operation_id = "users.update_user",
    params(("id" = i64, Path, description = "User id")),
    request_body(content = UserReq, description = "New user details; id is ignored"),
    responses(
        (status = 200, description = "Updated user", body = UserDto),
        (status = 400, description = "Invalid fields", body = FieldErrors),
        (status = 404, description = "Not Found", body = ErrorBody),
        (status = 500, description = "Internal Server Error", body = ErrorBody),
    )
)]
pub async fn update_user(
    Extension(svc): Extension<Arc<Service>>,
    ApiPath(id): ApiPath<i64>,
    ValidatedJson(req): ValidatedJson<UserReq>,
) -> Result<Json<UserDto>, ApiError> {
    info!("Updating user {}", id);

    match svc.update(id, req.into()).await {
        Ok(user) => Ok(Json(UserDto::from(user))),
        Err(e) => {
            log_failure(&format!("update user {id}"), &e);
            Err(e.into())
        }
    }
}

/// Delete a user by ID
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    tag = "users",
    operation_id = "users.delete_user",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 404, description = "Not Found", body = ErrorBody),
        (status = 500, description = "Internal Server Error", body = ErrorBody),
    )
)]
pub async fn delete_user(
    Extension(svc): Extension<Arc<Service>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<StatusCode, ApiError> {
    info!("Deleting user: {}", id);

    match svc.delete(id).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => {
            log_failure(&format!("delete user {id}"), &e);
            Err(e.into())
        }
    }
}

/// Mark a user inactive without removing it
#[utoipa::path(
    patch,
    path = "/api/users/{id}/deactivate",
    tag = "users",
    operation_id = "users.deactivate_user",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "Deactivated user", body = UserDto),
        (status = 404, description = "Not Found", body = ErrorBody),
        (status = 500, description = "Internal Server Error", body = ErrorBody),
    )
)]
pub async fn deactivate_user(
    Extension(svc): Extension<Arc<Service>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<UserDto>, ApiError> {
    info!("Deactivating user: {}", id);

    match svc.deactivate(id).await {
        Ok(user) => Ok(Json(UserDto::from(user))),
        Err(e) => {
            log_failure(&format!("deactivate user {id}"), &e);
            Err(e.into())
        }
    }
}
