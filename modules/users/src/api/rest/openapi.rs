use utoipa::OpenApi;

use crate::api::rest::dto::{UserDto, UserReq};
use crate::api::rest::error::{ErrorBody, FieldErrors};
use crate::api::rest::handlers;

/// OpenAPI document for the users REST API, served at `/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Users Service",
        description = "CRUD and soft-deactivation of user records"
    ),
    paths(
        handlers::create_user,
        handlers::get_user,
        handlers::list_users,
        handlers::update_user,
        handlers::delete_user,
        handlers::deactivate_user,
    ),
    components(schemas(UserDto, UserReq, ErrorBody, FieldErrors)),
    tags((name = "users", description = "User management"))
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = serde_json::to_value(ApiDoc::openapi()).unwrap();
        let paths = doc["paths"].as_object().unwrap();

        assert!(paths["/api/users"]["get"].is_object());
        assert!(paths["/api/users"]["post"].is_object());
        assert!(paths["/api/users/{id}"]["get"].is_object());
        assert!(paths["/api/users/{id}"]["put"].is_object());
        assert!(paths["/api/users/{id}"]["delete"].is_object());
        assert!(paths["/api/users/{id}/deactivate"]["patch"].is_object());

        let schemas = doc["components"]["schemas"].as_object().unwrap();
        for name in ["UserDto", "UserReq", "ErrorBody", "FieldErrors"] {
            assert!(schemas.contains_key(name), "missing schema {name}");
        }
    }
}
