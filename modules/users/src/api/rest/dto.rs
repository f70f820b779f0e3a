use std::borrow::Cow;

use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidateEmail, ValidationError};

use crate::contract::model::{NewUser, User, UserUpdate};

/// REST representation of a stored user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserDto {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub active: bool,
}

/// Request body for create and full update.
///
/// `id` is accepted for symmetry with [`UserDto`] and ignored. Missing or
/// null strings are read as empty so they fail validation with a field
/// message instead of a decoding error.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct UserReq {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "null_as_empty")]
    #[validate(custom(function = "validate_name"))]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    #[validate(custom(function = "validate_email"))]
    pub email: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

impl UserReq {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            email: email.into(),
            active: true,
        }
    }
}

fn default_active() -> bool {
    true
}

fn null_as_empty<'de, D>(d: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(d)?.unwrap_or_default())
}

fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::new("required").with_message(Cow::Borrowed("Name is required")));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.trim().is_empty() {
        return Err(
            ValidationError::new("required").with_message(Cow::Borrowed("Email is required"))
        );
    }
    if !email.validate_email() {
        return Err(
            ValidationError::new("email").with_message(Cow::Borrowed("Email should be valid"))
        );
    }
    Ok(())
}

// Conversion implementations between REST DTOs and contract models

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            active: user.active,
        }
    }
}

impl From<UserReq> for NewUser {
    fn from(req: UserReq) -> Self {
        Self {
            name: req.name,
            email: req.email,
            active: req.active,
        }
    }
}

impl From<UserReq> for UserUpdate {
    fn from(req: UserReq) -> Self {
        Self {
            name: req.name,
            email: req.email,
            active: req.active,
        }
    }
}
