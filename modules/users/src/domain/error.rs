use thiserror::Error;

use crate::domain::repo::SaveError;

/// Domain-specific errors using thiserror
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("User not found with id: {id}")]
    UserNotFound { id: i64 },

    #[error("Email already exists: {email}")]
    EmailAlreadyExists { email: String },

    #[error("Database error: {message}")]
    Database { message: String },
}

impl DomainError {
    pub fn user_not_found(id: i64) -> Self {
        Self::UserNotFound { id }
    }

    pub fn email_already_exists(email: impl Into<String>) -> Self {
        Self::EmailAlreadyExists {
            email: email.into(),
        }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }
}

impl From<anyhow::Error> for DomainError {
    fn from(e: anyhow::Error) -> Self {
        // `{:#}` keeps the context chain on one line
        Self::database(format!("{e:#}"))
    }
}

impl From<SaveError> for DomainError {
    fn from(e: SaveError) -> Self {
        match e {
            SaveError::EmailTaken(email) => Self::email_already_exists(email),
            SaveError::Other(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_match_http_contract() {
        assert_eq!(
            DomainError::user_not_found(42).to_string(),
            "User not found with id: 42"
        );
        assert_eq!(
            DomainError::email_already_exists("a@b.io").to_string(),
            "Email already exists: a@b.io"
        );
    }

    #[test]
    fn storage_conflicts_become_duplicate_email() {
        let e = DomainError::from(SaveError::EmailTaken("a@b.io".into()));
        assert!(matches!(e, DomainError::EmailAlreadyExists { ref email } if email == "a@b.io"));
    }

    #[test]
    fn anyhow_errors_become_database_errors_with_context() {
        let e = anyhow::anyhow!("disk full").context("insert failed");
        match DomainError::from(e) {
            DomainError::Database { message } => assert_eq!(message, "insert failed: disk full"),
            other => panic!("expected Database, got {other:?}"),
        }
    }
}
