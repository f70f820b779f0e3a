use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::contract::model::{NewUser, User, UserUpdate};
use crate::domain::error::DomainError;
use crate::domain::repo::UsersStore;

/// Domain service with business rules for user management.
/// Depends only on the repository port, not on infra types.
///
/// Every mutating operation runs its read-check-write sequence inside one
/// storage transaction. Returning early drops the transaction, which rolls
/// it back.
#[derive(Clone)]
pub struct Service {
    store: Arc<dyn UsersStore>,
}

impl Service {
    pub fn new(store: Arc<dyn UsersStore>) -> Self {
        Self { store }
    }

    #[instrument(name = "users.service.create", skip(self, candidate), fields(email = %candidate.email))]
    pub async fn create(&self, candidate: NewUser) -> Result<User, DomainError> {
        info!("Creating user");

        let tx = self.store.begin().await?;

        if tx.exists_by_email(&candidate.email).await? {
            warn!("Email already exists");
            return Err(DomainError::email_already_exists(candidate.email));
        }

        // A concurrent insert can still win the race past the check above;
        // the unique index then rejects ours and the adapter reports EmailTaken.
        let user = tx.insert(candidate).await?;
        tx.commit().await?;

        info!(user_id = user.id, "User created");
        Ok(user)
    }

    #[instrument(name = "users.service.get_by_id", skip(self), fields(user_id = id))]
    pub async fn get_by_id(&self, id: i64) -> Result<User, DomainError> {
        debug!("Fetching user");
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::user_not_found(id))
    }

    #[instrument(name = "users.service.get_all", skip(self))]
    pub async fn get_all(&self) -> Result<Vec<User>, DomainError> {
        debug!("Fetching all users");
        let users = self.store.find_all().await?;
        debug!("Fetched {} users", users.len());
        Ok(users)
    }

    /// Full replace of name, email and active. Email uniqueness is not
    /// pre-checked here; a conflicting write is rejected by storage and
    /// reported as `EmailAlreadyExists`.
    #[instrument(name = "users.service.update", skip(self, new_details), fields(user_id = id))]
    pub async fn update(&self, id: i64, new_details: UserUpdate) -> Result<User, DomainError> {
        info!("Updating user");

        let tx = self.store.begin().await?;
        let mut user = tx
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::user_not_found(id))?;

        user.apply(new_details);
        let updated = tx.update(user).await?;
        tx.commit().await?;

        info!("User updated");
        Ok(updated)
    }

    #[instrument(name = "users.service.delete", skip(self), fields(user_id = id))]
    pub async fn delete(&self, id: i64) -> Result<(), DomainError> {
        info!("Deleting user");

        let tx = self.store.begin().await?;
        if !tx.exists_by_id(id).await? {
            return Err(DomainError::user_not_found(id));
        }
        tx.delete_by_id(id).await?;
        tx.commit().await?;

        info!("User deleted");
        Ok(())
    }

    /// Soft delete. Deactivating an inactive user is a no-op that still
    /// returns the stored row.
    #[instrument(name = "users.service.deactivate", skip(self), fields(user_id = id))]
    pub async fn deactivate(&self, id: i64) -> Result<User, DomainError> {
        info!("Deactivating user");

        let tx = self.store.begin().await?;
        let mut user = tx
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::user_not_found(id))?;

        user.active = false;
        let deactivated = tx.update(user).await?;
        tx.commit().await?;

        info!("User deactivated");
        Ok(deactivated)
    }

    /// Number of stored users.
    pub async fn count(&self) -> Result<u64, DomainError> {
        Ok(self.store.count().await?)
    }
}
