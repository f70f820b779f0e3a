use async_trait::async_trait;
use thiserror::Error;

use crate::contract::model::{NewUser, User};

/// Write failure reported by the storage port.
#[derive(Debug, Error)]
pub enum SaveError {
    /// The storage uniqueness constraint on email rejected the write.
    #[error("email '{0}' is already taken")]
    EmailTaken(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Port for the domain layer: persistence operations the domain needs.
/// Object-safe and async-friendly via `async_trait`.
///
/// `insert` and `update` together form the `save` contract: a row without an
/// id is inserted and gets one assigned, a row with an id is overwritten.
#[async_trait]
pub trait UsersRepository: Send + Sync {
    /// Load a user by id.
    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<User>>;
    /// All users, ordered by id.
    async fn find_all(&self) -> anyhow::Result<Vec<User>>;
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;
    async fn exists_by_email(&self, email: &str) -> anyhow::Result<bool>;
    async fn exists_by_id(&self, id: i64) -> anyhow::Result<bool>;
    /// Insert a new row; storage assigns the id.
    async fn insert(&self, new_user: NewUser) -> Result<User, SaveError>;
    /// Overwrite the row identified by `user.id`.
    async fn update(&self, user: User) -> Result<User, SaveError>;
    /// Delete by id. Returns true if a row was deleted.
    async fn delete_by_id(&self, id: i64) -> anyhow::Result<bool>;
    async fn count(&self) -> anyhow::Result<u64>;
    /// Remove every row; returns how many were deleted.
    async fn delete_all(&self) -> anyhow::Result<u64>;
}

/// An open storage transaction. Dropping it without `commit` rolls back.
#[async_trait]
pub trait UsersTx: UsersRepository {
    async fn commit(self: Box<Self>) -> anyhow::Result<()>;
}

/// Repository that can open transactions around a read-check-write sequence.
#[async_trait]
pub trait UsersStore: UsersRepository {
    async fn begin(&self) -> anyhow::Result<Box<dyn UsersTx>>;
}
