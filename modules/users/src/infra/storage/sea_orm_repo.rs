//! SeaORM-backed repository implementation for the domain port.
//!
//! The struct is generic over `C: ConnectionTrait`, so the same code serves
//! the pooled `DatabaseConnection` and a `DatabaseTransaction`. `begin()` on
//! the pooled variant hands out the transactional one, opened on the writer
//! pool when one is attached.

use anyhow::Context;
use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    DbErr, EntityTrait, NotSet, PaginatorTrait, QueryFilter, QueryOrder, Set, SqlErr,
    TransactionTrait,
};

use crate::contract::model::{NewUser, User};
use crate::domain::repo::{SaveError, UsersRepository, UsersStore, UsersTx};
use crate::infra::db::DbPools;
use crate::infra::storage::entity::{ActiveModel as UserAM, Column, Entity as UserEntity};

/// SeaORM repository impl.
/// Holds a connection object; its lifetime/ownership is up to the caller.
pub struct SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    conn: C,
    writer: Option<DatabaseConnection>,
}

impl<C> SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn, writer: None }
    }
}

impl SeaOrmUsersRepository<DatabaseConnection> {
    /// Reads on `pools.reader`; every transaction on `pools.writer`.
    pub fn from_pools(pools: DbPools) -> Self {
        Self {
            conn: pools.reader,
            writer: Some(pools.writer),
        }
    }
}

/// Unique index violations are the only write failure the domain cares about.
fn save_error(e: DbErr, email: &str, op: &'static str) -> SaveError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => SaveError::EmailTaken(email.to_string()),
        _ => SaveError::Other(anyhow::Error::new(e).context(op)),
    }
}

#[async_trait]
impl<C> UsersRepository for SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<User>> {
        let found = UserEntity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("find_by_id failed")?;
        Ok(found.map(Into::into))
    }

    async fn find_all(&self) -> anyhow::Result<Vec<User>> {
        let rows = UserEntity::find()
            .order_by_asc(Column::Id)
            .all(&self.conn)
            .await
            .context("find_all failed")?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let found = UserEntity::find()
            .filter(Column::Email.eq(email))
            .one(&self.conn)
            .await
            .context("find_by_email failed")?;
        Ok(found.map(Into::into))
    }

    async fn exists_by_email(&self, email: &str) -> anyhow::Result<bool> {
        let count = UserEntity::find()
            .filter(Column::Email.eq(email))
            .count(&self.conn)
            .await
            .context("exists_by_email failed")?;
        Ok(count > 0)
    }

    async fn exists_by_id(&self, id: i64) -> anyhow::Result<bool> {
        let count = UserEntity::find_by_id(id)
            .count(&self.conn)
            .await
            .context("exists_by_id failed")?;
        Ok(count > 0)
    }

    async fn insert(&self, new_user: NewUser) -> Result<User, SaveError> {
        let email = new_user.email.clone();
        let m = UserAM {
            id: NotSet,
            name: Set(new_user.name),
            email: Set(new_user.email),
            active: Set(new_user.active),
        };
        let saved = m
            .insert(&self.conn)
            .await
            .map_err(|e| save_error(e, &email, "insert failed"))?;
        Ok(saved.into())
    }

    async fn update(&self, user: User) -> Result<User, SaveError> {
        let email = user.email.clone();
        let m = UserAM {
            id: Set(user.id),
            name: Set(user.name),
            email: Set(user.email),
            active: Set(user.active),
        };
        let saved = m
            .update(&self.conn)
            .await
            .map_err(|e| save_error(e, &email, "update failed"))?;
        Ok(saved.into())
    }

    async fn delete_by_id(&self, id: i64) -> anyhow::Result<bool> {
        let res = UserEntity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("delete failed")?;
        Ok(res.rows_affected > 0)
    }

    async fn count(&self) -> anyhow::Result<u64> {
        UserEntity::find()
            .count(&self.conn)
            .await
            .context("count failed")
    }

    async fn delete_all(&self) -> anyhow::Result<u64> {
        let res = UserEntity::delete_many()
            .exec(&self.conn)
            .await
            .context("delete_all failed")?;
        Ok(res.rows_affected)
    }
}

#[async_trait]
impl UsersStore for SeaOrmUsersRepository<DatabaseConnection> {
    async fn begin(&self) -> anyhow::Result<Box<dyn UsersTx>> {
        let txn = self
            .writer
            .as_ref()
            .unwrap_or(&self.conn)
            .begin()
            .await
            .context("begin transaction failed")?;
        Ok(Box::new(SeaOrmUsersRepository::new(txn)))
    }
}

#[async_trait]
impl UsersTx for SeaOrmUsersRepository<DatabaseTransaction> {
    async fn commit(self: Box<Self>) -> anyhow::Result<()> {
        self.conn.commit().await.context("commit failed")
    }
}
