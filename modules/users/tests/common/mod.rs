#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use users::contract::model::{NewUser, User};
use users::domain::repo::{SaveError, UsersRepository, UsersStore, UsersTx};
use users::domain::service::Service;
use users::infra::db;
use users::infra::storage::sea_orm_repo::SeaOrmUsersRepository;
use users::{UsersModule, UsersModuleConfig};

/// Service over a fresh migrated in-memory SQLite database.
pub async fn sqlite_service() -> Service {
    let pools = db::connect_in_memory().await.expect("in-memory db");
    Service::new(Arc::new(SeaOrmUsersRepository::from_pools(pools)))
}

/// Service over a migrated SQLite file in `dir`, opened with the default
/// pool settings the server uses.
pub async fn sqlite_file_service(dir: &std::path::Path) -> Service {
    let dsn = format!("sqlite://{}/users.db?mode=rwc", dir.display());
    let pools = db::connect(&dsn, db::ConnectOpts::default())
        .await
        .expect("file db");
    db::migrate(&pools.writer).await.expect("migrations");
    Service::new(Arc::new(SeaOrmUsersRepository::from_pools(pools)))
}

/// Full application router over a fresh in-memory database.
pub async fn test_router() -> Router {
    UsersModule::in_memory(UsersModuleConfig::default())
        .await
        .expect("users module")
        .router()
}

/// Send one request through the router; returns status and parsed JSON body
/// (`Value::Null` for an empty body).
pub async fn send(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(v) => {
            builder = builder.header("content-type", "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };
    let resp = router
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

/// How the fake store misbehaves.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Fault {
    #[default]
    None,
    /// `exists_by_email` says no, then the insert hits the unique constraint,
    /// as when a concurrent create commits between the two.
    LostInsertRace,
    /// Every call fails with a storage error.
    Broken,
}

/// In-process store with no real isolation; transactions share the rows.
#[derive(Clone, Default)]
pub struct FakeStore {
    users: Arc<Mutex<Vec<User>>>,
    next_id: Arc<Mutex<i64>>,
    fault: Fault,
}

impl FakeStore {
    pub fn new(fault: Fault) -> Self {
        Self {
            fault,
            ..Default::default()
        }
    }

    pub fn len(&self) -> usize {
        self.users.lock().unwrap().len()
    }

    fn check(&self) -> anyhow::Result<()> {
        if self.fault == Fault::Broken {
            anyhow::bail!("storage unavailable");
        }
        Ok(())
    }
}

#[async_trait]
impl UsersRepository for FakeStore {
    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<User>> {
        self.check()?;
        Ok(self.users.lock().unwrap().iter().find(|u| u.id == id).cloned())
    }

    async fn find_all(&self) -> anyhow::Result<Vec<User>> {
        self.check()?;
        Ok(self.users.lock().unwrap().clone())
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        self.check()?;
        Ok(self.users.lock().unwrap().iter().find(|u| u.email == email).cloned())
    }

    async fn exists_by_email(&self, email: &str) -> anyhow::Result<bool> {
        self.check()?;
        if self.fault == Fault::LostInsertRace {
            return Ok(false);
        }
        Ok(self.users.lock().unwrap().iter().any(|u| u.email == email))
    }

    async fn exists_by_id(&self, id: i64) -> anyhow::Result<bool> {
        Ok(self.find_by_id(id).await?.is_some())
    }

    async fn insert(&self, new_user: NewUser) -> Result<User, SaveError> {
        self.check()?;
        if self.fault == Fault::LostInsertRace {
            return Err(SaveError::EmailTaken(new_user.email));
        }
        let mut next = self.next_id.lock().unwrap();
        *next += 1;
        let user = User {
            id: *next,
            name: new_user.name,
            email: new_user.email,
            active: new_user.active,
        };
        self.users.lock().unwrap().push(user.clone());
        Ok(user)
    }

    async fn update(&self, user: User) -> Result<User, SaveError> {
        self.check()?;
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == user.email && u.id != user.id) {
            return Err(SaveError::EmailTaken(user.email));
        }
        if let Some(slot) = users.iter_mut().find(|u| u.id == user.id) {
            *slot = user.clone();
        }
        Ok(user)
    }

    async fn delete_by_id(&self, id: i64) -> anyhow::Result<bool> {
        self.check()?;
        let mut users = self.users.lock().unwrap();
        let before = users.len();
        users.retain(|u| u.id != id);
        Ok(users.len() < before)
    }

    async fn count(&self) -> anyhow::Result<u64> {
        self.check()?;
        Ok(self.users.lock().unwrap().len() as u64)
    }

    async fn delete_all(&self) -> anyhow::Result<u64> {
        self.check()?;
        let mut users = self.users.lock().unwrap();
        let n = users.len() as u64;
        users.clear();
        Ok(n)
    }
}

#[async_trait]
impl UsersTx for FakeStore {
    async fn commit(self: Box<Self>) -> anyhow::Result<()> {
        self.check()
    }
}

#[async_trait]
impl UsersStore for FakeStore {
    async fn begin(&self) -> anyhow::Result<Box<dyn UsersTx>> {
        self.check()?;
        Ok(Box::new(self.clone()))
    }
}
