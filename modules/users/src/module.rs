use std::sync::Arc;

use axum::Router;
use tracing::info;

use crate::api::{ingress, rest::routes};
use crate::domain::service::Service;
use crate::infra::db::{self, DbPools};
use crate::infra::storage::sea_orm_repo::SeaOrmUsersRepository;

/// HTTP settings for the router built by [`UsersModule::router`].
#[derive(Debug, Clone)]
pub struct UsersModuleConfig {
    /// Per-request timeout in seconds; 0 disables it.
    pub timeout_sec: u64,
    pub body_limit_bytes: usize,
    pub cors_enabled: bool,
}

impl Default for UsersModuleConfig {
    fn default() -> Self {
        Self {
            timeout_sec: 30,
            body_limit_bytes: 1024 * 1024,
            cors_enabled: false,
        }
    }
}

/// Users module: storage, domain service and HTTP surface wired together.
#[derive(Clone)]
pub struct UsersModule {
    service: Arc<Service>,
    config: UsersModuleConfig,
}

impl UsersModule {
    /// Migrate the schema and wire the SeaORM repository into the service.
    pub async fn init(pools: DbPools, config: UsersModuleConfig) -> anyhow::Result<Self> {
        info!("Initializing users module");

        db::migrate(&pools.writer).await?;

        // Wire repository (infra) to domain service (port)
        let repo = SeaOrmUsersRepository::from_pools(pools);
        let service = Service::new(Arc::new(repo));

        Ok(Self {
            service: Arc::new(service),
            config,
        })
    }

    /// Module backed by a private in-memory SQLite database.
    pub async fn in_memory(config: UsersModuleConfig) -> anyhow::Result<Self> {
        let pools = db::connect("sqlite::memory:", db::ConnectOpts::default()).await?;
        Self::init(pools, config).await
    }

    pub fn service(&self) -> Arc<Service> {
        self.service.clone()
    }

    /// Full application router: users REST API, `/health`, `/openapi.json`
    /// and the shared middleware stack.
    pub fn router(&self) -> Router {
        info!("Registering users REST routes");
        let routes = routes::register_routes(Router::new(), self.service.clone());
        ingress::build_router(routes, &self.config)
    }
}
