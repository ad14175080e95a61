//! PostgreSQL 连接管理

use std::sync::Arc;

use async_trait::async_trait;
use pgprov_errors::AppResult;
use pgprov_ports::{ConnectionPool, PoolFactory, PrimaryDescriptor, QueryExecutor};
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use crate::config::PostgresConfig;
use crate::executor::PgQueryExecutor;

/// 创建延迟连接的连接池
///
/// 首次查询时才建立连接，因此目标数据库在创建前也可以先构建连接池
pub fn create_lazy_pool(config: &PostgresConfig) -> PgPool {
    PgPoolOptions::new()
        .max_connections(config.pool_max)
        .min_connections(0)
        .acquire_timeout(config.acquire_timeout)
        .idle_timeout(config.idle_timeout)
        .connect_lazy_with(config.connect_options())
}

/// 绑定到同一主库的两个连接池：维护库与目标库
pub struct PgPools {
    admin: Arc<PgQueryExecutor>,
    target: Arc<PgQueryExecutor>,
}

impl PgPools {
    /// 为主库创建连接池
    pub fn new(admin_config: &PostgresConfig, target_database: &str) -> Self {
        let target_config = admin_config.for_database(target_database);
        Self {
            admin: Arc::new(PgQueryExecutor::new(
                create_lazy_pool(admin_config),
                admin_config.database.clone(),
            )),
            target: Arc::new(PgQueryExecutor::new(
                create_lazy_pool(&target_config),
                target_config.database,
            )),
        }
    }
}

#[async_trait]
impl ConnectionPool for PgPools {
    fn admin(&self) -> Arc<dyn QueryExecutor> {
        self.admin.clone()
    }

    fn target(&self) -> Arc<dyn QueryExecutor> {
        self.target.clone()
    }

    async fn close(&self) {
        self.admin.pool().close().await;
        self.target.pool().close().await;
        info!("PostgreSQL connection pools closed");
    }
}

/// 按主库地址创建 [`PgPools`]
pub struct PgPoolFactory {
    /// 主机与端口在连接时替换为主库地址
    template: PostgresConfig,
    target_database: String,
}

impl PgPoolFactory {
    pub fn new(template: PostgresConfig, target_database: impl Into<String>) -> Self {
        Self {
            template,
            target_database: target_database.into(),
        }
    }
}

#[async_trait]
impl PoolFactory for PgPoolFactory {
    async fn connect(&self, primary: &PrimaryDescriptor) -> AppResult<Arc<dyn ConnectionPool>> {
        let admin_config = self.template.for_host(primary.address(), primary.port());
        let pools = PgPools::new(&admin_config, &self.target_database);

        info!(
            primary = %primary,
            admin_database = %admin_config.database,
            target_database = %self.target_database,
            max_connections = admin_config.pool_max,
            "PostgreSQL connection pools created"
        );

        Ok(Arc::new(pools))
    }
}
