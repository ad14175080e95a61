//! 基础设施资源管理
//!
//! 根据配置组装所有外部依赖的适配器

use std::sync::Arc;
use std::time::Duration;

use pgprov_adapter_os::{FileSentinel, TokioCommandRunner};
use pgprov_adapter_postgres::{
    PgPoolFactory, PostgresConfig, RecoveryProbeDiscovery, StaticDiscovery,
};
use pgprov_config::{AppConfig, DiscoveryConfig, parse_endpoint};
use pgprov_errors::{AppError, AppResult};
use pgprov_ports::{CommandRunner, PoolFactory, PrimaryDescriptor, PrimaryDiscovery, SentinelStore};
use tracing::info;

/// 基础设施资源容器
pub struct Infrastructure {
    discovery: Arc<dyn PrimaryDiscovery>,
    pools: Arc<dyn PoolFactory>,
    commands: Arc<dyn CommandRunner>,
    sentinel: Arc<dyn SentinelStore>,
}

impl Infrastructure {
    /// 从配置创建基础设施资源
    ///
    /// 不建立任何连接：连接池延迟连接，发现机制在运行时启动
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        let db = &config.database;

        // 主机与端口在获得主库后替换
        let template = PostgresConfig::from_components(
            "localhost",
            5432,
            db.admin_database.clone(),
            db.admin_user.clone(),
        )
        .with_password(db.admin_password.clone())
        .with_pool_max(config.pool.max_connections)
        .with_acquire_timeout(config.pool.acquire_timeout())
        .with_idle_timeout(config.pool.idle_timeout());

        let discovery: Arc<dyn PrimaryDiscovery> = match &config.discovery {
            DiscoveryConfig::Static { primary } => {
                let primary = to_descriptor(primary)?;
                info!(primary = %primary, "Using static primary");
                Arc::new(StaticDiscovery::new(primary))
            }
            DiscoveryConfig::Probe {
                candidates,
                poll_interval_ms,
            } => {
                let candidates = candidates
                    .iter()
                    .map(String::as_str)
                    .map(to_descriptor)
                    .collect::<AppResult<Vec<_>>>()?;
                info!(candidates = candidates.len(), "Using recovery probe discovery");
                Arc::new(RecoveryProbeDiscovery::new(
                    candidates,
                    template.clone(),
                    Duration::from_millis(*poll_interval_ms),
                ))
            }
        };

        let pools: Arc<dyn PoolFactory> = Arc::new(PgPoolFactory::new(template, db.name.clone()));

        let mut runner = TokioCommandRunner::new();
        if let Some(password) = &db.admin_password {
            runner = runner.with_secret_env("PGPASSWORD", password.clone());
        }
        let commands: Arc<dyn CommandRunner> = Arc::new(runner);

        let sentinel: Arc<dyn SentinelStore> =
            Arc::new(FileSentinel::new(config.sentinel.path.clone()));

        Ok(Self {
            discovery,
            pools,
            commands,
            sentinel,
        })
    }

    pub fn discovery(&self) -> &dyn PrimaryDiscovery {
        self.discovery.as_ref()
    }

    pub fn pools(&self) -> &dyn PoolFactory {
        self.pools.as_ref()
    }

    pub fn commands(&self) -> Arc<dyn CommandRunner> {
        self.commands.clone()
    }

    pub fn sentinel(&self) -> Arc<dyn SentinelStore> {
        self.sentinel.clone()
    }
}

fn to_descriptor(endpoint: &str) -> AppResult<PrimaryDescriptor> {
    let (host, port) = parse_endpoint(endpoint).map_err(|e| AppError::config(e.to_string()))?;
    Ok(PrimaryDescriptor::new(host, port))
}
