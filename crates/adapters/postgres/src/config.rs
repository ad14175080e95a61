//! PostgreSQL 配置模块
//!
//! 提供连接到单个节点所需的配置，以及连接池参数

use std::time::Duration;

use secrecy::{ExposeSecret, Secret};
use sqlx::postgres::PgConnectOptions;

/// 默认应用名称（用于连接标识）
pub const DEFAULT_APPLICATION_NAME: &str = "pgprov-setup";

/// PostgreSQL 配置
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// 主机
    pub host: String,
    /// 端口
    pub port: u16,
    /// 数据库名
    pub database: String,
    /// 用户名
    pub username: String,
    /// 密码
    pub password: Option<Secret<String>>,

    /// 最大连接数
    pub pool_max: u32,
    /// 获取连接超时
    pub acquire_timeout: Duration,
    /// 空闲超时
    pub idle_timeout: Duration,

    /// 应用名称
    pub application_name: String,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            database: "postgres".to_string(),
            username: "postgres".to_string(),
            password: None,
            pool_max: 5,
            acquire_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(60),
            application_name: DEFAULT_APPLICATION_NAME.to_string(),
        }
    }
}

impl PostgresConfig {
    /// 从组件创建配置
    pub fn from_components(
        host: impl Into<String>,
        port: u16,
        database: impl Into<String>,
        username: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            database: database.into(),
            username: username.into(),
            ..Default::default()
        }
    }

    /// 设置密码
    pub fn with_password(mut self, password: Option<Secret<String>>) -> Self {
        self.password = password;
        self
    }

    /// 设置连接池大小
    pub fn with_pool_max(mut self, max: u32) -> Self {
        self.pool_max = max;
        self
    }

    /// 设置获取连接超时
    pub fn with_acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    /// 设置空闲超时
    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// 切换到同一节点上的另一个数据库
    pub fn for_database(&self, database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            ..self.clone()
        }
    }

    /// 切换到另一个节点
    pub fn for_host(&self, host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..self.clone()
        }
    }

    /// 从标准 libpq 环境变量读取连接参数
    ///
    /// 使用 PGHOST、PGPORT、PGUSER、PGPASSWORD、PGDATABASE，未设置时取 libpq 默认值
    #[cfg(test)]
    pub(crate) fn from_env() -> Self {
        let env = PgConnectOptions::new();
        Self::from_components(
            env.get_host(),
            env.get_port(),
            env.get_database().unwrap_or("postgres"),
            env.get_username(),
        )
        .with_password(std::env::var("PGPASSWORD").ok().map(Secret::new))
    }

    /// 构建 sqlx 连接参数
    pub fn connect_options(&self) -> PgConnectOptions {
        let options = PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.database)
            .username(&self.username)
            .application_name(&self.application_name);

        match &self.password {
            Some(password) => options.password(password.expose_secret()),
            None => options,
        }
    }
}
