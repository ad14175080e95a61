//! pgprov-config - 配置加载库
//!
//! 配置文件为 TOML，环境变量 `PGPROV_` 前缀可覆盖任意字段，
//! 嵌套字段以 `__` 分隔，例如 `PGPROV_DATABASE__ROLE`

use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use secrecy::Secret;
use serde::Deserialize;
use thiserror::Error;

/// PostgreSQL 标识符最大长度（NAMEDATALEN - 1）
const MAX_IDENTIFIER_LEN: usize = 63;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    Load(#[from] figment::Error),

    #[error("Invalid config: {0}")]
    Validation(String),
}

/// 日志输出格式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// 数据库配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// 管理员用户，用于执行所有管理操作
    pub admin_user: String,
    pub admin_password: Option<Secret<String>>,
    /// 维护库，执行集群级语句（SHOW / ALTER ROLE）
    pub admin_database: String,
    /// 目标数据库
    pub name: String,
    /// 专用服务角色
    pub role: String,
    /// 配置表
    pub table: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            admin_user: "postgres".to_string(),
            admin_password: None,
            admin_database: "postgres".to_string(),
            name: "pgprov".to_string(),
            role: "pgprov".to_string(),
            table: "buckets_config".to_string(),
        }
    }
}

/// 连接池配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: 5,
            acquire_timeout_secs: 30,
            idle_timeout_secs: 60,
        }
    }
}

impl PoolConfig {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }
}

/// 主库发现配置
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum DiscoveryConfig {
    /// 固定主库地址
    Static { primary: String },
    /// 轮询候选节点，选出非 recovery 状态的节点
    Probe {
        candidates: Vec<String>,
        #[serde(default = "default_poll_interval_ms")]
        poll_interval_ms: u64,
    },
}

fn default_poll_interval_ms() -> u64 {
    1000
}

/// 就绪探测配置
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// 两次探测之间的暂停（毫秒），0 表示仅让出调度
    pub interval_ms: u64,
}

impl ProbeConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// 外部工具配置
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// pg_isready / createuser / createdb 所在目录，未设置时从 PATH 查找
    pub bin_dir: Option<PathBuf>,
}

impl ToolsConfig {
    /// 解析工具的完整路径
    pub fn resolve(&self, tool: &str) -> PathBuf {
        match &self.bin_dir {
            Some(dir) => dir.join(tool),
            None => PathBuf::from(tool),
        }
    }
}

/// 完成标记配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SentinelConfig {
    pub path: PathBuf,
}

impl Default for SentinelConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("/var/tmp/.pgprov-setup-complete"),
        }
    }
}

/// 应用配置
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_format: LogFormat,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub pool: PoolConfig,
    pub discovery: DiscoveryConfig,
    #[serde(default)]
    pub probe: ProbeConfig,
    #[serde(default)]
    pub tools: ToolsConfig,
    #[serde(default)]
    pub sentinel: SentinelConfig,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl AppConfig {
    /// 从配置文件和环境变量加载配置
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let figment = Figment::new()
            .merge(Toml::file_exact(path))
            .merge(Env::prefixed("PGPROV_").split("__"));

        Self::from_figment(figment)
    }

    /// 从 figment 提取并校验配置
    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// 校验配置
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("database.admin_user", &self.database.admin_user),
            ("database.admin_database", &self.database.admin_database),
            ("database.name", &self.database.name),
            ("database.role", &self.database.role),
            ("database.table", &self.database.table),
        ] {
            if !is_valid_identifier(value) {
                return Err(ConfigError::Validation(format!(
                    "{} is not a valid identifier: {:?}",
                    field, value
                )));
            }
        }

        if self.pool.max_connections == 0 {
            return Err(ConfigError::Validation(
                "pool.max_connections must be greater than 0".to_string(),
            ));
        }

        match &self.discovery {
            DiscoveryConfig::Static { primary } => {
                parse_endpoint(primary)?;
            }
            DiscoveryConfig::Probe {
                candidates,
                poll_interval_ms,
            } => {
                if candidates.is_empty() {
                    return Err(ConfigError::Validation(
                        "discovery.candidates must not be empty".to_string(),
                    ));
                }
                if *poll_interval_ms == 0 {
                    return Err(ConfigError::Validation(
                        "discovery.poll_interval_ms must be greater than 0".to_string(),
                    ));
                }
                for candidate in candidates {
                    parse_endpoint(candidate)?;
                }
            }
        }

        if self.sentinel.path.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "sentinel.path must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

/// 判断是否为不需要引号的 SQL 标识符
pub fn is_valid_identifier(value: &str) -> bool {
    let mut chars = value.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    value.len() <= MAX_IDENTIFIER_LEN && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// 解析 `host:port` 形式的地址
pub fn parse_endpoint(value: &str) -> Result<(String, u16), ConfigError> {
    let (host, port) = value
        .rsplit_once(':')
        .ok_or_else(|| ConfigError::Validation(format!("missing port in {:?}", value)))?;
    let host = host.trim_start_matches('[').trim_end_matches(']');
    if host.is_empty() {
        return Err(ConfigError::Validation(format!("missing host in {:?}", value)));
    }
    let port = port
        .parse::<u16>()
        .map_err(|_| ConfigError::Validation(format!("invalid port in {:?}", value)))?;
    Ok((host.to_string(), port))
}
