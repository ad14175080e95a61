//! 运行上下文
//!
//! 一次运行内所有步骤共享的聚合：主库地址、部署类型、连接池句柄以及日志上下文。
//! 由控制器独占，以引用方式传给每个步骤。

use std::sync::Arc;

use pgprov_common::{RetrySchedule, TokioSchedule};
use pgprov_config::{DatabaseConfig, ToolsConfig};
use pgprov_ports::{CommandRunner, ConnectionPool, PrimaryDescriptor};
use tracing::{Span, info_span};

use super::Flavor;
use crate::application::SentinelGate;

/// 需要创建的对象名称
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisioningNames {
    /// 执行管理操作的用户
    pub admin_user: String,
    /// 服务角色
    pub role: String,
    /// 目标数据库
    pub database: String,
    /// 配置表
    pub table: String,
}

impl ProvisioningNames {
    pub fn from_config(config: &DatabaseConfig) -> Self {
        Self {
            admin_user: config.admin_user.clone(),
            role: config.role.clone(),
            database: config.name.clone(),
            table: config.table.clone(),
        }
    }
}

impl Default for ProvisioningNames {
    fn default() -> Self {
        Self::from_config(&DatabaseConfig::default())
    }
}

/// 外部工具路径
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPaths {
    pub pg_isready: String,
    pub createuser: String,
    pub createdb: String,
}

impl ToolPaths {
    pub fn from_config(config: &ToolsConfig) -> Self {
        let resolve = |tool: &str| config.resolve(tool).to_string_lossy().into_owned();
        Self {
            pg_isready: resolve("pg_isready"),
            createuser: resolve("createuser"),
            createdb: resolve("createdb"),
        }
    }
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self::from_config(&ToolsConfig::default())
    }
}

pub struct ProvisioningContext {
    primary: PrimaryDescriptor,
    flavor: Flavor,
    pool: Arc<dyn ConnectionPool>,
    commands: Arc<dyn CommandRunner>,
    sentinel: SentinelGate,
    schedule: Arc<dyn RetrySchedule>,
    names: ProvisioningNames,
    tools: ToolPaths,
    span: Span,
}

impl ProvisioningContext {
    pub fn new(
        primary: PrimaryDescriptor,
        flavor: Flavor,
        pool: Arc<dyn ConnectionPool>,
        commands: Arc<dyn CommandRunner>,
        sentinel: SentinelGate,
        names: ProvisioningNames,
    ) -> Self {
        let span = info_span!(
            "provision",
            primary = %primary,
            flavor = flavor.as_str(),
            role = %names.role,
            database = %names.database,
        );

        Self {
            primary,
            flavor,
            pool,
            commands,
            sentinel,
            schedule: Arc::new(TokioSchedule::next_tick()),
            names,
            tools: ToolPaths::default(),
            span,
        }
    }

    /// 替换探测重试的调度器
    pub fn with_schedule(mut self, schedule: Arc<dyn RetrySchedule>) -> Self {
        self.schedule = schedule;
        self
    }

    pub fn with_tools(mut self, tools: ToolPaths) -> Self {
        self.tools = tools;
        self
    }

    pub fn primary(&self) -> &PrimaryDescriptor {
        &self.primary
    }

    pub fn flavor(&self) -> Flavor {
        self.flavor
    }

    pub fn pool(&self) -> &dyn ConnectionPool {
        self.pool.as_ref()
    }

    pub fn commands(&self) -> &dyn CommandRunner {
        self.commands.as_ref()
    }

    pub fn sentinel(&self) -> &SentinelGate {
        &self.sentinel
    }

    pub fn schedule(&self) -> &dyn RetrySchedule {
        self.schedule.as_ref()
    }

    pub fn names(&self) -> &ProvisioningNames {
        &self.names
    }

    pub fn tools(&self) -> &ToolPaths {
        &self.tools
    }

    /// 携带主库与部署类型的日志上下文
    pub fn span(&self) -> &Span {
        &self.span
    }
}
