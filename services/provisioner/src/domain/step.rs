//! 步骤定义

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use pgprov_errors::AppResult;

use super::ProvisioningContext;

/// 步骤名称，顺序即执行顺序
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepName {
    WaitForReady,
    CreateRole,
    SetConnectionLimit,
    CreateDatabase,
    CreateTable,
    ChangeTableOwner,
    WriteSentinel,
}

impl StepName {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepName::WaitForReady => "wait-for-ready",
            StepName::CreateRole => "create-role",
            StepName::SetConnectionLimit => "set-connection-limit",
            StepName::CreateDatabase => "create-database",
            StepName::CreateTable => "create-table",
            StepName::ChangeTableOwner => "change-table-owner",
            StepName::WriteSentinel => "write-sentinel",
        }
    }
}

impl fmt::Display for StepName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 步骤结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// 已执行
    Completed,
    /// 未执行或失败被容忍，流程继续
    Skipped,
}

impl StepOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepOutcome::Completed => "completed",
            StepOutcome::Skipped => "skipped",
        }
    }
}

pub type StepFuture<'a> = Pin<Box<dyn Future<Output = AppResult<StepOutcome>> + Send + 'a>>;

pub type StepFn = for<'a> fn(&'a ProvisioningContext) -> StepFuture<'a>;

/// 作用于共享上下文的具名步骤
///
/// 步骤本身无状态，幂等性来自所执行的命令与语句
#[derive(Clone, Copy)]
pub struct Step {
    name: StepName,
    run: StepFn,
}

impl Step {
    pub fn new(name: StepName, run: StepFn) -> Self {
        Self { name, run }
    }

    pub fn name(&self) -> StepName {
        self.name
    }

    pub fn run<'a>(&self, ctx: &'a ProvisioningContext) -> StepFuture<'a> {
        (self.run)(ctx)
    }
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step").field("name", &self.name).finish()
    }
}
