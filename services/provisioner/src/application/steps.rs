//! 初始化步骤
//!
//! 所有步骤都可重复执行：创建类操作要么使用 `IF NOT EXISTS`，
//! 要么在失败时视为对象已存在

use pgprov_common::with_retry_forever;
use tracing::{info, warn};

use super::connection_limit;
use super::statements::{
    change_owner_sql, create_database_command, create_role_command, create_table_sql,
    probe_command,
};
use crate::domain::{ProvisioningContext, Step, StepFuture, StepName, StepOutcome};

/// 按执行顺序排列的全部步骤
pub fn standard_steps() -> Vec<Step> {
    vec![
        Step::new(StepName::WaitForReady, wait_for_ready),
        Step::new(StepName::CreateRole, create_role),
        Step::new(StepName::SetConnectionLimit, connection_limit::set_connection_limit),
        Step::new(StepName::CreateDatabase, create_database),
        Step::new(StepName::CreateTable, create_table),
        Step::new(StepName::ChangeTableOwner, change_table_owner),
        Step::new(StepName::WriteSentinel, write_sentinel),
    ]
}

/// 反复探测直到服务器接受连接，没有尝试次数上限
pub fn wait_for_ready(ctx: &ProvisioningContext) -> StepFuture<'_> {
    Box::pin(async move {
        let command = probe_command(ctx);
        let ((), attempts) = with_retry_forever(ctx.schedule(), command.program_name(), || {
            ctx.commands().run(&command)
        })
        .await;

        info!(primary = %ctx.primary(), attempts, "Server accepting connections");
        Ok(StepOutcome::Completed)
    })
}

/// 失败视为角色已存在
pub fn create_role(ctx: &ProvisioningContext) -> StepFuture<'_> {
    Box::pin(async move {
        let command = create_role_command(ctx);
        match ctx.commands().run(&command).await {
            Ok(()) => {
                info!(role = %ctx.names().role, "Role created");
                Ok(StepOutcome::Completed)
            }
            Err(e) => {
                warn!(command = %command, error = %e, "Role creation failed, assuming it exists");
                Ok(StepOutcome::Skipped)
            }
        }
    })
}

/// 失败视为数据库已存在
pub fn create_database(ctx: &ProvisioningContext) -> StepFuture<'_> {
    Box::pin(async move {
        let command = create_database_command(ctx);
        match ctx.commands().run(&command).await {
            Ok(()) => {
                info!(database = %ctx.names().database, "Database created");
                Ok(StepOutcome::Completed)
            }
            Err(e) => {
                warn!(command = %command, error = %e, "Database creation failed, assuming it exists");
                Ok(StepOutcome::Skipped)
            }
        }
    })
}

pub fn create_table(ctx: &ProvisioningContext) -> StepFuture<'_> {
    Box::pin(async move {
        let table = &ctx.names().table;
        ctx.pool().target().query(&create_table_sql(table)).await?;
        info!(table = %table, "Table ensured");
        Ok(StepOutcome::Completed)
    })
}

pub fn change_table_owner(ctx: &ProvisioningContext) -> StepFuture<'_> {
    Box::pin(async move {
        let names = ctx.names();
        ctx.pool()
            .target()
            .query(&change_owner_sql(&names.table, &names.role))
            .await?;
        info!(table = %names.table, owner = %names.role, "Table owner changed");
        Ok(StepOutcome::Completed)
    })
}

pub fn write_sentinel(ctx: &ProvisioningContext) -> StepFuture<'_> {
    Box::pin(async move {
        ctx.sentinel().commit().await?;
        Ok(StepOutcome::Completed)
    })
}
