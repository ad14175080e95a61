//! 单次运行控制器
//!
//! 流程：
//! 1. 启动主库发现，等待第一次公告
//! 2. 为该主库构建连接池
//! 3. 执行任务
//! 4. 无论成功失败都关闭连接池
//! 5. 将结果映射为退出码

use std::future::Future;
use std::sync::Arc;

use pgprov_errors::AppError;
use pgprov_ports::{ConnectionPool, PoolFactory, PrimaryDescriptor, PrimaryDiscovery};
use thiserror::Error;
use tracing::{error, info};

use crate::signal::wait_for_primary;

/// 单次运行成功：告知进程监管者这不是崩溃的守护进程
pub const EXIT_NO_DAEMON: u8 = 94;

/// 任意硬失败
pub const EXIT_FAILURE: u8 = 1;

#[derive(Debug, Error)]
pub enum RunError<E> {
    #[error("primary discovery failed: {0}")]
    Discovery(AppError),

    #[error("failed to create connection pool: {0}")]
    Pool(AppError),

    #[error("{0}")]
    Job(E),
}

/// 执行一次完整运行
///
/// 连接池只在获得主库后创建，并且在任务结束后恰好关闭一次
pub async fn run_once<F, Fut, E>(
    discovery: &dyn PrimaryDiscovery,
    pools: &dyn PoolFactory,
    job: F,
) -> Result<(), RunError<E>>
where
    F: FnOnce(PrimaryDescriptor, Arc<dyn ConnectionPool>) -> Fut,
    Fut: Future<Output = Result<(), E>>,
    E: std::fmt::Display,
{
    let primary = wait_for_primary(discovery)
        .await
        .map_err(RunError::Discovery)?;

    let pool = pools.connect(&primary).await.map_err(RunError::Pool)?;

    let result = job(primary, pool.clone()).await;
    pool.close().await;

    match &result {
        Ok(()) => info!("Run completed"),
        Err(e) => error!(error = %e, "Run failed"),
    }

    result.map_err(RunError::Job)
}

/// 将运行结果映射为进程退出码
pub fn exit_code<T, E>(result: &Result<T, E>) -> u8 {
    match result {
        Ok(_) => EXIT_NO_DAEMON,
        Err(_) => EXIT_FAILURE,
    }
}
