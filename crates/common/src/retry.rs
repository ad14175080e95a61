//! 通用重试机制模块
//!
//! 提供无上限重试逻辑，重试间隔由可注入的 [`RetrySchedule`] 决定，
//! 测试中可替换为不等待的实现

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, warn};

/// 重试调度器
///
/// 决定两次尝试之间如何让出控制权
#[async_trait]
pub trait RetrySchedule: Send + Sync {
    /// 在第 `attempt` 次失败后等待下一次调度机会
    async fn wait(&self, attempt: u32);
}

/// 基于 tokio 的调度器
///
/// `pause` 为零时只让出当前任务，等待下一次调度机会
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSchedule {
    pause: Duration,
}

impl TokioSchedule {
    /// 创建仅让出调度的调度器
    pub fn next_tick() -> Self {
        Self::default()
    }

    /// 设置两次尝试之间的暂停时间
    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }

    pub fn pause(&self) -> Duration {
        self.pause
    }
}

#[async_trait]
impl RetrySchedule for TokioSchedule {
    async fn wait(&self, _attempt: u32) {
        if self.pause.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(self.pause).await;
        }
    }
}

/// 无上限重试执行器
///
/// 反复执行 `operation` 直到成功，每次失败记录 warn 日志并通过
/// `schedule` 等待下一次机会。没有最大尝试次数。
///
/// # 返回
/// 成功时返回操作结果以及总尝试次数
pub async fn with_retry_forever<S, F, Fut, T, E>(
    schedule: &S,
    operation_name: &str,
    mut operation: F,
) -> (T, u32)
where
    S: RetrySchedule + ?Sized,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut attempt: u32 = 0;

    loop {
        attempt = attempt.saturating_add(1);
        match operation().await {
            Ok(result) => {
                if attempt > 1 {
                    info!(
                        operation = operation_name,
                        attempt,
                        "Operation succeeded after retry"
                    );
                }
                return (result, attempt);
            }
            Err(e) => {
                warn!(
                    operation = operation_name,
                    attempt,
                    error = %e,
                    "Operation failed, retrying"
                );
                schedule.wait(attempt).await;
            }
        }
    }
}
