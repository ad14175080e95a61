//! 主库发现适配器
//!
//! - [`StaticDiscovery`]：公告配置中的固定主库
//! - [`RecoveryProbeDiscovery`]：轮询候选节点的 `pg_is_in_recovery()`，
//!   公告第一个可写节点，主库变化时再次公告

use std::time::Duration;

use async_trait::async_trait;
use pgprov_errors::{AppError, AppResult};
use pgprov_ports::{PrimaryDescriptor, PrimaryDiscovery};
use sqlx::{Connection, PgConnection};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::PostgresConfig;

const ANNOUNCE_BUFFER: usize = 4;

/// 固定主库
pub struct StaticDiscovery {
    primary: PrimaryDescriptor,
}

impl StaticDiscovery {
    pub fn new(primary: PrimaryDescriptor) -> Self {
        Self { primary }
    }
}

#[async_trait]
impl PrimaryDiscovery for StaticDiscovery {
    async fn start(&self) -> AppResult<mpsc::Receiver<PrimaryDescriptor>> {
        let (tx, rx) = mpsc::channel(1);
        tx.send(self.primary.clone())
            .await
            .map_err(|_| AppError::discovery("primary receiver dropped"))?;
        info!(primary = %self.primary, "Static primary announced");
        Ok(rx)
    }
}

/// 通过 recovery 状态轮询候选节点
pub struct RecoveryProbeDiscovery {
    candidates: Vec<PrimaryDescriptor>,
    /// 探测使用的连接参数，主机与端口按候选节点替换
    template: PostgresConfig,
    poll_interval: Duration,
    connect_timeout: Duration,
}

impl RecoveryProbeDiscovery {
    pub fn new(
        candidates: Vec<PrimaryDescriptor>,
        template: PostgresConfig,
        poll_interval: Duration,
    ) -> Self {
        Self {
            candidates,
            template,
            poll_interval,
            connect_timeout: Duration::from_secs(5),
        }
    }

    /// 设置单个节点的探测超时
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// 启动后台轮询任务
    ///
    /// 接收端被丢弃后任务在下一轮结束时退出
    fn spawn_poller(&self) -> (mpsc::Receiver<PrimaryDescriptor>, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(ANNOUNCE_BUFFER);
        let candidates = self.candidates.clone();
        let template = self.template.clone();
        let poll_interval = self.poll_interval;
        let connect_timeout = self.connect_timeout;

        let handle = tokio::spawn(async move {
            info!(
                candidates = candidates.len(),
                interval_ms = poll_interval.as_millis() as u64,
                "Starting primary discovery"
            );
            let mut current: Option<PrimaryDescriptor> = None;

            while !tx.is_closed() {
                let found = find_primary(&candidates, &template, connect_timeout).await;

                if let Some(primary) = found {
                    if current.as_ref() != Some(&primary) {
                        info!(primary = %primary, "Primary available");
                        if tx.send(primary.clone()).await.is_err() {
                            break;
                        }
                        current = Some(primary);
                    }
                } else {
                    debug!("No writable primary among candidates");
                }

                tokio::time::sleep(poll_interval).await;
            }

            debug!("Primary discovery stopped");
        });

        (rx, handle)
    }
}

#[async_trait]
impl PrimaryDiscovery for RecoveryProbeDiscovery {
    async fn start(&self) -> AppResult<mpsc::Receiver<PrimaryDescriptor>> {
        if self.candidates.is_empty() {
            return Err(AppError::discovery("no primary candidates configured"));
        }

        let (rx, _poller) = self.spawn_poller();
        Ok(rx)
    }
}

/// 按顺序返回第一个不处于 recovery 状态的候选节点
async fn find_primary(
    candidates: &[PrimaryDescriptor],
    template: &PostgresConfig,
    connect_timeout: Duration,
) -> Option<PrimaryDescriptor> {
    for candidate in candidates {
        let config = template.for_host(candidate.address(), candidate.port());
        match tokio::time::timeout(connect_timeout, is_in_recovery(&config)).await {
            Ok(Ok(false)) => return Some(candidate.clone()),
            Ok(Ok(true)) => debug!(candidate = %candidate, "Candidate is a replica"),
            Ok(Err(e)) => warn!(candidate = %candidate, error = %e, "Candidate probe failed"),
            Err(_) => warn!(candidate = %candidate, "Candidate probe timed out"),
        }
    }
    None
}

async fn is_in_recovery(config: &PostgresConfig) -> AppResult<bool> {
    let mut conn = PgConnection::connect_with(&config.connect_options())
        .await
        .map_err(|e| AppError::database(format!("Failed to connect: {}", e)))?;

    let result: Result<(bool,), sqlx::Error> = sqlx::query_as("SELECT pg_is_in_recovery()")
        .fetch_one(&mut conn)
        .await;

    let _ = conn.close().await;

    result
        .map(|(in_recovery,)| in_recovery)
        .map_err(|e| AppError::database(format!("Failed to check recovery status: {}", e)))
}
