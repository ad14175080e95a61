//! 单次主库信号
//!
//! 发现机制会持续公告主库，这里只取第一次公告

use pgprov_errors::{AppError, AppResult};
use pgprov_ports::{PrimaryDescriptor, PrimaryDiscovery};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

/// 将公告流转换为只触发一次的信号
///
/// 收到第一条公告后立即丢弃接收端，后续主库切换不会被处理
pub fn primary_signal(
    mut announcements: mpsc::Receiver<PrimaryDescriptor>,
) -> oneshot::Receiver<PrimaryDescriptor> {
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        if let Some(primary) = announcements.recv().await {
            debug!(primary = %primary, "First primary announcement received");
            let _ = tx.send(primary);
        }
    });

    rx
}

/// 启动发现并等待第一个可用主库
pub async fn wait_for_primary(discovery: &dyn PrimaryDiscovery) -> AppResult<PrimaryDescriptor> {
    let announcements = discovery.start().await?;
    info!("Waiting for primary");

    let primary = primary_signal(announcements)
        .await
        .map_err(|_| AppError::discovery("discovery ended before a primary was announced"))?;

    info!(primary = %primary, "Primary available");
    Ok(primary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_signal_fires_with_first_announcement() {
        let (tx, rx) = mpsc::channel(4);
        tx.send(PrimaryDescriptor::new("10.0.0.5", 5432)).await.unwrap();
        tx.send(PrimaryDescriptor::new("10.0.0.6", 5432)).await.unwrap();

        let primary = primary_signal(rx).await.unwrap();
        assert_eq!(primary, PrimaryDescriptor::new("10.0.0.5", 5432));
    }

    #[tokio::test]
    async fn test_later_announcements_are_not_consumed() {
        let (tx, rx) = mpsc::channel(4);
        tx.send(PrimaryDescriptor::new("10.0.0.5", 5432)).await.unwrap();

        primary_signal(rx).await.unwrap();
        // 接收端已丢弃，发现机制据此停止
        tx.closed().await;
        assert!(tx.send(PrimaryDescriptor::new("10.0.0.6", 5432)).await.is_err());
    }

    #[tokio::test]
    async fn test_signal_errors_when_stream_ends() {
        let (tx, rx) = mpsc::channel::<PrimaryDescriptor>(1);
        drop(tx);
        assert!(primary_signal(rx).await.is_err());
    }
}
