//! 完成标记门控
//!
//! 标记存在即表示之前某次运行的全部步骤都已成功；标记缺失不代表任何结论

use std::sync::Arc;

use pgprov_errors::AppResult;
use pgprov_ports::SentinelStore;
use tracing::{debug, info};

#[derive(Clone)]
pub struct SentinelGate {
    store: Arc<dyn SentinelStore>,
}

impl SentinelGate {
    pub fn new(store: Arc<dyn SentinelStore>) -> Self {
        Self { store }
    }

    /// 标记是否已存在
    pub async fn check(&self) -> AppResult<bool> {
        let present = self.store.exists().await?;
        debug!(present, "Completion marker checked");
        Ok(present)
    }

    /// 写入标记，只能作为最后一个步骤调用
    pub async fn commit(&self) -> AppResult<()> {
        self.store.commit().await?;
        info!("Completion marker written");
        Ok(())
    }
}
