//! 完成标记 trait 定义

use async_trait::async_trait;
use pgprov_errors::AppResult;

/// 完成标记存储
#[async_trait]
pub trait SentinelStore: Send + Sync {
    /// 标记是否存在
    async fn exists(&self) -> AppResult<bool>;

    /// 写入标记，重复写入不报错
    async fn commit(&self) -> AppResult<()>;
}
