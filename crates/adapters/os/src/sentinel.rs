//! 基于文件的完成标记

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use pgprov_errors::AppResult;
use pgprov_ports::SentinelStore;
use tokio::fs::OpenOptions;
use tracing::info;

/// 文件存在即表示已完成，文件内容为空
pub struct FileSentinel {
    path: PathBuf,
}

impl FileSentinel {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SentinelStore for FileSentinel {
    async fn exists(&self) -> AppResult<bool> {
        Ok(tokio::fs::try_exists(&self.path).await?)
    }

    async fn commit(&self) -> AppResult<()> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.path)
            .await?;
        file.sync_all().await?;

        info!(path = %self.path.display(), "Sentinel written");
        Ok(())
    }
}
