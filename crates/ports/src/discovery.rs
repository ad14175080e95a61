//! 主库发现 trait 定义

use std::fmt;

use async_trait::async_trait;
use pgprov_errors::AppResult;
use tokio::sync::mpsc;

/// 当前可写主库的地址
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PrimaryDescriptor {
    address: String,
    port: u16,
}

impl PrimaryDescriptor {
    pub fn new(address: impl Into<String>, port: u16) -> Self {
        Self {
            address: address.into(),
            port,
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

impl fmt::Display for PrimaryDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.address.contains(':') {
            write!(f, "[{}]:{}", self.address, self.port)
        } else {
            write!(f, "{}:{}", self.address, self.port)
        }
    }
}

/// 主库发现 trait
///
/// 启动后持续公告新的主库，直到接收端被丢弃
#[async_trait]
pub trait PrimaryDiscovery: Send + Sync {
    async fn start(&self) -> AppResult<mpsc::Receiver<PrimaryDescriptor>>;
}
