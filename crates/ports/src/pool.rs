//! 连接池 trait 定义

use std::sync::Arc;

use async_trait::async_trait;
use pgprov_errors::AppResult;

use crate::{PrimaryDescriptor, QueryExecutor};

/// 绑定到单个主库的连接池
///
/// `admin` 连接维护库，执行集群级语句；`target` 连接目标数据库
#[async_trait]
pub trait ConnectionPool: Send + Sync {
    fn admin(&self) -> Arc<dyn QueryExecutor>;

    fn target(&self) -> Arc<dyn QueryExecutor>;

    /// 关闭连接池，每次运行只调用一次
    async fn close(&self);
}

/// 连接池工厂
#[async_trait]
pub trait PoolFactory: Send + Sync {
    async fn connect(&self, primary: &PrimaryDescriptor) -> AppResult<Arc<dyn ConnectionPool>>;
}
