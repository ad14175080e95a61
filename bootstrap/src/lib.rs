//! pgprov-bootstrap - 单次运行启动骨架
//!
//! 等待主库公告、构建连接池、执行任务、关闭连接池并映射退出码

mod infrastructure;
mod runner;
mod runtime;
mod signal;

pub use infrastructure::*;
pub use runner::*;
pub use runtime::*;
pub use signal::*;
