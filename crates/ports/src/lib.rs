//! ports - 抽象 trait 层
//!
//! 定义所有外部依赖的抽象接口，测试中以内存实现替换

mod command;
mod discovery;
mod pool;
mod query;
mod sentinel;

pub use command::*;
pub use discovery::*;
pub use pool::*;
pub use query::*;
pub use sentinel::*;
