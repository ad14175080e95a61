//! pgprov-adapter-os - 进程与文件系统适配器

mod command;
mod sentinel;

pub use command::*;
pub use sentinel::*;
