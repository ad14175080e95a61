//! 应用层：步骤实现与流水线

pub mod connection_limit;
mod pipeline;
mod sentinel_gate;
pub mod statements;
pub mod steps;

pub use pipeline::*;
pub use sentinel_gate::*;
