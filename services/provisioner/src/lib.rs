//! Provisioner - 数据库初始化服务
//!
//! 确保专用角色、数据库和配置表存在，所有步骤可重复执行

pub mod application;
pub mod domain;
pub mod error;

pub use application::{Pipeline, PipelineReport, ProvisionOutcome, SentinelGate, provision};
pub use domain::{Flavor, ProvisioningContext, ProvisioningNames, Step, StepName, StepOutcome, ToolPaths};
pub use error::ProvisionError;
