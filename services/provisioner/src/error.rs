//! 初始化错误

use pgprov_errors::AppError;
use thiserror::Error;

use crate::domain::StepName;

#[derive(Debug, Error)]
pub enum ProvisionError {
    /// 某个步骤硬失败，后续步骤未执行
    #[error("step {step} failed: {source}")]
    StepFailed {
        step: StepName,
        #[source]
        source: AppError,
    },

    #[error("failed to check completion marker: {0}")]
    SentinelCheck(#[source] AppError),
}

impl ProvisionError {
    /// 失败的步骤
    pub fn step(&self) -> Option<StepName> {
        match self {
            ProvisionError::StepFailed { step, .. } => Some(*step),
            ProvisionError::SentinelCheck(_) => None,
        }
    }
}
