//! 初始化流水线
//!
//! 按固定顺序执行步骤：前一步完成后才开始下一步，
//! 第一个硬失败终止剩余步骤，不做回滚

use tracing::{Instrument, debug, error, info, info_span};

use super::steps::standard_steps;
use crate::domain::{ProvisioningContext, Step, StepName, StepOutcome};
use crate::error::ProvisionError;

/// 一次成功执行的步骤记录
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineReport {
    steps: Vec<(StepName, StepOutcome)>,
}

impl PipelineReport {
    pub fn steps(&self) -> &[(StepName, StepOutcome)] {
        &self.steps
    }

    pub fn outcome(&self, step: StepName) -> Option<StepOutcome> {
        self.steps
            .iter()
            .find(|(name, _)| *name == step)
            .map(|(_, outcome)| *outcome)
    }

    /// 被跳过或失败被容忍的步骤
    pub fn skipped(&self) -> impl Iterator<Item = StepName> + '_ {
        self.steps
            .iter()
            .filter(|(_, outcome)| *outcome == StepOutcome::Skipped)
            .map(|(name, _)| *name)
    }
}

#[derive(Debug, Clone)]
pub struct Pipeline {
    steps: Vec<Step>,
}

impl Pipeline {
    pub fn new(steps: Vec<Step>) -> Self {
        Self { steps }
    }

    /// 标准的七步流水线
    pub fn standard() -> Self {
        Self::new(standard_steps())
    }

    pub fn step_names(&self) -> Vec<StepName> {
        self.steps.iter().map(Step::name).collect()
    }

    pub async fn run(&self, ctx: &ProvisioningContext) -> Result<PipelineReport, ProvisionError> {
        let mut report = PipelineReport::default();

        for step in &self.steps {
            debug!(parent: ctx.span(), step = step.name().as_str(), "Step started");
            let span = info_span!(parent: ctx.span(), "step", step = step.name().as_str());

            match step.run(ctx).instrument(span).await {
                Ok(outcome) => {
                    record(step.name(), outcome.as_str());
                    report.steps.push((step.name(), outcome));
                }
                Err(source) => {
                    record(step.name(), "failed");
                    error!(
                        parent: ctx.span(),
                        step = step.name().as_str(),
                        kind = source.kind(),
                        error = %source,
                        "Step failed"
                    );
                    return Err(ProvisionError::StepFailed {
                        step: step.name(),
                        source,
                    });
                }
            }
        }

        info!(
            parent: ctx.span(),
            steps = report.steps.len(),
            skipped = report.skipped().count(),
            "Provisioning pipeline succeeded"
        );
        Ok(report)
    }
}

fn record(step: StepName, outcome: &'static str) {
    metrics::counter!(
        "provisioner_step_total",
        "step" => step.as_str(),
        "outcome" => outcome
    )
    .increment(1);
}

/// 一次运行的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionOutcome {
    /// 完成标记已存在，未执行任何步骤
    AlreadyProvisioned,
    Provisioned(PipelineReport),
}

/// 检查完成标记，未完成时执行标准流水线
///
/// 标记存在时不执行任何外部命令或查询
pub async fn provision(ctx: &ProvisioningContext) -> Result<ProvisionOutcome, ProvisionError> {
    let done = ctx
        .sentinel()
        .check()
        .instrument(ctx.span().clone())
        .await
        .map_err(ProvisionError::SentinelCheck)?;

    if done {
        info!(parent: ctx.span(), "Completion marker present, nothing to do");
        return Ok(ProvisionOutcome::AlreadyProvisioned);
    }

    Pipeline::standard()
        .run(ctx)
        .await
        .map(ProvisionOutcome::Provisioned)
}
