//! 外部命令执行

use std::process::Stdio;

use async_trait::async_trait;
use pgprov_errors::{AppError, AppResult};
use pgprov_ports::{CommandRunner, CommandSpec};
use secrecy::{ExposeSecret, Secret};
use tokio::process::Command;
use tracing::{debug, warn};

/// 基于 tokio::process 的命令执行器
///
/// 不解析输出，只根据退出状态判断成功与否
#[derive(Default)]
pub struct TokioCommandRunner {
    /// 注入到子进程的敏感环境变量（如 PGPASSWORD）
    secret_env: Vec<(String, Secret<String>)>,
}

impl TokioCommandRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// 为所有子进程设置敏感环境变量
    pub fn with_secret_env(mut self, key: impl Into<String>, value: Secret<String>) -> Self {
        self.secret_env.push((key.into(), value));
        self
    }
}

#[async_trait]
impl CommandRunner for TokioCommandRunner {
    async fn run(&self, spec: &CommandSpec) -> AppResult<()> {
        let mut cmd = Command::new(spec.program());
        cmd.args(spec.args())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        for (key, value) in &self.secret_env {
            cmd.env(key, value.expose_secret());
        }

        debug!(command = %spec, "Running command");

        let output = cmd.output().await.map_err(|e| {
            AppError::command(format!("failed to spawn {}: {}", spec.program_name(), e))
        })?;

        if output.status.success() {
            debug!(command = %spec, "Command succeeded");
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        warn!(
            command = %spec,
            status = %output.status,
            stderr = %stderr.trim(),
            "Command failed"
        );
        Err(AppError::command(format!(
            "{} exited with {}",
            spec.program_name(),
            output.status
        )))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_success_exit_status() {
        let runner = TokioCommandRunner::new();
        assert!(runner.run(&CommandSpec::new("true")).await.is_ok());
    }

    #[tokio::test]
    async fn test_failure_exit_status() {
        let runner = TokioCommandRunner::new();
        let err = runner.run(&CommandSpec::new("false")).await.unwrap_err();
        assert_eq!(err.kind(), "command");
    }

    #[tokio::test]
    async fn test_missing_program() {
        let runner = TokioCommandRunner::new();
        let err = runner
            .run(&CommandSpec::new("/nonexistent/pg_isready").arg("-h").arg("db"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("failed to spawn pg_isready"));
    }

    #[tokio::test]
    async fn test_secret_env_passed_to_child() {
        let runner = TokioCommandRunner::new()
            .with_secret_env("PGPASSWORD", Secret::new("hunter2".to_string()));
        let spec = CommandSpec::new("sh")
            .arg("-c")
            .arg("test \"$PGPASSWORD\" = hunter2");
        assert!(runner.run(&spec).await.is_ok());
    }
}
