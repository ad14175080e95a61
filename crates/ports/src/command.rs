//! 外部命令 trait 定义

use std::fmt;

use async_trait::async_trait;
use pgprov_errors::AppResult;

/// 外部命令：程序名加固定参数列表
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    program: String,
    args: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// 程序文件名（不含目录）
    pub fn program_name(&self) -> &str {
        self.program
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(&self.program)
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// 命令执行 trait
///
/// 只关心退出状态：成功返回 Ok，非零退出或无法启动返回错误
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, command: &CommandSpec) -> AppResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_display() {
        let cmd = CommandSpec::new("/opt/pg/bin/createdb")
            .arg("-O")
            .arg("svc")
            .arg("svc");
        assert_eq!(cmd.to_string(), "/opt/pg/bin/createdb -O svc svc");
        assert_eq!(cmd.program_name(), "createdb");
        assert_eq!(cmd.args().len(), 3);
    }

    #[test]
    fn test_program_name_without_dir() {
        assert_eq!(CommandSpec::new("pg_isready").program_name(), "pg_isready");
    }
}
