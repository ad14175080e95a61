//! pgprov-errors - 统一错误处理

use thiserror::Error;

/// 应用错误类型
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Command error: {0}")]
    Command(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Discovery error: {0}")]
    Discovery(String),
}

impl AppError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    pub fn command(msg: impl Into<String>) -> Self {
        Self::Command(msg.into())
    }

    pub fn discovery(msg: impl Into<String>) -> Self {
        Self::Discovery(msg.into())
    }

    /// 错误类别，作为日志字段输出
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Database(_) => "database",
            Self::Command(_) => "command",
            Self::Io(_) => "io",
            Self::Discovery(_) => "discovery",
        }
    }
}

/// Result 类型别名
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AppError::database("relation does not exist");
        assert_eq!(err.to_string(), "Database error: relation does not exist");
        assert_eq!(err.kind(), "database");
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: AppError = io.into();
        assert_eq!(err.kind(), "io");
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn test_kinds_are_distinct() {
        let kinds = [
            AppError::config("bad endpoint").kind(),
            AppError::database("x").kind(),
            AppError::command("x").kind(),
            AppError::discovery("x").kind(),
            AppError::Io(std::io::Error::other("x")).kind(),
        ];
        assert_eq!(kinds, ["config", "database", "command", "discovery", "io"]);
    }
}
