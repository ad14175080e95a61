//! 运行时初始化

use pgprov_config::{AppConfig, LogFormat};
use pgprov_telemetry::{effective_level, init_tracing, init_tracing_json};
use tracing::info;

/// 初始化日志
///
/// `verbosity` 为命令行 `-v` 的次数，在配置的基础级别上逐级提升
pub fn init_runtime(config: &AppConfig, verbosity: u8) {
    let level = effective_level(&config.log_level, verbosity);

    match config.log_format {
        LogFormat::Json => init_tracing_json(level),
        LogFormat::Text => init_tracing(level),
    }

    info!(level, "Runtime initialized");
}

/// 配置加载失败时初始化日志
///
/// 此时还没有配置，使用 info 基础级别和文本格式
pub fn init_fallback_runtime(verbosity: u8) {
    init_tracing(effective_level("info", verbosity));
}
