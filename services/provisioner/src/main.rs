//! pgprov-setup - PostgreSQL 初始化工具入口
//!
//! 单次运行：等待主库、确保角色/数据库/表存在、写入完成标记后退出。
//! 成功退出码为 94，失败为 1。

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{ArgAction, Parser};
use pgprov_bootstrap::{
    EXIT_FAILURE, Infrastructure, exit_code, init_fallback_runtime, init_runtime, run_once,
};
use pgprov_common::{RetrySchedule, TokioSchedule};
use pgprov_config::{AppConfig, ConfigError};
use provisioner::{
    Flavor, ProvisionError, ProvisionOutcome, ProvisioningContext, ProvisioningNames,
    SentinelGate, ToolPaths, provision,
};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "pgprov-setup", version, about = "Provision the PostgreSQL role, database and table")]
struct Cli {
    /// 配置文件路径
    #[arg(short = 'f', value_name = "PATH")]
    config: PathBuf,

    /// 提高日志级别，可重复
    #[arg(short = 'v', action = ArgAction::Count)]
    verbose: u8,

    /// 部署类型
    #[arg(short = 'r', value_enum, default_value_t = Flavor::Standard)]
    flavor: Flavor,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match AppConfig::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            init_fallback_runtime(cli.verbose);
            report_config_error(&cli.config, &e);
            return ExitCode::from(EXIT_FAILURE);
        }
    };

    init_runtime(&config, cli.verbose);
    info!(config = %cli.config.display(), flavor = cli.flavor.as_str(), "Starting provisioning");

    ExitCode::from(run(&config, cli.flavor).await)
}

fn report_config_error(path: &Path, err: &ConfigError) {
    error!(config = %path.display(), error = %err, "Failed to load configuration");
}

async fn run(config: &AppConfig, flavor: Flavor) -> u8 {
    let infra = match Infrastructure::from_config(config) {
        Ok(infra) => infra,
        Err(e) => {
            error!(error = %e, "Failed to initialize infrastructure");
            return EXIT_FAILURE;
        }
    };

    let names = ProvisioningNames::from_config(&config.database);
    let tools = ToolPaths::from_config(&config.tools);
    let schedule: Arc<dyn RetrySchedule> =
        Arc::new(TokioSchedule::next_tick().with_pause(config.probe.interval()));
    let commands = infra.commands();
    let sentinel = SentinelGate::new(infra.sentinel());

    let result = run_once(infra.discovery(), infra.pools(), |primary, pool| async move {
        let ctx = ProvisioningContext::new(primary, flavor, pool, commands, sentinel, names)
            .with_schedule(schedule)
            .with_tools(tools);

        match provision(&ctx).await? {
            ProvisionOutcome::AlreadyProvisioned => info!("Already provisioned"),
            ProvisionOutcome::Provisioned(report) => {
                info!(steps = report.steps().len(), "Provisioned")
            }
        }
        Ok::<(), ProvisionError>(())
    })
    .await;

    exit_code(&result)
}
