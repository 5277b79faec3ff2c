// apps/pg_cli/src/main.rs

//! Pangu 命令行界面
//!
//! 提供弱可压缩 SPH 流体模拟的命令行工具。
//!
//! # 架构层级
//!
//! 本模块属于 **Layer 5: Application**，遵循以下原则：
//! - 零泛型语法：仅使用 `SphConfig` 和 `Box<dyn DynSimulation>`
//! - 维度与邻域后端通过枚举选择，无需指定类型参数

mod commands;

use anyhow::anyhow;
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Pangu SPH 流体求解器命令行工具
#[derive(Parser)]
#[command(name = "pangu")]
#[command(author = "Pangu Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Pangu weakly compressible SPH fluid solver", long_about = None)]
struct Cli {
    /// 日志级别 (trace, debug, info, warn, error)，RUST_LOG 优先
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 运行模拟
    Run(commands::run::RunArgs),
    /// 显示信息
    Info(commands::info::InfoArgs),
    /// 验证配置
    Validate(commands::validate::ValidateArgs),
}

fn parse_level(s: &str) -> Level {
    match s.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 初始化日志；库层 `log` 记录经 tracing-log 桥接
    let level = parse_level(&cli.log_level);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_string().to_lowercase()));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow!("日志初始化失败: {e}"))?;

    // 执行命令
    match cli.command {
        Commands::Run(args) => commands::run::execute(args),
        Commands::Info(args) => commands::info::execute(args),
        Commands::Validate(args) => commands::validate::execute(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("DEBUG"), Level::DEBUG);
        assert_eq!(parse_level("bogus"), Level::INFO);
    }

    #[test]
    fn test_parse_run_overrides() {
        let cli = Cli::try_parse_from([
            "pangu", "run", "--backend", "grid", "--dim", "2d", "--frames", "5", "--format", "csv",
        ])
        .unwrap();
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.backend, Some(pg_config::BackendKind::BlockGrid));
                assert_eq!(args.dim, Some(pg_config::DimensionKind::D2));
                assert_eq!(args.frames, Some(5));
                assert_eq!(args.format, Some(pg_config::OutputFormat::Csv));
            }
            _ => panic!("expected run"),
        }
    }
}
