// apps/pg_cli/src/commands/validate.rs

//! 配置验证命令
//!
//! 加载并校验配置文件，另外给出不致命但可疑的设置警告。

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use clap::Args;
use pg_config::{BackendKind, SphConfig};
use tracing::{error, info, warn};

/// 验证参数
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// 配置文件路径
    #[arg(short, long)]
    pub config: PathBuf,

    /// 严格模式（警告也视为错误）
    #[arg(long)]
    pub strict: bool,
}

/// 验证结果
#[derive(Default, Debug)]
struct ValidationResult {
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl ValidationResult {
    fn add_error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    fn is_ok_strict(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }
}

/// 执行验证命令
pub fn execute(args: ValidateArgs) -> Result<()> {
    info!("=== Pangu 配置验证 ===");

    let mut result = ValidationResult::default();
    validate_config(&args.config, &mut result);
    print_validation_result(&result, args.strict)
}

fn validate_config(path: &Path, result: &mut ValidationResult) {
    println!("\n检查配置文件: {}", path.display());

    if !path.exists() {
        result.add_error(format!("配置文件不存在: {}", path.display()));
        return;
    }

    match SphConfig::from_file(path) {
        Ok(config) => {
            println!("  ✓ 配置文件有效");
            check_warnings(&config, result);
        }
        Err(e) => result.add_error(e.to_string()),
    }
}

fn check_warnings(config: &SphConfig, result: &mut ValidationResult) {
    let frame_dt = config.simulation.frame_dt;
    let dt = config.simulation.dt;
    let ratio = frame_dt / dt;
    if (ratio - ratio.round()).abs() > 1e-9 {
        result.add_warning(format!(
            "frame_dt/dt = {ratio:.4} 不是整数，每帧按 {} 子步推进",
            config.substeps_per_frame()
        ));
    }

    let lattice = config.resolved_lattice();
    let h = config.smoothing_radius();
    if lattice.spacing >= h {
        result.add_warning(format!(
            "初始间距 {} 不小于 h = {}，最近邻不在支撑半径内",
            lattice.spacing, h
        ));
    }

    if config.simulation.backend == BackendKind::BlockGrid {
        let per_block = config
            .grid
            .block_size
            .pow(config.simulation.dimension.ndim() as u32);
        let spacing_cells = (lattice.spacing * config.inv_dx()).max(f64::MIN_POSITIVE);
        let density = (1.0 / spacing_cells).powi(config.simulation.dimension.ndim() as i32);
        let estimate = (per_block as f64 * density).ceil() as usize;
        if estimate > config.grid.max_particles_per_block {
            result.add_warning(format!(
                "初始点阵每块约 {estimate} 粒子，超过容量 {}",
                config.grid.max_particles_per_block
            ));
        }
        if config.grid.margin_blocks == 0 {
            result.add_warning("margin_blocks = 0，离开 [0, 1] 的粒子会立即丢失");
        }
    }
}

fn print_validation_result(result: &ValidationResult, strict: bool) -> Result<()> {
    println!("\n=== 验证结果 ===");

    if !result.errors.is_empty() {
        println!("\n错误 ({}):", result.errors.len());
        for err in &result.errors {
            error!("  ✗ {}", err);
            println!("  ✗ {}", err);
        }
    }

    if !result.warnings.is_empty() {
        println!("\n警告 ({}):", result.warnings.len());
        for warning in &result.warnings {
            warn!("  ⚠ {}", warning);
            println!("  ⚠ {}", warning);
        }
    }

    let success = if strict {
        result.is_ok_strict()
    } else {
        result.is_ok()
    };

    if success {
        println!("\n✓ 验证通过");
        Ok(())
    } else {
        println!("\n✗ 验证失败");
        bail!(
            "验证失败：发现 {} 个错误，{} 个警告",
            result.errors.len(),
            result.warnings.len()
        )
    }
}
