// apps/pg_cli/src/commands/info.rs

//! 信息显示命令
//!
//! 显示构建信息、预设和核函数常数。

use anyhow::{Context, Result};
use clap::Args;
use pg_config::SphConfig;
use pg_physics::grid::ancestor_offsets;
use pg_physics::kernel::{density_kernel, poly6_normalization};
use pg_physics::{D2, D3};
use tracing::info;

/// 信息显示参数
#[derive(Args, Debug)]
pub struct InfoArgs {
    /// 显示系统信息
    #[arg(long)]
    pub system: bool,

    /// 显示预设
    #[arg(long)]
    pub presets: bool,

    /// 以 JSON 输出指定预设的完整配置
    #[arg(long, value_name = "PRESET")]
    pub dump: Option<String>,
}

/// 执行信息命令
pub fn execute(args: InfoArgs) -> Result<()> {
    info!("=== Pangu 信息 ===");

    if let Some(name) = &args.dump {
        let config = SphConfig::preset(name)
            .with_context(|| format!("未知预设 '{name}'"))?;
        println!("{}", config.to_json_pretty()?);
        return Ok(());
    }

    if args.system {
        print_system_info();
    }

    if args.presets {
        print_presets();
    }

    if !args.system && !args.presets {
        // 默认显示所有信息
        print_system_info();
        println!();
        print_presets();
    }

    Ok(())
}

fn print_system_info() {
    println!("=== 系统信息 ===");
    println!("Pangu CLI 版本: {}", env!("CARGO_PKG_VERSION"));
    println!("目标平台: {}", std::env::consts::ARCH);
    println!("操作系统: {}", std::env::consts::OS);
    println!("rayon 线程数: {}", pg_physics::Scheduler::parallel().num_threads());

    println!("\n邻域后端:");
    println!("  - brute_force (bf): 全对 O(n²)");
    println!("  - block_grid (grid): 稀疏块网格");
    println!(
        "\n祖先块数: 2D {} / 3D {}",
        ancestor_offsets::<D2>().len(),
        ancestor_offsets::<D3>().len()
    );
}

fn print_presets() {
    println!("=== 预设 ===");
    for name in SphConfig::preset_names() {
        let Some(config) = SphConfig::preset(name) else {
            continue;
        };
        let h = config.smoothing_radius();
        println!("\n{name}:");
        println!("  维度: {}, 后端: {}", config.simulation.dimension, config.simulation.backend);
        println!("  N = {}, dx = {}, h = {}", config.physics.grid_resolution, config.dx(), h);
        println!(
            "  dt = {}, 帧间隔 = {}, 每帧子步 = {}, 帧数 = {}",
            config.simulation.dt,
            config.simulation.frame_dt,
            config.substeps_per_frame(),
            config.simulation.total_frames
        );
        println!(
            "  rho0 = {}, k = {:e}, 重力 = {:?}",
            config.physics.rest_density, config.physics.stiffness, config.physics.gravity
        );
        println!("  粒子数: {}", config.initial_particle_count());
        println!("  核函数:");
        println!("    W(0) = h⁶ = {:e}", density_kernel(0.0, h));
        println!("    poly6 c = 315/(64πh⁹) = {:e}", poly6_normalization(h));
        println!("    密度归一化: {}", if config.normalize_density() { "是" } else { "否" });
    }
}
