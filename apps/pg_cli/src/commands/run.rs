// apps/pg_cli/src/commands/run.rs

//! 运行模拟命令
//!
//! # 架构说明
//!
//! 本模块属于 Layer 5: Application，遵循零泛型原则：
//! - 使用 `SphConfig` 配置模拟
//! - 通过 `SimulationBuilder` 构建 `Box<dyn DynSimulation>`
//! - 维度与后端通过枚举选择，无需泛型参数

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Args;
use pg_config::{BackendKind, DimensionKind, OutputFormat, SphConfig};
use pg_physics::SimulationBuilder;
use tracing::{info, warn};

/// 运行模拟参数
#[derive(Args, Debug)]
pub struct RunArgs {
    /// 配置文件路径
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 预设名称 (dam_break_3d, column_2d)
    #[arg(short, long, conflicts_with = "config")]
    pub preset: Option<String>,

    /// 邻域后端 (bf, grid)
    #[arg(short, long)]
    pub backend: Option<BackendKind>,

    /// 空间维度 (2d, 3d)
    #[arg(short, long)]
    pub dim: Option<DimensionKind>,

    /// 总帧数
    #[arg(short, long)]
    pub frames: Option<usize>,

    /// 输出目录
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// 输出格式 (json, csv, binary, none)
    #[arg(long)]
    pub format: Option<OutputFormat>,

    /// 专用线程池大小
    #[arg(short, long)]
    pub threads: Option<usize>,

    /// 每隔多少帧打印一次进度
    #[arg(long, default_value = "10")]
    pub report_every: usize,
}

/// 组装最终配置：配置文件 > 预设 > 按维度选取的默认预设，再叠加命令行覆盖
pub fn resolve_config(args: &RunArgs) -> Result<SphConfig> {
    let mut config = if let Some(path) = &args.config {
        SphConfig::from_file(path)
            .with_context(|| format!("无法加载配置文件 {}", path.display()))?
    } else if let Some(name) = &args.preset {
        SphConfig::preset(name).with_context(|| {
            format!(
                "未知预设 '{}'，可选: {}",
                name,
                SphConfig::preset_names().join(", ")
            )
        })?
    } else {
        match args.dim {
            Some(DimensionKind::D2) => SphConfig::column_2d(),
            _ => SphConfig::dam_break_3d(),
        }
    };

    if let Some(dim) = args.dim {
        if dim != config.simulation.dimension {
            warn!("维度由 {} 改为 {}，点阵与边界使用该维度的默认值", config.simulation.dimension, dim);
            config.simulation.dimension = dim;
            config.initial = Default::default();
            config.boundary = Default::default();
        }
    }
    if let Some(backend) = args.backend {
        config.simulation.backend = backend;
    }
    if let Some(frames) = args.frames {
        config.simulation.total_frames = frames;
    }
    if let Some(output) = &args.output {
        config.output.directory = output.clone();
    }
    if let Some(format) = args.format {
        config.output.format = format;
    }
    if let Some(threads) = args.threads {
        config.parallel.num_threads = Some(threads);
    }

    config.validate().context("配置无效")?;
    Ok(config)
}

/// 执行运行命令
pub fn execute(args: RunArgs) -> Result<()> {
    info!("=== Pangu SPH 模拟启动 ===");

    let config = resolve_config(&args)?;
    info!(
        "配置: {} / {}, N={}, h={:.5}, dt={}, 每帧 {} 子步, 共 {} 帧",
        config.simulation.dimension,
        config.simulation.backend,
        config.physics.grid_resolution,
        config.smoothing_radius(),
        config.simulation.dt,
        config.substeps_per_frame(),
        config.simulation.total_frames
    );

    let mut simulation = SimulationBuilder::from_config(&config).context("构建模拟失败")?;
    info!(
        "模拟: {} 后端, {}, {} 粒子",
        simulation.backend_name(),
        simulation.dimension_name(),
        simulation.particle_count()
    );

    let mut sink = pg_io::create_writer(&config.output).context("创建输出失败")?;

    let start = Instant::now();
    let every = args.report_every.max(1);
    while !simulation.is_finished() {
        let report = simulation
            .advance_frame(sink.as_mut())
            .with_context(|| format!("第 {} 帧失败", simulation.current_frame() + 1))?;
        if report.lost_particles > 0 {
            warn!("帧 {}: 丢失 {} 个粒子", report.frame, report.lost_particles);
        }
        if report.frame % every == 0 || report.frame == simulation.total_frames() {
            info!(
                "帧 {}/{}: t={:.4}, {} 粒子, 质心 y={:.4}, 最大速率 {:.4}, 耗时 {:.1} ms",
                report.frame,
                simulation.total_frames(),
                report.time,
                report.particles,
                report.summary.centroid[1],
                report.summary.max_speed,
                report.wall_time.as_secs_f64() * 1000.0
            );
        }
    }

    let elapsed = start.elapsed();
    info!("=== 模拟完成 ===");
    for line in simulation.stats().to_string().lines() {
        info!("{}", line);
    }
    info!("总耗时: {:.2} s", elapsed.as_secs_f64());
    if let Some(ext) = config.output.format.extension() {
        info!("输出: {}/*.{}", config.output.directory.display(), ext);
    }

    Ok(())
}
