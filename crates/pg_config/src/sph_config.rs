// crates/pg_config/src/sph_config.rs

//! SphConfig - SPH 求解器配置（全 f64）
//!
//! 所有参数在构建求解器时一次性读取，此后不可变。
//! 部分默认值依赖维度与邻域后端（边界、初始粒子、输出缩放、密度归一化），
//! 因此以 `Option` 存储，由 `resolved_*` 方法给出最终取值。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::ConfigError;

// ============================================================
// 枚举
// ============================================================

/// 空间维度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DimensionKind {
    /// 二维
    #[serde(rename = "2d")]
    D2,
    /// 三维
    #[default]
    #[serde(rename = "3d")]
    D3,
}

impl DimensionKind {
    /// 维度数
    pub fn ndim(self) -> usize {
        match self {
            Self::D2 => 2,
            Self::D3 => 3,
        }
    }
}

impl fmt::Display for DimensionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::D2 => write!(f, "2d"),
            Self::D3 => write!(f, "3d"),
        }
    }
}

impl FromStr for DimensionKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "2d" | "2" => Ok(Self::D2),
            "3d" | "3" => Ok(Self::D3),
            other => Err(ConfigError::invalid("simulation.dimension", other, "可选值: 2d, 3d")),
        }
    }
}

/// 邻域搜索后端
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// 全对暴力搜索，O(n²)
    #[default]
    #[serde(alias = "bf")]
    BruteForce,
    /// 稀疏块网格
    #[serde(alias = "grid", alias = "pangu")]
    BlockGrid,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BruteForce => write!(f, "brute_force"),
            Self::BlockGrid => write!(f, "block_grid"),
        }
    }
}

impl FromStr for BackendKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bf" | "brute_force" | "brute-force" => Ok(Self::BruteForce),
            "grid" | "block_grid" | "block-grid" | "pangu" => Ok(Self::BlockGrid),
            other => Err(ConfigError::invalid(
                "simulation.backend",
                other,
                "可选值: bf, grid",
            )),
        }
    }
}

/// 执行模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// 串行执行
    Sequential,
    /// 并行执行
    Parallel,
    /// 按规模自动选择
    #[default]
    Auto,
}

/// 输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// JSON 粒子数组
    #[default]
    Json,
    /// CSV 表格
    Csv,
    /// 二进制 f32 粒子表
    Binary,
    /// 不输出
    None,
}

impl OutputFormat {
    /// 文件扩展名
    pub fn extension(self) -> Option<&'static str> {
        match self {
            Self::Json => Some("json"),
            Self::Csv => Some("csv"),
            Self::Binary => Some("bin"),
            Self::None => None,
        }
    }
}

impl FromStr for OutputFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            "binary" | "bin" => Ok(Self::Binary),
            "none" => Ok(Self::None),
            other => Err(ConfigError::invalid(
                "output.format",
                other,
                "可选值: json, csv, binary, none",
            )),
        }
    }
}

// ============================================================
// 顶层配置
// ============================================================

/// SPH 求解器配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SphConfig {
    /// 时间推进与后端选择
    #[serde(default)]
    pub simulation: SimulationConfig,

    /// 物理参数
    #[serde(default)]
    pub physics: PhysicsConfig,

    /// 边界
    #[serde(default)]
    pub boundary: BoundaryConfig,

    /// 初始粒子
    #[serde(default)]
    pub initial: InitialConfig,

    /// 块网格
    #[serde(default)]
    pub grid: GridConfig,

    /// 并行
    #[serde(default)]
    pub parallel: ParallelConfig,

    /// 输出
    #[serde(default)]
    pub output: OutputConfig,
}

/// 时间推进配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// 空间维度
    #[serde(default)]
    pub dimension: DimensionKind,

    /// 邻域后端
    #[serde(default)]
    pub backend: BackendKind,

    /// 总帧数
    #[serde(default = "default_total_frames")]
    pub total_frames: usize,

    /// 帧间隔 [s]
    #[serde(default = "default_frame_dt")]
    pub frame_dt: f64,

    /// 子步长 [s]
    #[serde(default = "default_dt")]
    pub dt: f64,
}

fn default_total_frames() -> usize {
    128
}
fn default_frame_dt() -> f64 {
    0.1
}
fn default_dt() -> f64 {
    0.0003
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            dimension: DimensionKind::default(),
            backend: BackendKind::default(),
            total_frames: default_total_frames(),
            frame_dt: default_frame_dt(),
            dt: default_dt(),
        }
    }
}

/// 物理参数配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhysicsConfig {
    /// 每个轴上的网格单元数 N，dx = 1/N
    #[serde(default = "default_grid_resolution")]
    pub grid_resolution: usize,

    /// 光滑半径与 dx 之比
    #[serde(default = "default_smoothing_ratio")]
    pub smoothing_ratio: f64,

    /// 参考密度 rho0
    #[serde(default = "default_rest_density")]
    pub rest_density: f64,

    /// 刚度 k
    #[serde(default = "default_stiffness")]
    pub stiffness: f64,

    /// 重力加速度，2D 时忽略 z 分量
    #[serde(default = "default_gravity")]
    pub gravity: [f64; 3],

    /// 是否乘以 poly6 归一化常数；缺省时仅暴力后端归一化
    #[serde(default)]
    pub normalize_density: Option<bool>,
}

fn default_grid_resolution() -> usize {
    20
}
fn default_smoothing_ratio() -> f64 {
    0.5
}
fn default_rest_density() -> f64 {
    1.0
}
fn default_stiffness() -> f64 {
    1e-8
}
fn default_gravity() -> [f64; 3] {
    [0.0, -100.0, 0.0]
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            grid_resolution: default_grid_resolution(),
            smoothing_ratio: default_smoothing_ratio(),
            rest_density: default_rest_density(),
            stiffness: default_stiffness(),
            gravity: default_gravity(),
            normalize_density: None,
        }
    }
}

/// 边界配置
///
/// 每个轴的下界/上界可缺省（无约束）。整体缺省时按维度取默认值。
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BoundaryConfig {
    /// 各轴下界
    #[serde(default)]
    pub lower: Option<[Option<f64>; 3]>,

    /// 各轴上界
    #[serde(default)]
    pub upper: Option<[Option<f64>; 3]>,
}

/// 解析后的边界
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedBounds {
    /// 各轴下界
    pub lower: [Option<f64>; 3],
    /// 各轴上界
    pub upper: [Option<f64>; 3],
}

/// 初始粒子点阵配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct InitialConfig {
    /// 点阵原点
    #[serde(default)]
    pub origin: Option<[f64; 3]>,

    /// 各轴粒子数
    #[serde(default)]
    pub counts: Option<[usize; 3]>,

    /// 粒子间距
    #[serde(default)]
    pub spacing: Option<f64>,

    /// 单元内偏移（0.5 表示放在单元中心）
    #[serde(default)]
    pub cell_offset: Option<f64>,
}

/// 解析后的初始点阵
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatticeSpec {
    /// 原点
    pub origin: [f64; 3],
    /// 各轴粒子数（2D 时 z 分量被忽略）
    pub counts: [usize; 3],
    /// 间距
    pub spacing: f64,
    /// 单元内偏移
    pub cell_offset: f64,
}

/// 块网格配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridConfig {
    /// 每块边长（单元数）
    #[serde(default = "default_block_size")]
    pub block_size: usize,

    /// 每块粒子容量
    #[serde(default = "default_max_particles_per_block")]
    pub max_particles_per_block: usize,

    /// 计算域外额外激活的块层数
    #[serde(default = "default_margin_blocks")]
    pub margin_blocks: usize,
}

fn default_block_size() -> usize {
    4
}
fn default_max_particles_per_block() -> usize {
    4096
}
fn default_margin_blocks() -> usize {
    1
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            block_size: default_block_size(),
            max_particles_per_block: default_max_particles_per_block(),
            margin_blocks: default_margin_blocks(),
        }
    }
}

/// 并行配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParallelConfig {
    /// 执行模式
    #[serde(default)]
    pub mode: ExecutionMode,

    /// 专用线程池大小，`Some(1)` 等价于强制单线程
    #[serde(default)]
    pub num_threads: Option<usize>,

    /// Auto 模式下启用并行的最小工作项数
    #[serde(default = "default_min_parallel_size")]
    pub min_parallel_size: usize,
}

fn default_min_parallel_size() -> usize {
    256
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            mode: ExecutionMode::default(),
            num_threads: None,
            min_parallel_size: default_min_parallel_size(),
        }
    }
}

/// 输出配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// 输出目录
    #[serde(default = "default_output_dir")]
    pub directory: PathBuf,

    /// 输出格式
    #[serde(default)]
    pub format: OutputFormat,

    /// 位置缩放，缺省按后端取值
    #[serde(default)]
    pub position_scale: Option<f64>,

    /// 粒子半径，缺省按后端取值
    #[serde(default)]
    pub radius: Option<f64>,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
            format: OutputFormat::default(),
            position_scale: None,
            radius: None,
        }
    }
}

// ============================================================
// 预设
// ============================================================

impl SphConfig {
    /// 三维溃坝：N=20，h=dx/2，10³ 粒子
    pub fn dam_break_3d() -> Self {
        Self::default()
    }

    /// 二维水柱：dx=0.01，h=dx，40×40 粒子，每帧 10 子步
    pub fn column_2d() -> Self {
        Self {
            simulation: SimulationConfig {
                dimension: DimensionKind::D2,
                backend: BackendKind::BruteForce,
                total_frames: 200,
                frame_dt: 0.01,
                dt: 0.001,
            },
            physics: PhysicsConfig {
                grid_resolution: 100,
                smoothing_ratio: 1.0,
                rest_density: 1.0,
                stiffness: 1e-7,
                gravity: [0.0, -10.0, 0.0],
                normalize_density: Some(false),
            },
            ..Self::default()
        }
    }

    /// 按名称查找预设
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "dam_break_3d" => Some(Self::dam_break_3d()),
            "column_2d" => Some(Self::column_2d()),
            _ => None,
        }
    }

    /// 全部预设名称
    pub fn preset_names() -> &'static [&'static str] {
        &["dam_break_3d", "column_2d"]
    }
}

// ============================================================
// 派生量
// ============================================================

impl SphConfig {
    /// 网格单元尺寸
    pub fn dx(&self) -> f64 {
        1.0 / self.physics.grid_resolution as f64
    }

    /// 单元尺寸倒数
    pub fn inv_dx(&self) -> f64 {
        self.physics.grid_resolution as f64
    }

    /// 光滑半径 h
    pub fn smoothing_radius(&self) -> f64 {
        self.dx() * self.physics.smoothing_ratio
    }

    /// 是否对密度做 poly6 归一化
    pub fn normalize_density(&self) -> bool {
        self.physics
            .normalize_density
            .unwrap_or(self.simulation.backend == BackendKind::BruteForce)
    }

    /// 每帧子步数，与 `for i in 0.. while i < frame_dt/dt` 一致
    pub fn substeps_per_frame(&self) -> usize {
        (self.simulation.frame_dt / self.simulation.dt).ceil() as usize
    }

    /// 边界（缺省时按维度取默认值）
    pub fn resolved_bounds(&self) -> ResolvedBounds {
        let dx = self.dx();
        let h = self.smoothing_radius();
        let (lower, upper) = match self.simulation.dimension {
            DimensionKind::D3 => (
                [Some(0.0), Some(h / 2.0), Some(0.0)],
                [Some(1.0), None, Some(1.0)],
            ),
            DimensionKind::D2 => (
                [Some(0.0), Some(0.1), None],
                [Some(1.0 - dx), Some(1.0 - dx), None],
            ),
        };
        ResolvedBounds {
            lower: self.boundary.lower.unwrap_or(lower),
            upper: self.boundary.upper.unwrap_or(upper),
        }
    }

    /// 初始点阵（缺省时按维度取默认值）
    pub fn resolved_lattice(&self) -> LatticeSpec {
        let defaults = match self.simulation.dimension {
            DimensionKind::D3 => LatticeSpec {
                origin: [0.0; 3],
                counts: [10, 10, 10],
                spacing: self.smoothing_radius(),
                cell_offset: 0.5,
            },
            DimensionKind::D2 => LatticeSpec {
                origin: [0.1, 0.1, 0.0],
                counts: [40, 40, 1],
                spacing: self.dx(),
                cell_offset: 0.0,
            },
        };
        LatticeSpec {
            origin: self.initial.origin.unwrap_or(defaults.origin),
            counts: self.initial.counts.unwrap_or(defaults.counts),
            spacing: self.initial.spacing.unwrap_or(defaults.spacing),
            cell_offset: self.initial.cell_offset.unwrap_or(defaults.cell_offset),
        }
    }

    /// 输出位置缩放
    pub fn resolved_position_scale(&self) -> f64 {
        self.output.position_scale.unwrap_or(match self.simulation.backend {
            BackendKind::BruteForce => 10.0,
            BackendKind::BlockGrid => 3.0,
        })
    }

    /// 输出粒子半径
    pub fn resolved_radius(&self) -> f64 {
        self.output.radius.unwrap_or(match self.simulation.backend {
            BackendKind::BruteForce => self.smoothing_radius() * 10.0,
            BackendKind::BlockGrid => 0.3,
        })
    }

    /// 初始粒子总数
    pub fn initial_particle_count(&self) -> usize {
        let lattice = self.resolved_lattice();
        lattice.counts[..self.simulation.dimension.ndim()]
            .iter()
            .product()
    }
}

// ============================================================
// 加载与验证
// ============================================================

impl SphConfig {
    /// 从文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json(&content)
    }

    /// 从 JSON 字符串加载配置
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let config: SphConfig =
            serde_json::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// 序列化为格式化 JSON
    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// 保存到文件
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        std::fs::write(path.as_ref(), self.to_json_pretty()?)?;
        Ok(())
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        let sim = &self.simulation;
        if !(sim.dt.is_finite() && sim.dt > 0.0) {
            return Err(ConfigError::invalid("simulation.dt", sim.dt, "必须为有限正数"));
        }
        if !(sim.frame_dt.is_finite() && sim.frame_dt >= sim.dt) {
            return Err(ConfigError::invalid(
                "simulation.frame_dt",
                sim.frame_dt,
                "必须为有限值且不小于 dt",
            ));
        }
        if sim.total_frames == 0 {
            return Err(ConfigError::invalid("simulation.total_frames", 0, "至少为 1"));
        }

        let phys = &self.physics;
        if phys.grid_resolution == 0 {
            return Err(ConfigError::invalid("physics.grid_resolution", 0, "至少为 1"));
        }
        if !(phys.smoothing_ratio.is_finite() && phys.smoothing_ratio > 0.0) {
            return Err(ConfigError::invalid(
                "physics.smoothing_ratio",
                phys.smoothing_ratio,
                "必须为有限正数",
            ));
        }
        if !(phys.rest_density.is_finite() && phys.rest_density > 0.0) {
            return Err(ConfigError::invalid(
                "physics.rest_density",
                phys.rest_density,
                "必须为有限正数",
            ));
        }
        if !(phys.stiffness.is_finite() && phys.stiffness >= 0.0) {
            return Err(ConfigError::invalid(
                "physics.stiffness",
                phys.stiffness,
                "必须为有限非负数",
            ));
        }
        if phys.gravity.iter().any(|g| !g.is_finite()) {
            return Err(ConfigError::invalid(
                "physics.gravity",
                format!("{:?}", phys.gravity),
                "分量必须为有限值",
            ));
        }

        let bounds = self.resolved_bounds();
        for axis in 0..3 {
            if let (Some(lo), Some(hi)) = (bounds.lower[axis], bounds.upper[axis]) {
                if lo >= hi {
                    return Err(ConfigError::invalid(
                        "boundary",
                        format!("axis {axis}: [{lo}, {hi}]"),
                        "下界必须小于上界",
                    ));
                }
            }
        }

        let lattice = self.resolved_lattice();
        if !(lattice.spacing.is_finite() && lattice.spacing > 0.0) {
            return Err(ConfigError::invalid(
                "initial.spacing",
                lattice.spacing,
                "必须为有限正数",
            ));
        }
        if self.initial_particle_count() == 0 {
            return Err(ConfigError::invalid(
                "initial.counts",
                format!("{:?}", lattice.counts),
                "粒子数不能为零",
            ));
        }

        let grid = &self.grid;
        if grid.block_size == 0 {
            return Err(ConfigError::invalid("grid.block_size", 0, "至少为 1"));
        }
        if grid.max_particles_per_block == 0 {
            return Err(ConfigError::invalid("grid.max_particles_per_block", 0, "至少为 1"));
        }

        if self.parallel.num_threads == Some(0) {
            return Err(ConfigError::invalid("parallel.num_threads", 0, "至少为 1"));
        }

        if let Some(scale) = self.output.position_scale {
            if !(scale.is_finite() && scale > 0.0) {
                return Err(ConfigError::invalid("output.position_scale", scale, "必须为有限正数"));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_dam_break() {
        let config = SphConfig::default();
        assert!(config.validate().is_ok());
        assert!((config.dx() - 0.05).abs() < 1e-12);
        assert!((config.smoothing_radius() - 0.025).abs() < 1e-12);
        assert_eq!(config.initial_particle_count(), 1000);
        assert!(config.normalize_density());
        assert_eq!(config.substeps_per_frame(), 334);
    }

    #[test]
    fn test_bounds_3d_has_no_y_ceiling() {
        let bounds = SphConfig::default().resolved_bounds();
        assert_eq!(bounds.upper[1], None);
        assert_eq!(bounds.lower[1], Some(0.0125));
        assert_eq!(bounds.upper[0], Some(1.0));
    }

    #[test]
    fn test_column_2d_preset() {
        let config = SphConfig::column_2d();
        assert!(config.validate().is_ok());
        assert_eq!(config.simulation.dimension, DimensionKind::D2);
        assert!(!config.normalize_density());
        assert_eq!(config.substeps_per_frame(), 10);
        assert_eq!(config.initial_particle_count(), 1600);
        let bounds = config.resolved_bounds();
        assert_eq!(bounds.lower[1], Some(0.1));
        assert!((bounds.upper[0].unwrap() - 0.99).abs() < 1e-12);
    }

    #[test]
    fn test_block_grid_defaults() {
        let mut config = SphConfig::default();
        config.simulation.backend = BackendKind::BlockGrid;
        assert!(!config.normalize_density());
        assert_eq!(config.resolved_position_scale(), 3.0);
        assert_eq!(config.resolved_radius(), 0.3);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = SphConfig::default();
        config.simulation.dt = 0.0;
        assert!(config.validate().is_err());

        let mut config = SphConfig::default();
        config.grid.block_size = 0;
        assert!(config.validate().is_err());

        let mut config = SphConfig::default();
        config.parallel.num_threads = Some(0);
        assert!(config.validate().is_err());

        let mut config = SphConfig::default();
        config.boundary.lower = Some([Some(1.0), None, None]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_json_partial_document() {
        let json = r#"{
            "simulation": { "backend": "grid", "total_frames": 4 },
            "physics": { "stiffness": 1e-6 }
        }"#;
        let config = SphConfig::from_json(json).unwrap();
        assert_eq!(config.simulation.backend, BackendKind::BlockGrid);
        assert_eq!(config.simulation.total_frames, 4);
        assert_eq!(config.physics.stiffness, 1e-6);
        assert_eq!(config.physics.grid_resolution, 20);
    }

    #[test]
    fn test_from_str() {
        assert_eq!("bf".parse::<BackendKind>().unwrap(), BackendKind::BruteForce);
        assert_eq!("pangu".parse::<BackendKind>().unwrap(), BackendKind::BlockGrid);
        assert_eq!("2d".parse::<DimensionKind>().unwrap(), DimensionKind::D2);
        assert!("4d".parse::<DimensionKind>().is_err());
        assert_eq!("bin".parse::<OutputFormat>().unwrap(), OutputFormat::Binary);
    }
}
