// crates/pg_config/src/lib.rs

//! Pangu Config Layer (Layer 2)
//!
//! 配置层，描述一次 SPH 模拟的全部输入参数。本层不含泛型，
//! 维度与邻域后端均以枚举表示，由物理层在构建时分发。
//!
//! # 模块概览
//!
//! - [`sph_config`]: `SphConfig` 及各子配置、预设
//! - [`error`]: 配置错误类型
//!
//! # 层级架构
//!
//! ```text
//! Layer 5: pg_cli      ─> SphConfig, DynSimulation
//! Layer 4: pg_io       ─> FrameSink 实现
//! Layer 3: pg_physics  ─> 核函数、后端、驱动
//! Layer 2: pg_config   ─> SphConfig (本层)
//! Layer 1: pg_foundation
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod sph_config;

/// 层级标识
pub const LAYER: u8 = 2;

// 重导出核心类型
pub use error::ConfigError;
pub use sph_config::{
    BackendKind, BoundaryConfig, DimensionKind, ExecutionMode, GridConfig, InitialConfig,
    LatticeSpec, OutputConfig, OutputFormat, ParallelConfig, PhysicsConfig, ResolvedBounds,
    SimulationConfig, SphConfig,
};
