// crates/pg_physics/src/lib.rs

//! Pangu Physics Layer (Layer 3)
//!
//! 弱可压缩 SPH 流体求解器。每个子步先由邻域核求密度，经刚性状态方程得到压力，
//! 再由压力梯度与重力求力，最后半隐式欧拉积分并钳制到边界盒。
//!
//! # 模块概览
//!
//! - [`core`]: 维度标记 (`D2`/`D3`) 与光滑参数
//! - [`kernel`]: 密度核、压力梯度核、状态方程
//! - [`particle`]: 粒子、初始点阵
//! - [`boundary`]: 轴对齐边界盒
//! - [`engine`]: 共用 SPH 计算、暴力后端、并行调度
//! - [`grid`]: 稀疏块网格后端（祖先查找、迁移、双缓冲）
//! - [`driver`]: 帧循环与输出接口
//! - [`builder`]: 从配置构建类型擦除的模拟
//!
//! # 设计原则
//!
//! 1. **维度泛型**: 2D 与 3D 共用同一套实现
//! 2. **静态分发**: 后端在启动时选定，热循环中无动态派发
//! 3. **确定性**: 每轮读快照写新值，串行与并行结果逐位一致
//!
//! # 示例
//!
//! ```ignore
//! use pg_config::SphConfig;
//! use pg_physics::prelude::*;
//!
//! let mut sim = SimulationBuilder::new(SphConfig::column_2d()).build()?;
//! let mut sink = MemorySink::default();
//! sim.advance_frame(&mut sink)?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod boundary;
pub mod builder;
pub mod core;
pub mod driver;
pub mod engine;
pub mod grid;
pub mod kernel;
pub mod particle;

/// 层级标识
pub const LAYER: u8 = 3;

// 重导出核心类型
pub use boundary::BoundaryBox;
pub use builder::{DynSimulation, SimulationBuilder, SimulationStats};
pub use crate::core::{Dimension, SmoothingParameters, D2, D3};
pub use driver::{
    DriverSettings, FrameRecord, FrameReport, FrameSink, MemorySink, NullSink, RunSummary,
    SimulationDriver,
};
pub use engine::{
    BruteForceBackend, NeighborBackend, Scheduler, SchedulerMetrics, SphBackend, SubstepStats,
};
pub use grid::{BlockGridBackend, BlockGridSettings, SparseGrid};
pub use particle::{lattice, Particle, ParticleSummary};

/// Prelude 模块，包含常用类型
pub mod prelude {
    pub use crate::boundary::BoundaryBox;
    pub use crate::builder::{DynSimulation, SimulationBuilder};
    pub use crate::core::{Dimension, SmoothingParameters, D2, D3};
    pub use crate::driver::{FrameRecord, FrameSink, MemorySink, NullSink, SimulationDriver};
    pub use crate::engine::{BruteForceBackend, NeighborBackend, Scheduler, SphBackend};
    pub use crate::grid::{BlockGridBackend, BlockGridSettings};
    pub use crate::particle::Particle;
}
