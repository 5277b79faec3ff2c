// crates/pg_physics/src/engine/mod.rs

//! 邻域后端
//!
//! 两种后端都只暴露一个推进操作 `substep()`，由驱动每个积分步调用一次。
//! 启动时按配置选定后端，之后通过 [`SphBackend`] 枚举静态分发，
//! 热循环内部没有动态派发。
//!
//! # 模块概览
//!
//! - [`sph_pass`]: 两种后端共用的密度/力/积分计算
//! - [`brute_force`]: 全对暴力后端
//! - [`parallel`]: 显式并行调度器

pub mod brute_force;
pub mod parallel;
pub mod sph_pass;

use std::time::Duration;

use pg_foundation::PgResult;

use crate::core::dimension::Dimension;
use crate::grid::BlockGridBackend;
use crate::particle::Particle;

pub use brute_force::BruteForceBackend;
pub use parallel::{Scheduler, SchedulerMetrics};
pub use sph_pass::SphPass;

/// 单个子步的统计
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SubstepStats {
    /// 子步结束时的粒子数
    pub particles: usize,
    /// 本子步丢失的粒子数（离开全部块的覆盖范围）
    pub lost_particles: usize,
    /// 激活块数（暴力后端为 0）
    pub active_blocks: usize,
    /// 耗时
    pub duration: Duration,
}

/// 邻域后端接口
pub trait NeighborBackend<D: Dimension>: Send + Sync {
    /// 后端名称
    fn name(&self) -> &'static str;

    /// 推进一个子步
    fn substep(&mut self) -> PgResult<SubstepStats>;

    /// 拷贝出全部存活粒子
    fn gather_particles(&self) -> Vec<Particle<D>>;

    /// 存活粒子数
    fn particle_count(&self) -> usize;

    /// 调度指标
    fn scheduler_metrics(&self) -> &SchedulerMetrics;
}

/// 启动时选定的后端
#[derive(Debug)]
pub enum SphBackend<D: Dimension> {
    /// 暴力后端
    BruteForce(BruteForceBackend<D>),
    /// 稀疏块网格后端
    BlockGrid(BlockGridBackend<D>),
}

impl<D: Dimension> NeighborBackend<D> for SphBackend<D> {
    fn name(&self) -> &'static str {
        match self {
            Self::BruteForce(b) => b.name(),
            Self::BlockGrid(b) => b.name(),
        }
    }

    fn substep(&mut self) -> PgResult<SubstepStats> {
        match self {
            Self::BruteForce(b) => b.substep(),
            Self::BlockGrid(b) => b.substep(),
        }
    }

    fn gather_particles(&self) -> Vec<Particle<D>> {
        match self {
            Self::BruteForce(b) => b.gather_particles(),
            Self::BlockGrid(b) => b.gather_particles(),
        }
    }

    fn particle_count(&self) -> usize {
        match self {
            Self::BruteForce(b) => b.particle_count(),
            Self::BlockGrid(b) => b.particle_count(),
        }
    }

    fn scheduler_metrics(&self) -> &SchedulerMetrics {
        match self {
            Self::BruteForce(b) => b.scheduler_metrics(),
            Self::BlockGrid(b) => b.scheduler_metrics(),
        }
    }
}

impl<D: Dimension> From<BruteForceBackend<D>> for SphBackend<D> {
    fn from(b: BruteForceBackend<D>) -> Self {
        Self::BruteForce(b)
    }
}

impl<D: Dimension> From<BlockGridBackend<D>> for SphBackend<D> {
    fn from(b: BlockGridBackend<D>) -> Self {
        Self::BlockGrid(b)
    }
}
