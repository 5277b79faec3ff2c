// crates/pg_physics/src/grid/backend.rs

//! 块网格邻域后端
//!
//! 每个子步对每个激活块 `b`：
//!
//! 1. 从自身祖先复制节点数据（自身祖先缺失为致命错误）
//! 2. 计算负责区间 `[base − 0.5, base + size − 0.5)`（网格单位）
//! 3. 扫描所有存在的祖先，把网格位置落在区间内的粒子收集到 `b`（迁移）
//! 4. 在 `b` 刚收集的粒子集合内执行密度、力与积分
//!
//! 第 4 步的邻域只限于块内驻留粒子，靠近块边界的粒子会少计跨块邻居，
//! 与暴力后端结果不同。这是该后端的已知近似。
//!
//! 离开全部块覆盖范围的粒子在下一子步丢失，计入 `lost_particles` 并告警。

use std::time::Instant;

use log::{info, trace, warn};
use pg_config::SphConfig;
use pg_foundation::{PgError, PgResult};

use crate::boundary::BoundaryBox;
use crate::core::dimension::Dimension;
use crate::core::params::SmoothingParameters;
use crate::engine::parallel::{Scheduler, SchedulerMetrics};
use crate::engine::sph_pass::SphPass;
use crate::engine::{NeighborBackend, SubstepStats};
use crate::grid::ancestors::Ancestors;
use crate::grid::block::Block;
use crate::grid::sparse_grid::SparseGrid;
use crate::particle::Particle;

/// 块网格设置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockGridSettings {
    /// 每块边长（单元数）
    pub block_size: usize,
    /// 每块粒子容量
    pub max_particles_per_block: usize,
    /// 计算域外额外激活的块层数
    pub margin_blocks: usize,
    /// 每轴网格单元数 N
    pub grid_resolution: usize,
}

impl Default for BlockGridSettings {
    fn default() -> Self {
        Self {
            block_size: 4,
            max_particles_per_block: 4096,
            margin_blocks: 1,
            grid_resolution: 20,
        }
    }
}

impl BlockGridSettings {
    /// 从配置提取
    pub fn from_config(config: &SphConfig) -> Self {
        Self {
            block_size: config.grid.block_size,
            max_particles_per_block: config.grid.max_particles_per_block,
            margin_blocks: config.grid.margin_blocks,
            grid_resolution: config.physics.grid_resolution,
        }
    }

    /// 1/dx
    pub fn inv_dx(&self) -> f64 {
        self.grid_resolution as f64
    }

    /// 覆盖 `[-margin, N + margin]` 单元所需的全部块基坐标
    pub fn covering_cells<D: Dimension>(&self) -> Vec<D::Coord> {
        let b = self.block_size as i32;
        let margin = (self.margin_blocks * self.block_size) as i32;
        let lo = (-margin).div_euclid(b);
        let hi = (self.grid_resolution as i32 + margin).div_euclid(b);
        let per_axis = (hi - lo + 1) as usize;
        let total = per_axis.pow(D::NDIM as u32);
        (0..total)
            .map(|index| {
                D::coord_from_fn(|axis| {
                    let step = (index / per_axis.pow(axis as u32)) % per_axis;
                    (lo + step as i32) * b
                })
            })
            .collect()
    }
}

/// 单个块的一次更新
///
/// `block` 为本代写缓冲（初始为空），`ancestors` 为上一代只读祖先。
pub fn update_block<D: Dimension>(
    block: &mut Block<D>,
    ancestors: &Ancestors<'_, D>,
    pass: &SphPass<'_, D>,
    inv_dx: f64,
) -> PgResult<()> {
    let seed = ancestors
        .self_block()
        .ok_or_else(|| PgError::missing_self_ancestor(block.base_array()))?;
    block.inherit_nodes(seed)?;

    for source in ancestors.existing() {
        for particle in source.particles() {
            if block.owns_grid_pos(particle.position * inv_dx) {
                block.add_particle(*particle)?;
            }
        }
    }
    block.record_occupancy(inv_dx);

    if block.particle_count() > 0 {
        pass.step(block.particles_mut(), &Scheduler::sequential())?;
    }
    Ok(())
}

/// 块网格邻域后端
#[derive(Debug)]
pub struct BlockGridBackend<D: Dimension> {
    grid: SparseGrid<D>,
    params: SmoothingParameters<D>,
    boundary: BoundaryBox<D>,
    scheduler: Scheduler,
    inv_dx: f64,
    step_count: u64,
    lost_particles: usize,
}

impl<D: Dimension> BlockGridBackend<D> {
    /// 创建后端：激活覆盖计算域的块，再放入初始粒子
    pub fn new(
        particles: Vec<Particle<D>>,
        params: SmoothingParameters<D>,
        boundary: BoundaryBox<D>,
        settings: BlockGridSettings,
        scheduler: Scheduler,
    ) -> PgResult<Self> {
        let mut grid = SparseGrid::new(settings.block_size, settings.max_particles_per_block)?;
        for cell in settings.covering_cells::<D>() {
            grid.touch(cell);
        }
        let inv_dx = settings.inv_dx();
        for particle in particles {
            grid.insert_particle(particle, inv_dx)?;
        }
        info!(
            "块网格初始化: {} 块 (边长 {}), {} 粒子",
            grid.num_blocks(),
            settings.block_size,
            grid.num_particles()
        );
        Ok(Self {
            grid,
            params,
            boundary,
            scheduler,
            inv_dx,
            step_count: 0,
            lost_particles: 0,
        })
    }

    /// 底层网格
    pub fn grid(&self) -> &SparseGrid<D> {
        &self.grid
    }

    /// 累计丢失粒子数
    pub fn lost_particles(&self) -> usize {
        self.lost_particles
    }

    /// 已执行子步数
    pub fn step_count(&self) -> u64 {
        self.step_count
    }
}

impl<D: Dimension> NeighborBackend<D> for BlockGridBackend<D> {
    fn name(&self) -> &'static str {
        "block_grid"
    }

    fn substep(&mut self) -> PgResult<SubstepStats> {
        let start = Instant::now();
        let before = self.grid.num_particles();
        let parallel = self.scheduler.should_parallelize(self.grid.num_blocks());
        let pass = SphPass::new(&self.params, &self.boundary);
        let inv_dx = self.inv_dx;
        let grid = &mut self.grid;
        self.scheduler.install(|| {
            grid.advance(
                |block, ancestors| update_block(block, ancestors, &pass, inv_dx),
                parallel,
            )
        })?;
        let duration = start.elapsed();
        self.scheduler.record(self.grid.num_blocks(), parallel, duration);

        let after = self.grid.num_particles();
        if after > before {
            return Err(PgError::internal(format!(
                "迁移后粒子数增加: {before} -> {after}"
            )));
        }
        let lost = before - after;
        if lost > 0 {
            self.lost_particles += lost;
            warn!(
                "子步 {}: {} 个粒子离开块覆盖范围 (累计 {})",
                self.step_count + 1,
                lost,
                self.lost_particles
            );
        }
        self.step_count += 1;
        trace!("block_grid 子步 {} 完成, {} 粒子", self.step_count, after);

        Ok(SubstepStats {
            particles: after,
            lost_particles: lost,
            active_blocks: self.grid.num_blocks(),
            duration,
        })
    }

    fn gather_particles(&self) -> Vec<Particle<D>> {
        self.grid.gather_particles()
    }

    fn particle_count(&self) -> usize {
        self.grid.num_particles()
    }

    fn scheduler_metrics(&self) -> &SchedulerMetrics {
        self.scheduler.metrics()
    }
}
