// crates/pg_physics/src/engine/brute_force.rs

//! 暴力邻域后端
//!
//! 每个子步对全部粒子对求和，O(n²)，适用于小规模粒子集。
//! 粒子列表由后端直接持有。

use std::time::Instant;

use log::trace;
use pg_foundation::PgResult;

use crate::boundary::BoundaryBox;
use crate::core::dimension::Dimension;
use crate::core::params::SmoothingParameters;
use crate::engine::parallel::{Scheduler, SchedulerMetrics};
use crate::engine::sph_pass::SphPass;
use crate::engine::{NeighborBackend, SubstepStats};
use crate::particle::Particle;

/// 暴力邻域后端
#[derive(Debug)]
pub struct BruteForceBackend<D: Dimension> {
    particles: Vec<Particle<D>>,
    params: SmoothingParameters<D>,
    boundary: BoundaryBox<D>,
    scheduler: Scheduler,
    step_count: u64,
}

impl<D: Dimension> BruteForceBackend<D> {
    /// 创建后端
    pub fn new(
        particles: Vec<Particle<D>>,
        params: SmoothingParameters<D>,
        boundary: BoundaryBox<D>,
        scheduler: Scheduler,
    ) -> Self {
        Self {
            particles,
            params,
            boundary,
            scheduler,
            step_count: 0,
        }
    }

    /// 粒子只读视图
    pub fn particles(&self) -> &[Particle<D>] {
        &self.particles
    }

    /// 光滑参数
    pub fn params(&self) -> &SmoothingParameters<D> {
        &self.params
    }

    /// 已执行子步数
    pub fn step_count(&self) -> u64 {
        self.step_count
    }
}

impl<D: Dimension> NeighborBackend<D> for BruteForceBackend<D> {
    fn name(&self) -> &'static str {
        "brute_force"
    }

    fn substep(&mut self) -> PgResult<SubstepStats> {
        let start = Instant::now();
        let pass = SphPass::new(&self.params, &self.boundary);
        pass.step_recorded(&mut self.particles, &mut self.scheduler)?;
        self.step_count += 1;
        trace!("brute_force 子步 {} 完成, {} 粒子", self.step_count, self.particles.len());
        Ok(SubstepStats {
            particles: self.particles.len(),
            lost_particles: 0,
            active_blocks: 0,
            duration: start.elapsed(),
        })
    }

    fn gather_particles(&self) -> Vec<Particle<D>> {
        self.particles.clone()
    }

    fn particle_count(&self) -> usize {
        self.particles.len()
    }

    fn scheduler_metrics(&self) -> &SchedulerMetrics {
        self.scheduler.metrics()
    }
}
