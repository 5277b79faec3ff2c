// crates/pg_physics/src/engine/sph_pass.rs

//! SPH 子步：密度/压力、压力力、积分与边界
//!
//! 两种后端共用同一套计算，区别只在邻域候选集合：
//! 暴力后端传入全部粒子，块网格后端传入单个块刚收集的粒子。
//!
//! # 读写分离
//!
//! 每一遍先基于只读快照为所有粒子算出结果，再统一写回。
//! 粒子只写自己的字段，遍历顺序不影响结果。
//!
//! # 力的形式
//!
//! ```text
//! force_pressure = Σ_q (p.p·p.inv² + q.p·q.inv²) · ∇W(q.pos − p.pos)
//! force          = (k·force_pressure + gravity) · dt
//! velocity      += force · dt
//! position      += velocity · dt
//! ```
//!
//! 求和对有序对进行（含自身），stiffness 在状态方程和这里各乘一次，
//! dt 作用两次，均为模型的既定行为。

use std::time::Instant;

use pg_foundation::{PgError, PgResult};

use crate::boundary::BoundaryBox;
use crate::core::dimension::Dimension;
use crate::core::params::SmoothingParameters;
use crate::engine::parallel::Scheduler;
use crate::kernel::{density_kernel, equation_of_state, pressure_gradient_kernel};
use crate::particle::Particle;

/// 一次 SPH 子步的计算上下文
#[derive(Debug, Clone, Copy)]
pub struct SphPass<'a, D: Dimension> {
    params: &'a SmoothingParameters<D>,
    boundary: &'a BoundaryBox<D>,
}

impl<'a, D: Dimension> SphPass<'a, D> {
    /// 创建
    pub fn new(params: &'a SmoothingParameters<D>, boundary: &'a BoundaryBox<D>) -> Self {
        Self { params, boundary }
    }

    /// 光滑参数
    pub fn params(&self) -> &SmoothingParameters<D> {
        self.params
    }

    /// 粒子 `i` 的未归一化密度
    pub fn raw_density(&self, particles: &[Particle<D>], i: usize) -> f64 {
        let h = self.params.h;
        let pos = particles[i].position;
        let mut rho = 0.0;
        for q in particles {
            rho += density_kernel(D::length_squared(q.position - pos), h);
        }
        rho
    }

    /// 粒子 `i` 的 `(inverse_density, pressure)`
    pub fn density_state(&self, particles: &[Particle<D>], i: usize) -> PgResult<(f64, f64)> {
        let rho = self.raw_density(particles, i) * self.params.density_scale;
        if rho <= 0.0 || rho.is_nan() {
            return Err(PgError::DegenerateDensity { index: i });
        }
        let pressure = equation_of_state(rho, self.params.rho0, self.params.stiffness);
        Ok((1.0 / rho, pressure))
    }

    /// 粒子 `i` 的冲量项 `(k·force_pressure + gravity)·dt`
    pub fn force(&self, particles: &[Particle<D>], i: usize) -> D::Vector {
        let h = self.params.h;
        let p = &particles[i];
        let p_term = p.pressure * p.inverse_density * p.inverse_density;
        let mut force_pressure = D::zero();
        for q in particles {
            let dpos = q.position - p.position;
            let r2 = D::length_squared(dpos);
            let q_term = q.pressure * q.inverse_density * q.inverse_density;
            force_pressure += pressure_gradient_kernel::<D>(dpos, r2, h) * (p_term + q_term);
        }
        (force_pressure * self.params.stiffness + self.params.gravity) * self.params.dt
    }

    /// 积分并施加边界
    pub fn integrate(&self, particle: &mut Particle<D>, force: D::Vector) {
        let dt = self.params.dt;
        particle.velocity += force * dt;
        particle.position += particle.velocity * dt;
        self.boundary.clamp(particle);
    }

    /// 密度/压力遍
    pub fn density_pass(&self, particles: &mut [Particle<D>], scheduler: &Scheduler) -> PgResult<()> {
        let states = {
            let snapshot: &[Particle<D>] = particles;
            scheduler.try_map_indexed(snapshot.len(), |i| self.density_state(snapshot, i))?
        };
        for (p, (inv_density, pressure)) in particles.iter_mut().zip(states) {
            p.inverse_density = inv_density;
            p.pressure = pressure;
        }
        Ok(())
    }

    /// 压力力与积分遍
    pub fn force_pass(&self, particles: &mut [Particle<D>], scheduler: &Scheduler) {
        let forces = {
            let snapshot: &[Particle<D>] = particles;
            scheduler.map_indexed(snapshot.len(), |i| self.force(snapshot, i))
        };
        for (p, force) in particles.iter_mut().zip(forces) {
            self.integrate(p, force);
        }
    }

    /// 完整子步，返回是否并行
    pub fn step(&self, particles: &mut [Particle<D>], scheduler: &Scheduler) -> PgResult<bool> {
        self.density_pass(particles, scheduler)?;
        self.force_pass(particles, scheduler);
        Ok(scheduler.should_parallelize(particles.len()))
    }

    /// 完整子步并记录调度指标
    pub fn step_recorded(
        &self,
        particles: &mut [Particle<D>],
        scheduler: &mut Scheduler,
    ) -> PgResult<()> {
        let start = Instant::now();
        let parallel = self.step(particles, scheduler)?;
        scheduler.record(particles.len(), parallel, start.elapsed());
        Ok(())
    }
}
