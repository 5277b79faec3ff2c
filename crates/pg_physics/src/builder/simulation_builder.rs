// crates/pg_physics/src/builder/simulation_builder.rs

//! 模拟构建器
//!
//! 实现从无泛型配置到泛型驱动的桥梁：按维度实例化 `D2`/`D3`，
//! 按后端种类构造 [`SphBackend`]，二者在启动时各选一次。

use log::{debug, info};
use pg_config::{BackendKind, DimensionKind, SphConfig};
use pg_foundation::{PgError, PgResult};

use crate::boundary::BoundaryBox;
use crate::builder::dyn_simulation::DynSimulation;
use crate::core::dimension::{Dimension, D2, D3};
use crate::core::params::SmoothingParameters;
use crate::driver::{DriverSettings, SimulationDriver};
use crate::engine::{BruteForceBackend, NeighborBackend, Scheduler, SphBackend};
use crate::grid::{BlockGridBackend, BlockGridSettings};
use crate::particle::{lattice, Particle};

/// 模拟构建器
///
/// # 示例
///
/// ```ignore
/// use pg_physics::builder::SimulationBuilder;
///
/// let config = SphConfig::column_2d();
/// let mut sim = SimulationBuilder::new(config).build()?;
/// sim.run(&mut NullSink)?;
/// ```
#[derive(Debug, Clone)]
pub struct SimulationBuilder {
    config: SphConfig,
    particles: Option<Vec<[f64; 3]>>,
}

impl SimulationBuilder {
    /// 创建构建器
    pub fn new(config: SphConfig) -> Self {
        Self {
            config,
            particles: None,
        }
    }

    /// 直接从配置构建动态模拟
    pub fn from_config(config: &SphConfig) -> PgResult<Box<dyn DynSimulation>> {
        Self::new(config.clone()).build()
    }

    /// 用给定的初始位置替代配置中的点阵（静止粒子，2D 忽略 z）
    pub fn with_positions(mut self, positions: Vec<[f64; 3]>) -> Self {
        self.particles = Some(positions);
        self
    }

    /// 配置
    pub fn config(&self) -> &SphConfig {
        &self.config
    }

    /// 构建动态模拟
    pub fn build(self) -> PgResult<Box<dyn DynSimulation>> {
        let simulation: Box<dyn DynSimulation> = match self.config.simulation.dimension {
            DimensionKind::D2 => Box::new(self.build_typed::<D2>()?),
            DimensionKind::D3 => Box::new(self.build_typed::<D3>()?),
        };
        Ok(simulation)
    }

    /// 构建指定维度的驱动
    pub fn build_typed<D: Dimension>(&self) -> PgResult<SimulationDriver<D, SphBackend<D>>> {
        let config = &self.config;
        config
            .validate()
            .map_err(|e| PgError::config(e.to_string()))?;
        if config.simulation.dimension.ndim() != D::NDIM {
            return Err(PgError::config(format!(
                "配置维度 {} 与请求的 {} 不一致",
                config.simulation.dimension,
                D::name()
            )));
        }

        let backend = self.build_backend::<D>()?;
        info!(
            "构建 {} 模拟: 后端 {}, {} 粒子, h={:.5}",
            D::name(),
            config.simulation.backend,
            backend.particle_count(),
            config.smoothing_radius()
        );
        SimulationDriver::new(backend, DriverSettings::from_config(config))
    }

    /// 构建指定维度的邻域后端
    pub fn build_backend<D: Dimension>(&self) -> PgResult<SphBackend<D>> {
        let config = &self.config;
        let params = SmoothingParameters::<D>::from_config(config)?;
        debug!("光滑参数: h={}, 密度归一化={}", params.h, params.is_normalized());
        let boundary = BoundaryBox::<D>::from_resolved(&config.resolved_bounds());
        let scheduler = Scheduler::new(&config.parallel)?;
        let particles = self.initial_particles::<D>();

        Ok(match config.simulation.backend {
            BackendKind::BruteForce => {
                BruteForceBackend::new(particles, params, boundary, scheduler).into()
            }
            BackendKind::BlockGrid => BlockGridBackend::new(
                particles,
                params,
                boundary,
                BlockGridSettings::from_config(config),
                scheduler,
            )?
            .into(),
        })
    }

    fn initial_particles<D: Dimension>(&self) -> Vec<Particle<D>> {
        match &self.particles {
            Some(positions) => positions
                .iter()
                .map(|&p| Particle::at_rest(D::from_array(p)))
                .collect(),
            None => lattice::<D>(&self.config.resolved_lattice()),
        }
    }
}
