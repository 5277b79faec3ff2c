// crates/pg_physics/src/particle.rs

//! 粒子与初始点阵
//!
//! `pressure` 与 `inverse_density` 为每子步重算的瞬态量，在被读取前一定已被本子步覆盖。

use pg_config::LatticeSpec;

use crate::core::dimension::Dimension;

/// SPH 粒子
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle<D: Dimension> {
    /// 位置
    pub position: D::Vector,
    /// 速度
    pub velocity: D::Vector,
    /// 压力（瞬态）
    pub pressure: f64,
    /// 密度倒数（瞬态）
    pub inverse_density: f64,
}

impl<D: Dimension> Particle<D> {
    /// 静止粒子
    pub fn at_rest(position: D::Vector) -> Self {
        Self::new(position, D::zero())
    }

    /// 指定位置与速度
    pub fn new(position: D::Vector, velocity: D::Vector) -> Self {
        Self {
            position,
            velocity,
            pressure: 0.0,
            inverse_density: 0.0,
        }
    }
}

/// 规则点阵：`origin + (index + cell_offset)·spacing`
///
/// 二维时忽略 z 轴计数。遍历顺序为 x 最外层。
pub fn lattice<D: Dimension>(spec: &LatticeSpec) -> Vec<Particle<D>> {
    let counts = effective_counts::<D>(spec.counts);
    let mut particles = Vec::with_capacity(counts.iter().product());
    for i in 0..counts[0] {
        for j in 0..counts[1] {
            for k in 0..counts[2] {
                let index = [i, j, k];
                let position = D::vector_from_fn(|axis| {
                    spec.origin[axis] + (index[axis] as f64 + spec.cell_offset) * spec.spacing
                });
                particles.push(Particle::at_rest(position));
            }
        }
    }
    particles
}

fn effective_counts<D: Dimension>(counts: [usize; 3]) -> [usize; 3] {
    let mut out = [1; 3];
    out[..D::NDIM].copy_from_slice(&counts[..D::NDIM]);
    out
}

/// 粒子集合的简单统计
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ParticleSummary {
    /// 粒子数
    pub count: usize,
    /// 质心
    pub centroid: [f64; 3],
    /// 最大速率
    pub max_speed: f64,
}

impl ParticleSummary {
    /// 统计一组粒子
    pub fn of<D: Dimension>(particles: &[Particle<D>]) -> Self {
        if particles.is_empty() {
            return Self::default();
        }
        let mut sum = [0.0; 3];
        let mut max_speed2: f64 = 0.0;
        for p in particles {
            let pos = D::to_array(p.position);
            for axis in 0..3 {
                sum[axis] += pos[axis];
            }
            max_speed2 = max_speed2.max(D::length_squared(p.velocity));
        }
        let n = particles.len() as f64;
        Self {
            count: particles.len(),
            centroid: [sum[0] / n, sum[1] / n, sum[2] / n],
            max_speed: max_speed2.sqrt(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dimension::{D2, D3};
    use glam::{DVec2, DVec3};

    #[test]
    fn test_lattice_3d_cell_centers() {
        let spec = LatticeSpec {
            origin: [0.0; 3],
            counts: [2, 2, 2],
            spacing: 0.5,
            cell_offset: 0.5,
        };
        let particles = lattice::<D3>(&spec);
        assert_eq!(particles.len(), 8);
        assert_eq!(particles[0].position, DVec3::splat(0.25));
        assert_eq!(particles[7].position, DVec3::splat(0.75));
        assert!(particles.iter().all(|p| p.velocity == DVec3::ZERO));
    }

    #[test]
    fn test_lattice_2d_ignores_z_count() {
        let spec = LatticeSpec {
            origin: [0.1, 0.1, 0.0],
            counts: [3, 2, 0],
            spacing: 0.01,
            cell_offset: 0.0,
        };
        let particles = lattice::<D2>(&spec);
        assert_eq!(particles.len(), 6);
        assert_eq!(particles[0].position, DVec2::new(0.1, 0.1));
        assert!((particles[5].position.x - 0.12).abs() < 1e-12);
        assert!((particles[5].position.y - 0.11).abs() < 1e-12);
    }

    #[test]
    fn test_summary() {
        let particles = vec![
            Particle::<D2>::new(DVec2::new(0.0, 0.0), DVec2::new(3.0, 4.0)),
            Particle::<D2>::at_rest(DVec2::new(1.0, 1.0)),
        ];
        let summary = ParticleSummary::of(&particles);
        assert_eq!(summary.count, 2);
        assert_eq!(summary.centroid, [0.5, 0.5, 0.0]);
        assert!((summary.max_speed - 5.0).abs() < 1e-12);
    }
}
