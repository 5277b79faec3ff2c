// crates/pg_physics/src/boundary.rs

//! 轴对齐盒边界
//!
//! 位置分量越过某轴的界时被夹回界上，同时对应速度分量被截断以禁止继续穿透：
//! 下界取 `max(v, 0)`，上界取 `min(v, 0)`。未设界的轴不受约束（三维时 y 无上界）。

use pg_config::ResolvedBounds;

use crate::core::dimension::Dimension;
use crate::particle::Particle;

/// 边界盒
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryBox<D: Dimension> {
    lower: [Option<f64>; 3],
    upper: [Option<f64>; 3],
    _dim: std::marker::PhantomData<D>,
}

impl<D: Dimension> BoundaryBox<D> {
    /// 创建边界盒，只使用前 `D::NDIM` 个分量
    pub fn new(lower: [Option<f64>; 3], upper: [Option<f64>; 3]) -> Self {
        Self {
            lower,
            upper,
            _dim: std::marker::PhantomData,
        }
    }

    /// 无约束
    pub fn unbounded() -> Self {
        Self::new([None; 3], [None; 3])
    }

    /// 从配置解析结果构造
    pub fn from_resolved(bounds: &ResolvedBounds) -> Self {
        Self::new(bounds.lower, bounds.upper)
    }

    /// 下界
    pub fn lower(&self, axis: usize) -> Option<f64> {
        self.lower[axis]
    }

    /// 上界
    pub fn upper(&self, axis: usize) -> Option<f64> {
        self.upper[axis]
    }

    /// 夹紧单个粒子
    pub fn clamp(&self, particle: &mut Particle<D>) {
        for axis in 0..D::NDIM {
            if let Some(lo) = self.lower[axis] {
                if D::component(particle.position, axis) < lo {
                    D::set_component(&mut particle.position, axis, lo);
                    let v = D::component(particle.velocity, axis);
                    D::set_component(&mut particle.velocity, axis, v.max(0.0));
                }
            }
            if let Some(hi) = self.upper[axis] {
                if D::component(particle.position, axis) > hi {
                    D::set_component(&mut particle.position, axis, hi);
                    let v = D::component(particle.velocity, axis);
                    D::set_component(&mut particle.velocity, axis, v.min(0.0));
                }
            }
        }
    }

    /// 位置是否在盒内（含边界）
    pub fn contains(&self, position: D::Vector) -> bool {
        (0..D::NDIM).all(|axis| {
            let x = D::component(position, axis);
            self.lower[axis].map_or(true, |lo| x >= lo) && self.upper[axis].map_or(true, |hi| x <= hi)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dimension::{D2, D3};
    use glam::{DVec2, DVec3};

    fn box_3d() -> BoundaryBox<D3> {
        BoundaryBox::new([Some(0.0), Some(0.0125), Some(0.0)], [Some(1.0), None, Some(1.0)])
    }

    #[test]
    fn test_lower_clamp_zeroes_inward_velocity() {
        let mut p = Particle::<D3>::new(DVec3::new(0.5, -0.2, 0.5), DVec3::new(0.0, -3.0, 0.0));
        box_3d().clamp(&mut p);
        assert_eq!(p.position.y, 0.0125);
        assert_eq!(p.velocity.y, 0.0);
    }

    #[test]
    fn test_upper_clamp_keeps_retreating_velocity() {
        let mut p = Particle::<D3>::new(DVec3::new(1.2, 0.5, 0.5), DVec3::new(-1.0, 0.0, 0.0));
        box_3d().clamp(&mut p);
        assert_eq!(p.position.x, 1.0);
        assert_eq!(p.velocity.x, -1.0);
    }

    #[test]
    fn test_no_ceiling_in_3d() {
        let mut p = Particle::<D3>::new(DVec3::new(0.5, 7.0, 0.5), DVec3::new(0.0, 2.0, 0.0));
        box_3d().clamp(&mut p);
        assert_eq!(p.position.y, 7.0);
        assert_eq!(p.velocity.y, 2.0);
    }

    #[test]
    fn test_2d_upper_bounds() {
        let bounds = BoundaryBox::<D2>::new([Some(0.0), Some(0.1), None], [Some(0.99), Some(0.99), None]);
        let mut p = Particle::<D2>::new(DVec2::new(1.5, 1.5), DVec2::new(1.0, 1.0));
        bounds.clamp(&mut p);
        assert_eq!(p.position, DVec2::new(0.99, 0.99));
        assert_eq!(p.velocity, DVec2::ZERO);
        assert!(bounds.contains(p.position));
    }

    #[test]
    fn test_unbounded_is_identity() {
        let mut p = Particle::<D2>::new(DVec2::new(-5.0, 9.0), DVec2::new(-1.0, 1.0));
        let before = p;
        BoundaryBox::<D2>::unbounded().clamp(&mut p);
        assert_eq!(p, before);
    }
}
