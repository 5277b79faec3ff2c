// crates/pg_physics/src/core/params.rs

//! 光滑参数
//!
//! 模拟期间不可变的物理参数：支撑半径、参考密度、刚度、子步长与重力。

use pg_config::SphConfig;
use pg_foundation::{ensure, PgError, PgResult};

use crate::core::dimension::Dimension;
use crate::kernel::poly6_normalization;

/// 光滑参数
#[derive(Debug, Clone, Copy)]
pub struct SmoothingParameters<D: Dimension> {
    /// 支撑半径 h
    pub h: f64,
    /// 1/h
    pub inv_h: f64,
    /// 参考密度 rho0
    pub rho0: f64,
    /// 刚度 k
    pub stiffness: f64,
    /// 子步长 dt
    pub dt: f64,
    /// 重力
    pub gravity: D::Vector,
    /// 密度缩放：1 或 poly6 归一化常数
    pub density_scale: f64,
}

impl<D: Dimension> SmoothingParameters<D> {
    /// 创建参数（不做密度归一化）
    pub fn new(h: f64, rho0: f64, stiffness: f64, dt: f64, gravity: D::Vector) -> PgResult<Self> {
        PgError::check_positive("h", h)?;
        PgError::check_positive("rho0", rho0)?;
        PgError::check_positive("dt", dt)?;
        ensure!(
            stiffness.is_finite() && stiffness >= 0.0,
            PgError::out_of_range("stiffness", stiffness, 0.0, f64::MAX)
        );
        Ok(Self {
            h,
            inv_h: 1.0 / h,
            rho0,
            stiffness,
            dt,
            gravity,
            density_scale: 1.0,
        })
    }

    /// 启用 poly6 归一化常数 c = 315/(64πh⁹)
    pub fn with_poly6_normalization(mut self) -> Self {
        self.density_scale = poly6_normalization(self.h);
        self
    }

    /// 从配置构造
    pub fn from_config(config: &SphConfig) -> PgResult<Self> {
        let params = Self::new(
            config.smoothing_radius(),
            config.physics.rest_density,
            config.physics.stiffness,
            config.simulation.dt,
            D::from_array(config.physics.gravity),
        )?;
        Ok(if config.normalize_density() {
            params.with_poly6_normalization()
        } else {
            params
        })
    }

    /// h²
    #[inline]
    pub fn h2(&self) -> f64 {
        self.h * self.h
    }

    /// 是否启用了归一化
    pub fn is_normalized(&self) -> bool {
        self.density_scale != 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dimension::{D2, D3};
    use glam::DVec3;

    #[test]
    fn test_from_default_config() {
        let params = SmoothingParameters::<D3>::from_config(&SphConfig::default()).unwrap();
        assert!((params.h - 0.025).abs() < 1e-15);
        assert!((params.inv_h - 40.0).abs() < 1e-9);
        assert_eq!(params.gravity, DVec3::new(0.0, -100.0, 0.0));
        assert!(params.is_normalized());
    }

    #[test]
    fn test_column_2d_is_unnormalized() {
        let params = SmoothingParameters::<D2>::from_config(&SphConfig::column_2d()).unwrap();
        assert!(!params.is_normalized());
        assert!((params.h - 0.01).abs() < 1e-15);
    }

    #[test]
    fn test_rejects_non_positive_h() {
        assert!(SmoothingParameters::<D3>::new(0.0, 1.0, 1.0, 1e-3, DVec3::ZERO).is_err());
    }

    #[test]
    fn test_rejects_invalid_stiffness() {
        assert!(SmoothingParameters::<D3>::new(0.1, 1.0, 0.0, 1e-3, DVec3::ZERO).is_ok());
        for k in [-1.0, f64::NAN, f64::INFINITY] {
            let err = SmoothingParameters::<D3>::new(0.1, 1.0, k, 1e-3, DVec3::ZERO).unwrap_err();
            assert!(matches!(err, PgError::OutOfRange { field: "stiffness", .. }));
        }
    }
}
