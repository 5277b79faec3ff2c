// crates/pg_physics/src/kernel.rs

//! 核函数与状态方程
//!
//! 无状态纯函数：平方距离映射到密度贡献与压力梯度贡献，密度映射到压力。
//!
//! # 形式
//!
//! - 密度核: `max(0, (h² − r²)³)`，r² ≥ h² 时为 0
//! - 梯度核: `−6·(h² − r²)·dpos`，非标准 spiky 梯度，保持此形式
//! - 状态方程: `k·((rho/rho0)^7 − 1)`，rho < rho0 时为负压（吸引）

use std::f64::consts::PI;

use crate::core::dimension::Dimension;

/// poly6 归一化常数 c = 315/(64πh⁹)
#[inline]
pub fn poly6_normalization(h: f64) -> f64 {
    315.0 / (64.0 * PI * h.powi(9))
}

/// 密度核
#[inline]
pub fn density_kernel(r2: f64, h: f64) -> f64 {
    let h2 = h * h;
    if r2 < h2 {
        (h2 - r2).powi(3).max(0.0)
    } else {
        0.0
    }
}

/// 压力梯度核
#[inline]
pub fn pressure_gradient_kernel<D: Dimension>(dpos: D::Vector, r2: f64, h: f64) -> D::Vector {
    let h2 = h * h;
    if r2 < h2 {
        dpos * (-6.0 * (h2 - r2))
    } else {
        D::zero()
    }
}

/// 弱可压缩状态方程
#[inline]
pub fn equation_of_state(rho: f64, rho0: f64, k: f64) -> f64 {
    k * ((rho / rho0).powi(7) - 1.0)
}
