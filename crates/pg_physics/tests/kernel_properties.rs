// crates/pg_physics/tests/kernel_properties.rs

//! 核函数与边界性质测试
//! 紧支撑、自身密度、压力符号、边界夹紧幂等

use glam::{DVec2, DVec3};
use pg_physics::boundary::BoundaryBox;
use pg_physics::kernel::{density_kernel, equation_of_state, poly6_normalization, pressure_gradient_kernel};
use pg_physics::{Particle, D2, D3};

/// 支撑半径外密度核与梯度核均为零
#[test]
fn test_compact_support() {
    let h = 0.05;
    for r2 in [h * h, 1.5 * h * h, 4.0 * h * h, 1.0] {
        assert_eq!(density_kernel(r2, h), 0.0);
        let dpos = DVec3::new(r2.sqrt(), 0.0, 0.0);
        assert_eq!(pressure_gradient_kernel::<D3>(dpos, r2, h), DVec3::ZERO);
    }
    assert!(density_kernel(0.99 * h * h, h) > 0.0);
}

/// 自身贡献为 h⁶，归一化后为正
#[test]
fn test_self_density_positive() {
    for h in [0.01, 0.025, 0.1] {
        let w = density_kernel(0.0, h);
        assert!((w - h.powi(6)).abs() < 1e-12 * h.powi(6));
        assert!(w * poly6_normalization(h) > 0.0);
    }
}

/// 密度核随距离单调递减
#[test]
fn test_density_kernel_monotone() {
    let h = 0.1;
    let mut prev = density_kernel(0.0, h);
    for i in 1..10 {
        let r = h * i as f64 / 10.0;
        let w = density_kernel(r * r, h);
        assert!(w < prev);
        prev = w;
    }
}

/// 梯度核指向邻居的反方向并与 dpos 共线
#[test]
fn test_gradient_direction() {
    let h = 0.1;
    let dpos = DVec2::new(0.03, -0.04);
    let g = pressure_gradient_kernel::<D2>(dpos, dpos.length_squared(), h);
    assert!(g.dot(dpos) < 0.0);
    assert!((g.perp_dot(dpos)).abs() < 1e-18);
}

/// 状态方程：rho = rho0 时压力为零，低于 rho0 为负
#[test]
fn test_equation_of_state_sign() {
    assert_eq!(equation_of_state(2.0, 2.0, 1e-3), 0.0);
    assert!(equation_of_state(1.0, 2.0, 1e-3) < 0.0);
    assert!(equation_of_state(3.0, 2.0, 1e-3) > 0.0);
    let p = equation_of_state(2.0, 1.0, 1.0);
    assert!((p - 127.0).abs() < 1e-9);
}

/// 夹紧后粒子在盒内，再次夹紧不变
#[test]
fn test_clamp_idempotent() {
    let boundary = BoundaryBox::<D3>::new([Some(0.0), Some(0.0125), Some(0.0)], [Some(1.0), None, Some(1.0)]);
    let mut p = Particle::<D3>::new(DVec3::new(-0.2, -1.0, 1.5), DVec3::new(-1.0, -2.0, 3.0));
    boundary.clamp(&mut p);
    assert!(boundary.contains(p.position));
    assert_eq!(p.position, DVec3::new(0.0, 0.0125, 1.0));
    assert_eq!(p.velocity, DVec3::new(0.0, 0.0, 0.0));

    let once = p;
    boundary.clamp(&mut p);
    assert_eq!(p, once);
}

/// 向盒内运动的速度分量不被修改
#[test]
fn test_clamp_keeps_inward_velocity() {
    let boundary = BoundaryBox::<D2>::new([Some(0.0), Some(0.1), None], [Some(0.99), Some(0.99), None]);
    let mut p = Particle::<D2>::new(DVec2::new(-0.01, 0.05), DVec2::new(0.5, 2.0));
    boundary.clamp(&mut p);
    assert_eq!(p.position, DVec2::new(0.0, 0.1));
    assert_eq!(p.velocity, DVec2::new(0.5, 2.0));
}
