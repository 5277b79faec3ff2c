// crates/pg_physics/src/core/dimension.rs

//! 维度标记
//!
//! 提供编译期维度区分，核函数、边界与两种邻域后端都对 `D: Dimension` 泛型，
//! 二维与三维共用同一份实现。
//!
//! 向量使用 glam 的 `DVec2`/`DVec3`，块坐标使用 `IVec2`/`IVec3`。

use glam::{DVec2, DVec3, IVec2, IVec3};
use std::fmt::Debug;
use std::hash::Hash;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

/// 维度标记 trait
pub trait Dimension: Debug + Clone + Copy + Default + PartialEq + Eq + Send + Sync + 'static {
    /// 维度数
    const NDIM: usize;

    /// 实数向量
    type Vector: Copy
        + Debug
        + Default
        + PartialEq
        + Send
        + Sync
        + Add<Output = Self::Vector>
        + Sub<Output = Self::Vector>
        + Mul<f64, Output = Self::Vector>
        + AddAssign
        + SubAssign;

    /// 整数网格坐标
    type Coord: Copy + Debug + Eq + Hash + Send + Sync + Add<Output = Self::Coord>;

    /// 维度名称
    fn name() -> &'static str;

    /// 长度平方
    fn length_squared(v: Self::Vector) -> f64;

    /// 取分量
    fn component(v: Self::Vector, axis: usize) -> f64;

    /// 写分量
    fn set_component(v: &mut Self::Vector, axis: usize, value: f64);

    /// 按轴构造向量
    fn vector_from_fn(f: impl FnMut(usize) -> f64) -> Self::Vector;

    /// 取坐标分量
    fn coord_component(c: Self::Coord, axis: usize) -> i32;

    /// 按轴构造坐标
    fn coord_from_fn(f: impl FnMut(usize) -> i32) -> Self::Coord;

    /// 零向量
    #[inline]
    fn zero() -> Self::Vector {
        <Self::Vector as Default>::default()
    }

    /// 从三分量数组构造，多余分量被忽略
    #[inline]
    fn from_array(a: [f64; 3]) -> Self::Vector {
        Self::vector_from_fn(|axis| a[axis])
    }

    /// 展开为三分量数组，缺失分量补零
    #[inline]
    fn to_array(v: Self::Vector) -> [f64; 3] {
        let mut out = [0.0; 3];
        for (axis, slot) in out.iter_mut().enumerate().take(Self::NDIM) {
            *slot = Self::component(v, axis);
        }
        out
    }

    /// 坐标展开为三分量数组，缺失分量补零
    #[inline]
    fn coord_to_array(c: Self::Coord) -> [i32; 3] {
        let mut out = [0; 3];
        for (axis, slot) in out.iter_mut().enumerate().take(Self::NDIM) {
            *slot = Self::coord_component(c, axis);
        }
        out
    }
}

/// 2D 维度标记
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct D2;

impl Dimension for D2 {
    const NDIM: usize = 2;
    type Vector = DVec2;
    type Coord = IVec2;

    fn name() -> &'static str {
        "2D"
    }

    #[inline]
    fn length_squared(v: DVec2) -> f64 {
        v.length_squared()
    }

    #[inline]
    fn component(v: DVec2, axis: usize) -> f64 {
        v[axis]
    }

    #[inline]
    fn set_component(v: &mut DVec2, axis: usize, value: f64) {
        v[axis] = value;
    }

    #[inline]
    fn vector_from_fn(mut f: impl FnMut(usize) -> f64) -> DVec2 {
        let x = f(0);
        let y = f(1);
        DVec2::new(x, y)
    }

    #[inline]
    fn coord_component(c: IVec2, axis: usize) -> i32 {
        c[axis]
    }

    #[inline]
    fn coord_from_fn(mut f: impl FnMut(usize) -> i32) -> IVec2 {
        let x = f(0);
        let y = f(1);
        IVec2::new(x, y)
    }
}

/// 3D 维度标记
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct D3;

impl Dimension for D3 {
    const NDIM: usize = 3;
    type Vector = DVec3;
    type Coord = IVec3;

    fn name() -> &'static str {
        "3D"
    }

    #[inline]
    fn length_squared(v: DVec3) -> f64 {
        v.length_squared()
    }

    #[inline]
    fn component(v: DVec3, axis: usize) -> f64 {
        v[axis]
    }

    #[inline]
    fn set_component(v: &mut DVec3, axis: usize, value: f64) {
        v[axis] = value;
    }

    #[inline]
    fn vector_from_fn(mut f: impl FnMut(usize) -> f64) -> DVec3 {
        let x = f(0);
        let y = f(1);
        let z = f(2);
        DVec3::new(x, y, z)
    }

    #[inline]
    fn coord_component(c: IVec3, axis: usize) -> i32 {
        c[axis]
    }

    #[inline]
    fn coord_from_fn(mut f: impl FnMut(usize) -> i32) -> IVec3 {
        let x = f(0);
        let y = f(1);
        let z = f(2);
        IVec3::new(x, y, z)
    }
}
