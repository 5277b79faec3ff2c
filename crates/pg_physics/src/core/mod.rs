// crates/pg_physics/src/core/mod.rs

//! 核心抽象：维度标记与光滑参数

pub mod dimension;
pub mod params;

pub use dimension::{Dimension, D2, D3};
pub use params::SmoothingParameters;
