// crates/pg_physics/src/builder/mod.rs

//! 模拟构建模块
//!
//! 提供从无泛型配置到泛型驱动的桥梁。
//!
//! # 架构设计
//!
//! ```text
//! App Layer (无泛型)
//!     │
//!     ▼
//! SphConfig ─────> SimulationBuilder
//!                      │
//!                      ▼ (维度 × 后端分发)
//!               ┌──────────────────────────┐
//!               │ D2 / D3                  │
//!               │ BruteForce / BlockGrid   │──> SimulationDriver<D, SphBackend<D>>
//!               └──────────────────────────┘
//!                      │
//!                      ▼
//! DynSimulation trait <── Box<dyn DynSimulation>
//! ```

pub mod dyn_simulation;
pub mod simulation_builder;

pub use dyn_simulation::{DynSimulation, SimulationStats};
pub use simulation_builder::SimulationBuilder;
