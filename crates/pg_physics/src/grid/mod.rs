// crates/pg_physics/src/grid/mod.rs

//! 稀疏块网格
//!
//! # 模块概览
//!
//! - [`block`]: 空间块（有界粒子数组 + 节点数据）
//! - [`ancestors`]: 祖先偏移与只读祖先集合
//! - [`sparse_grid`]: 块 Arena + 坐标哈希，`touch`/`advance`/`gather_particles`
//! - [`backend`]: 基于块网格的邻域后端与单块更新函数

pub mod ancestors;
pub mod backend;
pub mod block;
pub mod sparse_grid;

pub use ancestors::{ancestor_offsets, Ancestors};
pub use backend::{update_block, BlockGridBackend, BlockGridSettings};
pub use block::Block;
pub use sparse_grid::{BlockIdx, BlockTag, SparseGrid};
