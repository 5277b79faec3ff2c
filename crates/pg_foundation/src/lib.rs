// crates/pg_foundation/src/lib.rs

//! Pangu Foundation Layer
//!
//! 基础层，提供整个项目的基础抽象。
//!
//! # 模块概览
//!
//! - [`arena`]: 只增 Arena 与强类型索引
//! - [`error`]: 统一错误类型
//!
//! # 设计原则
//!
//! 1. **最少依赖**: 仅依赖 thiserror
//! 2. **类型安全**: 编译期防止索引误用
//!
//! # 示例
//!
//! ```
//! use pg_foundation::prelude::*;
//!
//! #[derive(Debug, Clone, Copy)]
//! struct Tag;
//! impl ArenaTag for Tag {}
//!
//! let mut arena: Arena<f64, Tag> = Arena::new();
//! let idx = arena.insert(42.0);
//! assert_eq!(arena[idx], 42.0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod arena;
pub mod error;

// 重导出常用类型
pub use arena::{Arena, ArenaTag, Idx};
pub use error::{PgError, PgResult};

/// Prelude 模块，包含常用类型
pub mod prelude {
    pub use crate::arena::{Arena, ArenaTag, Idx};
    pub use crate::ensure;
    pub use crate::error::{PgError, PgResult};
}
