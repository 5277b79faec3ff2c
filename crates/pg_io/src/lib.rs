// crates/pg_io/src/lib.rs

//! Pangu IO Layer (Layer 4)
//!
//! 把驱动每帧交出的 `(位置, 半径)` 序列写成按帧编号的文件。
//!
//! # 模块
//!
//! - [`frame_writer`]: JSON / CSV / 二进制写出器与工厂函数
//! - [`error`]: IO 错误类型
//!
//! # 使用示例
//!
//! ```rust,ignore
//! use pg_io::create_writer;
//!
//! let mut sink = create_writer(&config.output)?;
//! simulation.run(sink.as_mut())?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod frame_writer;

/// 层级标识
pub const LAYER: u8 = 4;

// 重导出常用类型
pub use error::{IoError, IoResult};
pub use frame_writer::{
    create_writer, encode_binary, encode_csv, encode_json, read_binary_frame, BinaryFrameWriter,
    CsvFrameWriter, FrameFiles, JsonFrameWriter, PackedParticle,
};
