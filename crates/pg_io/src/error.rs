// crates/pg_io/src/error.rs
//! IO 错误类型定义
//!
//! 帧写出器通过 `FrameSink` 接口返回 `PgResult`，
//! 因此本层错误最终都转换为 `PgError` 以实现跨层错误传递。

use std::path::PathBuf;

use pg_foundation::PgError;
use thiserror::Error;

/// IO 模块结果类型别名
pub type IoResult<T> = Result<T, IoError>;

/// IO 错误枚举
#[derive(Error, Debug)]
pub enum IoError {
    /// 创建输出目录失败
    #[error("无法创建输出目录 {path}: {source}")]
    CreateDir {
        /// 目录
        path: PathBuf,
        /// 底层错误
        #[source]
        source: std::io::Error,
    },

    /// 写文件失败
    #[error("写入失败 {path}: {source}")]
    Write {
        /// 文件
        path: PathBuf,
        /// 底层错误
        #[source]
        source: std::io::Error,
    },

    /// 读文件失败
    #[error("读取失败 {path}: {source}")]
    Read {
        /// 文件
        path: PathBuf,
        /// 底层错误
        #[source]
        source: std::io::Error,
    },

    /// 序列化失败
    #[error("序列化失败: {0}")]
    Serialization(String),

    /// 二进制帧长度不是记录大小的整数倍
    #[error("二进制帧损坏: {path}, {len} 字节不是 {record} 的整数倍")]
    CorruptFrame {
        /// 文件
        path: PathBuf,
        /// 文件字节数
        len: usize,
        /// 单条记录字节数
        record: usize,
    },

    /// 基础层错误转换
    #[error("基础层错误: {0}")]
    Foundation(#[from] PgError),
}

impl From<IoError> for PgError {
    fn from(err: IoError) -> Self {
        let message = err.to_string();
        match err {
            IoError::CreateDir { source, .. }
            | IoError::Write { source, .. }
            | IoError::Read { source, .. } => PgError::io_with_source(message, source),
            IoError::Serialization(inner) => PgError::serialization(inner),
            IoError::Foundation(inner) => inner,
            IoError::CorruptFrame { .. } => PgError::io(message),
        }
    }
}

impl From<serde_json::Error> for IoError {
    fn from(err: serde_json::Error) -> Self {
        IoError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_error_maps_to_io() {
        let err = IoError::Write {
            path: PathBuf::from("out/00001.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().contains("00001.json"));
        let pg: PgError = err.into();
        match &pg {
            PgError::Io { message, source } => {
                assert!(message.contains("写入失败"));
                assert!(message.contains("00001.json"));
                assert!(source.is_some());
            }
            other => panic!("期望 Io 错误, 得到 {other:?}"),
        }
    }

    #[test]
    fn test_create_dir_error_keeps_operation() {
        let err = IoError::CreateDir {
            path: PathBuf::from("out"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let pg: PgError = err.into();
        assert!(pg.to_string().contains("无法创建输出目录"));
    }

    #[test]
    fn test_foundation_passthrough() {
        let pg: PgError = IoError::Foundation(PgError::internal("x")).into();
        assert!(matches!(pg, PgError::Internal { .. }));
    }
}
