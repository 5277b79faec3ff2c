// crates/pg_io/src/frame_writer.rs

//! 按帧编号写出粒子
//!
//! 每帧一个文件 `{directory}/{frame:05}.{ext}`，内容为 `(位置, 半径)` 序列：
//!
//! - JSON: `[{"position":[x,y,z],"radius":r}, ...]`
//! - CSV: 表头 `x,y,z,radius`，每行一个粒子
//! - 二进制: 每粒子 `[f32; 4]`（x, y, z, radius），小端，无文件头

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use bytemuck::{Pod, Zeroable};
use log::{debug, info};
use pg_config::{OutputConfig, OutputFormat};
use pg_foundation::PgResult;
use pg_physics::{FrameRecord, FrameSink, NullSink};

use crate::error::{IoError, IoResult};

// ============================================================
// 编码
// ============================================================

/// 二进制粒子记录
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct PackedParticle {
    /// x, y, z, radius（各分量以小端位模式存放）
    pub data: [f32; 4],
}

impl PackedParticle {
    /// 单条记录字节数
    pub const SIZE: usize = std::mem::size_of::<Self>();

    /// 从输出记录打包
    pub fn from_record(record: &FrameRecord) -> Self {
        let [x, y, z] = record.position;
        Self {
            data: [x, y, z, record.radius].map(|v| f32::from_bits((v as f32).to_bits().to_le())),
        }
    }

    /// 解包为本机字节序的值
    pub fn values(&self) -> [f32; 4] {
        self.data.map(|v| f32::from_bits(u32::from_le(v.to_bits())))
    }
}

/// 编码为 JSON
pub fn encode_json(records: &[FrameRecord]) -> IoResult<Vec<u8>> {
    Ok(serde_json::to_vec(records)?)
}

/// 编码为 CSV
pub fn encode_csv(records: &[FrameRecord]) -> String {
    let mut out = String::with_capacity(32 * (records.len() + 1));
    out.push_str("x,y,z,radius\n");
    for r in records {
        // 写入 String 不会失败
        let _ = writeln!(out, "{},{},{},{}", r.position[0], r.position[1], r.position[2], r.radius);
    }
    out
}

/// 编码为二进制
pub fn encode_binary(records: &[FrameRecord]) -> Vec<u8> {
    let packed: Vec<PackedParticle> = records.iter().map(PackedParticle::from_record).collect();
    bytemuck::cast_slice(&packed).to_vec()
}

/// 读回二进制帧
pub fn read_binary_frame(path: &Path) -> IoResult<Vec<[f32; 4]>> {
    let bytes = fs::read(path).map_err(|source| IoError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    if bytes.len() % PackedParticle::SIZE != 0 {
        return Err(IoError::CorruptFrame {
            path: path.to_path_buf(),
            len: bytes.len(),
            record: PackedParticle::SIZE,
        });
    }
    Ok(bytes
        .chunks_exact(PackedParticle::SIZE)
        .map(|chunk| bytemuck::pod_read_unaligned::<PackedParticle>(chunk).values())
        .collect())
}

// ============================================================
// 写出器
// ============================================================

/// 帧文件命名与写出统计
#[derive(Debug, Clone)]
pub struct FrameFiles {
    directory: PathBuf,
    extension: &'static str,
    frames_written: usize,
    bytes_written: u64,
}

impl FrameFiles {
    /// 创建并确保目录存在
    pub fn create(directory: impl Into<PathBuf>, extension: &'static str) -> IoResult<Self> {
        let directory = directory.into();
        fs::create_dir_all(&directory).map_err(|source| IoError::CreateDir {
            path: directory.clone(),
            source,
        })?;
        Ok(Self {
            directory,
            extension,
            frames_written: 0,
            bytes_written: 0,
        })
    }

    /// 输出目录
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// 第 `frame` 帧的文件路径
    pub fn path_for(&self, frame: usize) -> PathBuf {
        self.directory.join(format!("{frame:05}.{}", self.extension))
    }

    /// 已写帧数
    pub fn frames_written(&self) -> usize {
        self.frames_written
    }

    /// 已写字节数
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    fn write(&mut self, frame: usize, contents: &[u8]) -> IoResult<()> {
        let path = self.path_for(frame);
        fs::write(&path, contents).map_err(|source| IoError::Write {
            path: path.clone(),
            source,
        })?;
        self.frames_written += 1;
        self.bytes_written += contents.len() as u64;
        debug!("写出帧 {}: {} ({} 字节)", frame, path.display(), contents.len());
        Ok(())
    }
}

/// JSON 帧写出器
#[derive(Debug, Clone)]
pub struct JsonFrameWriter {
    files: FrameFiles,
}

impl JsonFrameWriter {
    /// 在目录下创建
    pub fn new(directory: impl Into<PathBuf>) -> IoResult<Self> {
        Ok(Self {
            files: FrameFiles::create(directory, "json")?,
        })
    }

    /// 文件信息
    pub fn files(&self) -> &FrameFiles {
        &self.files
    }
}

impl FrameSink for JsonFrameWriter {
    fn write_frame(&mut self, frame: usize, records: &[FrameRecord]) -> PgResult<()> {
        let bytes = encode_json(records)?;
        Ok(self.files.write(frame, &bytes)?)
    }
}

/// CSV 帧写出器
#[derive(Debug, Clone)]
pub struct CsvFrameWriter {
    files: FrameFiles,
}

impl CsvFrameWriter {
    /// 在目录下创建
    pub fn new(directory: impl Into<PathBuf>) -> IoResult<Self> {
        Ok(Self {
            files: FrameFiles::create(directory, "csv")?,
        })
    }

    /// 文件信息
    pub fn files(&self) -> &FrameFiles {
        &self.files
    }
}

impl FrameSink for CsvFrameWriter {
    fn write_frame(&mut self, frame: usize, records: &[FrameRecord]) -> PgResult<()> {
        Ok(self.files.write(frame, encode_csv(records).as_bytes())?)
    }
}

/// 二进制帧写出器
#[derive(Debug, Clone)]
pub struct BinaryFrameWriter {
    files: FrameFiles,
}

impl BinaryFrameWriter {
    /// 在目录下创建
    pub fn new(directory: impl Into<PathBuf>) -> IoResult<Self> {
        Ok(Self {
            files: FrameFiles::create(directory, "bin")?,
        })
    }

    /// 文件信息
    pub fn files(&self) -> &FrameFiles {
        &self.files
    }
}

impl FrameSink for BinaryFrameWriter {
    fn write_frame(&mut self, frame: usize, records: &[FrameRecord]) -> PgResult<()> {
        Ok(self.files.write(frame, &encode_binary(records))?)
    }
}

/// 按输出配置创建写出器，`none` 时返回丢弃输出
pub fn create_writer(config: &OutputConfig) -> IoResult<Box<dyn FrameSink + Send>> {
    let dir = config.directory.clone();
    let writer: Box<dyn FrameSink + Send> = match config.format {
        OutputFormat::Json => Box::new(JsonFrameWriter::new(dir)?),
        OutputFormat::Csv => Box::new(CsvFrameWriter::new(dir)?),
        OutputFormat::Binary => Box::new(BinaryFrameWriter::new(dir)?),
        OutputFormat::None => Box::new(NullSink),
    };
    if let Some(ext) = config.format.extension() {
        info!("帧输出: {}/*.{}", config.directory.display(), ext);
    }
    Ok(writer)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> Vec<FrameRecord> {
        vec![
            FrameRecord {
                position: [1.0, 2.5, 0.0],
                radius: 0.1,
            },
            FrameRecord {
                position: [-0.5, 0.25, 3.0],
                radius: 0.1,
            },
        ]
    }

    #[test]
    fn test_csv_layout() {
        let csv = encode_csv(&records());
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines, vec!["x,y,z,radius", "1,2.5,0,0.1", "-0.5,0.25,3,0.1"]);
    }

    #[test]
    fn test_binary_is_little_endian_f32() {
        let bytes = encode_binary(&records());
        assert_eq!(bytes.len(), 2 * 16);
        assert_eq!(&bytes[0..4], &1.0f32.to_le_bytes());
        assert_eq!(&bytes[4..8], &2.5f32.to_le_bytes());
        assert_eq!(&bytes[28..32], &0.1f32.to_le_bytes());
    }

    #[test]
    fn test_json_fields() {
        let bytes = encode_json(&records()).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value[1]["position"][2], 3.0);
        assert_eq!(value[0]["radius"], 0.1);
    }

    #[test]
    fn test_packed_size() {
        assert_eq!(PackedParticle::SIZE, 16);
    }
}
