// crates/pg_physics/src/driver.rs

//! 模拟驱动
//!
//! 持有一个邻域后端，每帧调用 `substeps_per_frame` 次 `substep()`，
//! 推进模拟时间，然后把当前粒子以 `(位置, 半径)` 序列交给输出端。
//! 输出格式由 [`FrameSink`] 的实现决定。

use std::marker::PhantomData;
use std::time::{Duration, Instant};

use log::{debug, error};
use pg_config::SphConfig;
use pg_foundation::{PgError, PgResult};
use serde::Serialize;

use crate::core::dimension::Dimension;
use crate::engine::{NeighborBackend, SubstepStats};
use crate::particle::{Particle, ParticleSummary};

// ============================================================
// 输出接口
// ============================================================

/// 单个粒子的输出记录
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrameRecord {
    /// 缩放后的位置，2D 时 z 为 0
    pub position: [f64; 3],
    /// 显示半径
    pub radius: f64,
}

/// 帧输出端
pub trait FrameSink {
    /// 写出第 `frame` 帧
    fn write_frame(&mut self, frame: usize, records: &[FrameRecord]) -> PgResult<()>;
}

/// 内存输出端，收集全部帧
#[derive(Debug, Default)]
pub struct MemorySink {
    /// `(帧号, 记录)` 列表
    pub frames: Vec<(usize, Vec<FrameRecord>)>,
}

impl FrameSink for MemorySink {
    fn write_frame(&mut self, frame: usize, records: &[FrameRecord]) -> PgResult<()> {
        self.frames.push((frame, records.to_vec()));
        Ok(())
    }
}

/// 丢弃输出
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl FrameSink for NullSink {
    fn write_frame(&mut self, _frame: usize, _records: &[FrameRecord]) -> PgResult<()> {
        Ok(())
    }
}

// ============================================================
// 驱动
// ============================================================

/// 驱动设置
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriverSettings {
    /// 帧间隔
    pub frame_dt: f64,
    /// 子步长
    pub dt: f64,
    /// 总帧数
    pub total_frames: usize,
    /// 输出位置缩放
    pub position_scale: f64,
    /// 输出粒子半径
    pub radius: f64,
}

impl DriverSettings {
    /// 从配置提取
    pub fn from_config(config: &SphConfig) -> Self {
        Self {
            frame_dt: config.simulation.frame_dt,
            dt: config.simulation.dt,
            total_frames: config.simulation.total_frames,
            position_scale: config.resolved_position_scale(),
            radius: config.resolved_radius(),
        }
    }

    /// 每帧子步数：满足 `i < frame_dt/dt` 的 i 个数
    pub fn substeps_per_frame(&self) -> usize {
        (self.frame_dt / self.dt).ceil() as usize
    }
}

/// 单帧报告
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameReport {
    /// 帧号（从 1 开始）
    pub frame: usize,
    /// 本帧子步数
    pub substeps: usize,
    /// 帧末模拟时间
    pub time: f64,
    /// 帧末粒子数
    pub particles: usize,
    /// 本帧丢失粒子数
    pub lost_particles: usize,
    /// 帧末粒子统计
    pub summary: ParticleSummary,
    /// 本帧墙钟耗时
    pub wall_time: Duration,
}

/// 整次运行汇总
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunSummary {
    /// 完成帧数
    pub frames: usize,
    /// 完成子步数
    pub substeps: u64,
    /// 模拟时间
    pub time: f64,
    /// 累计丢失粒子数
    pub lost_particles: usize,
    /// 墙钟耗时
    pub wall_time: Duration,
}

/// 模拟驱动
#[derive(Debug)]
pub struct SimulationDriver<D: Dimension, B: NeighborBackend<D>> {
    backend: B,
    settings: DriverSettings,
    current_frame: usize,
    substep_count: u64,
    time: f64,
    lost_particles: usize,
    wall_time: Duration,
    _dim: PhantomData<D>,
}

impl<D: Dimension, B: NeighborBackend<D>> SimulationDriver<D, B> {
    /// 创建驱动
    pub fn new(backend: B, settings: DriverSettings) -> PgResult<Self> {
        PgError::check_positive("dt", settings.dt)?;
        if !(settings.frame_dt.is_finite() && settings.frame_dt >= settings.dt) {
            return Err(PgError::out_of_range("frame_dt", settings.frame_dt, settings.dt, f64::MAX));
        }
        Ok(Self {
            backend,
            settings,
            current_frame: 0,
            substep_count: 0,
            time: 0.0,
            lost_particles: 0,
            wall_time: Duration::ZERO,
            _dim: PhantomData,
        })
    }

    /// 后端
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// 设置
    pub fn settings(&self) -> &DriverSettings {
        &self.settings
    }

    /// 已完成帧数
    pub fn current_frame(&self) -> usize {
        self.current_frame
    }

    /// 已完成子步数
    pub fn substep_count(&self) -> u64 {
        self.substep_count
    }

    /// 模拟时间
    pub fn time(&self) -> f64 {
        self.time
    }

    /// 累计丢失粒子数
    pub fn lost_particles(&self) -> usize {
        self.lost_particles
    }

    /// 累计墙钟耗时
    pub fn wall_time(&self) -> Duration {
        self.wall_time
    }

    /// 是否已跑完全部帧
    pub fn is_finished(&self) -> bool {
        self.current_frame >= self.settings.total_frames
    }

    /// 单个子步
    pub fn substep(&mut self) -> PgResult<SubstepStats> {
        let stats = self.backend.substep().map_err(|err| {
            if err.is_grid_precondition() {
                error!("子步 {} 违反块网格前置条件: {}", self.substep_count + 1, err);
            }
            err
        })?;
        self.substep_count += 1;
        self.time += self.settings.dt;
        self.lost_particles += stats.lost_particles;
        Ok(stats)
    }

    /// 当前状态的输出记录
    pub fn frame_records(&self) -> Vec<FrameRecord> {
        self.records_from(&self.backend.gather_particles())
    }

    fn records_from(&self, particles: &[Particle<D>]) -> Vec<FrameRecord> {
        let scale = self.settings.position_scale;
        let radius = self.settings.radius;
        particles
            .iter()
            .map(|p| {
                let pos = D::to_array(p.position);
                FrameRecord {
                    position: [pos[0] * scale, pos[1] * scale, pos[2] * scale],
                    radius,
                }
            })
            .collect()
    }

    /// 当前粒子拷贝
    pub fn particles(&self) -> Vec<Particle<D>> {
        self.backend.gather_particles()
    }

    /// 推进一帧并输出
    pub fn advance(&mut self, sink: &mut dyn FrameSink) -> PgResult<FrameReport> {
        let start = Instant::now();
        let substeps = self.settings.substeps_per_frame();
        let mut lost = 0;
        for _ in 0..substeps {
            lost += self.substep()?.lost_particles;
        }
        self.current_frame += 1;

        let particles = self.backend.gather_particles();
        let records = self.records_from(&particles);
        sink.write_frame(self.current_frame, &records)?;

        let wall_time = start.elapsed();
        self.wall_time += wall_time;
        let report = FrameReport {
            frame: self.current_frame,
            substeps,
            time: self.time,
            particles: particles.len(),
            lost_particles: lost,
            summary: ParticleSummary::of(&particles),
            wall_time,
        };
        debug!(
            "帧 {} 完成: t={:.4}, {} 子步, {} 粒子, 耗时 {:?}",
            report.frame, report.time, substeps, report.particles, wall_time
        );
        Ok(report)
    }

    /// 运行到 `total_frames`
    pub fn run(&mut self, sink: &mut dyn FrameSink) -> PgResult<RunSummary> {
        while !self.is_finished() {
            self.advance(sink)?;
        }
        Ok(self.summary())
    }

    /// 当前汇总
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            frames: self.current_frame,
            substeps: self.substep_count,
            time: self.time,
            lost_particles: self.lost_particles,
            wall_time: self.wall_time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::BoundaryBox;
    use crate::core::dimension::D2;
    use crate::core::params::SmoothingParameters;
    use crate::engine::{BruteForceBackend, Scheduler};
    use glam::DVec2;

    fn driver(frame_dt: f64, dt: f64, frames: usize) -> SimulationDriver<D2, BruteForceBackend<D2>> {
        let params = SmoothingParameters::<D2>::new(0.01, 1.0, 0.0, dt, DVec2::new(0.0, -10.0)).unwrap();
        let backend = BruteForceBackend::new(
            vec![Particle::at_rest(DVec2::new(0.5, 0.5))],
            params,
            BoundaryBox::unbounded(),
            Scheduler::sequential(),
        );
        let settings = DriverSettings {
            frame_dt,
            dt,
            total_frames: frames,
            position_scale: 10.0,
            radius: 0.1,
        };
        SimulationDriver::new(backend, settings).unwrap()
    }

    #[test]
    fn test_substeps_per_frame_rounds_up() {
        let d = driver(0.1, 0.0003, 1);
        assert_eq!(d.settings().substeps_per_frame(), 334);
        let d = driver(0.01, 0.001, 1);
        assert_eq!(d.settings().substeps_per_frame(), 10);
    }

    #[test]
    fn test_run_writes_every_frame() {
        let mut d = driver(0.01, 0.001, 3);
        let mut sink = MemorySink::default();
        let summary = d.run(&mut sink).unwrap();
        assert_eq!(summary.frames, 3);
        assert_eq!(summary.substeps, 30);
        assert!((summary.time - 0.03).abs() < 1e-12);
        let frames: Vec<usize> = sink.frames.iter().map(|(f, _)| *f).collect();
        assert_eq!(frames, vec![1, 2, 3]);
        assert!(d.is_finished());
    }

    #[test]
    fn test_records_are_scaled() {
        let d = driver(0.01, 0.001, 1);
        let records = d.frame_records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].position, [5.0, 5.0, 0.0]);
        assert_eq!(records[0].radius, 0.1);
    }

    #[test]
    fn test_advance_writes_post_frame_state() {
        let mut d = driver(0.01, 0.001, 2);
        let mut sink = MemorySink::default();
        let report = d.advance(&mut sink).unwrap();
        let (frame, written) = &sink.frames[0];
        assert_eq!(*frame, 1);
        assert_eq!(report.particles, written.len());
        assert_eq!(written, &d.frame_records());
        // 重力下落后 y 已低于初始 0.5*10
        assert!(written[0].position[1] < 5.0);
        assert!((report.summary.centroid[1] * 10.0 - written[0].position[1]).abs() < 1e-9);
    }

    #[test]
    fn test_rejects_frame_dt_below_dt() {
        let params = SmoothingParameters::<D2>::new(0.01, 1.0, 0.0, 0.1, DVec2::ZERO).unwrap();
        let backend = BruteForceBackend::new(vec![], params, BoundaryBox::unbounded(), Scheduler::sequential());
        let settings = DriverSettings {
            frame_dt: 0.01,
            dt: 0.1,
            total_frames: 1,
            position_scale: 1.0,
            radius: 1.0,
        };
        assert!(SimulationDriver::new(backend, settings).is_err());
    }
}
