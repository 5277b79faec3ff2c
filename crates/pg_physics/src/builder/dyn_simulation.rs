// crates/pg_physics/src/builder/dyn_simulation.rs

//! 动态模拟 trait
//!
//! App 层通过 `Box<dyn DynSimulation>` 使用模拟，不关心维度与邻域后端。

use std::fmt;
use std::time::Duration;

use pg_foundation::PgResult;

use crate::core::dimension::Dimension;
use crate::driver::{FrameRecord, FrameReport, FrameSink, RunSummary, SimulationDriver};
use crate::engine::NeighborBackend;
use crate::particle::ParticleSummary;

/// 动态模拟 trait（运行时多态）
///
/// 所有 `SimulationDriver<D, B>` 自动实现此 trait。
///
/// # 示例
///
/// ```ignore
/// let mut sim = SimulationBuilder::new(config).build()?;
/// while !sim.is_finished() {
///     let report = sim.advance_frame(&mut sink)?;
///     println!("帧 {}: t={:.3}", report.frame, report.time);
/// }
/// ```
pub trait DynSimulation: Send + Sync {
    /// 后端名称
    fn backend_name(&self) -> &'static str;

    /// 维度名称（"2D" / "3D"）
    fn dimension_name(&self) -> &'static str;

    /// 推进一帧并写出
    fn advance_frame(&mut self, sink: &mut dyn FrameSink) -> PgResult<FrameReport>;

    /// 运行到总帧数
    fn run(&mut self, sink: &mut dyn FrameSink) -> PgResult<RunSummary>;

    /// 已完成帧数
    fn current_frame(&self) -> usize;

    /// 总帧数
    fn total_frames(&self) -> usize;

    /// 是否已跑完
    fn is_finished(&self) -> bool {
        self.current_frame() >= self.total_frames()
    }

    /// 模拟时间
    fn time(&self) -> f64;

    /// 存活粒子数
    fn particle_count(&self) -> usize;

    /// 当前输出记录
    fn frame_records(&self) -> Vec<FrameRecord>;

    /// 统计信息
    fn stats(&self) -> SimulationStats;
}

/// 模拟统计
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulationStats {
    /// 已完成帧数
    pub frames: usize,
    /// 已完成子步数
    pub substeps: u64,
    /// 模拟时间
    pub time: f64,
    /// 存活粒子数
    pub particles: usize,
    /// 累计丢失粒子数
    pub lost_particles: usize,
    /// 并行调用次数
    pub parallel_calls: usize,
    /// 串行调用次数
    pub sequential_calls: usize,
    /// 计算耗时
    pub compute_time: Duration,
    /// 粒子统计
    pub summary: ParticleSummary,
}

impl fmt::Display for SimulationStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "模拟统计:")?;
        writeln!(f, "  帧数: {}", self.frames)?;
        writeln!(f, "  子步数: {}", self.substeps)?;
        writeln!(f, "  模拟时间: {:.4}", self.time)?;
        writeln!(f, "  粒子数: {} (丢失 {})", self.particles, self.lost_particles)?;
        writeln!(
            f,
            "  调度: 并行 {} 次, 串行 {} 次",
            self.parallel_calls, self.sequential_calls
        )?;
        writeln!(f, "  计算耗时: {:.3}s", self.compute_time.as_secs_f64())?;
        write!(
            f,
            "  质心: ({:.4}, {:.4}, {:.4}), 最大速率 {:.4}",
            self.summary.centroid[0],
            self.summary.centroid[1],
            self.summary.centroid[2],
            self.summary.max_speed
        )
    }
}

impl<D: Dimension, B: NeighborBackend<D>> DynSimulation for SimulationDriver<D, B> {
    fn backend_name(&self) -> &'static str {
        self.backend().name()
    }

    fn dimension_name(&self) -> &'static str {
        D::name()
    }

    fn advance_frame(&mut self, sink: &mut dyn FrameSink) -> PgResult<FrameReport> {
        self.advance(sink)
    }

    fn run(&mut self, sink: &mut dyn FrameSink) -> PgResult<RunSummary> {
        SimulationDriver::run(self, sink)
    }

    fn current_frame(&self) -> usize {
        SimulationDriver::current_frame(self)
    }

    fn total_frames(&self) -> usize {
        self.settings().total_frames
    }

    fn time(&self) -> f64 {
        SimulationDriver::time(self)
    }

    fn particle_count(&self) -> usize {
        self.backend().particle_count()
    }

    fn frame_records(&self) -> Vec<FrameRecord> {
        SimulationDriver::frame_records(self)
    }

    fn stats(&self) -> SimulationStats {
        let metrics = self.backend().scheduler_metrics();
        SimulationStats {
            frames: SimulationDriver::current_frame(self),
            substeps: self.substep_count(),
            time: SimulationDriver::time(self),
            particles: self.backend().particle_count(),
            lost_particles: self.lost_particles(),
            parallel_calls: metrics.parallel_calls,
            sequential_calls: metrics.sequential_calls,
            compute_time: metrics.total_duration,
            summary: ParticleSummary::of(&self.particles()),
        }
    }
}
