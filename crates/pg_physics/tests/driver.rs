// crates/pg_physics/tests/driver.rs

//! 驱动测试
//! 每帧子步数、帧编号、输出缩放与时间推进

use pg_config::{BackendKind, SphConfig};
use pg_physics::prelude::*;
use pg_physics::DriverSettings;

fn small_column(frames: usize) -> SphConfig {
    let mut config = SphConfig::column_2d();
    config.initial.counts = Some([3, 3, 1]);
    config.simulation.total_frames = frames;
    config
}

/// 2D 预设每帧 10 子步
#[test]
fn test_column_substeps_per_frame() {
    let config = small_column(4);
    assert_eq!(DriverSettings::from_config(&config).substeps_per_frame(), 10);

    let mut driver = SimulationBuilder::new(config).build_typed::<D2>().unwrap();
    let report = driver.advance(&mut NullSink).unwrap();
    assert_eq!(report.frame, 1);
    assert_eq!(report.substeps, 10);
    assert_eq!(driver.substep_count(), 10);
    assert!((driver.time() - 0.01).abs() < 1e-12);
}

/// 3D 预设每帧 334 子步
#[test]
fn test_dam_break_substeps_per_frame() {
    let config = SphConfig::dam_break_3d();
    assert_eq!(DriverSettings::from_config(&config).substeps_per_frame(), 334);
}

/// 每帧写出一次，帧号从 1 开始连续
#[test]
fn test_frames_written_in_order() {
    let mut sim = SimulationBuilder::new(small_column(3)).build().unwrap();
    let mut sink = MemorySink::default();
    let summary = sim.run(&mut sink).unwrap();

    assert_eq!(summary.frames, 3);
    assert_eq!(summary.substeps, 30);
    assert_eq!(sim.current_frame(), 3);
    let indices: Vec<usize> = sink.frames.iter().map(|(i, _)| *i).collect();
    assert_eq!(indices, vec![1, 2, 3]);
    assert!(sink.frames.iter().all(|(_, records)| records.len() == 9));
}

/// 暴力后端输出位置放大 10 倍，半径为 10h；2D 的 z 为 0
#[test]
fn test_brute_force_output_scaling() {
    let config = small_column(1);
    let h = config.smoothing_radius();
    let sim = SimulationBuilder::new(config).build().unwrap();
    let records = sim.frame_records();
    assert_eq!(records.len(), 9);
    // 第一个点阵粒子位于 (0.1, 0.1)
    assert!((records[0].position[0] - 1.0).abs() < 1e-12);
    assert!((records[0].position[1] - 1.0).abs() < 1e-12);
    assert_eq!(records[0].position[2], 0.0);
    assert!(records.iter().all(|r| (r.radius - 10.0 * h).abs() < 1e-12));
}

/// 块网格输出位置放大 3 倍，半径 0.3
#[test]
fn test_block_grid_output_scaling() {
    let mut config = SphConfig::dam_break_3d();
    config.simulation.backend = BackendKind::BlockGrid;
    config.initial.counts = Some([2, 2, 2]);
    let h = config.smoothing_radius();
    let sim = SimulationBuilder::new(config).build().unwrap();
    let records = sim.frame_records();
    assert_eq!(records.len(), 8);
    assert!(records.iter().all(|r| r.radius == 0.3));
    let min_x = records.iter().map(|r| r.position[0]).fold(f64::INFINITY, f64::min);
    assert!((min_x - 3.0 * 0.5 * h).abs() < 1e-12);
}

/// 统计信息反映已完成的帧与子步
#[test]
fn test_stats_after_run() {
    let mut sim = SimulationBuilder::new(small_column(2)).build().unwrap();
    sim.run(&mut NullSink).unwrap();
    let stats = sim.stats();
    assert_eq!(stats.frames, 2);
    assert_eq!(stats.substeps, 20);
    assert_eq!(stats.particles, 9);
    assert_eq!(stats.lost_particles, 0);
    assert_eq!(stats.parallel_calls + stats.sequential_calls, 20);
    assert!(stats.to_string().contains("帧数: 2"));
}
