// crates/pg_physics/tests/block_grid_migration.rs

//! 块网格迁移测试
//! 粒子守恒、跨块迁移、节点继承、容量溢出（构造与迁移）、缺失自身祖先

use glam::{DVec2, DVec3, IVec2};
use pg_foundation::PgError;
use pg_physics::engine::SphPass;
use pg_physics::grid::{ancestor_offsets, update_block, Ancestors, Block};
use pg_physics::prelude::*;

const INV_DX: f64 = 20.0;

fn settings(capacity: usize) -> BlockGridSettings {
    BlockGridSettings {
        block_size: 4,
        max_particles_per_block: capacity,
        margin_blocks: 1,
        grid_resolution: 20,
    }
}

fn drifting_backend(start_x: f64) -> BlockGridBackend<D2> {
    let params = SmoothingParameters::<D2>::new(0.025, 1.0, 0.0, 1e-3, DVec2::ZERO).unwrap();
    let particles = vec![Particle::new(DVec2::new(start_x, 0.1), DVec2::new(1.0, 0.0))];
    BlockGridBackend::new(particles, params, BoundaryBox::unbounded(), settings(64), Scheduler::sequential())
        .unwrap()
}

fn nodes_sum(backend: &BlockGridBackend<D2>, base: IVec2) -> u32 {
    backend
        .grid()
        .get(base)
        .map(|b| b.nodes().iter().sum())
        .unwrap_or(0)
}

/// 覆盖范围内粒子数在多个子步中保持不变
#[test]
fn test_particle_count_conserved() {
    let mut config = pg_config::SphConfig::dam_break_3d();
    config.simulation.backend = pg_config::BackendKind::BlockGrid;
    config.initial.counts = Some([4, 4, 4]);
    let mut backend = SimulationBuilder::new(config).build_backend::<D3>().unwrap();
    assert_eq!(backend.particle_count(), 64);

    for _ in 0..100 {
        let stats = backend.substep().unwrap();
        assert_eq!(stats.particles, 64);
        assert_eq!(stats.lost_particles, 0);
    }
    assert_eq!(backend.gather_particles().len(), 64);
}

/// 粒子跨过块边界后在下一子步被新块收集
#[test]
fn test_particle_migrates_between_blocks() {
    // 块 (0,0) 负责 x ∈ [-0.025, 0.175)，块 (4,0) 负责 [0.175, 0.375)
    let mut backend = drifting_backend(0.1695);
    assert_eq!(backend.grid().get(IVec2::ZERO).map(Block::particle_count), Some(1));

    for _ in 0..10 {
        backend.substep().unwrap();
    }
    assert_eq!(backend.grid().get(IVec2::ZERO).map(Block::particle_count), Some(0));
    assert_eq!(backend.grid().get(IVec2::new(4, 0)).map(Block::particle_count), Some(1));
    assert_eq!(backend.lost_particles(), 0);

    let p = backend.gather_particles()[0];
    assert!((p.position.x - 0.1795).abs() < 1e-12);
}

/// 节点数据从自身祖先继承并逐步累加
#[test]
fn test_nodes_inherit_across_steps() {
    let mut backend = drifting_backend(0.1695);
    for _ in 0..10 {
        backend.substep().unwrap();
    }
    // 前 6 个子步收集于块 (0,0)，后 4 个收集于块 (4,0)
    assert_eq!(nodes_sum(&backend, IVec2::ZERO), 6);
    assert_eq!(nodes_sum(&backend, IVec2::new(4, 0)), 4);
    assert_eq!(nodes_sum(&backend, IVec2::new(8, 0)), 0);
}

/// 离开全部块覆盖范围的粒子被计为丢失
#[test]
fn test_lost_particle_is_counted() {
    // 覆盖到 x 单元 24..27，即位置 < 1.375
    let params = SmoothingParameters::<D2>::new(0.025, 1.0, 0.0, 1e-3, DVec2::ZERO).unwrap();
    let particles = vec![
        Particle::new(DVec2::new(1.37, 0.5), DVec2::new(10.0, 0.0)),
        Particle::at_rest(DVec2::new(0.5, 0.5)),
    ];
    let mut backend =
        BlockGridBackend::new(particles, params, BoundaryBox::unbounded(), settings(64), Scheduler::sequential())
            .unwrap();
    let first = backend.substep().unwrap();
    assert_eq!(first.lost_particles, 0);
    let second = backend.substep().unwrap();
    assert_eq!(second.lost_particles, 1);
    assert_eq!(second.particles, 1);
    assert_eq!(backend.lost_particles(), 1);
}

/// 单块粒子数超过容量时构造失败
#[test]
fn test_block_overflow() {
    let params = SmoothingParameters::<D3>::new(0.025, 1.0, 0.0, 1e-3, DVec3::ZERO).unwrap();
    let particles = (0..3)
        .map(|i| Particle::at_rest(DVec3::new(0.01 * i as f64, 0.0, 0.0)))
        .collect();
    let err = BlockGridBackend::new(particles, params, BoundaryBox::unbounded(), settings(2), Scheduler::sequential())
        .unwrap_err();
    assert!(matches!(err, PgError::BlockOverflow { capacity: 2, .. }));
}

/// 迁移使目标块超出容量时子步失败，新一代整体丢弃
#[test]
fn test_block_overflow_during_substep() {
    let params = SmoothingParameters::<D2>::new(0.025, 1.0, 0.0, 1e-3, DVec2::ZERO).unwrap();
    // 两个静止粒子在块 (0,0)，第三个从块 (4,0) 向左越界
    let particles = vec![
        Particle::at_rest(DVec2::new(0.05, 0.1)),
        Particle::at_rest(DVec2::new(0.1, 0.1)),
        Particle::new(DVec2::new(0.18, 0.1), DVec2::new(-10.0, 0.0)),
    ];
    let mut backend =
        BlockGridBackend::new(particles, params, BoundaryBox::unbounded(), settings(2), Scheduler::sequential())
            .unwrap();
    assert_eq!(backend.grid().get(IVec2::ZERO).map(Block::particle_count), Some(2));

    // 第 1 步粒子移到 x = 0.17，仍由块 (4,0) 收集
    backend.substep().unwrap();
    let before = backend.gather_particles();
    assert_eq!(backend.grid().get(IVec2::new(4, 0)).map(Block::particle_count), Some(1));

    // 第 2 步块 (0,0) 收集到 3 个粒子
    let err = backend.substep().unwrap_err();
    assert!(matches!(err, PgError::BlockOverflow { coord: [0, 0, 0], capacity: 2 }));
    assert!(err.is_grid_precondition());
    assert_eq!(backend.particle_count(), 3);
    assert_eq!(backend.gather_particles(), before);
    assert_eq!(backend.lost_particles(), 0);
}

/// 缺失自身祖先是致命错误
#[test]
fn test_missing_self_ancestor() {
    let params = SmoothingParameters::<D2>::new(0.025, 1.0, 0.0, 1e-3, DVec2::ZERO).unwrap();
    let boundary = BoundaryBox::unbounded();
    let pass = SphPass::new(&params, &boundary);
    let offsets = ancestor_offsets::<D2>();
    let ancestors = Ancestors::<D2>::new(&offsets, vec![None; offsets.len()]);
    let mut block = Block::<D2>::new(IVec2::new(8, -4), 4, 16);
    let err = update_block(&mut block, &ancestors, &pass, INV_DX).unwrap_err();
    assert!(err.is_grid_precondition());
    assert!(matches!(err, PgError::MissingSelfAncestor { coord: [8, -4, 0] }));
}

/// 暴力与块网格在单个块内的结果一致
#[test]
fn test_single_block_matches_brute_force() {
    let params = SmoothingParameters::<D2>::new(0.05, 1e-6, 1e-6, 1e-3, DVec2::new(0.0, -10.0)).unwrap();
    let particles = vec![
        Particle::at_rest(DVec2::new(0.05, 0.05)),
        Particle::at_rest(DVec2::new(0.07, 0.05)),
        Particle::at_rest(DVec2::new(0.06, 0.08)),
    ];
    let mut bf = BruteForceBackend::new(particles.clone(), params, BoundaryBox::unbounded(), Scheduler::sequential());
    let mut grid =
        BlockGridBackend::new(particles, params, BoundaryBox::unbounded(), settings(16), Scheduler::sequential())
            .unwrap();
    bf.substep().unwrap();
    grid.substep().unwrap();
    assert_eq!(bf.gather_particles(), grid.gather_particles());
}
