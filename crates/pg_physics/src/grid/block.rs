// crates/pg_physics/src/grid/block.rs

//! 空间块
//!
//! 块以网格单位的基坐标 `base` 标识，边长 `size` 个单元，
//! 对半开区间 `[base − 0.5, base + size − 0.5)`（网格单位）内的粒子负责。
//!
//! `nodes` 为块内每个单元一个的累计占用计数，每子步从自身祖先继承，
//! 再叠加本子步驻留粒子。

use pg_foundation::{PgError, PgResult};

use crate::core::dimension::Dimension;
use crate::particle::Particle;

/// 空间块
#[derive(Debug, Clone)]
pub struct Block<D: Dimension> {
    base: D::Coord,
    size: usize,
    capacity: usize,
    particles: Vec<Particle<D>>,
    nodes: Vec<u32>,
}

impl<D: Dimension> Block<D> {
    /// 创建空块
    pub fn new(base: D::Coord, size: usize, capacity: usize) -> Self {
        Self {
            base,
            size,
            capacity,
            particles: Vec::new(),
            nodes: vec![0; size.pow(D::NDIM as u32)],
        }
    }

    /// 同基坐标的空块，作为下一代的写缓冲
    pub fn empty_like(&self) -> Self {
        Self::new(self.base, self.size, self.capacity)
    }

    /// 基坐标（网格单位）
    pub fn base(&self) -> D::Coord {
        self.base
    }

    /// 基坐标展开为三分量
    pub fn base_array(&self) -> [i32; 3] {
        D::coord_to_array(self.base)
    }

    /// 边长（单元数）
    pub fn size(&self) -> usize {
        self.size
    }

    /// 粒子容量
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 驻留粒子
    pub fn particles(&self) -> &[Particle<D>] {
        &self.particles
    }

    /// 驻留粒子（可变）
    pub fn particles_mut(&mut self) -> &mut [Particle<D>] {
        &mut self.particles
    }

    /// 驻留粒子数
    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    /// 单元占用计数
    pub fn nodes(&self) -> &[u32] {
        &self.nodes
    }

    /// 加入一个粒子，容量已满时返回 `BlockOverflow`
    pub fn add_particle(&mut self, particle: Particle<D>) -> PgResult<()> {
        if self.particles.len() >= self.capacity {
            return Err(PgError::block_overflow(self.base_array(), self.capacity));
        }
        self.particles.push(particle);
        Ok(())
    }

    /// 从另一个块复制节点数据
    pub fn inherit_nodes(&mut self, seed: &Block<D>) -> PgResult<()> {
        if seed.nodes.len() != self.nodes.len() {
            return Err(PgError::internal(format!(
                "块 {:?} 节点数 {} 与种子块 {} 不一致",
                self.base_array(),
                self.nodes.len(),
                seed.nodes.len()
            )));
        }
        self.nodes.copy_from_slice(&seed.nodes);
        Ok(())
    }

    /// 负责区间 `[lower, upper)`（网格单位）
    pub fn particle_range(&self) -> (D::Vector, D::Vector) {
        let size = self.size as f64;
        let lower = D::vector_from_fn(|axis| D::coord_component(self.base, axis) as f64 - 0.5);
        let upper = D::vector_from_fn(|axis| D::coord_component(self.base, axis) as f64 + size - 0.5);
        (lower, upper)
    }

    /// 网格单位位置是否落在负责区间内
    pub fn owns_grid_pos(&self, grid_pos: D::Vector) -> bool {
        let (lower, upper) = self.particle_range();
        (0..D::NDIM).all(|axis| {
            let x = D::component(grid_pos, axis);
            D::component(lower, axis) <= x && x < D::component(upper, axis)
        })
    }

    /// 网格单位位置对应的块内单元线性下标
    pub fn local_cell(&self, grid_pos: D::Vector) -> Option<usize> {
        let size = self.size as i64;
        let mut linear = 0i64;
        let mut stride = 1i64;
        for axis in 0..D::NDIM {
            let cell = (D::component(grid_pos, axis) + 0.5).floor() as i64;
            let local = cell - D::coord_component(self.base, axis) as i64;
            if !(0..size).contains(&local) {
                return None;
            }
            linear += local * stride;
            stride *= size;
        }
        Some(linear as usize)
    }

    /// 按驻留粒子所在单元累加占用计数
    pub fn record_occupancy(&mut self, inv_dx: f64) {
        for i in 0..self.particles.len() {
            let grid_pos = self.particles[i].position * inv_dx;
            if let Some(cell) = self.local_cell(grid_pos) {
                self.nodes[cell] = self.nodes[cell].saturating_add(1);
            }
        }
    }
}
