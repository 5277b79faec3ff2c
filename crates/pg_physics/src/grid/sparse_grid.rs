// crates/pg_physics/src/grid/sparse_grid.rs

//! 稀疏块网格
//!
//! 块保存在只增 Arena 中，另有基坐标到块索引的哈希表；
//! 祖先按坐标偏移逐个查表解析，块之间不持有引用。
//!
//! # 推进（双缓冲）
//!
//! `advance` 为每个激活块新建同基坐标的空块作为写缓冲，
//! 以旧一代全部块为只读祖先执行更新函数；全部块完成后整体替换旧一代。
//! 任何块都看不到兄弟块（或自身）本代的中间状态。

use std::collections::HashMap;

use pg_foundation::arena::{Arena, ArenaTag, Idx};
use pg_foundation::{PgError, PgResult};
use rayon::prelude::*;

use crate::core::dimension::Dimension;
use crate::grid::ancestors::{ancestor_offsets, Ancestors};
use crate::grid::block::Block;
use crate::particle::Particle;

/// 块 Arena 标记
#[derive(Debug, Clone, Copy)]
pub struct BlockTag;
impl ArenaTag for BlockTag {}

/// 块索引
pub type BlockIdx = Idx<BlockTag>;

/// 稀疏块网格
#[derive(Debug)]
pub struct SparseGrid<D: Dimension> {
    block_size: usize,
    capacity: usize,
    blocks: Arena<Block<D>, BlockTag>,
    lookup: HashMap<D::Coord, BlockIdx>,
    offsets: Vec<D::Coord>,
}

impl<D: Dimension> SparseGrid<D> {
    /// 创建空网格
    pub fn new(block_size: usize, capacity: usize) -> PgResult<Self> {
        if block_size == 0 || block_size > i32::MAX as usize {
            return Err(PgError::invalid_input(format!("块边长无效: {block_size}")));
        }
        if capacity == 0 {
            return Err(PgError::invalid_input("块容量至少为 1"));
        }
        Ok(Self {
            block_size,
            capacity,
            blocks: Arena::new(),
            lookup: HashMap::new(),
            offsets: ancestor_offsets::<D>(),
        })
    }

    /// 块边长（单元数）
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// 每块容量
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 激活块数
    pub fn num_blocks(&self) -> usize {
        self.blocks.len()
    }

    /// 驻留粒子总数
    pub fn num_particles(&self) -> usize {
        self.blocks.values().iter().map(Block::particle_count).sum()
    }

    /// 包含单元 `cell` 的块基坐标
    pub fn block_base(&self, cell: D::Coord) -> D::Coord {
        let b = self.block_size as i32;
        D::coord_from_fn(|axis| D::coord_component(cell, axis).div_euclid(b) * b)
    }

    /// 位置所在单元（单元 i 覆盖网格单位 `[i − 0.5, i + 0.5)`）
    pub fn cell_of(position: D::Vector, inv_dx: f64) -> D::Coord {
        D::coord_from_fn(|axis| (D::component(position, axis) * inv_dx + 0.5).floor() as i32)
    }

    /// 确保包含单元 `cell` 的块存在
    pub fn touch(&mut self, cell: D::Coord) -> BlockIdx {
        let base = self.block_base(cell);
        if let Some(&idx) = self.lookup.get(&base) {
            return idx;
        }
        let idx = self
            .blocks
            .insert(Block::new(base, self.block_size, self.capacity));
        self.lookup.insert(base, idx);
        idx
    }

    /// 按基坐标查找块
    pub fn get(&self, base: D::Coord) -> Option<&Block<D>> {
        self.lookup.get(&base).map(|&idx| &self.blocks[idx])
    }

    /// 按索引取块
    pub fn block(&self, idx: BlockIdx) -> Option<&Block<D>> {
        self.blocks.get(idx)
    }

    /// 按激活顺序遍历块
    pub fn blocks(&self) -> impl Iterator<Item = &Block<D>> + '_ {
        self.blocks.values().iter()
    }

    /// 将粒子放入其位置所属的块，必要时激活该块
    pub fn insert_particle(&mut self, particle: Particle<D>, inv_dx: f64) -> PgResult<BlockIdx> {
        let idx = self.touch(Self::cell_of(particle.position, inv_dx));
        self.blocks[idx].add_particle(particle)?;
        Ok(idx)
    }

    /// 解析块 `idx` 的祖先集合
    pub fn ancestors(&self, idx: BlockIdx) -> Ancestors<'_, D> {
        let b = self.block_size as i32;
        let resolved = self.blocks.get(idx).map(|block| {
            let base = block.base();
            self.offsets
                .iter()
                .map(|&offset| {
                    let key = D::coord_from_fn(|axis| {
                        D::coord_component(base, axis) + D::coord_component(offset, axis) * b
                    });
                    self.get(key)
                })
                .collect::<Vec<_>>()
        });
        Ancestors::new(&self.offsets, resolved.unwrap_or_else(|| vec![None; self.offsets.len()]))
    }

    /// 对每个激活块执行 `update(新块, 祖先)`，`parallel` 为真时跨块并行
    ///
    /// 任一块返回错误时整代作废，网格保持推进前的状态。
    pub fn advance<F>(&mut self, update: F, parallel: bool) -> PgResult<()>
    where
        F: Fn(&mut Block<D>, &Ancestors<'_, D>) -> PgResult<()> + Sync + Send,
    {
        let next: Vec<Block<D>> = {
            let this = &*self;
            let build = |i: usize| -> PgResult<Block<D>> {
                let idx = BlockIdx::new(i as u32);
                let ancestors = this.ancestors(idx);
                let mut fresh = this.blocks[idx].empty_like();
                update(&mut fresh, &ancestors)?;
                Ok(fresh)
            };
            let n = this.blocks.len();
            if parallel {
                (0..n).into_par_iter().map(&build).collect::<PgResult<_>>()?
            } else {
                (0..n).map(build).collect::<PgResult<_>>()?
            }
        };
        self.blocks.replace_values(next)
    }

    /// 按块激活顺序拷贝出全部驻留粒子
    pub fn gather_particles(&self) -> Vec<Particle<D>> {
        let mut out = Vec::with_capacity(self.num_particles());
        for block in self.blocks.values() {
            out.extend_from_slice(block.particles());
        }
        out
    }
}
