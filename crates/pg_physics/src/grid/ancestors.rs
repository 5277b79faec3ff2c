// crates/pg_physics/src/grid/ancestors.rs

//! 祖先块集合
//!
//! 目标块及其各轴 ±1 块范围内的邻居（含自身），共 3^NDIM 个位置。
//! 祖先只是按键查到的只读引用，不发生所有权转移。

use crate::core::dimension::Dimension;
use crate::grid::block::Block;

/// 祖先偏移（块单位），x 变化最快，包含零偏移
pub fn ancestor_offsets<D: Dimension>() -> Vec<D::Coord> {
    let total = 3usize.pow(D::NDIM as u32);
    (0..total)
        .map(|index| {
            D::coord_from_fn(|axis| ((index / 3usize.pow(axis as u32)) % 3) as i32 - 1)
        })
        .collect()
}

/// 某个块的祖先集合
#[derive(Debug)]
pub struct Ancestors<'a, D: Dimension> {
    offsets: &'a [D::Coord],
    blocks: Vec<Option<&'a Block<D>>>,
}

impl<'a, D: Dimension> Ancestors<'a, D> {
    /// 由偏移表与对应的查找结果构造，二者按位置一一对应
    pub fn new(offsets: &'a [D::Coord], blocks: Vec<Option<&'a Block<D>>>) -> Self {
        Self { offsets, blocks }
    }

    /// 按块单位偏移查找
    pub fn get(&self, offset: D::Coord) -> Option<&'a Block<D>> {
        self.offsets
            .iter()
            .zip(&self.blocks)
            .find(|(o, _)| **o == offset)
            .and_then(|(_, b)| *b)
    }

    /// 自身（零偏移）
    pub fn self_block(&self) -> Option<&'a Block<D>> {
        self.get(D::coord_from_fn(|_| 0))
    }

    /// 按偏移表顺序遍历存在的祖先
    pub fn existing(&self) -> impl Iterator<Item = &'a Block<D>> + '_ {
        self.blocks.iter().filter_map(|b| *b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dimension::{D2, D3};
    use glam::{IVec2, IVec3};

    #[test]
    fn test_offset_counts() {
        assert_eq!(ancestor_offsets::<D2>().len(), 9);
        let offsets = ancestor_offsets::<D3>();
        assert_eq!(offsets.len(), 27);
        assert_eq!(offsets[0], IVec3::splat(-1));
        assert_eq!(offsets[13], IVec3::ZERO);
        assert_eq!(offsets[26], IVec3::ONE);
    }

    #[test]
    fn test_lookup_by_offset() {
        let offsets = ancestor_offsets::<D2>();
        let center = Block::<D2>::new(IVec2::ZERO, 4, 8);
        let right = Block::<D2>::new(IVec2::new(4, 0), 4, 8);
        let blocks: Vec<_> = offsets
            .iter()
            .map(|o| match (o.x, o.y) {
                (0, 0) => Some(&center),
                (1, 0) => Some(&right),
                _ => None,
            })
            .collect();
        let ancestors = Ancestors::new(&offsets, blocks);
        assert_eq!(ancestors.existing().count(), 2);
        assert_eq!(ancestors.self_block().map(|b| b.base()), Some(IVec2::ZERO));
        assert_eq!(ancestors.get(IVec2::new(1, 0)).map(|b| b.base()), Some(IVec2::new(4, 0)));
        assert!(ancestors.get(IVec2::new(-1, 0)).is_none());
    }

    #[test]
    fn test_missing_self() {
        let offsets = ancestor_offsets::<D2>();
        let ancestors = Ancestors::<D2>::new(&offsets, vec![None; offsets.len()]);
        assert!(ancestors.self_block().is_none());
        assert_eq!(ancestors.existing().count(), 0);
    }
}
