// crates/pg_foundation/src/arena.rs

//! 泛型只增 Arena
//!
//! 存放同类型对象，以强类型 `Idx<Tag>` 访问。元素一经插入即常驻，
//! 不支持删除，因此索引永不失效。
//!
//! 稀疏块网格用它保存全部激活块：坐标到索引的映射放在网格里，
//! 块本身只通过索引访问，块之间没有指针互引。
//!
//! # 代际替换
//!
//! [`Arena::replace_values`] 以同长度的新一代元素整体替换旧一代，
//! 所有已发放的索引继续指向同一位置。双缓冲更新依赖这一点。
//!
//! # 示例
//!
//! ```
//! use pg_foundation::arena::{Arena, ArenaTag};
//!
//! #[derive(Debug, Clone, Copy)]
//! struct BlockTag;
//! impl ArenaTag for BlockTag {}
//!
//! let mut arena: Arena<i32, BlockTag> = Arena::new();
//! let idx = arena.insert(42);
//! assert_eq!(arena.get(idx), Some(&42));
//!
//! arena.replace_values(vec![7]).unwrap();
//! assert_eq!(arena[idx], 7);
//! ```

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

use crate::error::{PgError, PgResult};

// ============================================================================
// 标记类型
// ============================================================================

/// Arena标记trait，用于类型安全地区分不同用途的Arena
pub trait ArenaTag: 'static + Copy + Send + Sync {}

// ============================================================================
// 索引类型
// ============================================================================

/// 轻量级类型安全索引（4字节）
///
/// 与 `u32` 内存布局相同。`PhantomData<fn() -> Tag>` 让索引
/// 无条件实现 `Send`/`Sync`，且不要求 `Tag: Copy`。
#[derive(Debug)]
#[repr(transparent)]
pub struct Idx<Tag> {
    index: u32,
    _marker: PhantomData<fn() -> Tag>,
}

// 手动实现，避免派生宏对 `Tag` 附加多余约束
impl<Tag> Copy for Idx<Tag> {}

impl<Tag> Clone for Idx<Tag> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<Tag> PartialEq for Idx<Tag> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl<Tag> Eq for Idx<Tag> {}

impl<Tag> Hash for Idx<Tag> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
    }
}

impl<Tag> PartialOrd for Idx<Tag> {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<Tag> Ord for Idx<Tag> {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.index.cmp(&other.index)
    }
}

impl<Tag> Idx<Tag> {
    /// 创建新索引
    #[inline]
    pub const fn new(index: u32) -> Self {
        Self {
            index,
            _marker: PhantomData,
        }
    }

    /// 转换为`usize`
    #[inline]
    pub const fn as_usize(self) -> usize {
        self.index as usize
    }
}

// ============================================================================
// Arena 实现
// ============================================================================

/// 只增内存池
///
/// # 类型参数
/// - `T`: 存储的元素类型
/// - `Tag`: 标记类型，用于防止不同Arena的索引混用
#[derive(Debug, Clone)]
pub struct Arena<T, Tag: ArenaTag> {
    values: Vec<T>,
    _marker: PhantomData<Tag>,
}

impl<T, Tag: ArenaTag> Default for Arena<T, Tag> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, Tag: ArenaTag> Arena<T, Tag> {
    /// 创建空Arena
    #[inline]
    pub fn new() -> Self {
        Self {
            values: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// 返回元素数量
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// 检查是否为空
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// 插入元素并返回索引
    pub fn insert(&mut self, value: T) -> Idx<Tag> {
        let idx = Idx::new(self.values.len() as u32);
        self.values.push(value);
        idx
    }

    /// 获取元素引用
    #[inline]
    pub fn get(&self, idx: Idx<Tag>) -> Option<&T> {
        self.values.get(idx.as_usize())
    }

    /// 按插入顺序遍历元素
    #[inline]
    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// 以新一代元素整体替换
    ///
    /// 长度必须与当前一致，否则返回错误且不修改 Arena。
    pub fn replace_values(&mut self, next: Vec<T>) -> PgResult<()> {
        if next.len() != self.values.len() {
            return Err(PgError::internal(format!(
                "Arena 代际替换长度不一致: 期望 {}, 实际 {}",
                self.values.len(),
                next.len()
            )));
        }
        self.values = next;
        Ok(())
    }
}

impl<T, Tag: ArenaTag> Index<Idx<Tag>> for Arena<T, Tag> {
    type Output = T;

    #[inline]
    fn index(&self, idx: Idx<Tag>) -> &T {
        &self.values[idx.as_usize()]
    }
}

impl<T, Tag: ArenaTag> IndexMut<Idx<Tag>> for Arena<T, Tag> {
    #[inline]
    fn index_mut(&mut self, idx: Idx<Tag>) -> &mut T {
        &mut self.values[idx.as_usize()]
    }
}
