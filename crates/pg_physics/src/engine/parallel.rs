// crates/pg_physics/src/engine/parallel.rs

//! 并行调度
//!
//! 串行/并行的选择是显式配置，不依赖全局状态：
//! - `Sequential`: 始终串行
//! - `Parallel`: 始终并行
//! - `Auto`: 工作项数不少于 `min_parallel_size` 时并行
//!
//! 给定 `num_threads` 时调度器持有专用 rayon 线程池，所有并行工作在池内执行；
//! `num_threads = 1` 即强制单线程模式。
//!
//! 各并行路径只做"按下标映射"，每个工作项只写自己的结果，
//! 因此串行与并行结果逐位一致。

use pg_config::{ExecutionMode, ParallelConfig};
use pg_foundation::{PgError, PgResult};

use rayon::prelude::*;
use std::time::Duration;

// ============================================================
// 性能指标
// ============================================================

/// 调度指标
#[derive(Debug, Clone, Default)]
pub struct SchedulerMetrics {
    /// 总调用次数
    pub total_calls: usize,
    /// 并行调用次数
    pub parallel_calls: usize,
    /// 串行调用次数
    pub sequential_calls: usize,
    /// 总耗时
    pub total_duration: Duration,
    /// 处理的工作项总数
    pub total_items: usize,
}

impl SchedulerMetrics {
    /// 记录一次调用
    pub fn record(&mut self, n_items: usize, is_parallel: bool, duration: Duration) {
        self.total_calls += 1;
        self.total_items += n_items;
        self.total_duration += duration;
        if is_parallel {
            self.parallel_calls += 1;
        } else {
            self.sequential_calls += 1;
        }
    }
}

// ============================================================
// 调度器
// ============================================================

/// 并行调度器
pub struct Scheduler {
    mode: ExecutionMode,
    min_parallel_size: usize,
    pool: Option<rayon::ThreadPool>,
    single_threaded: bool,
    metrics: SchedulerMetrics,
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("mode", &self.mode)
            .field("min_parallel_size", &self.min_parallel_size)
            .field("threads", &self.num_threads())
            .field("single_threaded", &self.single_threaded)
            .finish()
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::sequential()
    }
}

impl Scheduler {
    /// 从配置构建
    pub fn new(config: &ParallelConfig) -> PgResult<Self> {
        let single_threaded = config.num_threads == Some(1);
        let pool = match config.num_threads {
            Some(n) if n > 1 => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .thread_name(|i| format!("pangu-worker-{i}"))
                    .build()
                    .map_err(|e| PgError::config(format!("线程池创建失败: {e}")))?,
            ),
            Some(0) => return Err(PgError::config("num_threads 至少为 1")),
            _ => None,
        };
        Ok(Self {
            mode: config.mode,
            min_parallel_size: config.min_parallel_size,
            pool,
            single_threaded,
            metrics: SchedulerMetrics::default(),
        })
    }

    /// 纯串行调度器
    pub fn sequential() -> Self {
        Self {
            mode: ExecutionMode::Sequential,
            min_parallel_size: usize::MAX,
            pool: None,
            single_threaded: true,
            metrics: SchedulerMetrics::default(),
        }
    }

    /// 始终并行（使用全局线程池）
    pub fn parallel() -> Self {
        Self {
            mode: ExecutionMode::Parallel,
            min_parallel_size: 0,
            pool: None,
            single_threaded: false,
            metrics: SchedulerMetrics::default(),
        }
    }

    /// 执行模式
    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    /// 实际可用线程数
    pub fn num_threads(&self) -> usize {
        if self.single_threaded {
            1
        } else {
            self.pool
                .as_ref()
                .map_or_else(rayon::current_num_threads, |p| p.current_num_threads())
        }
    }

    /// 对 `n_items` 个工作项是否并行
    pub fn should_parallelize(&self, n_items: usize) -> bool {
        if self.single_threaded {
            return false;
        }
        match self.mode {
            ExecutionMode::Sequential => false,
            ExecutionMode::Parallel => true,
            ExecutionMode::Auto => n_items >= self.min_parallel_size,
        }
    }

    /// 在调度器的线程池内执行
    pub fn install<R, OP>(&self, op: OP) -> R
    where
        OP: FnOnce() -> R + Send,
        R: Send,
    {
        match &self.pool {
            Some(pool) => pool.install(op),
            None => op(),
        }
    }

    /// 按下标映射 `0..n`
    pub fn map_indexed<T, F>(&self, n: usize, f: F) -> Vec<T>
    where
        T: Send,
        F: Fn(usize) -> T + Sync + Send,
    {
        if self.should_parallelize(n) {
            self.install(|| (0..n).into_par_iter().map(&f).collect())
        } else {
            (0..n).map(f).collect()
        }
    }

    /// 按下标映射 `0..n`，任一工作项出错即返回错误
    pub fn try_map_indexed<T, F>(&self, n: usize, f: F) -> PgResult<Vec<T>>
    where
        T: Send,
        F: Fn(usize) -> PgResult<T> + Sync + Send,
    {
        if self.should_parallelize(n) {
            self.install(|| (0..n).into_par_iter().map(&f).collect())
        } else {
            (0..n).map(f).collect()
        }
    }

    /// 记录一次调用
    pub fn record(&mut self, n_items: usize, is_parallel: bool, duration: Duration) {
        self.metrics.record(n_items, is_parallel, duration);
    }

    /// 调度指标
    pub fn metrics(&self) -> &SchedulerMetrics {
        &self.metrics
    }
}
