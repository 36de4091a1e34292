//! # Scheduler 模块
//!
//! 单线程延迟动作队列。
//!
//! 队列不读取真实时间：宿主通过协调器的 `advance(dt)` 推进时钟，
//! 队列按到期时间依次弹出动作。同一时刻到期的动作按登记顺序弹出。
//!
//! 每个动作都带有登记时的 generation。新过渡开始时调用方通过
//! [`TimerQueue::cancel_stale`] 移除旧 generation 的动作，队列长度因此只取决于
//! 当前过渡登记的动作数，不随连续操作的次数增长。

use std::collections::VecDeque;
use std::time::Duration;

/// 已登记的延迟动作
#[derive(Debug, Clone, PartialEq)]
pub struct Scheduled<A> {
    /// 到期时刻（队列时钟）
    pub due: Duration,
    /// 登记时的 generation
    pub generation: u64,
    /// 动作内容
    pub action: A,
}

/// 延迟动作队列
#[derive(Debug, Clone)]
pub struct TimerQueue<A> {
    /// 当前时钟
    now: Duration,
    /// 按到期时间排序的待执行动作
    pending: VecDeque<Scheduled<A>>,
}

impl<A> Default for TimerQueue<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> TimerQueue<A> {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            pending: VecDeque::new(),
        }
    }

    /// 当前时钟
    pub fn now(&self) -> Duration {
        self.now
    }

    /// 登记一个在 `delay` 之后到期的动作
    pub fn schedule(&mut self, delay: Duration, generation: u64, action: A) {
        let due = self.now.saturating_add(delay);
        // 插在所有不晚于 due 的动作之后，保持同一时刻的登记顺序
        let at = self.pending.partition_point(|entry| entry.due <= due);
        self.pending.insert(
            at,
            Scheduled {
                due,
                generation,
                action,
            },
        );
    }

    /// 弹出最早一个在 `deadline` 之前（含）到期的动作，并把时钟推进到它的到期时刻
    pub fn pop_due(&mut self, deadline: Duration) -> Option<Scheduled<A>> {
        if self.pending.front()?.due > deadline {
            return None;
        }
        let entry = self.pending.pop_front()?;
        self.now = self.now.max(entry.due);
        Some(entry)
    }

    /// 移除所有不属于 `generation` 的动作，返回移除数量
    pub fn cancel_stale(&mut self, generation: u64) -> usize {
        let before = self.pending.len();
        self.pending.retain(|entry| entry.generation == generation);
        before - self.pending.len()
    }

    /// 把时钟推进到 `deadline`（不会回退）
    pub fn settle(&mut self, deadline: Duration) {
        self.now = self.now.max(deadline);
    }

    /// 指定 generation 下一个动作距当前时钟的时长
    pub fn next_due(&self, generation: u64) -> Option<Duration> {
        self.pending
            .iter()
            .find(|entry| entry.generation == generation)
            .map(|entry| entry.due.saturating_sub(self.now))
    }

    /// 待执行动作数量
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
