//! # Card 模块
//!
//! 单卡动画状态与卡片状态映射。
//!
//! ## 设计说明
//!
//! - `CardStates` 只能通过 [`CardStates::for_selection`] / [`CardStates::for_deselection`] 构建，
//!   构建时校验卡片集合，保证映射的键集合与传入集合完全一致
//! - 卡片保持传入顺序，方便视图层按网格顺序遍历
//! - 离场延迟按与选中卡片的下标距离线性增长，形成由近及远的涟漪效果

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::error::{MotionError, MotionResult};
use crate::phase::CardSubPhase;

/// 单张卡片的动画状态
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardAnimationState {
    /// 卡片标识符（与页面数据中的 slug 一致）
    pub identifier: String,
    /// 子阶段
    pub sub_phase: CardSubPhase,
    /// 动画进度 (0.0 - 1.0)，同一次过渡内单调不减
    pub progress: f32,
    /// 离场/入场延迟
    #[serde(with = "duration_ms")]
    pub exit_delay: Duration,
}

impl CardAnimationState {
    fn new(identifier: &str, sub_phase: CardSubPhase, exit_delay: Duration) -> Self {
        Self {
            identifier: identifier.to_string(),
            sub_phase,
            progress: 0.0,
            exit_delay,
        }
    }

    /// 推进进度
    ///
    /// 卡片从 `exit_delay` 开始线性推进，到 `span` 时到达 1.0。
    /// 延迟不短于 `span` 的卡片在 `span` 处直接完成。
    fn advance(&mut self, elapsed: Duration, span: Duration) {
        let target = if elapsed >= span {
            1.0
        } else if elapsed <= self.exit_delay {
            0.0
        } else {
            let done = (elapsed - self.exit_delay).as_secs_f32();
            let total = (span - self.exit_delay).as_secs_f32();
            (done / total).clamp(0.0, 1.0)
        };

        self.progress = self.progress.max(target);

        if self.sub_phase == CardSubPhase::Exiting && self.progress >= 1.0 {
            self.sub_phase = CardSubPhase::Hidden;
        }
    }
}

/// 卡片状态映射
///
/// Key 集合始终等于最近一次 select/deselect 传入的卡片集合，直到回到 idle 时被清空。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CardStates {
    /// 按传入顺序排列的卡片状态
    cards: Vec<CardAnimationState>,
    /// identifier -> cards 下标
    index: HashMap<String, usize>,
}

impl CardStates {
    /// 创建空映射
    pub fn new() -> Self {
        Self::default()
    }

    /// 构建选择过渡的卡片状态
    ///
    /// 选中卡片为 `Moving`、延迟 0；其余卡片为 `Exiting`，延迟为 `|下标差| × step`。
    pub fn for_selection<S: AsRef<str>>(
        selected: &str,
        all: &[S],
        step: Duration,
    ) -> MotionResult<Self> {
        Self::build(selected, all, step, CardSubPhase::Exiting)
    }

    /// 构建取消选择过渡的卡片状态
    ///
    /// 与选择对称，其余卡片为 `Entering`。
    pub fn for_deselection<S: AsRef<str>>(
        selected: &str,
        all: &[S],
        step: Duration,
    ) -> MotionResult<Self> {
        Self::build(selected, all, step, CardSubPhase::Entering)
    }

    fn build<S: AsRef<str>>(
        selected: &str,
        all: &[S],
        step: Duration,
        others: CardSubPhase,
    ) -> MotionResult<Self> {
        let mut index = HashMap::with_capacity(all.len());
        for (i, id) in all.iter().enumerate() {
            if let Some(first) = index.insert(id.as_ref().to_string(), i) {
                return Err(MotionError::DuplicateCard {
                    identifier: id.as_ref().to_string(),
                    first,
                    second: i,
                });
            }
        }

        let selected_index = *index.get(selected).ok_or_else(|| MotionError::UnknownCard {
            identifier: selected.to_string(),
        })?;

        let cards = all
            .iter()
            .enumerate()
            .map(|(i, id)| {
                if i == selected_index {
                    CardAnimationState::new(id.as_ref(), CardSubPhase::Moving, Duration::ZERO)
                } else {
                    let distance = u32::try_from(i.abs_diff(selected_index)).unwrap_or(u32::MAX);
                    CardAnimationState::new(id.as_ref(), others, step.saturating_mul(distance))
                }
            })
            .collect();

        Ok(Self { cards, index })
    }

    /// 获取指定卡片的状态
    pub fn get(&self, identifier: &str) -> Option<&CardAnimationState> {
        self.index.get(identifier).map(|&i| &self.cards[i])
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.index.contains_key(identifier)
    }

    /// 按传入顺序遍历
    pub fn iter(&self) -> impl Iterator<Item = &CardAnimationState> {
        self.cards.iter()
    }

    /// 按传入顺序返回所有标识符
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.cards.iter().map(|card| card.identifier.as_str())
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// 清空映射
    pub fn clear(&mut self) {
        self.cards.clear();
        self.index.clear();
    }

    /// 按过渡已经过的时间推进所有卡片进度
    pub(crate) fn advance_progress(&mut self, elapsed: Duration, span: Duration) {
        for card in &mut self.cards {
            card.advance(elapsed, span);
        }
    }

    /// 导出为有序列表（用于快照）
    pub fn to_vec(&self) -> Vec<CardAnimationState> {
        self.cards.clone()
    }
}

/// `Duration` 以毫秒整数序列化
pub(crate) mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        let millis = u64::try_from(value.as_millis()).unwrap_or(u64::MAX);
        serializer.serialize_u64(millis)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
