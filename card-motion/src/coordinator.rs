//! # Coordinator 模块
//!
//! 卡片选择动画的阶段协调器。
//!
//! ## 执行模型
//!
//! ```text
//! select_card / deselect_card / reset   -> 立即写入 Phase / Selection / CardStates
//!                                          并登记本次过渡的延迟动作
//! advance(dt)                           -> 推进时钟，依次执行到期动作，更新卡片进度
//! ```
//!
//! 协调器是 Phase、Selection、CardStates 的唯一写入方，外部只能读取或消费事件。
//!
//! ## 取代语义
//!
//! 每次 select/deselect/reset 都会开启新的 generation，并立即从队列中移除旧
//! generation 尚未到期的动作，旧过渡的阶段写入不会落到新过渡上。

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, trace, warn};

use crate::card::{CardAnimationState, CardStates};
use crate::error::MotionResult;
use crate::phase::Phase;
use crate::scheduler::TimerQueue;
use crate::timeline::TimelineConfig;

/// 延迟动作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimelineAction {
    /// 写入阶段
    SetPhase(Phase),
    /// 取消选择结束：清空选中与卡片状态，回到 Idle
    Settle,
}

/// 过渡类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TransitionKind {
    Selection,
    Deselection,
}

/// 正在进行的过渡
#[derive(Debug, Clone, Copy)]
struct ActiveTransition {
    kind: TransitionKind,
    /// 过渡开始时刻（队列时钟）
    started_at: Duration,
    /// 过渡总时长，卡片进度在此时到达 1.0
    span: Duration,
}

/// 协调器事件
///
/// 视图层通过 [`PhaseCoordinator::drain_events`] 订阅状态变化。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CoordinatorEvent {
    /// 阶段变化
    PhaseChanged { from: Phase, to: Phase },
    /// 选中卡片变化
    SelectionChanged { selection: Option<String> },
    /// 卡片状态整体替换
    CardsReplaced { count: usize },
    /// 卡片状态被清空
    CardsCleared,
    /// 新 generation 开始时取消了旧过渡尚未到期的延迟动作
    StaleActionsCancelled { generation: u64, count: usize },
}

/// 可序列化的协调器状态快照
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinatorSnapshot {
    pub phase: Phase,
    pub selection: Option<String>,
    pub cards: Vec<CardAnimationState>,
    /// 当前过渡已经过的时间，回到 Idle 后为 0
    #[serde(with = "crate::card::duration_ms")]
    pub elapsed: Duration,
}

/// 动画阶段协调器
#[derive(Debug)]
pub struct PhaseCoordinator {
    /// 时间轴配置
    config: TimelineConfig,
    /// 当前阶段
    phase: Phase,
    /// 当前选中卡片
    selection: Option<String>,
    /// 卡片状态映射
    cards: CardStates,
    /// 延迟动作队列
    timers: TimerQueue<TimelineAction>,
    /// 当前 generation
    generation: u64,
    /// 正在推进卡片进度的过渡
    active: Option<ActiveTransition>,
    /// 最近一次 select/deselect 的开始时刻，回到 Idle 时清除
    transition_start: Option<Duration>,
    /// 待消费的事件
    events: Vec<CoordinatorEvent>,
}

impl Default for PhaseCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl PhaseCoordinator {
    /// 使用默认时间轴创建协调器
    pub fn new() -> Self {
        Self::with_config(TimelineConfig::default())
    }

    /// 使用指定时间轴创建协调器
    pub fn with_config(config: TimelineConfig) -> Self {
        Self {
            config,
            phase: Phase::Idle,
            selection: None,
            cards: CardStates::new(),
            timers: TimerQueue::new(),
            generation: 0,
            active: None,
            transition_start: None,
            events: Vec::new(),
        }
    }

    // ========== 操作 ==========

    /// 开始选择过渡
    ///
    /// `identifier` 必须出现在 `all` 中，且 `all` 不能有重复项，否则返回错误且状态不变。
    pub fn select_card<S: AsRef<str>>(
        &mut self,
        identifier: &str,
        all: &[S],
    ) -> MotionResult<()> {
        let cards = CardStates::for_selection(identifier, all, self.config.stagger_step())
            .inspect_err(|e| warn!(error = %e, "拒绝选择过渡"))?;

        let generation = self.next_generation();
        debug!(card = identifier, cards = cards.len(), generation, "开始选择过渡");

        self.set_selection(Some(identifier.to_string()));
        self.set_phase(Phase::Selecting);
        self.replace_cards(cards);
        self.transition_start = Some(self.timers.now());
        self.active = Some(ActiveTransition {
            kind: TransitionKind::Selection,
            started_at: self.timers.now(),
            span: self.config.selection_span(),
        });

        for (delay, phase) in self.config.selection_steps() {
            self.timers.schedule(delay, generation, TimelineAction::SetPhase(phase));
        }

        Ok(())
    }

    /// 开始取消选择过渡（返回网格）
    ///
    /// 选中卡片在过渡结束时才被清除。
    pub fn deselect_card<S: AsRef<str>>(
        &mut self,
        identifier: &str,
        all: &[S],
    ) -> MotionResult<()> {
        let cards = CardStates::for_deselection(identifier, all, self.config.stagger_step())
            .inspect_err(|e| warn!(error = %e, "拒绝取消选择过渡"))?;

        let generation = self.next_generation();
        debug!(card = identifier, cards = cards.len(), generation, "开始取消选择过渡");

        self.set_phase(Phase::Deselecting);
        self.replace_cards(cards);
        self.transition_start = Some(self.timers.now());
        self.active = Some(ActiveTransition {
            kind: TransitionKind::Deselection,
            started_at: self.timers.now(),
            span: self.config.deselection_span(),
        });

        self.timers.schedule(
            self.config.deselection_span(),
            generation,
            TimelineAction::Settle,
        );

        Ok(())
    }

    /// 立即回到 Idle
    ///
    /// 同时使所有未到期的延迟动作失效。
    pub fn reset(&mut self) {
        self.next_generation();
        self.settle();
    }

    /// 推进时钟
    ///
    /// 依次执行 `dt` 内到期的动作并更新卡片进度。
    ///
    /// # 返回
    /// - `true`: 过渡仍在进行中
    /// - `false`: 处于 Idle 或 Complete
    pub fn advance(&mut self, dt: Duration) -> bool {
        let deadline = self.timers.now().saturating_add(dt);

        while let Some(entry) = self.timers.pop_due(deadline) {
            self.update_progress();

            if entry.generation != self.generation {
                trace!(
                    generation = entry.generation,
                    current = self.generation,
                    "跳过已被取代的延迟动作"
                );
                continue;
            }

            match entry.action {
                TimelineAction::SetPhase(phase) => self.set_phase(phase),
                TimelineAction::Settle => {
                    debug!("取消选择过渡完成");
                    self.settle();
                }
            }
        }

        self.timers.settle(deadline);
        self.update_progress();

        self.phase.is_animating()
    }

    // ========== 查询 ==========

    /// 当前阶段
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// 当前选中卡片
    pub fn selection(&self) -> Option<&str> {
        self.selection.as_deref()
    }

    /// 卡片状态映射
    pub fn card_states(&self) -> &CardStates {
        &self.cards
    }

    /// 指定卡片的状态
    pub fn card_state(&self, identifier: &str) -> Option<&CardAnimationState> {
        self.cards.get(identifier)
    }

    /// 是否正在过渡中
    pub fn is_animating(&self) -> bool {
        self.phase.is_animating()
    }

    /// 协调器时钟
    pub fn now(&self) -> Duration {
        self.timers.now()
    }

    /// 距离下一个有效延迟动作的时长
    ///
    /// 宿主可以据此休眠，而不必逐帧调用 `advance`。
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.next_due(self.generation)
    }

    /// 队列中等待执行的延迟动作数量
    pub fn pending_actions(&self) -> usize {
        self.timers.len()
    }

    /// 当前过渡已经过的时间，没有过渡时为 0
    pub fn elapsed(&self) -> Duration {
        self.transition_start
            .map_or(Duration::ZERO, |start| self.timers.now().saturating_sub(start))
    }

    /// 时间轴配置
    pub fn config(&self) -> &TimelineConfig {
        &self.config
    }

    /// 导出快照
    pub fn snapshot(&self) -> CoordinatorSnapshot {
        CoordinatorSnapshot {
            phase: self.phase,
            selection: self.selection.clone(),
            cards: self.cards.to_vec(),
            elapsed: self.elapsed(),
        }
    }

    /// 取出所有待消费的事件
    pub fn drain_events(&mut self) -> Vec<CoordinatorEvent> {
        std::mem::take(&mut self.events)
    }

    // ========== 内部 ==========

    /// 开启新 generation，并取消旧过渡剩余的延迟动作
    fn next_generation(&mut self) -> u64 {
        self.generation += 1;
        let count = self.timers.cancel_stale(self.generation);
        if count > 0 {
            debug!(generation = self.generation, count, "取消旧过渡的延迟动作");
            self.events.push(CoordinatorEvent::StaleActionsCancelled {
                generation: self.generation,
                count,
            });
        }
        self.generation
    }

    /// 清空选中与卡片状态，回到 Idle
    fn settle(&mut self) {
        self.active = None;
        self.transition_start = None;
        self.set_selection(None);
        self.set_phase(Phase::Idle);
        if !self.cards.is_empty() {
            self.cards.clear();
            self.events.push(CoordinatorEvent::CardsCleared);
        }
    }

    fn set_phase(&mut self, phase: Phase) {
        if self.phase == phase {
            return;
        }
        debug!(from = %self.phase, to = %phase, "阶段切换");
        self.events.push(CoordinatorEvent::PhaseChanged {
            from: self.phase,
            to: phase,
        });
        self.phase = phase;
    }

    fn set_selection(&mut self, selection: Option<String>) {
        if self.selection == selection {
            return;
        }
        self.selection = selection;
        self.events.push(CoordinatorEvent::SelectionChanged {
            selection: self.selection.clone(),
        });
    }

    fn replace_cards(&mut self, cards: CardStates) {
        self.events.push(CoordinatorEvent::CardsReplaced { count: cards.len() });
        self.cards = cards;
    }

    fn update_progress(&mut self) {
        if let Some(active) = self.active {
            let elapsed = self.timers.now().saturating_sub(active.started_at);
            self.cards.advance_progress(elapsed, active.span);
            if active.kind == TransitionKind::Selection && elapsed >= active.span {
                // 卡片进度已全部到达 1.0
                self.active = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phase::CardSubPhase;

    const CARDS: [&str; 4] = ["web", "brand", "seo", "support"];

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn test_select_immediate_state() {
        let mut coordinator = PhaseCoordinator::new();
        coordinator.select_card("brand", &CARDS).unwrap();

        assert_eq!(coordinator.phase(), Phase::Selecting);
        assert_eq!(coordinator.selection(), Some("brand"));
        assert_eq!(coordinator.card_states().len(), 4);

        let brand = coordinator.card_state("brand").unwrap();
        assert_eq!(brand.sub_phase, CardSubPhase::Moving);
        assert_eq!(brand.exit_delay, Duration::ZERO);

        assert_eq!(coordinator.card_state("web").unwrap().exit_delay, ms(50));
        assert_eq!(coordinator.card_state("seo").unwrap().exit_delay, ms(50));
        assert_eq!(coordinator.card_state("support").unwrap().exit_delay, ms(100));
    }

    #[test]
    fn test_selection_timeline() {
        let mut coordinator = PhaseCoordinator::new();
        coordinator.select_card("web", &CARDS).unwrap();

        coordinator.advance(Duration::ZERO);
        assert_eq!(coordinator.phase(), Phase::Positioning);

        coordinator.advance(ms(149));
        assert_eq!(coordinator.phase(), Phase::Positioning);
        coordinator.advance(ms(1));
        assert_eq!(coordinator.phase(), Phase::Exiting);

        coordinator.advance(ms(100));
        assert_eq!(coordinator.phase(), Phase::Repositioning);

        coordinator.advance(ms(650));
        assert_eq!(coordinator.phase(), Phase::Revealing);

        assert!(!coordinator.advance(ms(100)));
        assert_eq!(coordinator.phase(), Phase::Complete);
        assert_eq!(coordinator.selection(), Some("web"));
    }

    #[test]
    fn test_deselect_settles_to_idle() {
        let mut coordinator = PhaseCoordinator::new();
        coordinator.select_card("seo", &CARDS).unwrap();
        coordinator.advance(ms(1000));

        coordinator.deselect_card("seo", &CARDS).unwrap();
        assert_eq!(coordinator.phase(), Phase::Deselecting);
        assert_eq!(coordinator.selection(), Some("seo"));
        assert_eq!(
            coordinator.card_state("web").unwrap().sub_phase,
            CardSubPhase::Entering
        );

        coordinator.advance(ms(799));
        assert_eq!(coordinator.phase(), Phase::Deselecting);

        coordinator.advance(ms(1));
        assert_eq!(coordinator.phase(), Phase::Idle);
        assert_eq!(coordinator.selection(), None);
        assert!(coordinator.card_states().is_empty());
    }

    #[test]
    fn test_reset_idempotent() {
        let mut coordinator = PhaseCoordinator::new();
        coordinator.select_card("seo", &CARDS).unwrap();

        coordinator.reset();
        let once = coordinator.snapshot();
        coordinator.drain_events();

        coordinator.reset();
        assert_eq!(coordinator.snapshot(), once);
        assert!(coordinator.drain_events().is_empty());
        assert_eq!(once.phase, Phase::Idle);
        assert_eq!(once.selection, None);
        assert!(once.cards.is_empty());
    }

    #[test]
    fn test_reset_cancels_pending_actions() {
        let mut coordinator = PhaseCoordinator::new();
        coordinator.select_card("seo", &CARDS).unwrap();
        coordinator.drain_events();
        coordinator.reset();
        assert_eq!(coordinator.next_deadline(), None);
        assert_eq!(coordinator.pending_actions(), 0);
        assert_eq!(
            coordinator.drain_events()[0],
            CoordinatorEvent::StaleActionsCancelled {
                generation: 2,
                count: 5
            }
        );

        assert!(!coordinator.advance(ms(2000)));
        assert_eq!(coordinator.phase(), Phase::Idle);
    }

    #[test]
    fn test_rapid_reselection_keeps_queue_bounded() {
        let mut coordinator = PhaseCoordinator::new();
        for _ in 0..10 {
            coordinator.select_card("web", &CARDS).unwrap();
            coordinator.select_card("seo", &CARDS).unwrap();
        }
        // 只剩最后一次选择的 5 个阶段动作
        assert_eq!(coordinator.pending_actions(), 5);

        coordinator.deselect_card("seo", &CARDS).unwrap();
        assert_eq!(coordinator.pending_actions(), 1);

        let cancelled: Vec<usize> = coordinator
            .drain_events()
            .into_iter()
            .filter_map(|event| match event {
                CoordinatorEvent::StaleActionsCancelled { count, .. } => Some(count),
                _ => None,
            })
            .collect();
        assert_eq!(cancelled.len(), 20);
        assert!(cancelled.iter().all(|&count| count == 5));
    }

    #[test]
    fn test_elapsed_tracks_current_transition() {
        let mut coordinator = PhaseCoordinator::new();
        assert_eq!(coordinator.elapsed(), Duration::ZERO);

        coordinator.select_card("web", &CARDS).unwrap();
        coordinator.advance(ms(300));
        assert_eq!(coordinator.snapshot().elapsed, ms(300));

        // 新过渡从 0 重新计时
        coordinator.deselect_card("web", &CARDS).unwrap();
        assert_eq!(coordinator.elapsed(), Duration::ZERO);
        coordinator.advance(ms(200));
        assert_eq!(coordinator.elapsed(), ms(200));

        coordinator.advance(ms(600));
        assert_eq!(coordinator.phase(), Phase::Idle);
        assert_eq!(coordinator.snapshot().elapsed, Duration::ZERO);
    }

    #[test]
    fn test_rejected_selection_leaves_state() {
        let mut coordinator = PhaseCoordinator::new();
        let before = coordinator.snapshot();

        assert!(coordinator.select_card("missing", &CARDS).is_err());
        assert!(coordinator.select_card("web", &["web", "web"]).is_err());
        assert!(coordinator.deselect_card("missing", &CARDS).is_err());

        assert_eq!(coordinator.snapshot(), before);
        assert!(coordinator.drain_events().is_empty());
        assert_eq!(coordinator.next_deadline(), None);
    }

    #[test]
    fn test_events_follow_state_changes() {
        let mut coordinator = PhaseCoordinator::new();
        coordinator.select_card("web", &CARDS).unwrap();

        assert_eq!(
            coordinator.drain_events(),
            vec![
                CoordinatorEvent::SelectionChanged {
                    selection: Some("web".to_string())
                },
                CoordinatorEvent::PhaseChanged {
                    from: Phase::Idle,
                    to: Phase::Selecting
                },
                CoordinatorEvent::CardsReplaced { count: 4 },
            ]
        );

        coordinator.advance(Duration::ZERO);
        assert_eq!(
            coordinator.drain_events(),
            vec![CoordinatorEvent::PhaseChanged {
                from: Phase::Selecting,
                to: Phase::Positioning
            }]
        );
    }

    #[test]
    fn test_next_deadline() {
        let mut coordinator = PhaseCoordinator::new();
        assert_eq!(coordinator.next_deadline(), None);

        coordinator.select_card("web", &CARDS).unwrap();
        assert_eq!(coordinator.next_deadline(), Some(Duration::ZERO));

        coordinator.advance(ms(200));
        assert_eq!(coordinator.next_deadline(), Some(ms(50)));
    }

    #[test]
    fn test_custom_config() {
        let config = TimelineConfig {
            stagger_step_ms: 20,
            deselect_ms: 300,
            ..TimelineConfig::default()
        };
        let mut coordinator = PhaseCoordinator::with_config(config);
        coordinator.deselect_card("web", &CARDS).unwrap();

        assert_eq!(coordinator.card_state("support").unwrap().exit_delay, ms(60));
        coordinator.advance(ms(300));
        assert_eq!(coordinator.phase(), Phase::Idle);
    }
}
