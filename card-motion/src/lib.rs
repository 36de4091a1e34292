//! # Card Motion
//!
//! 卡片选择动画的阶段协调库。
//!
//! ## 架构概述
//!
//! `card-motion` 是纯逻辑核心，不依赖任何 IO、渲染引擎或真实时钟。
//! 它负责把"选中卡片 → 移动 → 展开详情"及其逆过程编排成一条固定时间轴，
//! 视图层只需读取状态并映射为 class / transform：
//!
//! ```text
//! View                          Coordinator
//!   │                              │
//!   │──── select_card / deselect_card / reset ──►│
//!   │──── advance(dt) ────────────►│
//!   │◄─── phase() / card_states() / drain_events() ──│
//!   │                              │
//! ```
//!
//! ## 核心类型
//!
//! - [`PhaseCoordinator`]：阶段协调器，Phase / Selection / CardStates 的唯一写入方
//! - [`Phase`]：全局动画阶段
//! - [`CardAnimationState`]：单卡动画状态
//! - [`TimelineConfig`]：时间轴配置
//!
//! ## 使用示例
//!
//! ```ignore
//! use card_motion::{Phase, PhaseCoordinator};
//!
//! let cards = ["web", "brand", "seo"];
//! let mut coordinator = PhaseCoordinator::new();
//! coordinator.select_card("brand", &cards)?;
//!
//! // 每帧推进
//! while coordinator.advance(frame_time) {
//!     for event in coordinator.drain_events() {
//!         view.apply(event);
//!     }
//! }
//! assert_eq!(coordinator.phase(), Phase::Complete);
//! ```
//!
//! ## 模块结构
//!
//! - [`phase`]：Phase 与 CardSubPhase 定义
//! - [`card`]：单卡状态与卡片状态映射
//! - [`timeline`]：时间轴配置
//! - [`scheduler`]：延迟动作队列
//! - [`coordinator`]：阶段协调器
//! - [`service`]：服务页选中状态
//! - [`contact`]：联系表单校验与响应
//! - [`error`]：错误类型定义

pub mod card;
pub mod contact;
pub mod coordinator;
pub mod error;
pub mod phase;
pub mod scheduler;
pub mod service;
pub mod timeline;

// 重导出核心类型
pub use card::{CardAnimationState, CardStates};
pub use contact::{
    ContactEmail, ContactRequest, ContactResponse, ContactSubmission, handle_submission,
};
pub use coordinator::{CoordinatorEvent, CoordinatorSnapshot, PhaseCoordinator};
pub use error::{ConfigError, ContactError, MotionError, MotionResult};
pub use phase::{CardSubPhase, Phase};
pub use scheduler::TimerQueue;
pub use service::ServiceSelection;
pub use timeline::TimelineConfig;
