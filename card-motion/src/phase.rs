//! # Phase 模块
//!
//! 定义卡片选择动画的全局阶段与单卡子阶段。
//!
//! ## 阶段转换
//!
//! ```text
//! 选择：Idle -> Selecting -> Positioning -> Exiting -> Repositioning -> Revealing -> Complete
//! 取消：<任意> -> Deselecting -> Idle
//! 重置：<任意> -> Idle
//! ```
//!
//! 阶段之间没有合法性校验，任何操作都可以覆盖当前阶段。

use serde::{Deserialize, Serialize};
use std::fmt;

/// 全局动画阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// 无动画
    #[default]
    Idle,
    /// 卡片被点击，过渡开始
    Selecting,
    /// 位置计算完成
    Positioning,
    /// 其余卡片离场
    Exiting,
    /// 选中卡片移动
    Repositioning,
    /// 详情内容进入
    Revealing,
    /// 动画完成
    Complete,
    /// 返回网格
    Deselecting,
}

impl Phase {
    /// 对应的小写名称，与视图层的 class 名一致
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Selecting => "selecting",
            Self::Positioning => "positioning",
            Self::Exiting => "exiting",
            Self::Repositioning => "repositioning",
            Self::Revealing => "revealing",
            Self::Complete => "complete",
            Self::Deselecting => "deselecting",
        }
    }

    /// 是否处于过渡中（`Idle` 与 `Complete` 是静止状态）
    pub fn is_animating(&self) -> bool {
        !matches!(self, Self::Idle | Self::Complete)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 单张卡片的子阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardSubPhase {
    Idle,
    /// 选中卡片（移动到详情位置或移回网格）
    Moving,
    /// 离场中
    Exiting,
    /// 已离场
    Hidden,
    /// 回到网格
    Entering,
}

impl CardSubPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Moving => "moving",
            Self::Exiting => "exiting",
            Self::Hidden => "hidden",
            Self::Entering => "entering",
        }
    }
}

impl fmt::Display for CardSubPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_is_animating() {
        assert!(!Phase::Idle.is_animating());
        assert!(!Phase::Complete.is_animating());
        assert!(Phase::Selecting.is_animating());
        assert!(Phase::Revealing.is_animating());
        assert!(Phase::Deselecting.is_animating());
    }

    #[test]
    fn test_phase_default_is_idle() {
        assert_eq!(Phase::default(), Phase::Idle);
    }

    #[test]
    fn test_phase_serde_names() {
        assert_eq!(
            serde_json::to_string(&Phase::Repositioning).unwrap(),
            "\"repositioning\""
        );
        let phase: Phase = serde_json::from_str("\"deselecting\"").unwrap();
        assert_eq!(phase, Phase::Deselecting);
        assert_eq!(Phase::Revealing.to_string(), "revealing");
    }

    #[test]
    fn test_sub_phase_serde_names() {
        assert_eq!(
            serde_json::to_string(&CardSubPhase::Hidden).unwrap(),
            "\"hidden\""
        );
        assert_eq!(CardSubPhase::Entering.to_string(), "entering");
    }
}
