//! # Timeline 模块
//!
//! 选择/取消选择过渡的固定时间轴配置。
//!
//! ## 默认时间轴
//!
//! ```text
//! select_card:    +0 Positioning  +150 Exiting  +250 Repositioning  +900 Revealing  +1000 Complete
//! deselect_card:  +800 回到 Idle（清空选中与卡片状态）
//! ```
//!
//! 所有偏移量都相对于操作调用时刻，而不是相对于上一阶段。

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

use crate::error::ConfigError;
use crate::phase::Phase;

/// 时间轴配置（毫秒）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineConfig {
    /// 每相隔一张卡片增加的离场延迟
    #[serde(default = "default_stagger_step_ms")]
    pub stagger_step_ms: u64,

    /// 进入 Positioning 的偏移
    #[serde(default = "default_positioning_ms")]
    pub positioning_ms: u64,

    /// 进入 Exiting 的偏移
    #[serde(default = "default_exiting_ms")]
    pub exiting_ms: u64,

    /// 进入 Repositioning 的偏移
    #[serde(default = "default_repositioning_ms")]
    pub repositioning_ms: u64,

    /// 进入 Revealing 的偏移
    #[serde(default = "default_revealing_ms")]
    pub revealing_ms: u64,

    /// 进入 Complete 的偏移，同时也是选择过渡的总时长
    #[serde(default = "default_complete_ms")]
    pub complete_ms: u64,

    /// 取消选择后回到 Idle 的偏移
    #[serde(default = "default_deselect_ms")]
    pub deselect_ms: u64,
}

// 默认值函数
fn default_stagger_step_ms() -> u64 {
    50
}

fn default_positioning_ms() -> u64 {
    0
}

fn default_exiting_ms() -> u64 {
    150
}

fn default_repositioning_ms() -> u64 {
    250
}

fn default_revealing_ms() -> u64 {
    900
}

fn default_complete_ms() -> u64 {
    1000
}

fn default_deselect_ms() -> u64 {
    800
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            stagger_step_ms: default_stagger_step_ms(),
            positioning_ms: default_positioning_ms(),
            exiting_ms: default_exiting_ms(),
            repositioning_ms: default_repositioning_ms(),
            revealing_ms: default_revealing_ms(),
            complete_ms: default_complete_ms(),
            deselect_ms: default_deselect_ms(),
        }
    }
}

impl TimelineConfig {
    /// 加载配置文件
    ///
    /// 文件不存在时返回默认配置并打印警告；读取或解析失败返回错误。
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            warn!(path = %path.display(), "时间轴配置不存在，使用默认配置");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        let config = Self::from_json(&content)?;
        info!(path = %path.display(), "时间轴配置加载成功");
        Ok(config)
    }

    /// 从 JSON 文本解析并验证
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// 保存配置到文件
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json =
            serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))?;
        fs::write(path, json).map_err(|e| ConfigError::Io(e.to_string()))
    }

    /// 验证配置有效性
    ///
    /// 选择时间轴的各阶段偏移必须单调不减。
    pub fn validate(&self) -> Result<(), ConfigError> {
        let offsets = [
            ("positioning_ms", self.positioning_ms),
            ("exiting_ms", self.exiting_ms),
            ("repositioning_ms", self.repositioning_ms),
            ("revealing_ms", self.revealing_ms),
            ("complete_ms", self.complete_ms),
        ];

        for pair in offsets.windows(2) {
            let (prev_name, prev) = pair[0];
            let (name, value) = pair[1];
            if value < prev {
                return Err(ConfigError::Invalid(format!(
                    "{name} ({value}) 不能早于 {prev_name} ({prev})"
                )));
            }
        }

        Ok(())
    }

    /// 离场延迟步长
    pub fn stagger_step(&self) -> Duration {
        Duration::from_millis(self.stagger_step_ms)
    }

    /// 选择过渡的阶段序列（偏移, 阶段）
    pub fn selection_steps(&self) -> [(Duration, Phase); 5] {
        [
            (Duration::from_millis(self.positioning_ms), Phase::Positioning),
            (Duration::from_millis(self.exiting_ms), Phase::Exiting),
            (Duration::from_millis(self.repositioning_ms), Phase::Repositioning),
            (Duration::from_millis(self.revealing_ms), Phase::Revealing),
            (Duration::from_millis(self.complete_ms), Phase::Complete),
        ]
    }

    /// 选择过渡总时长
    pub fn selection_span(&self) -> Duration {
        Duration::from_millis(self.complete_ms)
    }

    /// 取消选择过渡总时长
    pub fn deselection_span(&self) -> Duration {
        Duration::from_millis(self.deselect_ms)
    }
}
