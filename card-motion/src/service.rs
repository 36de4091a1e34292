//! # Service 模块
//!
//! 服务页的选中状态：当前选中的服务、是否正在播放过渡，以及进入详情前的路由。
//!
//! 与 [`crate::PhaseCoordinator`] 配合使用：视图层在详情页返回时
//! 读取 `previous_route` 决定回到哪里。

use serde::{Deserialize, Serialize};

/// 默认的返回路由
const DEFAULT_ROUTE: &str = "/";

/// 服务选中状态
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceSelection {
    /// 当前选中的服务 slug
    pub selected_slug: Option<String>,
    /// 是否正在播放过渡
    pub is_animating: bool,
    /// 进入详情前的路由
    pub previous_route: Option<String>,
}

impl ServiceSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// 选中服务
    ///
    /// `previous_route` 为空时记为 `/`。
    pub fn select_service(&mut self, slug: impl Into<String>, previous_route: Option<&str>) {
        self.selected_slug = Some(slug.into());
        self.previous_route = Some(previous_route.unwrap_or(DEFAULT_ROUTE).to_string());
    }

    /// 清除选中（保留返回路由）
    pub fn clear_selection(&mut self) {
        self.selected_slug = None;
    }

    pub fn set_animating(&mut self, is_animating: bool) {
        self.is_animating = is_animating;
    }

    /// 返回路由，未记录时为 `/`
    pub fn return_route(&self) -> &str {
        self.previous_route.as_deref().unwrap_or(DEFAULT_ROUTE)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
