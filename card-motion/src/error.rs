//! # Error 模块
//!
//! 定义 card-motion 中使用的错误类型。

use thiserror::Error;

/// 卡片动画错误
///
/// 调用方传入的卡片集合与被选卡片不一致时返回，此时协调器状态保持不变。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MotionError {
    /// 被选卡片不在卡片集合中
    #[error("卡片 '{identifier}' 不在当前卡片集合中")]
    UnknownCard { identifier: String },

    /// 卡片集合中存在重复标识符
    #[error("卡片集合中存在重复标识符 '{identifier}'（位置 {first} 与 {second}）")]
    DuplicateCard {
        identifier: String,
        first: usize,
        second: usize,
    },
}

/// 时间轴配置错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// 读取配置文件失败
    #[error("配置 IO 错误: {0}")]
    Io(String),

    /// 配置文件格式错误
    #[error("配置解析失败: {0}")]
    Parse(String),

    /// 配置值不合法
    #[error("配置验证失败: {0}")]
    Invalid(String),
}

/// 联系表单错误
///
/// 每个变体对应一个 HTTP 状态码与一条返回给客户端的错误信息。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContactError {
    /// 必填字段缺失
    #[error("Name, email, and message are required")]
    MissingFields,

    /// 邮箱格式错误
    #[error("Invalid email address")]
    InvalidEmail,

    /// 邮件投递失败
    #[error("Failed to send email. Please try again later.")]
    Delivery { reason: String },
}

impl ContactError {
    /// 对应的 HTTP 状态码
    pub fn status(&self) -> u16 {
        match self {
            Self::MissingFields | Self::InvalidEmail => 400,
            Self::Delivery { .. } => 500,
        }
    }
}

/// Result 类型别名
pub type MotionResult<T> = Result<T, MotionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contact_error_status() {
        assert_eq!(ContactError::MissingFields.status(), 400);
        assert_eq!(ContactError::InvalidEmail.status(), 400);
        assert_eq!(
            ContactError::Delivery {
                reason: "timeout".to_string()
            }
            .status(),
            500
        );
    }

    #[test]
    fn test_motion_error_display() {
        let err = MotionError::UnknownCard {
            identifier: "seo".to_string(),
        };
        assert_eq!(err.to_string(), "卡片 'seo' 不在当前卡片集合中");
    }
}
