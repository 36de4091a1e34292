//! # Contact 模块
//!
//! 联系表单接口的请求校验与响应格式。邮件投递由调用方注入，本模块不负责发送。
//!
//! 一次成功的提交会产生两封邮件：先投递给站点的通知邮件，再投递给提交者的确认邮件。
//! 通知邮件失败时返回 500；确认邮件的结果只记录日志，不影响响应。
//!
//! ## 响应约定
//!
//! ```text
//! 200 {"success": true, "message": "Email sent successfully"}
//! 400 {"error": "Name, email, and message are required"}
//! 400 {"error": "Invalid email address"}
//! 500 {"error": "Failed to send email. Please try again later."}
//! 500 {"error": "Internal server error. Please try again later."}   // 请求体无法解析
//! ```

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::error::ContactError;

const SUCCESS_MESSAGE: &str = "Email sent successfully";
const INTERNAL_ERROR: &str = "Internal server error. Please try again later.";
const CONFIRMATION_SUBJECT: &str = "Thank you for contacting Blue Frame Digital";

/// 联系表单请求体
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ContactRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// 校验通过的联系表单
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: String,
}

impl ContactRequest {
    /// 校验必填字段与邮箱格式
    pub fn validate(self) -> Result<ContactSubmission, ContactError> {
        let (Some(name), Some(email), Some(message)) = (
            non_empty(self.name),
            non_empty(self.email),
            non_empty(self.message),
        ) else {
            return Err(ContactError::MissingFields);
        };

        if !is_valid_email(&email) {
            return Err(ContactError::InvalidEmail);
        }

        Ok(ContactSubmission {
            name,
            email,
            phone: non_empty(self.phone),
            message,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

/// 邮箱格式检查：`local@domain.tld`
///
/// 不允许空白字符，恰好一个 `@`，域名部分含有前后都有字符的 `.`。
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

impl ContactSubmission {
    /// 通知邮件标题
    pub fn subject(&self) -> String {
        format!("New Contact Form Submission from {}", self.name)
    }

    /// 通知邮件纯文本正文
    ///
    /// 没有电话时电话行留空，正文中会多出一个空行。
    pub fn text_body(&self) -> String {
        let phone = self
            .phone
            .as_deref()
            .map(|phone| format!("Phone: {phone}"))
            .unwrap_or_default();
        [
            "New Contact Form Submission".to_string(),
            String::new(),
            format!("Name: {}", self.name),
            format!("Email: {}", self.email),
            phone,
            String::new(),
            "Message:".to_string(),
            self.message.clone(),
        ]
        .join("\n")
    }

    /// 确认邮件标题
    pub fn confirmation_subject(&self) -> &'static str {
        CONFIRMATION_SUBJECT
    }

    /// 确认邮件纯文本正文
    pub fn confirmation_text_body(&self) -> String {
        format!(
            "Thank you for reaching out!\n\n\
             Hi {},\n\n\
             We've received your message and will get back to you as soon as possible.\n\n\
             In the meantime, feel free to explore our services and learn more about how we can \
             help grow your construction business.\n\n\
             Best regards,\n\
             Blue Frame Digital",
            self.name
        )
    }

    /// 发给站点的通知邮件
    pub fn notification(&self) -> ContactEmail {
        ContactEmail::Notification {
            reply_to: self.email.clone(),
            subject: self.subject(),
            text: self.text_body(),
        }
    }

    /// 发给提交者的确认邮件
    pub fn confirmation(&self) -> ContactEmail {
        ContactEmail::Confirmation {
            to: self.email.clone(),
            subject: self.confirmation_subject().to_string(),
            text: self.confirmation_text_body(),
        }
    }
}

/// 交给投递方的一封邮件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactEmail {
    /// 通知站点，回复地址为提交者
    Notification {
        reply_to: String,
        subject: String,
        text: String,
    },
    /// 发给提交者的确认
    Confirmation {
        to: String,
        subject: String,
        text: String,
    },
}

impl ContactEmail {
    pub fn subject(&self) -> &str {
        match self {
            Self::Notification { subject, .. } | Self::Confirmation { subject, .. } => subject,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Self::Notification { text, .. } | Self::Confirmation { text, .. } => text,
        }
    }
}

/// 联系表单响应体
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ContactResponse {
    Success { success: bool, message: String },
    Failure { error: String },
}

impl ContactResponse {
    pub fn success() -> Self {
        Self::Success {
            success: true,
            message: SUCCESS_MESSAGE.to_string(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure {
            error: message.into(),
        }
    }
}

/// 处理一次联系表单提交
///
/// `deliver` 负责实际投递，每封邮件调用一次，返回的错误信息只写入日志，不返回给客户端。
///
/// # 返回
/// (HTTP 状态码, 响应体)
pub fn handle_submission<F>(body: &str, mut deliver: F) -> (u16, ContactResponse)
where
    F: FnMut(&ContactEmail) -> Result<(), String>,
{
    let request: ContactRequest = match serde_json::from_str(body) {
        Ok(request) => request,
        Err(e) => {
            error!(error = %e, "联系表单请求体解析失败");
            return (500, ContactResponse::failure(INTERNAL_ERROR));
        }
    };

    let result = request.validate().and_then(|submission| {
        deliver(&submission.notification()).map_err(|reason| ContactError::Delivery { reason })?;
        info!(from = %submission.email, "联系表单已投递");

        if let Err(reason) = deliver(&submission.confirmation()) {
            warn!(to = %submission.email, reason = %reason, "确认邮件投递失败");
        }
        Ok(())
    });

    match result {
        Ok(()) => (200, ContactResponse::success()),
        Err(e) => {
            if let ContactError::Delivery { reason } = &e {
                error!(reason = %reason, "联系表单投递失败");
            }
            (e.status(), ContactResponse::failure(e.to_string()))
        }
    }
}
