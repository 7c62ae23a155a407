//! Transient notifications: the single surface every outcome and error
//! reaches the user through.

use serde::Serialize;

use crate::routes::util::escape_html;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NoticeKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    /// Ready-to-swap fragment for the notification modal.
    pub html: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NoticeKind::Success, message.into())
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NoticeKind::Error, message.into())
    }

    fn new(kind: NoticeKind, message: String) -> Self {
        let class = match kind {
            NoticeKind::Success => "text-emerald-600",
            NoticeKind::Error => "text-red-500",
        };
        let html = format!(
            r#"<span class="{}" role="status">{}</span>"#,
            class,
            escape_html(&message)
        );
        Self { kind, message, html }
    }
}

impl<E: std::error::Error> From<&E> for Notice {
    fn from(err: &E) -> Self {
        Notice::error(err.to_string())
    }
}
