use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Info,
    Warning,
    Danger,
}

impl NoticeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NoticeKind::Success => "success",
            NoticeKind::Info => "info",
            NoticeKind::Warning => "warning",
            NoticeKind::Danger => "danger",
        }
    }
}

/// A transient message shown after an action; dismissed once expired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NoticeKind,
    pub message: String,
    expires_at: Instant,
}

impl Notification {
    pub fn new(kind: NoticeKind, message: impl Into<String>, ttl: Duration) -> Self {
        Self {
            kind,
            message: message.into(),
            expires_at: Instant::now() + ttl,
        }
    }

    pub fn is_visible_at(&self, now: Instant) -> bool {
        now < self.expires_at
    }

    pub fn is_visible(&self) -> bool {
        self.is_visible_at(Instant::now())
    }
}
