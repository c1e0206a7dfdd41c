use std::time::{Duration, Instant};

pub const DEFAULT_DURATION: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
    expires_at: Instant,
}

impl Toast {
    pub fn success<S: Into<String>>(message: S, now: Instant, duration: Duration) -> Self {
        Self {
            message: message.into(),
            kind: ToastKind::Success,
            expires_at: now + duration,
        }
    }

    pub fn error<S: Into<String>>(message: S, now: Instant, duration: Duration) -> Self {
        Self {
            message: message.into(),
            kind: ToastKind::Error,
            expires_at: now + duration,
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}
