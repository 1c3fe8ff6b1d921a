use std::time::{Duration, Instant};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NoticeKind {
    Error,
    Success,
    Info,
}

#[derive(Debug, Clone)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    pub created: Instant,
}

/// Error toasts expire on their own, the banner stays until it is dismissed.
#[derive(Debug)]
pub struct Notifications {
    toasts: Vec<Notice>,
    banner: Option<Notice>,
    toast_duration: Duration,
}

impl Notifications {
    pub fn new(toast_duration: Duration) -> Self {
        Self {
            toasts: Vec::new(),
            banner: None,
            toast_duration,
        }
    }

    pub fn error(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!("{message}");
        self.toasts.push(Notice {
            kind: NoticeKind::Error,
            message,
            created: Instant::now(),
        });
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.set_banner(NoticeKind::Success, message.into());
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.set_banner(NoticeKind::Info, message.into());
    }

    fn set_banner(&mut self, kind: NoticeKind, message: String) {
        info!("{message}");
        self.banner = Some(Notice {
            kind,
            message,
            created: Instant::now(),
        });
    }

    pub fn toasts(&self) -> &[Notice] {
        &self.toasts
    }

    pub fn banner(&self) -> Option<&Notice> {
        self.banner.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty() && self.banner.is_none()
    }

    /// Drops toasts older than the toast duration. Returns true if anything changed.
    pub fn expire(&mut self, now: Instant) -> bool {
        let before = self.toasts.len();
        let ttl = self.toast_duration;
        self.toasts
            .retain(|t| now.duration_since(t.created) < ttl);
        before != self.toasts.len()
    }

    pub fn dismiss(&mut self) {
        self.toasts.clear();
        self.banner = None;
    }
}
