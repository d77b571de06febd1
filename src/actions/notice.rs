//! User-facing outcome notices and the confirmation gate for destructive
//! actions.

use std::fmt;

use tokio::sync::mpsc;

/// Whether a notice reports success or failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    /// The action completed.
    Success,
    /// The action failed.
    Error,
}

/// A transient message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Success or failure.
    pub level: NoticeLevel,
    /// Text shown to the user.
    pub message: String,
}

impl Notice {
    /// A success notice.
    pub fn success(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Success, message: message.into() }
    }

    /// A failure notice.
    pub fn error(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Error, message: message.into() }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.level {
            NoticeLevel::Success => write!(f, "✓ {}", self.message),
            NoticeLevel::Error => write!(f, "✗ {}", self.message),
        }
    }
}

/// Receives notices produced by actions.
pub trait NoticeSink: Send + Sync {
    /// Delivers one notice. Must not block.
    fn publish(&self, notice: Notice);
}

/// Forwards notices to a channel; a closed receiver drops them.
impl NoticeSink for mpsc::UnboundedSender<Notice> {
    fn publish(&self, notice: Notice) {
        let _ = self.send(notice);
    }
}

/// Explicit user confirmation required before destructive calls.
pub trait Confirm: Send + Sync {
    /// Returns `true` if the user agreed to `prompt`.
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}
