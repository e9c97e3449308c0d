//! Presentation helpers - notifications, theme, dates
//!
//! Notifications are the only user-visible error channel: every failure is
//! recovered at its call site and reported as a short-lived message.

pub mod dates;
pub mod theme;

pub use theme::{Palette, Theme};

use colored::Colorize;
use indicatif::MultiProgress;
use parking_lot::Mutex;
use tracing::debug;

use crate::spinner::StatusIcons;

/// Notification flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
    Info,
}

/// A transient user notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub kind: ToastKind,
    pub message: String,
}

impl Toast {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Error,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Info,
            message: message.into(),
        }
    }
}

/// Sink for notifications
pub trait Notifier: Send + Sync {
    fn notify(&self, toast: Toast);

    fn success(&self, message: &str) {
        self.notify(Toast::success(message));
    }

    fn error(&self, message: &str) {
        self.notify(Toast::error(message));
    }

    fn info(&self, message: &str) {
        self.notify(Toast::info(message));
    }
}

/// Prints notifications to stderr with a status icon
///
/// Output is suspended through the shared progress handle, so a live spinner
/// or batch bar is redrawn below the message instead of being torn.
#[derive(Clone)]
pub struct ConsoleNotifier {
    progress: MultiProgress,
}

impl ConsoleNotifier {
    pub fn new(progress: MultiProgress) -> Self {
        Self { progress }
    }
}

impl Default for ConsoleNotifier {
    fn default() -> Self {
        Self::new(MultiProgress::new())
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, toast: Toast) {
        let message = crate::view::sanitize(&toast.message);
        let (kind, line) = match toast.kind {
            ToastKind::Success => (
                "success",
                format!("{} {}", StatusIcons::SUCCESS.green(), message.green()),
            ),
            ToastKind::Error => (
                "error",
                format!("{} {}", StatusIcons::ERROR.red(), message.red()),
            ),
            ToastKind::Info => (
                "info",
                format!("{} {}", StatusIcons::INFO.cyan(), message.cyan()),
            ),
        };
        debug!(kind, "{}", message);
        self.progress.suspend(|| eprintln!("{}", line));
    }
}

/// Keeps notifications in memory instead of showing them
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    toasts: Mutex<Vec<Toast>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toasts(&self) -> Vec<Toast> {
        self.toasts.lock().clone()
    }

    pub fn of_kind(&self, kind: ToastKind) -> Vec<String> {
        self.toasts
            .lock()
            .iter()
            .filter(|t| t.kind == kind)
            .map(|t| t.message.clone())
            .collect()
    }

    pub fn last(&self) -> Option<Toast> {
        self.toasts.lock().last().cloned()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, toast: Toast) {
        self.toasts.lock().push(toast);
    }
}
