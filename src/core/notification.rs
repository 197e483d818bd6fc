use std::{
    fmt,
    sync::{Mutex, PoisonError},
    time::Duration,
};

use serde::{Serialize, Serializer};

/// How long every toast stays on screen.
pub const TOAST_DURATION: Duration = Duration::from_millis(5000);

/// Severity of a toast, serialized as the toast library's CSS modifier token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Severity {
    #[serde(rename = "is-info")]
    Info,
    #[serde(rename = "is-warning")]
    Warning,
    #[serde(rename = "is-success")]
    Success,
    #[serde(rename = "is-danger")]
    Danger,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "is-info",
            Severity::Warning => "is-warning",
            Severity::Success => "is-success",
            Severity::Danger => "is-danger",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where toasts appear. Every toast is shown at the top center.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Position {
    #[default]
    TopCenter,
}

/// A transient notification, shaped like the payload handed to the toast library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    pub message: String,
    #[serde(rename = "type")]
    pub severity: Severity,
    pub position: Position,
    #[serde(serialize_with = "serialize_millis")]
    pub duration: Duration,
}

impl Toast {
    /// A toast shown at the top center of the screen for [TOAST_DURATION].
    pub fn new(message: impl Into<String>, severity: Severity) -> Self {
        Self {
            message: message.into(),
            severity,
            position: Position::TopCenter,
            duration: TOAST_DURATION,
        }
    }
}

fn serialize_millis<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
}

/// Displays toasts to the user.
///
/// Delivery is fire-and-forget: implementations swallow their own display failures.
pub trait Notifier {
    fn notify(&self, toast: Toast);

    fn show(&self, message: impl Into<String>, severity: Severity)
    where
        Self: Sized,
    {
        self.notify(Toast::new(message, severity))
    }
}

impl<N: Notifier + ?Sized> Notifier for std::sync::Arc<N> {
    fn notify(&self, toast: Toast) {
        (**self).notify(toast)
    }
}

/// Emits toasts as `tracing` events, for headless hosts.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, toast: Toast) {
        let Toast {
            message, severity, ..
        } = toast;
        match severity {
            Severity::Danger => tracing::error!(%severity, "{message}"),
            Severity::Warning => tracing::warn!(%severity, "{message}"),
            Severity::Info | Severity::Success => tracing::info!(%severity, "{message}"),
        }
    }
}

/// Keeps every toast in memory.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    toasts: Mutex<Vec<Toast>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toasts(&self) -> Vec<Toast> {
        self.toasts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.toasts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|toast| toast.severity == severity)
            .count()
    }

    pub fn clear(&self) {
        self.toasts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear()
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, toast: Toast) {
        self.toasts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(toast)
    }
}
