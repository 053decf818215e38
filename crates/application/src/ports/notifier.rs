//! Notifier port for non-fatal user notifications.

/// A message shown to the user without interrupting the current action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Message text.
    pub message: String,
    /// Optional icon name understood by the front end.
    pub icon: Option<String>,
}

impl Notification {
    /// Creates a notification without icon.
    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            icon: None,
        }
    }

    /// Sets the icon.
    #[must_use]
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }
}

/// Port for surfacing notifications (toasts) to the user.
pub trait Notifier: Send + Sync {
    /// Shows a notification.
    fn notify(&self, notification: Notification);
}
