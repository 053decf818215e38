//! Notifier adapter that reports notifications through `tracing`.

use courier_application::ports::{Notification, Notifier};

/// Logs every notification at `info` level.
///
/// Used by the headless binary, where there is no toast surface.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match notification.icon.as_deref() {
            Some(icon) => tracing::info!(icon, "{}", notification.message),
            None => tracing::info!("{}", notification.message),
        }
    }
}
