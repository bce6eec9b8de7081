use std::time::Duration;

use crate::dialogs::{ActiveDialog, Icon};
use crate::engine::backend::{self, NotifySpec};
use crate::engine::probe;
use crate::error::DialogError;

/// A passive toast/balloon notification. Fire-and-forget: the handle only
/// exists so callers can confirm delivery or detect a launch failure.
pub struct Notification {
    title: String,
    message: String,
    icon: Icon,
    timeout: Option<Duration>,
}

impl Notification {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            icon: Icon::Info,
            timeout: None,
        }
    }

    pub fn icon(mut self, icon: Icon) -> Self {
        self.icon = icon;
        self
    }

    /// Give up on the notifier process after `timeout`.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Post the notification and return immediately.
    pub fn show(self) -> NotificationDialog {
        // Question marks are not a thing notifications can express.
        let icon = if self.icon == Icon::Question {
            Icon::Info
        } else {
            self.icon
        };
        let backend = backend::select(probe::installed());
        let launch = backend.notification(&NotifySpec {
            title: &self.title,
            message: &self.message,
            icon,
        });
        NotificationDialog {
            inner: ActiveDialog::launch(backend, launch, self.timeout),
        }
    }
}

/// A notification that has been handed to the platform notifier.
pub struct NotificationDialog {
    inner: ActiveDialog,
}

impl NotificationDialog {
    /// Non-blocking: has the notifier process finished?
    pub fn ready(&mut self) -> bool {
        self.inner.ready()
    }

    /// Block until the notifier process exits. `Ok` means the notification
    /// was handed off; it says nothing about the user seeing it.
    pub fn result(&mut self) -> Result<(), DialogError> {
        self.inner.output().map(|_| ())
    }
}
