use std::time::Duration;

use crate::dialogs::{ActiveDialog, Buttons, Choice, Icon};
use crate::engine::backend::{self, MessageSpec};
use crate::engine::probe;
use crate::error::DialogError;

/// A message box request. `show` hands it to the platform backend and
/// returns a handle that can be polled or waited on.
///
/// ```no_run
/// use dialogrs::{Buttons, Choice, Icon, Message};
///
/// let choice = Message::new("Overwrite?", "The file already exists.")
///     .buttons(Buttons::YesNo)
///     .icon(Icon::Warning)
///     .show()
///     .result()
///     .unwrap_or(Choice::No);
/// ```
pub struct Message {
    title: String,
    text: String,
    buttons: Buttons,
    icon: Icon,
    timeout: Option<Duration>,
}

impl Message {
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
            buttons: Buttons::OkCancel,
            icon: Icon::Info,
            timeout: None,
        }
    }

    pub fn buttons(mut self, buttons: Buttons) -> Self {
        self.buttons = buttons;
        self
    }

    pub fn icon(mut self, icon: Icon) -> Self {
        self.icon = icon;
        self
    }

    /// Kill the dialog and report [`DialogError::Timeout`] if the user has
    /// not answered within `timeout`.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Present the message box and return without waiting for an answer.
    pub fn show(self) -> MessageDialog {
        let backend = backend::select(probe::installed());
        let launch = backend.message(&MessageSpec {
            title: &self.title,
            text: &self.text,
            buttons: self.buttons,
            icon: self.icon,
        });
        MessageDialog {
            inner: ActiveDialog::launch(backend, launch, self.timeout),
            buttons: self.buttons,
        }
    }
}

/// A message box that has been presented.
pub struct MessageDialog {
    inner: ActiveDialog,
    buttons: Buttons,
}

impl MessageDialog {
    /// Non-blocking: has the user answered yet?
    pub fn ready(&mut self) -> bool {
        self.inner.ready()
    }

    /// Block until the dialog is dismissed and return the chosen button.
    /// Repeated calls return the same answer.
    pub fn result(&mut self) -> Result<Choice, DialogError> {
        let out = self.inner.output()?;
        Ok(self.inner.backend().decode_choice(self.buttons, &out))
    }
}
