//! The user-facing dialog kinds.
//!
//! Every variant is a thin translator: semantic parameters in, one helper
//! command line (or one blocking native call) out, with the raw outcome
//! decoded back by the selected backend.

pub mod file;
pub mod message;
pub mod notify;

// Flatten the API for consumers
pub use file::{FileDialog, OpenFile, SaveFile, SelectFolder};
pub use message::{Message, MessageDialog};
pub use notify::{Notification, NotificationDialog};

use std::time::Duration;

use crate::engine::backend::{Backend, Launch};
use crate::engine::executor::{CommandOutput, Executor};
use crate::error::DialogError;

/// Button sets a message box can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Buttons {
    Ok,
    OkCancel,
    YesNo,
    YesNoCancel,
}

impl Buttons {
    /// Canonical name of the button set in helper-program vocabulary.
    pub fn name(self) -> &'static str {
        match self {
            Buttons::Ok => "ok",
            Buttons::OkCancel => "okcancel",
            Buttons::YesNo => "yesno",
            Buttons::YesNoCancel => "yesnocancel",
        }
    }
}

/// Icon attached to a message box or notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Icon {
    Info,
    Warning,
    Error,
    Question,
}

impl Icon {
    /// Icon name in the vocabulary of the current platform's dialogs.
    pub fn name(self) -> &'static str {
        match self {
            Icon::Warning => "warning",
            Icon::Error => "error",
            Icon::Question => "question",
            // zenity wants "information" but the PowerShell path wants "info"
            Icon::Info => {
                if cfg!(windows) {
                    "info"
                } else {
                    "information"
                }
            }
        }
    }
}

/// The button the user ended up pressing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Ok,
    Cancel,
    Yes,
    No,
}

// One in-flight (or completed) interaction: the selected backend plus the
// executor owning its subprocess, shared by every dialog kind.
pub(crate) struct ActiveDialog {
    backend: &'static dyn Backend,
    exec: Executor,
}

impl ActiveDialog {
    pub(crate) fn launch(
        backend: &'static dyn Backend,
        launch: Launch,
        timeout: Option<Duration>,
    ) -> Self {
        let mut exec = Executor::new();
        match launch {
            Launch::Command(command) => exec.start_with_timeout(&command, timeout),
            Launch::Immediate { output, exit_code } => exec.run_blocking(|| (output, exit_code)),
            Launch::Failed(reason) => exec.fail(reason),
        }
        Self { backend, exec }
    }

    pub(crate) fn ready(&mut self) -> bool {
        self.exec.ready()
    }

    pub(crate) fn output(&mut self) -> Result<CommandOutput, DialogError> {
        self.exec.result()
    }

    pub(crate) fn backend(&self) -> &'static dyn Backend {
        self.backend
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_set_vocabulary() {
        assert_eq!(Buttons::Ok.name(), "ok");
        assert_eq!(Buttons::OkCancel.name(), "okcancel");
        assert_eq!(Buttons::YesNo.name(), "yesno");
        assert_eq!(Buttons::YesNoCancel.name(), "yesnocancel");
    }

    #[test]
    fn test_icon_vocabulary() {
        assert_eq!(Icon::Warning.name(), "warning");
        assert_eq!(Icon::Error.name(), "error");
        assert_eq!(Icon::Question.name(), "question");
        if cfg!(windows) {
            assert_eq!(Icon::Info.name(), "info");
        } else {
            assert_eq!(Icon::Info.name(), "information");
        }
    }
}
