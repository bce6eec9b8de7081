use std::time::Duration;
use thiserror::Error;

/// Failures a dialog can report beyond the user simply cancelling it.
///
/// A dialog that was presented but dismissed is not an error: it yields an
/// empty selection or a negative [`Choice`](crate::dialogs::Choice). These
/// variants cover the cases where the dialog never appeared at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DialogError {
    /// The helper command or native call could not be started.
    #[error("failed to launch dialog: {0}")]
    Launch(String),

    /// The dialog process outlived the deadline attached to it and was
    /// forcibly terminated.
    #[error("dialog did not finish within {0:?}")]
    Timeout(Duration),
}
