//! Process-wide knobs shared by every dialog.

use crate::engine::probe;
use crate::logger;

/// When enabled, every assembled helper command is echoed to stderr before
/// it runs. Pure diagnostics; behavior is unchanged.
pub fn verbose(enabled: bool) {
    logger::set_verbose(enabled);
}

/// Force a re-probe of the installed helper programs. Normally they are
/// detected once, the first time any dialog is constructed.
pub fn rescan() {
    probe::rescan();
}

/// Whether a real dialog backend is available: always true on Windows,
/// otherwise true when at least one known helper program is installed.
pub fn available() -> bool {
    cfg!(windows) || probe::installed().first_available().is_some()
}
