//! Manual COM plumbing for the native Windows file dialogs.

pub mod file_dialog;
