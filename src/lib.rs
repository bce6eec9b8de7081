//! Non-blocking native message boxes, notifications and file dialogs.
//!
//! On Windows the dialogs are first-class OS calls (`MessageBoxW`, COM
//! `IFileDialog`). Everywhere else they are rendered by whichever desktop
//! helper program is installed (`zenity`, `matedialog`, `qarma`,
//! `kdialog`), spawned as a child process and polled without blocking the
//! caller.
//!
//! ```no_run
//! use dialogrs::OpenFile;
//!
//! let mut picker = OpenFile::new("Choose an image")
//!     .filter("*.png *.jpg")
//!     .multiselect(true)
//!     .show();
//!
//! while !picker.ready() {
//!     // keep rendering, pumping events, ...
//!     std::thread::sleep(std::time::Duration::from_millis(50));
//! }
//! let paths = picker.result().unwrap_or_default();
//! ```

#[cfg(windows)]
pub mod com;
pub mod dialogs;
pub mod engine;
pub mod error;
pub mod logger;
pub mod settings;
pub mod utils;

pub use dialogs::{
    Buttons, Choice, FileDialog, Icon, Message, MessageDialog, Notification, NotificationDialog,
    OpenFile, SaveFile, SelectFolder,
};
pub use error::DialogError;
