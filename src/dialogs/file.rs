use std::path::PathBuf;
use std::time::Duration;

use crate::dialogs::ActiveDialog;
use crate::engine::backend::{self, FileKind, FileSpec};
use crate::engine::probe;
use crate::error::DialogError;

/// Open-file picker: select one or several existing files.
pub struct OpenFile {
    title: String,
    default_path: String,
    filter: String,
    multiselect: bool,
    timeout: Option<Duration>,
}

impl OpenFile {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            default_path: String::new(),
            filter: String::new(),
            multiselect: false,
            timeout: None,
        }
    }

    /// Directory (or file) the dialog starts at.
    pub fn default_path(mut self, path: impl Into<String>) -> Self {
        self.default_path = path.into();
        self
    }

    /// Glob-style filter pattern, e.g. `"*.png *.jpg"`.
    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    pub fn multiselect(mut self, multiselect: bool) -> Self {
        self.multiselect = multiselect;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn show(self) -> FileDialog {
        FileDialog::launch(
            FileKind::Open,
            &self.title,
            &self.default_path,
            &self.filter,
            self.multiselect,
            self.timeout,
        )
    }
}

/// Save-file picker: choose a (possibly new) destination path.
pub struct SaveFile {
    title: String,
    default_path: String,
    filter: String,
    timeout: Option<Duration>,
}

impl SaveFile {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            default_path: String::new(),
            filter: String::new(),
            timeout: None,
        }
    }

    pub fn default_path(mut self, path: impl Into<String>) -> Self {
        self.default_path = path.into();
        self
    }

    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn show(self) -> FileDialog {
        FileDialog::launch(
            FileKind::Save,
            &self.title,
            &self.default_path,
            &self.filter,
            false,
            self.timeout,
        )
    }
}

/// Folder picker.
pub struct SelectFolder {
    title: String,
    default_path: String,
    timeout: Option<Duration>,
}

impl SelectFolder {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            default_path: String::new(),
            timeout: None,
        }
    }

    pub fn default_path(mut self, path: impl Into<String>) -> Self {
        self.default_path = path.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn show(self) -> FileDialog {
        FileDialog::launch(
            FileKind::Folder,
            &self.title,
            &self.default_path,
            "",
            false,
            self.timeout,
        )
    }
}

/// Any of the three pickers, once presented.
pub struct FileDialog {
    inner: ActiveDialog,
    multiple: bool,
}

impl FileDialog {
    fn launch(
        kind: FileKind,
        title: &str,
        default_path: &str,
        filter: &str,
        multiple: bool,
        timeout: Option<Duration>,
    ) -> Self {
        let backend = backend::select(probe::installed());
        let launch = backend.file_select(&FileSpec {
            kind,
            title,
            default_path,
            filter,
            multiple,
        });
        Self {
            inner: ActiveDialog::launch(backend, launch, timeout),
            multiple,
        }
    }

    /// Non-blocking: has the user picked (or cancelled) yet?
    pub fn ready(&mut self) -> bool {
        self.inner.ready()
    }

    /// Block until the dialog closes and return the selected paths. An
    /// empty vector means the user cancelled. Repeated calls return the
    /// same selection.
    pub fn result(&mut self) -> Result<Vec<PathBuf>, DialogError> {
        let out = self.inner.output()?;
        Ok(self.inner.backend().decode_paths(self.multiple, &out))
    }
}
