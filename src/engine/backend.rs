use std::path::PathBuf;

use crate::dialogs::{Buttons, Choice, Icon};
use crate::engine::executor::CommandOutput;
#[cfg(not(windows))]
use crate::engine::probe::Helper;
use crate::engine::probe::HelperSet;
#[cfg(not(windows))]
use crate::utils::shell_quote;

/// Semantic request for a message box.
pub(crate) struct MessageSpec<'a> {
    pub title: &'a str,
    pub text: &'a str,
    pub buttons: Buttons,
    pub icon: Icon,
}

/// Semantic request for a passive notification.
pub(crate) struct NotifySpec<'a> {
    pub title: &'a str,
    pub message: &'a str,
    pub icon: Icon,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FileKind {
    Open,
    Save,
    Folder,
}

/// Semantic request for a file-selection dialog.
pub(crate) struct FileSpec<'a> {
    pub kind: FileKind,
    pub title: &'a str,
    pub default_path: &'a str,
    pub filter: &'a str,
    pub multiple: bool,
}

/// How a backend wants a dialog to be carried out.
pub(crate) enum Launch {
    /// Run this shell command asynchronously and scrape its output.
    Command(String),
    /// A blocking native call already ran; here is its outcome.
    Immediate { output: String, exit_code: i32 },
    /// The dialog could not be presented at all.
    #[cfg_attr(not(windows), allow(dead_code))]
    Failed(String),
}

/// One dialog-presentation strategy: build (or directly perform) the
/// platform action for each dialog kind, then decode the raw outcome.
///
/// Implementations are selected at runtime from the probe results, one per
/// backend family, so each can be exercised in isolation.
pub(crate) trait Backend: Sync {
    /// Identifier used as the command prefix (or "native").
    fn name(&self) -> &'static str;

    fn message(&self, spec: &MessageSpec) -> Launch;
    fn notification(&self, spec: &NotifySpec) -> Launch;
    fn file_select(&self, spec: &FileSpec) -> Launch;

    /// Map a finished command's exit code and output to the button the
    /// user picked.
    fn decode_choice(&self, buttons: Buttons, out: &CommandOutput) -> Choice;

    /// Split a file dialog's output into the selected paths. Empty output
    /// means the dialog was cancelled.
    fn decode_paths(&self, multiple: bool, out: &CommandOutput) -> Vec<PathBuf>;
}

/// Pick the backend for the current platform and probe results.
pub(crate) fn select(installed: HelperSet) -> &'static dyn Backend {
    #[cfg(windows)]
    {
        let _ = installed;
        &native::NATIVE
    }
    #[cfg(not(windows))]
    {
        match installed.first_available() {
            Some(Helper::Zenity) => &ZENITY,
            Some(Helper::Matedialog) => &MATEDIALOG,
            Some(Helper::Qarma) => &QARMA,
            Some(Helper::Kdialog) => &KDIALOG,
            None => &FALLBACK,
        }
    }
}

// --- zenity dialect (zenity, matedialog, qarma) ---

#[cfg(not(windows))]
pub(crate) struct ZenityDialect {
    program: &'static str,
}

#[cfg(not(windows))]
pub(crate) static ZENITY: ZenityDialect = ZenityDialect { program: "zenity" };
#[cfg(not(windows))]
pub(crate) static MATEDIALOG: ZenityDialect = ZenityDialect { program: "matedialog" };
#[cfg(not(windows))]
pub(crate) static QARMA: ZenityDialect = ZenityDialect { program: "qarma" };

#[cfg(not(windows))]
impl Backend for ZenityDialect {
    fn name(&self) -> &'static str {
        self.program
    }

    fn message(&self, spec: &MessageSpec) -> Launch {
        let mut command = self.program.to_string();
        match spec.buttons {
            Buttons::OkCancel => command.push_str(" --question --ok-label=OK --cancel-label=Cancel"),
            Buttons::YesNo => command.push_str(" --question"),
            // zenity has no three-button question; a two-row list plus the
            // implicit Cancel button stands in for it.
            Buttons::YesNoCancel => {
                command.push_str(" --list --column '' --hide-header 'Yes' 'No'")
            }
            Buttons::Ok => match spec.icon {
                Icon::Error => command.push_str(" --error"),
                Icon::Warning => command.push_str(" --warning"),
                _ => command.push_str(" --info"),
            },
        }

        command.push_str(" --title ");
        command.push_str(&shell_quote(spec.title));
        // sensible defaults
        command.push_str(" --width 300 --height 0");
        command.push_str(" --text ");
        command.push_str(&shell_quote(spec.text));
        command.push_str(" --icon-name=dialog-");
        command.push_str(spec.icon.name());
        Launch::Command(command)
    }

    fn notification(&self, spec: &NotifySpec) -> Launch {
        let mut command = self.program.to_string();
        command.push_str(" --notification --window-icon ");
        command.push_str(spec.icon.name());
        command.push_str(" --text ");
        command.push_str(&shell_quote(&format!("{}\n{}", spec.title, spec.message)));
        Launch::Command(command)
    }

    fn file_select(&self, spec: &FileSpec) -> Launch {
        let mut command = self.program.to_string();
        command.push_str(" --file-selection --filename=");
        command.push_str(&shell_quote(spec.default_path));
        command.push_str(" --title ");
        command.push_str(&shell_quote(spec.title));
        command.push_str(" --file-filter=");
        command.push_str(&shell_quote(spec.filter));
        if spec.multiple {
            command.push_str(" --multiple");
        }
        match spec.kind {
            FileKind::Save => command.push_str(" --save"),
            FileKind::Folder => command.push_str(" --directory"),
            FileKind::Open => {}
        }
        Launch::Command(command)
    }

    fn decode_choice(&self, buttons: Buttons, out: &CommandOutput) -> Choice {
        match buttons {
            Buttons::YesNoCancel => match out.text.trim_end() {
                "Yes" => Choice::Yes,
                "No" => Choice::No,
                _ => Choice::Cancel,
            },
            Buttons::YesNo => {
                if out.exit_code == Some(0) {
                    Choice::Yes
                } else {
                    Choice::No
                }
            }
            Buttons::OkCancel => {
                if out.exit_code == Some(0) {
                    Choice::Ok
                } else {
                    Choice::Cancel
                }
            }
            Buttons::Ok => Choice::Ok,
        }
    }

    fn decode_paths(&self, multiple: bool, out: &CommandOutput) -> Vec<PathBuf> {
        let text = out.text.trim_end_matches('\n');
        if text.is_empty() {
            return Vec::new();
        }
        if multiple {
            text.split('|').map(PathBuf::from).collect()
        } else {
            vec![PathBuf::from(text)]
        }
    }
}

// --- kdialog ---

#[cfg(not(windows))]
pub(crate) struct KdialogBackend;

#[cfg(not(windows))]
pub(crate) static KDIALOG: KdialogBackend = KdialogBackend;

#[cfg(not(windows))]
impl Backend for KdialogBackend {
    fn name(&self) -> &'static str {
        "kdialog"
    }

    fn message(&self, spec: &MessageSpec) -> Launch {
        let mut command = "kdialog".to_string();
        if spec.buttons == Buttons::Ok {
            match spec.icon {
                Icon::Error => command.push_str(" --error"),
                Icon::Warning => command.push_str(" --sorry"),
                _ => command.push_str(" --msgbox"),
            }
        } else {
            command.push_str(" --");
            if spec.icon == Icon::Warning || spec.icon == Icon::Error {
                command.push_str("warning");
            }
            command.push_str("yesno");
            if spec.buttons == Buttons::YesNoCancel {
                command.push_str("cancel");
            }
        }

        command.push(' ');
        command.push_str(&shell_quote(spec.text));
        command.push_str(" --title ");
        command.push_str(&shell_quote(spec.title));
        if spec.buttons == Buttons::OkCancel {
            command.push_str(" --yes-label OK --no-label Cancel");
        }
        Launch::Command(command)
    }

    fn notification(&self, spec: &NotifySpec) -> Launch {
        let mut command = "kdialog --icon ".to_string();
        command.push_str(spec.icon.name());
        command.push_str(" --title ");
        command.push_str(&shell_quote(spec.title));
        command.push_str(" --passivepopup ");
        command.push_str(&shell_quote(spec.message));
        command.push_str(" 5");
        Launch::Command(command)
    }

    fn file_select(&self, spec: &FileSpec) -> Launch {
        let mut command = "kdialog".to_string();
        command.push_str(match spec.kind {
            FileKind::Open => " --getopenfilename",
            FileKind::Save => " --getsavefilename",
            FileKind::Folder => " --getexistingdirectory",
        });
        command.push(' ');
        command.push_str(&shell_quote(spec.default_path));
        if spec.kind != FileKind::Folder && !spec.filter.is_empty() {
            command.push(' ');
            command.push_str(&shell_quote(spec.filter));
        }
        if spec.kind == FileKind::Open && spec.multiple {
            command.push_str(" --multiple --separate-output");
        }
        command.push_str(" --title ");
        command.push_str(&shell_quote(spec.title));
        Launch::Command(command)
    }

    fn decode_choice(&self, buttons: Buttons, out: &CommandOutput) -> Choice {
        match out.exit_code {
            Some(0) => match buttons {
                Buttons::Ok | Buttons::OkCancel => Choice::Ok,
                Buttons::YesNo | Buttons::YesNoCancel => Choice::Yes,
            },
            Some(1) => match buttons {
                Buttons::Ok => Choice::Ok,
                Buttons::OkCancel => Choice::Cancel,
                Buttons::YesNo | Buttons::YesNoCancel => Choice::No,
            },
            // 2 is the explicit Cancel button; anything else means the
            // window was closed.
            _ => match buttons {
                Buttons::Ok => Choice::Ok,
                Buttons::YesNo => Choice::No,
                _ => Choice::Cancel,
            },
        }
    }

    fn decode_paths(&self, _multiple: bool, out: &CommandOutput) -> Vec<PathBuf> {
        // --separate-output prints one path per line; the single-selection
        // forms print one line total.
        out.text
            .lines()
            .filter(|line| !line.is_empty())
            .map(PathBuf::from)
            .collect()
    }
}

// --- fallback when no helper is installed ---

#[cfg(not(windows))]
pub(crate) struct EchoFallback;

#[cfg(not(windows))]
pub(crate) static FALLBACK: EchoFallback = EchoFallback;

#[cfg(not(windows))]
impl Backend for EchoFallback {
    fn name(&self) -> &'static str {
        "echo"
    }

    fn message(&self, _spec: &MessageSpec) -> Launch {
        Launch::Command("echo".to_string())
    }

    fn notification(&self, _spec: &NotifySpec) -> Launch {
        Launch::Command("echo".to_string())
    }

    fn file_select(&self, _spec: &FileSpec) -> Launch {
        Launch::Command("echo".to_string())
    }

    fn decode_choice(&self, buttons: Buttons, _out: &CommandOutput) -> Choice {
        // Nothing was shown; report the affirmative default.
        match buttons {
            Buttons::Ok | Buttons::OkCancel => Choice::Ok,
            Buttons::YesNo | Buttons::YesNoCancel => Choice::Yes,
        }
    }

    fn decode_paths(&self, _multiple: bool, _out: &CommandOutput) -> Vec<PathBuf> {
        Vec::new()
    }
}

// --- native Windows backend ---

#[cfg(windows)]
pub(crate) mod native {
    use super::*;
    use crate::utils::{powershell_quote, to_wstring};
    use windows_sys::Win32::System::Threading::GetCurrentProcessId;
    use windows_sys::Win32::UI::WindowsAndMessaging::{
        GetForegroundWindow, MessageBoxW, IDCANCEL, IDNO, IDOK, IDYES, MB_ICONERROR,
        MB_ICONINFORMATION, MB_ICONQUESTION, MB_ICONWARNING, MB_OK, MB_OKCANCEL, MB_TOPMOST,
        MB_YESNO, MB_YESNOCANCEL,
    };

    pub(crate) struct NativeBackend;

    pub(crate) static NATIVE: NativeBackend = NativeBackend;

    impl Backend for NativeBackend {
        fn name(&self) -> &'static str {
            "native"
        }

        fn message(&self, spec: &MessageSpec) -> Launch {
            let mut style = MB_TOPMOST;
            style |= match spec.icon {
                Icon::Warning => MB_ICONWARNING,
                Icon::Error => MB_ICONERROR,
                Icon::Question => MB_ICONQUESTION,
                Icon::Info => MB_ICONINFORMATION,
            };
            style |= match spec.buttons {
                Buttons::OkCancel => MB_OKCANCEL,
                Buttons::YesNo => MB_YESNO,
                Buttons::YesNoCancel => MB_YESNOCANCEL,
                Buttons::Ok => MB_OK,
            };

            let title = to_wstring(spec.title);
            let text = to_wstring(spec.text);
            let ret = unsafe {
                MessageBoxW(GetForegroundWindow(), text.as_ptr(), title.as_ptr(), style)
            };
            Launch::Immediate {
                output: String::new(),
                exit_code: ret,
            }
        }

        fn notification(&self, spec: &NotifySpec) -> Launch {
            let delay = 5000;
            let pid = unsafe { GetCurrentProcessId() };
            let command = format!(
                "powershell.exe -Command \"\
                 Add-Type -AssemblyName System.Windows.Forms;\
                 $exe = (Get-Process -id {pid}).Path;\
                 $popup = New-Object System.Windows.Forms.NotifyIcon;\
                 $popup.Icon = [System.Drawing.Icon]::ExtractAssociatedIcon($exe);\
                 $popup.Visible = $true;\
                 $popup.ShowBalloonTip({delay}, {title}, {message}, '{icon}');\
                 Start-Sleep -Milliseconds {delay};\
                 $popup.Dispose();\"",
                title = powershell_quote(spec.title),
                message = powershell_quote(spec.message),
                icon = spec.icon.name(),
            );
            Launch::Command(command)
        }

        fn file_select(&self, spec: &FileSpec) -> Launch {
            let picked = unsafe {
                match spec.kind {
                    FileKind::Open => crate::com::file_dialog::open_files(
                        spec.title,
                        spec.default_path,
                        spec.filter,
                        spec.multiple,
                    ),
                    FileKind::Save => crate::com::file_dialog::save_file(
                        spec.title,
                        spec.default_path,
                        spec.filter,
                    ),
                    FileKind::Folder => {
                        crate::com::file_dialog::select_folder(spec.title, spec.default_path)
                    }
                }
            };
            match picked {
                Ok(paths) => Launch::Immediate {
                    output: paths.join("\n"),
                    exit_code: 0,
                },
                Err(hr) => Launch::Failed(format!("file dialog failed (HRESULT {hr:#010x})")),
            }
        }

        fn decode_choice(&self, buttons: Buttons, out: &CommandOutput) -> Choice {
            match out.exit_code {
                Some(code) if code == IDOK => Choice::Ok,
                Some(code) if code == IDCANCEL => Choice::Cancel,
                Some(code) if code == IDYES => Choice::Yes,
                Some(code) if code == IDNO => Choice::No,
                _ => match buttons {
                    Buttons::Ok | Buttons::OkCancel => Choice::Ok,
                    Buttons::YesNo | Buttons::YesNoCancel => Choice::Cancel,
                },
            }
        }

        fn decode_paths(&self, _multiple: bool, out: &CommandOutput) -> Vec<PathBuf> {
            out.text
                .lines()
                .filter(|line| !line.is_empty())
                .map(PathBuf::from)
                .collect()
        }
    }
}

#[cfg(all(test, not(windows)))]
mod tests {
    use super::*;

    fn finished(exit_code: i32, text: &str) -> CommandOutput {
        CommandOutput {
            text: text.to_string(),
            exit_code: Some(exit_code),
        }
    }

    #[test]
    fn test_zenity_yes_no_cancel_warning_tokens() {
        let spec = MessageSpec {
            title: "Caution",
            text: "Continue?",
            buttons: Buttons::YesNoCancel,
            icon: Icon::Warning,
        };
        let Launch::Command(cmd) = ZENITY.message(&spec) else {
            panic!("expected a command");
        };
        assert!(cmd.starts_with("zenity "));
        assert!(cmd.contains("--list --column '' --hide-header 'Yes' 'No'"));
        assert!(cmd.contains("--icon-name=dialog-warning"));
        assert!(cmd.contains("--title 'Caution'"));
        assert!(cmd.contains("--text 'Continue?'"));
    }

    #[test]
    fn test_zenity_ok_only_picks_icon_flag() {
        let spec = MessageSpec {
            title: "t",
            text: "x",
            buttons: Buttons::Ok,
            icon: Icon::Error,
        };
        let Launch::Command(cmd) = ZENITY.message(&spec) else {
            panic!("expected a command");
        };
        assert!(cmd.contains(" --error "));
        assert!(!cmd.contains("--question"));
    }

    #[test]
    fn test_zenity_dialect_reuses_other_binaries() {
        let spec = MessageSpec {
            title: "t",
            text: "x",
            buttons: Buttons::YesNo,
            icon: Icon::Question,
        };
        let Launch::Command(cmd) = QARMA.message(&spec) else {
            panic!("expected a command");
        };
        assert!(cmd.starts_with("qarma --question"));
    }

    #[test]
    fn test_kdialog_yes_no_cancel_warning_tokens() {
        let spec = MessageSpec {
            title: "Caution",
            text: "Continue?",
            buttons: Buttons::YesNoCancel,
            icon: Icon::Warning,
        };
        let Launch::Command(cmd) = KDIALOG.message(&spec) else {
            panic!("expected a command");
        };
        assert!(cmd.contains(" --warningyesnocancel "));
        assert!(cmd.contains("--title 'Caution'"));
    }

    #[test]
    fn test_kdialog_ok_cancel_relabels_buttons() {
        let spec = MessageSpec {
            title: "t",
            text: "x",
            buttons: Buttons::OkCancel,
            icon: Icon::Info,
        };
        let Launch::Command(cmd) = KDIALOG.message(&spec) else {
            panic!("expected a command");
        };
        assert!(cmd.contains(" --yesno "));
        assert!(cmd.ends_with("--yes-label OK --no-label Cancel"));
    }

    #[test]
    fn test_notification_commands() {
        let spec = NotifySpec {
            title: "Done",
            message: "job's finished",
            icon: Icon::Info,
        };
        let Launch::Command(zen) = ZENITY.notification(&spec) else {
            panic!("expected a command");
        };
        assert!(zen.contains("--notification --window-icon information"));
        assert!(zen.contains("'Done\njob'\\''s finished'"));

        let Launch::Command(kd) = KDIALOG.notification(&spec) else {
            panic!("expected a command");
        };
        assert!(kd.contains("--passivepopup 'job'\\''s finished' 5"));
    }

    #[test]
    fn test_zenity_file_select_variants() {
        let open = FileSpec {
            kind: FileKind::Open,
            title: "Pick",
            default_path: "/home/user",
            filter: "*.png *.jpg",
            multiple: true,
        };
        let Launch::Command(cmd) = ZENITY.file_select(&open) else {
            panic!("expected a command");
        };
        assert!(cmd.contains("--file-selection --filename='/home/user'"));
        assert!(cmd.contains("--file-filter='*.png *.jpg'"));
        assert!(cmd.contains("--multiple"));
        assert!(!cmd.contains("--save"));

        let save = FileSpec {
            kind: FileKind::Save,
            multiple: false,
            ..open
        };
        let Launch::Command(cmd) = ZENITY.file_select(&save) else {
            panic!("expected a command");
        };
        assert!(cmd.ends_with("--save"));

        let folder = FileSpec {
            kind: FileKind::Folder,
            filter: "",
            multiple: false,
            ..open
        };
        let Launch::Command(cmd) = ZENITY.file_select(&folder) else {
            panic!("expected a command");
        };
        assert!(cmd.ends_with("--directory"));
    }

    #[test]
    fn test_kdialog_file_select_variants() {
        let open = FileSpec {
            kind: FileKind::Open,
            title: "Pick",
            default_path: "/tmp",
            filter: "*.txt",
            multiple: true,
        };
        let Launch::Command(cmd) = KDIALOG.file_select(&open) else {
            panic!("expected a command");
        };
        assert!(cmd.contains("--getopenfilename '/tmp' '*.txt'"));
        assert!(cmd.contains("--multiple --separate-output"));

        let folder = FileSpec {
            kind: FileKind::Folder,
            filter: "*.txt",
            multiple: false,
            ..open
        };
        let Launch::Command(cmd) = KDIALOG.file_select(&folder) else {
            panic!("expected a command");
        };
        assert!(cmd.contains("--getexistingdirectory '/tmp'"));
        assert!(!cmd.contains("'*.txt'"));
    }

    #[test]
    fn test_zenity_choice_decoding() {
        assert_eq!(
            ZENITY.decode_choice(Buttons::OkCancel, &finished(0, "")),
            Choice::Ok
        );
        assert_eq!(
            ZENITY.decode_choice(Buttons::OkCancel, &finished(1, "")),
            Choice::Cancel
        );
        assert_eq!(
            ZENITY.decode_choice(Buttons::YesNoCancel, &finished(0, "Yes\n")),
            Choice::Yes
        );
        assert_eq!(
            ZENITY.decode_choice(Buttons::YesNoCancel, &finished(0, "No\n")),
            Choice::No
        );
        assert_eq!(
            ZENITY.decode_choice(Buttons::YesNoCancel, &finished(1, "")),
            Choice::Cancel
        );
    }

    #[test]
    fn test_kdialog_choice_decoding() {
        assert_eq!(
            KDIALOG.decode_choice(Buttons::YesNoCancel, &finished(0, "")),
            Choice::Yes
        );
        assert_eq!(
            KDIALOG.decode_choice(Buttons::YesNoCancel, &finished(1, "")),
            Choice::No
        );
        assert_eq!(
            KDIALOG.decode_choice(Buttons::YesNoCancel, &finished(2, "")),
            Choice::Cancel
        );
        assert_eq!(
            KDIALOG.decode_choice(Buttons::OkCancel, &finished(1, "")),
            Choice::Cancel
        );
    }

    #[test]
    fn test_path_decoding() {
        let out = finished(0, "/a/b|/c d/e\n");
        assert_eq!(
            ZENITY.decode_paths(true, &out),
            vec![PathBuf::from("/a/b"), PathBuf::from("/c d/e")]
        );
        assert_eq!(ZENITY.decode_paths(false, &finished(0, "/a/b\n")), vec![PathBuf::from("/a/b")]);
        assert!(ZENITY.decode_paths(false, &finished(1, "")).is_empty());

        let out = finished(0, "/a/b\n/c d/e\n");
        assert_eq!(
            KDIALOG.decode_paths(true, &out),
            vec![PathBuf::from("/a/b"), PathBuf::from("/c d/e")]
        );
    }

    #[test]
    fn test_fallback_selection_and_defaults() {
        let backend = select(HelperSet::default());
        assert_eq!(backend.name(), "echo");
        assert_eq!(
            backend.decode_choice(Buttons::OkCancel, &finished(0, "\n")),
            Choice::Ok
        );
        assert!(backend.decode_paths(true, &finished(0, "\n")).is_empty());
    }

    #[test]
    fn test_selection_prefers_zenity_dialect() {
        let mut set = HelperSet::default();
        set.set(Helper::Kdialog, true);
        assert_eq!(select(set).name(), "kdialog");
        set.set(Helper::Matedialog, true);
        assert_eq!(select(set).name(), "matedialog");
        set.set(Helper::Zenity, true);
        assert_eq!(select(set).name(), "zenity");
    }
}
