use std::sync::RwLock;

use crate::engine::executor::Executor;

/// The fixed set of desktop helper programs, in selection priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Helper {
    Zenity,
    Matedialog,
    Qarma,
    Kdialog,
}

impl Helper {
    pub const ALL: [Helper; 4] = [
        Helper::Zenity,
        Helper::Matedialog,
        Helper::Qarma,
        Helper::Kdialog,
    ];

    /// Binary name on `$PATH`.
    pub fn binary(self) -> &'static str {
        match self {
            Helper::Zenity => "zenity",
            Helper::Matedialog => "matedialog",
            Helper::Qarma => "qarma",
            Helper::Kdialog => "kdialog",
        }
    }

    fn index(self) -> usize {
        match self {
            Helper::Zenity => 0,
            Helper::Matedialog => 1,
            Helper::Qarma => 2,
            Helper::Kdialog => 3,
        }
    }
}

/// Presence flags for the known helper programs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HelperSet {
    present: [bool; 4],
}

impl HelperSet {
    pub fn has(self, helper: Helper) -> bool {
        self.present[helper.index()]
    }

    pub fn set(&mut self, helper: Helper, present: bool) {
        self.present[helper.index()] = present;
    }

    /// Highest-priority installed helper, if any.
    pub fn first_available(self) -> Option<Helper> {
        Helper::ALL.into_iter().find(|h| self.has(*h))
    }

    /// Probe the system for each known helper. On Windows the helper path
    /// is never taken, so nothing is probed.
    pub fn probe() -> Self {
        let mut set = HelperSet::default();
        if cfg!(windows) {
            return set;
        }
        for helper in Helper::ALL {
            set.set(helper, check_program(helper.binary()));
        }
        set
    }
}

// Computed once per process on first use, re-filled by rescan(). The lock
// makes concurrent first-time initialization safe; after that the cache is
// read-mostly.
static INSTALLED: RwLock<Option<HelperSet>> = RwLock::new(None);

/// The process-wide helper presence cache, probing on first use.
pub fn installed() -> HelperSet {
    if let Ok(guard) = INSTALLED.read() {
        if let Some(set) = *guard {
            return set;
        }
    }
    let mut guard = INSTALLED.write().unwrap_or_else(|e| e.into_inner());
    *guard.get_or_insert_with(HelperSet::probe)
}

/// Throw away the cache and probe again.
pub fn rescan() {
    let fresh = HelperSet::probe();
    let mut guard = INSTALLED.write().unwrap_or_else(|e| e.into_inner());
    *guard = Some(fresh);
}

/// Check whether a program is present using `which`.
pub fn check_program(program: &str) -> bool {
    if cfg!(windows) {
        return false;
    }
    let mut exec = Executor::new();
    exec.start(&format!("which {program} 2>/dev/null"));
    match exec.result() {
        Ok(out) => out.exit_code == Some(0),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn test_check_program_finds_sh() {
        assert!(check_program("sh"));
    }

    #[cfg(unix)]
    #[test]
    fn test_check_program_absent() {
        assert!(!check_program("definitely-not-an-installed-program-5577"));
    }

    #[test]
    fn test_priority_order() {
        let mut set = HelperSet::default();
        assert_eq!(set.first_available(), None);

        set.set(Helper::Kdialog, true);
        assert_eq!(set.first_available(), Some(Helper::Kdialog));

        // zenity outranks kdialog once both are present
        set.set(Helper::Zenity, true);
        assert_eq!(set.first_available(), Some(Helper::Zenity));
    }

    #[test]
    fn test_rescan_refills_cache() {
        rescan();
        let first = installed();
        let second = installed();
        assert_eq!(first, second);
    }
}
