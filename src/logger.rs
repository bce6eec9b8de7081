use std::sync::atomic::{AtomicU8, Ordering};

// Bitflags for log levels
pub const LOG_LEVEL_ERROR: u8 = 1;
pub const LOG_LEVEL_WARN: u8 = 2;
pub const LOG_LEVEL_TRACE: u8 = 4;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Error = 1,
    Warning = 2,
    Trace = 4,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARN",
            LogLevel::Trace => "TRACE",
        }
    }
}

// Trace is off by default; settings::verbose(true) enables it so that every
// assembled helper command is echoed before execution.
pub static GLOBAL_LOG_LEVEL: AtomicU8 = AtomicU8::new(LOG_LEVEL_ERROR | LOG_LEVEL_WARN);

/// Enable or disable the trace bit of the global log level mask.
pub fn set_verbose(enabled: bool) {
    if enabled {
        GLOBAL_LOG_LEVEL.fetch_or(LOG_LEVEL_TRACE, Ordering::Relaxed);
    } else {
        GLOBAL_LOG_LEVEL.fetch_and(!LOG_LEVEL_TRACE, Ordering::Relaxed);
    }
}

/// Whether trace logging (command echoing) is currently enabled.
pub fn is_verbose() -> bool {
    GLOBAL_LOG_LEVEL.load(Ordering::Relaxed) & LOG_LEVEL_TRACE != 0
}

/// Internal function to log a message if its level is enabled
pub fn log_internal(level: LogLevel, msg: String) {
    // Atomic check (Zero-cost if disabled)
    let current_mask = GLOBAL_LOG_LEVEL.load(Ordering::Relaxed);
    if (current_mask & (level as u8)) == 0 {
        return;
    }

    eprintln!("dialogrs: [{}] {}", level.as_str(), msg);
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        $crate::logger::log_internal($crate::logger::LogLevel::Error, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        $crate::logger::log_internal($crate::logger::LogLevel::Warning, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_trace {
    ($($arg:tt)*) => {
        $crate::logger::log_internal($crate::logger::LogLevel::Trace, format!($($arg)*))
    };
}
