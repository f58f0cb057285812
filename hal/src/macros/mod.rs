//! ARC HAL Macros
//!
//! Debug output for the HAL. Messages go through the `log` facade so the
//! embedding kernel decides where they end up (UART, ring buffer, nothing).
//! Levels follow `DebugLevel`; the level token is written first:
//!
//! ```ignore
//! debug_print!(INFO, "SCM version {}", version);
//! ```

#![deny(missing_docs)]

/// Debug output levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum DebugLevel {
    /// Error messages - always shown
    Error = 0,
    /// Warning messages
    Warning = 1,
    /// Information messages
    Info = 2,
    /// Debug messages
    Debug = 3,
    /// Trace messages - most verbose
    Trace = 4,
}

impl From<DebugLevel> for log::Level {
    fn from(level: DebugLevel) -> Self {
        match level {
            DebugLevel::Error => Self::Error,
            DebugLevel::Warning => Self::Warn,
            DebugLevel::Info => Self::Info,
            DebugLevel::Debug => Self::Debug,
            DebugLevel::Trace => Self::Trace,
        }
    }
}

/// Print a HAL debug message at the given level
#[macro_export]
macro_rules! debug_print {
    (ERROR, $($arg:tt)*) => {
        $crate::debug_print!(@emit $crate::macros::DebugLevel::Error, $($arg)*)
    };
    (WARN, $($arg:tt)*) => {
        $crate::debug_print!(@emit $crate::macros::DebugLevel::Warning, $($arg)*)
    };
    (INFO, $($arg:tt)*) => {
        $crate::debug_print!(@emit $crate::macros::DebugLevel::Info, $($arg)*)
    };
    (DEBUG, $($arg:tt)*) => {
        $crate::debug_print!(@emit $crate::macros::DebugLevel::Debug, $($arg)*)
    };
    (TRACE, $($arg:tt)*) => {
        $crate::debug_print!(@emit $crate::macros::DebugLevel::Trace, $($arg)*)
    };
    (@emit $level:expr, $($arg:tt)*) => {
        $crate::log::log!(target: "arc_hal", $crate::log::Level::from($level), "[HAL] {}", format_args!($($arg)*))
    };
}
