//! A minimal, zero-dependency logging crate for the Strata project.
//!
//! Provides thread-safe leveled logging with automatic module-path capture
//! and colored stderr output. The level can be set programmatically or
//! from the `STRATA_LOG` environment variable.
//!
//! # Example
//!
//! ```
//! use strata_log::{debug, info, Level};
//!
//! strata_log::set_level(Level::Debug);
//!
//! let scope = "kernel_main";
//! info!("inferring regions for {}", scope);
//! debug!("constraint set size: {}", 17);
//! ```

use std::fmt::Arguments;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicU8, Ordering};

/// Environment variable consulted by [`init_from_env`].
pub const LEVEL_ENV_VAR: &str = "STRATA_LOG";

/// Log levels, ordered from most severe (Error) to most verbose (Trace).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    /// Critical failures
    Error = 0,
    /// Potentially harmful situations
    Warn = 1,
    /// Informational messages
    Info = 2,
    /// Diagnostic detail
    Debug = 3,
    /// Per-step tracing
    Trace = 4,
}

impl Level {
    /// Returns the ANSI color code for this level.
    const fn color_code(&self) -> &'static str {
        match self {
            Level::Error => "\x1b[31m", // Red
            Level::Warn => "\x1b[33m",  // Yellow
            Level::Info => "\x1b[32m",  // Green
            Level::Debug => "\x1b[36m", // Cyan
            Level::Trace => "\x1b[35m", // Magenta
        }
    }

    /// Returns the display name of this level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Level::Error => "ERROR",
            Level::Warn => "WARN",
            Level::Info => "INFO",
            Level::Debug => "DEBUG",
            Level::Trace => "TRACE",
        }
    }

    /// Parses a level name, case-insensitively.
    ///
    /// # Example
    ///
    /// ```
    /// use strata_log::Level;
    ///
    /// assert_eq!(Level::parse("debug"), Some(Level::Debug));
    /// assert_eq!(Level::parse("WARN"), Some(Level::Warn));
    /// assert_eq!(Level::parse("loud"), None);
    /// ```
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "ERROR" => Some(Level::Error),
            "WARN" => Some(Level::Warn),
            "INFO" => Some(Level::Info),
            "DEBUG" => Some(Level::Debug),
            "TRACE" => Some(Level::Trace),
            _ => None,
        }
    }
}

/// The global logger.
///
/// Holds only the minimum level, as an atomic so any thread may adjust it.
pub struct Logger {
    level: AtomicU8,
}

impl Logger {
    const fn new(level: Level) -> Self {
        Logger {
            level: AtomicU8::new(level as u8),
        }
    }

    /// Sets the minimum level; messages below it are dropped.
    pub fn set_level(&self, level: Level) {
        self.level.store(level as u8, Ordering::SeqCst);
    }

    /// Returns the current minimum level.
    pub fn level(&self) -> Level {
        match self.level.load(Ordering::Relaxed) {
            0 => Level::Error,
            1 => Level::Warn,
            2 => Level::Info,
            3 => Level::Debug,
            _ => Level::Trace,
        }
    }

    /// Returns true if a message at `level` would be emitted.
    pub fn enabled(&self, level: Level) -> bool {
        level as u8 <= self.level.load(Ordering::Relaxed)
    }
}

static LOGGER: OnceLock<Logger> = OnceLock::new();

/// Returns the global logger, initializing it at `Level::Warn` on first
/// use.
pub fn get_logger() -> &'static Logger {
    LOGGER.get_or_init(|| Logger::new(Level::Warn))
}

/// Sets the minimum level of the global logger.
pub fn set_level(level: Level) {
    get_logger().set_level(level);
}

/// Configures the global logger from the `STRATA_LOG` environment
/// variable.
///
/// Unset or unrecognized values leave the level unchanged. Returns the
/// level in effect afterwards.
///
/// # Example
///
/// ```
/// // STRATA_LOG=trace ./stratac ...
/// let level = strata_log::init_from_env();
/// ```
pub fn init_from_env() -> Level {
    if let Ok(value) = std::env::var(LEVEL_ENV_VAR)
        && let Some(level) = Level::parse(&value)
    {
        set_level(level);
    }
    get_logger().level()
}

/// Emits a formatted record. Called by the macros after the level check.
#[doc(hidden)]
pub fn __log_with_target(level: Level, target: &str, args: Arguments) {
    static RESET: &str = "\x1b[0m";

    if !get_logger().enabled(level) {
        return;
    }

    let color = level.color_code();
    let level_str = level.as_str();

    eprintln!("{color}[{level_str}]{RESET} {target}: {args}");
}

/// The primary logging macro; captures the calling module path.
///
/// # Example
///
/// ```
/// use strata_log::{log, Level};
///
/// log!(level: Level::Info, "solved {} constraints", 42);
/// ```
#[macro_export]
macro_rules! log {
    (level: $level:expr, $($arg:tt)*) => {
        {
            if $crate::get_logger().enabled($level) {
                $crate::__log_with_target(
                    $level,
                    module_path!(),
                    format_args!($($arg)*)
                );
            }
        }
    };
}

/// Logs at the Error level.
#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::log!(level: $crate::Level::Error, $($arg)*)
    };
}

/// Logs at the Warn level.
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::log!(level: $crate::Level::Warn, $($arg)*)
    };
}

/// Logs at the Info level.
#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        $crate::log!(level: $crate::Level::Info, $($arg)*)
    };
}

/// Logs at the Debug level.
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {
        $crate::log!(level: $crate::Level::Debug, $($arg)*)
    };
}

/// Logs at the Trace level.
#[macro_export]
macro_rules! trace {
    ($($arg:tt)*) => {
        $crate::log!(level: $crate::Level::Trace, $($arg)*)
    };
}
