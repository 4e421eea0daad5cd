//! Logging utilities with colored output and progress display.
//!
//! This module provides:
//! - `log!` macro for formatted terminal output with colored prefixes
//! - `debug!` macro, printed only in verbose mode
//! - `ProgressLine` for a single-line counter display
//!
//! # Example
//!
//! ```ignore
//! log!("content"; "duplicate page {}, skipping {}", key, path);
//!
//! let progress = ProgressLine::new(&[("resources", 120)]);
//! progress.inc("resources");
//! progress.finish();
//! ```

use crossterm::{
    cursor, execute,
    terminal::{Clear, ClearType},
};
use owo_colors::OwoColorize;
use parking_lot::Mutex;
use std::{
    io::{Write, stdout},
    sync::atomic::{AtomicBool, AtomicUsize, Ordering},
};

/// Global verbose flag (set by --verbose CLI argument)
static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Set verbose mode globally
pub fn set_verbose(v: bool) {
    VERBOSE.store(v, Ordering::SeqCst);
}

/// Check if verbose mode is enabled
pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::SeqCst)
}

/// Active progress line count (for log coordination)
static BAR_COUNT: AtomicUsize = AtomicUsize::new(0);

// ============================================================================
// Log Macros
// ============================================================================

/// Log a message with a colored module prefix
///
/// # Usage
/// ```ignore
/// log!("module"; "message with {} formatting", args);
/// ```
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

/// Log a debug message (only shown when --verbose is enabled)
///
/// # Usage
/// ```ignore
/// debug!("module"; "debug info: {}", value);
/// ```
#[macro_export]
macro_rules! debug {
    ($module:expr; $($arg:tt)*) => {{
        if $crate::logger::is_verbose() {
            $crate::logger::log($module, &format!($($arg)*))
        }
    }};
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Log a message with a colored module prefix
#[inline]
#[allow(clippy::cast_possible_truncation)] // Safe: bars count is always small
pub fn log(module: &str, message: &str) {
    let prefix = colorize_prefix(module);

    let mut stdout = stdout().lock();

    let bar_count = BAR_COUNT.load(Ordering::SeqCst);
    if bar_count > 0 {
        execute!(stdout, cursor::MoveToColumn(0)).ok();
        execute!(stdout, Clear(ClearType::CurrentLine)).ok();
    } else {
        execute!(stdout, Clear(ClearType::UntilNewLine)).ok();
    }

    writeln!(stdout, "{prefix} {message}").ok();
    stdout.flush().ok();
}

/// Apply color to a module prefix based on module type
#[inline]
fn colorize_prefix(module: &str) -> String {
    let prefix = format!("[{module}]");
    match module.to_ascii_lowercase().as_str() {
        "error" => prefix.bright_red().bold().to_string(),
        "publish" => prefix.bright_green().bold().to_string(),
        "cascade" => prefix.bright_blue().bold().to_string(),
        _ => prefix.bright_yellow().bold().to_string(),
    }
}

// ============================================================================
// Progress Line (single-line counters)
// ============================================================================

/// Single-line progress display with multiple counters
///
/// Displays: `[publish] resources(42/69)`
///
/// Counters update in place. Uses `try_lock` so worker threads never block
/// on the display; a busy display skips the refresh.
pub struct ProgressLine {
    module: &'static str,
    counters: Vec<Counter>,
    lock: Mutex<()>,
}

struct Counter {
    name: &'static str,
    total: usize,
    current: AtomicUsize,
}

impl ProgressLine {
    /// Create a progress display; counters with a zero total are dropped.
    pub fn new(module: &'static str, items: &[(&'static str, usize)]) -> Self {
        let counters: Vec<_> = items
            .iter()
            .filter(|(_, total)| *total > 0)
            .map(|(name, total)| Counter {
                name,
                total: *total,
                current: AtomicUsize::new(0),
            })
            .collect();

        BAR_COUNT.store(1, Ordering::SeqCst);

        let progress = Self {
            module,
            counters,
            lock: Mutex::new(()),
        };
        progress.display(false);
        progress
    }

    /// Increment the counter with the given name.
    #[inline]
    pub fn inc(&self, name: &str) {
        if let Some(counter) = self.counters.iter().find(|c| c.name == name) {
            counter.current.fetch_add(1, Ordering::Relaxed);
            if let Some(_guard) = self.lock.try_lock() {
                self.display(false);
            }
        }
    }

    fn line(&self) -> String {
        self.counters
            .iter()
            .map(|c| format!("{}({}/{})", c.name, c.current.load(Ordering::Relaxed), c.total))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn display(&self, newline: bool) {
        let prefix = colorize_prefix(self.module);
        let mut stdout = stdout().lock();
        execute!(stdout, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine)).ok();
        if newline {
            writeln!(stdout, "{} {}", prefix, self.line()).ok();
        } else {
            write!(stdout, "{} {}", prefix, self.line()).ok();
        }
        stdout.flush().ok();
    }

    /// Finish progress display, keeping the final line.
    pub fn finish(self) {
        BAR_COUNT.store(0, Ordering::SeqCst);
        {
            let _guard = self.lock.lock();
            self.display(true);
        }
        std::mem::forget(self); // Prevent Drop from clearing
    }
}

impl Drop for ProgressLine {
    fn drop(&mut self) {
        BAR_COUNT.store(0, Ordering::SeqCst);

        let mut stdout = stdout().lock();
        execute!(stdout, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine)).ok();
        stdout.flush().ok();
    }
}
