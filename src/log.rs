//! Injected logging interface
//!
//! Loading code never reaches for a global logger; callers hand a `&dyn Logger`
//! to the entry points that need one. [`TracingLogger`] forwards to `tracing`,
//! [`MemoryLogger`] keeps entries around for inspection.

use std::cell::RefCell;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
	Error,
	Warn,
	Info,
	Trace,
}

impl fmt::Display for LogLevel {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let label = match self {
			LogLevel::Error => "ERROR",
			LogLevel::Warn => "WARN",
			LogLevel::Info => "INFO",
			LogLevel::Trace => "TRACE",
		};
		f.write_str(label)
	}
}

pub trait Logger {
	/// Record one message. `target` names the component (`"model"`, `"scene"`, ...).
	fn log(&self, level: LogLevel, target: &str, message: &str);

	fn error(&self, target: &str, message: &str) {
		self.log(LogLevel::Error, target, message);
	}

	fn warn(&self, target: &str, message: &str) {
		self.log(LogLevel::Warn, target, message);
	}

	fn info(&self, target: &str, message: &str) {
		self.log(LogLevel::Info, target, message);
	}

	fn trace(&self, target: &str, message: &str) {
		self.log(LogLevel::Trace, target, message);
	}
}

/// Forwards every message to the `tracing` macros.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
	fn log(&self, level: LogLevel, target: &str, message: &str) {
		match level {
			LogLevel::Error => tracing::error!(component = target, "{}", message),
			LogLevel::Warn => tracing::warn!(component = target, "{}", message),
			LogLevel::Info => tracing::info!(component = target, "{}", message),
			LogLevel::Trace => tracing::trace!(component = target, "{}", message),
		}
	}
}

/// Drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLogger;

impl Logger for NullLogger {
	fn log(&self, _level: LogLevel, _target: &str, _message: &str) {}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
	pub level: LogLevel,
	pub target: String,
	pub message: String,
}

/// Keeps entries in memory, filtered by a maximum level.
#[derive(Debug)]
pub struct MemoryLogger {
	max_level: LogLevel,
	entries: RefCell<Vec<LogEntry>>,
}

impl Default for MemoryLogger {
	fn default() -> Self {
		Self::new(LogLevel::Trace)
	}
}

impl MemoryLogger {
	pub fn new(max_level: LogLevel) -> Self {
		Self {
			max_level,
			entries: RefCell::new(Vec::new()),
		}
	}

	pub fn entries(&self) -> Vec<LogEntry> {
		self.entries.borrow().clone()
	}

	pub fn count(&self, level: LogLevel) -> usize {
		self.entries
			.borrow()
			.iter()
			.filter(|e| e.level == level)
			.count()
	}
}

impl Logger for MemoryLogger {
	fn log(&self, level: LogLevel, target: &str, message: &str) {
		if level > self.max_level {
			return;
		}
		self.entries.borrow_mut().push(LogEntry {
			level,
			target: target.to_string(),
			message: message.to_string(),
		});
	}
}
