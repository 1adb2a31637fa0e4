//! Explicitly passed logging capability.
//!
//! Components never reach for a global logger; they log through the [`Logger`] carried by
//! [`Context`](crate::auth::Context) so tests can capture diagnostics with [`MemoryLogger`].

// self
use crate::_prelude::*;

/// Severity attached to a log entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
	/// Diagnostic detail.
	Debug,
	/// Informational message.
	Info,
	/// Recoverable problem.
	Warn,
	/// Failure.
	Error,
}

/// Structured key/value attached to a log entry.
#[derive(Clone, Copy)]
pub struct Field<'a> {
	/// Field name.
	pub key: &'static str,
	/// Field value.
	pub value: &'a dyn Display,
}
impl<'a> Field<'a> {
	/// Creates a new field.
	pub fn new(key: &'static str, value: &'a dyn Display) -> Self {
		Self { key, value }
	}
}
impl Debug for Field<'_> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "{}={}", self.key, self.value)
	}
}

/// Minimal logging interface consumed by the resolver and providers.
pub trait Logger
where
	Self: Send + Sync,
{
	/// Emits one entry.
	fn log(&self, level: Level, message: &str, fields: &[Field<'_>]);

	/// Emits a debug-level entry.
	fn debug(&self, message: &str, fields: &[Field<'_>]) {
		self.log(Level::Debug, message, fields);
	}
}

/// Logger that discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopLogger;
impl Logger for NoopLogger {
	fn log(&self, _level: Level, _message: &str, _fields: &[Field<'_>]) {}
}

/// Logger that forwards entries to `tracing` events under the `depot_client` target.
#[cfg(feature = "tracing")]
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingLogger;
#[cfg(feature = "tracing")]
impl Logger for TracingLogger {
	fn log(&self, level: Level, message: &str, fields: &[Field<'_>]) {
		let fields = render_fields(fields);

		match level {
			Level::Debug => tracing::debug!(target: "depot_client", %fields, "{message}"),
			Level::Info => tracing::info!(target: "depot_client", %fields, "{message}"),
			Level::Warn => tracing::warn!(target: "depot_client", %fields, "{message}"),
			Level::Error => tracing::error!(target: "depot_client", %fields, "{message}"),
		}
	}
}

/// A captured log entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogEntry {
	/// Entry severity.
	pub level: Level,
	/// Entry message.
	pub message: String,
	/// Rendered fields in emission order.
	pub fields: Vec<(String, String)>,
}
impl LogEntry {
	/// Returns the rendered value of `key`, if present.
	pub fn field(&self, key: &str) -> Option<&str> {
		self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
	}
}

/// Logger that keeps entries in memory; clones share the same buffer.
#[derive(Clone, Debug, Default)]
pub struct MemoryLogger {
	entries: Arc<Mutex<Vec<LogEntry>>>,
}
impl MemoryLogger {
	/// Returns a snapshot of every captured entry.
	pub fn entries(&self) -> Vec<LogEntry> {
		self.entries.lock().clone()
	}

	/// Returns captured messages in order.
	pub fn messages(&self) -> Vec<String> {
		self.entries.lock().iter().map(|e| e.message.clone()).collect()
	}
}
impl Logger for MemoryLogger {
	fn log(&self, level: Level, message: &str, fields: &[Field<'_>]) {
		let fields = fields.iter().map(|f| (f.key.to_owned(), f.value.to_string())).collect();

		self.entries.lock().push(LogEntry { level, message: message.to_owned(), fields });
	}
}

/// Returns the logger used when callers do not supply one.
pub fn default_logger() -> Arc<dyn Logger> {
	#[cfg(feature = "tracing")]
	{
		Arc::new(TracingLogger)
	}
	#[cfg(not(feature = "tracing"))]
	{
		Arc::new(NoopLogger)
	}
}

#[cfg_attr(not(feature = "tracing"), allow(dead_code))]
fn render_fields(fields: &[Field<'_>]) -> String {
	fields.iter().map(|f| format!("{}={}", f.key, f.value)).collect::<Vec<_>>().join(" ")
}
