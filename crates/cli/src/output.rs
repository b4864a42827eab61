//! Result envelope printed by every command.
//!
//! ```json
//! { "schemaVersion": 1, "ok": true, "command": "detect", "data": { ... } }
//! ```
//!
//! On failure `data` is absent and `error` carries a stable code:
//!
//! ```json
//! { "schemaVersion": 1, "ok": false, "command": "connect",
//!   "error": { "code": "UNSUPPORTED_RUNTIME", "message": "..." } }
//! ```

use std::fmt;
use std::io::{self, Write};

use colored::Colorize;
use serde::{Deserialize, Serialize};

/// Bumped on breaking changes to the envelope.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
	/// Pretty-printed JSON envelope
	#[default]
	Json,
	/// Human-readable summary
	Text,
}

impl fmt::Display for OutputFormat {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			OutputFormat::Json => write!(f, "json"),
			OutputFormat::Text => write!(f, "text"),
		}
	}
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResult<T: Serialize> {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub schema_version: Option<u32>,

	pub ok: bool,

	/// Subcommand name ("detect", "connect", "negotiate")
	pub command: String,

	/// Only present on success
	#[serde(skip_serializing_if = "Option::is_none")]
	pub data: Option<T>,

	/// Only present on failure
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<CommandError>,

	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandError {
	pub code: ErrorCode,
	pub message: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub details: Option<serde_json::Value>,
}

/// Stable error codes for scripts consuming the envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
	/// The host runtime has no peer-connection stack
	UnsupportedRuntime,
	/// No adapter is registered for the selected family, or it failed to build
	StackUnavailable,
	/// The extension answered without a stream id
	ScreenAccessDenied,
	/// The extension could not be reached
	PluginUnavailable,
	/// The capability API rejected the request
	CapabilityRejected,
	/// Malformed argument or JSON payload
	InvalidInput,
	/// Settings file missing or invalid
	ConfigError,
	InternalError,
}

impl fmt::Display for ErrorCode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let s = match self {
			ErrorCode::UnsupportedRuntime => "UNSUPPORTED_RUNTIME",
			ErrorCode::StackUnavailable => "STACK_UNAVAILABLE",
			ErrorCode::ScreenAccessDenied => "SCREEN_ACCESS_DENIED",
			ErrorCode::PluginUnavailable => "PLUGIN_UNAVAILABLE",
			ErrorCode::CapabilityRejected => "CAPABILITY_REJECTED",
			ErrorCode::InvalidInput => "INVALID_INPUT",
			ErrorCode::ConfigError => "CONFIG_ERROR",
			ErrorCode::InternalError => "INTERNAL_ERROR",
		};
		f.write_str(s)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticLevel {
	Info,
	Warning,
	Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
	pub level: DiagnosticLevel,
	pub message: String,
}

pub struct ResultBuilder<T: Serialize> {
	command: String,
	data: Option<T>,
	error: Option<CommandError>,
	diagnostics: Vec<Diagnostic>,
}

impl<T: Serialize> ResultBuilder<T> {
	pub fn new(command: impl Into<String>) -> Self {
		Self {
			command: command.into(),
			data: None,
			error: None,
			diagnostics: Vec::new(),
		}
	}

	pub fn data(mut self, data: T) -> Self {
		self.data = Some(data);
		self
	}

	pub fn error(mut self, error: CommandError) -> Self {
		self.error = Some(error);
		self
	}

	pub fn diagnostic(mut self, level: DiagnosticLevel, message: impl Into<String>) -> Self {
		self.diagnostics.push(Diagnostic {
			level,
			message: message.into(),
		});
		self
	}

	pub fn build(self) -> CommandResult<T> {
		CommandResult {
			schema_version: Some(SCHEMA_VERSION),
			ok: self.error.is_none() && self.data.is_some(),
			command: self.command,
			data: self.data,
			error: self.error,
			diagnostics: self.diagnostics,
		}
	}
}

pub fn print_result<T: Serialize>(result: &CommandResult<T>, format: OutputFormat) {
	match format {
		OutputFormat::Json => {
			if let Ok(json) = serde_json::to_string_pretty(result) {
				println!("{json}");
			}
		}
		OutputFormat::Text => print_result_text(result),
	}
}

fn print_result_text<T: Serialize>(result: &CommandResult<T>) {
	let mut stdout = io::stdout().lock();

	if result.ok {
		let _ = writeln!(stdout, "{} {}", "ok".green().bold(), result.command);
		if let Some(data) = result.data.as_ref().and_then(|d| serde_json::to_value(d).ok()) {
			write_fields(&mut stdout, &data);
		}
	} else if let Some(ref error) = result.error {
		let _ = writeln!(stdout, "{} [{}]: {}", "error".red().bold(), error.code, error.message);
	}

	for diag in &result.diagnostics {
		let prefix = match diag.level {
			DiagnosticLevel::Info => "info".cyan(),
			DiagnosticLevel::Warning => "warning".yellow(),
			DiagnosticLevel::Error => "error".red(),
		};
		let _ = writeln!(stdout, "[{prefix}] {}", diag.message);
	}
}

fn write_fields(out: &mut impl Write, data: &serde_json::Value) {
	match data.as_object() {
		Some(fields) => {
			for (key, value) in fields {
				let rendered = match value {
					serde_json::Value::String(s) => s.clone(),
					other => other.to_string(),
				};
				let _ = writeln!(out, "  {}: {rendered}", key.bold());
			}
		}
		None => {
			let _ = writeln!(out, "  {data}");
		}
	}
}

pub fn print_error_stderr(error: &CommandError) {
	eprintln!("{} [{}]: {}", "error".red().bold(), error.code, error.message);
}
