mod connect;
mod detect;
mod negotiate;

use std::path::Path;

use rtcgate::Settings;
use tracing::debug;

use crate::cli::{Cli, Commands};
use crate::error::Result;
use crate::output::OutputFormat;

pub use connect::{ConnectReport, ConnectionReport, UpdateOutcome};
pub use detect::DetectReport;
pub use negotiate::NegotiateReport;

pub async fn dispatch(cli: Cli, format: OutputFormat) -> Result<()> {
	let settings = load_settings(cli.config.as_deref())?;
	debug!(target = "rtcgate_cli", command = cli.command.name(), ?settings, "dispatching");

	match cli.command {
		Commands::Detect { host } => detect::execute(&host, format),
		Commands::Connect { host, spec, count } => connect::execute(&host, spec.as_deref(), count, &settings, format).await,
		Commands::Negotiate {
			host,
			media,
			extension,
			deny,
		} => negotiate::execute(&host, &media, &extension, deny, &settings, format).await,
	}
}

/// File settings (if any) with `RTCGATE_*` environment overrides applied.
pub fn load_settings(path: Option<&Path>) -> Result<Settings> {
	let settings = match path {
		Some(path) => Settings::from_file(path)?,
		None => Settings::default(),
	};
	Ok(settings.with_env_overrides()?)
}
