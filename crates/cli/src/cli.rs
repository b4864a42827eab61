use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::output::OutputFormat;
use crate::styles::cli_styles;

#[derive(Parser, Debug)]
#[command(name = "rtcgate")]
#[command(about = "Inspect runtime detection, stack selection, and media negotiation")]
#[command(version)]
#[command(styles = cli_styles())]
pub struct Cli {
	/// Increase verbosity (-v info, -vv debug)
	#[arg(short, long, global = true, action = clap::ArgAction::Count)]
	pub verbose: u8,

	/// Output format
	#[arg(short = 'f', long, global = true, value_enum, default_value = "json")]
	pub format: OutputFormat,

	/// Settings file (JSON); RTCGATE_* environment variables override it
	#[arg(long, global = true, value_name = "FILE")]
	pub config: Option<PathBuf>,

	#[command(subcommand)]
	pub command: Commands,
}

/// The simulated host.
#[derive(Args, Debug, Clone, Default)]
pub struct HostArgs {
	/// Browser user-agent string to classify (omit for a browser that reports none)
	#[arg(long, value_name = "UA", conflicts_with = "headless")]
	pub user_agent: Option<String>,

	/// Simulate a non-browser host
	#[arg(long)]
	pub headless: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
	/// Classify the host and show which stack family it maps to
	Detect {
		#[command(flatten)]
		host: HostArgs,
	},

	/// Build connections against dry-run adapters
	Connect {
		#[command(flatten)]
		host: HostArgs,

		/// Connection spec as JSON
		#[arg(long, value_name = "JSON")]
		spec: Option<String>,

		/// Number of connections to build
		#[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
		count: u32,
	},

	/// Negotiate a media request against a recording capability API
	Negotiate {
		#[command(flatten)]
		host: HostArgs,

		/// Media request as JSON, e.g. '{"screen": true}'
		#[arg(long, value_name = "JSON")]
		media: String,

		#[command(flatten)]
		extension: ExtensionArgs,

		/// Make the capability API reject with this error name
		#[arg(long, value_name = "NAME")]
		deny: Option<String>,
	},
}

impl Commands {
	pub fn name(&self) -> &'static str {
		match self {
			Commands::Detect { .. } => "detect",
			Commands::Connect { .. } => "connect",
			Commands::Negotiate { .. } => "negotiate",
		}
	}
}

/// How the simulated screen-capture extension behaves.
#[derive(Args, Debug, Clone, Default)]
#[group(multiple = false)]
pub struct ExtensionArgs {
	/// Extension answers with this desktop stream id
	#[arg(long, value_name = "ID")]
	pub extension_reply: Option<String>,

	/// Extension answers without a stream id
	#[arg(long)]
	pub extension_silent: bool,

	/// Extension cannot be reached (default)
	#[arg(long)]
	pub extension_unreachable: bool,
}
