use rtcgate::{HostProbe, RuntimeTag, StackFamily, detect_runtime};
use serde::Serialize;

use crate::cli::HostArgs;
use crate::error::Result;
use crate::output::{DiagnosticLevel, OutputFormat, ResultBuilder, print_result};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectReport {
	pub runtime: RuntimeTag,
	pub browser: bool,
	pub family: Option<StackFamily>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub user_agent: Option<String>,
}

impl DetectReport {
	pub fn for_host(host: &impl HostProbe) -> Self {
		let runtime = detect_runtime(host);
		Self {
			runtime,
			browser: runtime.is_browser(),
			family: runtime.stack_family(),
			user_agent: host.user_agent(),
		}
	}
}

pub fn execute(host: &HostArgs, format: OutputFormat) -> Result<()> {
	let report = DetectReport::for_host(&host.probe());

	let mut builder = ResultBuilder::new("detect");
	if report.family.is_none() {
		builder = builder.diagnostic(
			DiagnosticLevel::Warning,
			format!("runtime '{}' has no peer-connection stack", report.runtime),
		);
	}
	print_result(&builder.data(report).build(), format);
	Ok(())
}
