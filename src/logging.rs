use anyhow::{anyhow, Context, Result};
use crate::config::LoggingConfig;

/// Installs the global logger: everything at or above the configured level goes to stderr, and to the log file if
/// one is configured.
///
/// Fails if a logger was already installed.
pub fn setup(config: &LoggingConfig) -> Result<()> {
	let mut dispatch = fern::Dispatch::new()
		.format(|out, message, record| {
			out.finish(format_args!("[{} {}] {}", record.level(), record.target(), message))
		})
		.level(config.level_filter()?)
		.chain(std::io::stderr());

	if let Some(path) = &config.file {
		let file = fern::log_file(path)
			.with_context(|| anyhow!("failed to open log file {path:?}"))?;
		dispatch = dispatch.chain(file);
	}

	dispatch.apply()
		.context("failed to install the logger")
}
