//! The configuration, read once from a JSON file and handed to whatever needs it.
//!
//! Every field has a default, so `{}` is a complete configuration.

use std::path::{Path, PathBuf};
use anyhow::{anyhow, Context, Result};
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use quill::save::{MappingFileNameFormat, MappingSaveParameters};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
	pub logging: LoggingConfig,
	pub indexing: IndexingConfig,
	pub mappings: MappingsConfig,
}

impl Config {
	pub fn from_json_file(path: impl AsRef<Path>) -> Result<Config> {
		let path = path.as_ref();
		let string = std::fs::read_to_string(path)
			.with_context(|| anyhow!("failed to read config file {path:?}"))?;

		Config::from_json_str(&string)
			.with_context(|| anyhow!("failed to parse config file {path:?}"))
	}

	pub fn from_json_str(s: &str) -> Result<Config> {
		Ok(serde_json::from_str(s)?)
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
	/// One of `off`, `error`, `warn`, `info`, `debug` and `trace`.
	pub level: String,
	/// A file to also write the log to.
	pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
	fn default() -> Self {
		LoggingConfig {
			level: "info".to_owned(),
			file: None,
		}
	}
}

impl LoggingConfig {
	pub fn level_filter(&self) -> Result<LevelFilter> {
		self.level.parse()
			.map_err(|e| anyhow!("unknown log level {:?}: {e}", self.level))
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexingConfig {
	/// Whether to visit the classes of a pass on multiple threads.
	pub parallel: bool,
	/// Package prefixes of the platform classes, like `java/`. Such classes are never indexed, and aren't recorded
	/// as supertypes.
	pub jre_packages: Vec<String>,
}

impl Default for IndexingConfig {
	fn default() -> Self {
		IndexingConfig {
			parallel: true,
			jre_packages: vec!["java/".to_owned(), "javax/".to_owned()],
		}
	}
}

impl IndexingConfig {
	pub fn is_jre(&self, class_name: &str) -> bool {
		self.jre_packages.iter().any(|package| class_name.starts_with(package.as_str()))
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MappingsConfig {
	pub file_name_format: MappingFileNameFormat,
}

impl MappingsConfig {
	pub fn save_parameters(&self) -> MappingSaveParameters {
		MappingSaveParameters::new(self.file_name_format)
	}
}

#[cfg(test)]
mod testing {
	use anyhow::Result;
	use log::LevelFilter;
	use pretty_assertions::assert_eq;
	use quill::save::MappingFileNameFormat;
	use crate::config::Config;

	#[test]
	fn empty_object_is_the_default() -> Result<()> {
		let config = Config::from_json_str("{}")?;
		assert_eq!(config, Config::default());
		assert_eq!(config.logging.level_filter()?, LevelFilter::Info);
		assert!(config.indexing.is_jre("java/lang/String"));
		assert!(!config.indexing.is_jre("javafx/Foo"));
		Ok(())
	}

	#[test]
	fn partial_config() -> Result<()> {
		let config = Config::from_json_str(r#"{
			"logging": { "level": "trace" },
			"indexing": { "parallel": false },
			"mappings": { "file_name_format": "by_obf" }
		}"#)?;

		assert_eq!(config.logging.level_filter()?, LevelFilter::Trace);
		assert_eq!(config.logging.file, None);
		assert!(!config.indexing.parallel);
		assert_eq!(config.indexing.jre_packages, vec!["java/", "javax/"]);
		assert_eq!(config.mappings.file_name_format, MappingFileNameFormat::ByObf);

		assert!(Config::from_json_str(r#"{ "logging": { "level": "loud" } }"#)?.logging.level_filter().is_err());
		assert!(Config::from_json_str(r#"{ "mappings": { "file_name_format": "by_size" } }"#).is_err());
		Ok(())
	}
}
