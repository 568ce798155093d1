//! Server configuration.
//!
//! This is loaded from a TOML file on startup. Every field has a default, so
//! an empty file (or no file at all) is a valid configuration.

#![allow(
	missing_copy_implementations,
	reason = "configs won't be copied around"
)]

mod http;
mod recovery;
mod runtime;
mod tracing;

use std::path::{Path, PathBuf};
use std::{fs, io};

use serde::Deserialize;

pub use self::http::HttpConfig;
pub use self::recovery::RecoveryConfig;
pub use self::runtime::RuntimeConfig;
pub use self::tracing::{FilesConfig, StderrConfig, TracingConfig};

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct Config
{
	pub runtime: RuntimeConfig,
	pub http: HttpConfig,
	pub recovery: RecoveryConfig,
	pub tracing: TracingConfig,
}

/// Errors returned by [`Config::load_from_file()`].
#[derive(Debug, thiserror::Error)]
pub enum LoadError
{
	#[error("failed to read configuration file at {path:?}: {source}")]
	Read
	{
		path: PathBuf,
		source: io::Error,
	},

	#[error("failed to parse configuration file: {0}")]
	Parse(#[from] toml::de::Error),
}

impl Config
{
	pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, LoadError>
	{
		let path = path.as_ref();
		let file = fs::read_to_string(path)
			.map_err(|source| LoadError::Read { path: path.to_owned(), source })?;

		Ok(toml::from_str(&file)?)
	}
}
