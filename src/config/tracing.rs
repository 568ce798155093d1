use std::path::{Path, PathBuf};

use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct TracingConfig
{
	pub stderr: StderrConfig,
	pub files: FilesConfig,
}

/// Pretty logs on stderr.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct StderrConfig
{
	pub enable: bool,
	pub ansi: bool,
}

/// JSON logs in a directory, rotated daily.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct FilesConfig
{
	pub enable: bool,

	#[serde(default = "default_files_directory")]
	pub directory: Box<Path>,
}

impl Default for StderrConfig
{
	fn default() -> Self
	{
		Self { enable: true, ansi: true }
	}
}

impl Default for FilesConfig
{
	fn default() -> Self
	{
		Self { enable: Default::default(), directory: default_files_directory() }
	}
}

fn default_files_directory() -> Box<Path>
{
	PathBuf::from("/var/log/safety-net").into_boxed_path()
}
