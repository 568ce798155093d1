//! Logging setup.
//!
//! Which events are emitted is controlled by the `RUST_LOG` environment
//! variable.

use std::{fs, io};

use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::config::TracingConfig;

/// Keeps the log file writer alive.
///
/// Logs written after this is dropped may be lost.
#[must_use = "dropping the guard stops file logging"]
#[derive(Debug)]
pub struct Guard
{
	_files_guard: Option<tracing_appender::non_blocking::WorkerGuard>,
}

/// Installs the global tracing subscriber.
///
/// # Panics
///
/// This function will panic if a global subscriber has already been set.
pub fn init(config: &TracingConfig) -> io::Result<Guard>
{
	let stderr_layer = config.stderr.enable.then(|| {
		tracing_subscriber::fmt::layer()
			.pretty()
			.with_ansi(config.stderr.ansi)
			.with_timer(UtcTime::rfc_3339())
			.with_writer(io::stderr)
	});

	let (files_layer, files_guard) = config
		.files
		.enable
		.then(|| -> io::Result<_> {
			fs::create_dir_all(&*config.files.directory)?;

			let directory = config.files.directory.canonicalize()?;
			let (writer, guard) = tracing_appender::rolling::Builder::default()
				.rotation(tracing_appender::rolling::Rotation::DAILY)
				.filename_prefix("safety-net")
				.filename_suffix("log")
				.build(directory)
				.map(tracing_appender::non_blocking)
				.map_err(io::Error::other)?;

			let layer = tracing_subscriber::fmt::layer()
				.json()
				.with_file(false)
				.with_line_number(false)
				.with_span_list(true)
				.with_writer(writer)
				.with_timer(UtcTime::rfc_3339());

			Ok((layer, guard))
		})
		.transpose()?
		.unzip();

	tracing_subscriber::registry()
		.with(Layer::and_then(stderr_layer, files_layer).with_filter(EnvFilter::from_default_env()))
		.init();

	info!(files = config.files.enable, "initialized tracing");

	Ok(Guard { _files_guard: files_guard })
}
