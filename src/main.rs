//! safety-net - recoverable panics for HTTP handlers.
//! Copyright (C) 2024  AlphaKeks <alphakeks@dawn>
//!
//! This program is free software: you can redistribute it and/or modify
//! it under the terms of the GNU General Public License as published by
//! the Free Software Foundation, either version 3 of the License, or
//! (at your option) any later version.
//!
//! This program is distributed in the hope that it will be useful,
//! but WITHOUT ANY WARRANTY; without even the implied warranty of
//! MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
//! GNU General Public License for more details.
//!
//! You should have received a copy of the GNU General Public License
//! along with this program. If not, see https://www.gnu.org/licenses.

use std::backtrace::Backtrace;
use std::net::SocketAddr;
use std::panic;
use std::path::PathBuf;

use clap::Parser;
use color_eyre::Section;
use color_eyre::eyre::{self, WrapErr};
use safety_net::{Config, Server};
use tracing::Instrument;

/// A demo HTTP server whose handlers panic, and which survives it.
#[derive(Debug, Parser)]
struct Args
{
	/// Path to the configuration file.
	///
	/// If this is omitted, the defaults are used.
	#[arg(long, env = "SAFETY_NET_CONFIG", name = "FILE")]
	config: Option<PathBuf>,

	/// Use a custom `.env` file.
	#[arg(long, name = "ENV_FILE")]
	env_file: Option<PathBuf>,

	/// Override the address to listen on.
	#[arg(long, name = "ADDR")]
	listen_on: Option<SocketAddr>,

	/// Do not include panic messages and backtraces in responses.
	#[arg(long)]
	hide_diagnostics: bool,
}

fn main() -> eyre::Result<()>
{
	color_eyre::install()?;

	let args = Args::parse();

	if let Some(path) = args.env_file.as_deref() {
		dotenvy::from_filename(path).wrap_err("failed to load custom `.env` file")?;
	} else if let Err(error) = dotenvy::dotenv() {
		if !error.not_found() {
			return Err(error).wrap_err("failed to load `.env` file");
		}
	}

	let mut config = match args.config.as_deref() {
		Some(path) => Config::load_from_file(path)
			.wrap_err("failed to load configuration")
			.suggestion("create the file or run with `--config` to specify an alternative path")?,
		None => Config::default(),
	};

	if let Some(addr) = args.listen_on {
		config.http.ip_addr = addr.ip();
		config.http.port = addr.port();
	}

	if args.hide_diagnostics {
		config.recovery.expose_diagnostics = false;
	}

	let _guard = safety_net::telemetry::init(&config.tracing).wrap_err("failed to initialize tracing")?;

	let old_panic_hook = panic::take_hook();

	// Panics outside of request handlers are not caught by anything, but we
	// still want to log them.
	panic::set_hook(Box::new(move |info| {
		tracing::error_span!("runtime::panic_hook").in_scope(|| {
			let backtrace = Backtrace::force_capture();
			tracing::error! {
				target: "safety_net::panics",
				"{info}\n\nstack backtrace:\n{backtrace}",
			};
		});

		old_panic_hook(info)
	}));

	safety_net::fault::install_hook();

	let runtime = config
		.runtime
		.build_runtime()
		.wrap_err("failed to build tokio runtime")?;

	let runtime_span = tracing::info_span!("runtime");

	runtime.block_on(
		async move {
			let server = Server::bind(&config).await.wrap_err("failed to start server")?;

			server.run().await.wrap_err("failed to run server")
		}
		.instrument(runtime_span),
	)
}
