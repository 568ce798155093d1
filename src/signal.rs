use std::error::Error;
use std::future;

/// Resolves once the OS asks us to shut down.
pub(crate) async fn shutdown()
{
	tokio::select! {
		() = sigint() => {},
		() = platform_specific_shutdown() => {},
	}
}

async fn sigint()
{
	match tokio::signal::ctrl_c().await {
		Ok(()) => warn!("received SIGINT"),
		Err(err) => {
			error!(error = &err as &dyn Error, "failed listening for SIGINT");
			future::pending().await
		},
	}
}

#[cfg(unix)]
async fn platform_specific_shutdown()
{
	use tokio::signal::unix::{SignalKind, signal};

	match signal(SignalKind::terminate()) {
		Ok(mut signal) => match signal.recv().await {
			Some(()) => warn!("received SIGTERM"),
			None => {
				warn!("cannot receive more SIGTERM signals");
				future::pending().await
			},
		},
		Err(err) => {
			error!(error = &err as &dyn Error, "failed listening for SIGTERM");
			future::pending().await
		},
	}
}

#[cfg(not(unix))]
async fn platform_specific_shutdown()
{
	future::pending().await
}
