//! The HTTP server.

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tower::Layer;

use crate::config::{Config, RecoveryConfig};
use crate::handler::HandlerService;
use crate::middleware::{self, RecoverLayer};
use crate::routes;

/// A bound, but not yet running, HTTP server.
#[derive(Debug)]
pub struct Server
{
	listener: TcpListener,
	router: axum::Router,
	shutdown_timeout: Duration,
}

/// Errors returned by [`Server`].
#[derive(Debug, thiserror::Error)]
pub enum RunError
{
	/// We failed to bind the TCP listener.
	#[error("failed to bind to {addr}: {source}")]
	Bind
	{
		addr: SocketAddr,
		source: io::Error,
	},

	/// The server itself failed.
	#[error("failed to serve http requests: {0}")]
	Serve(#[source] io::Error),

	/// Some other I/O failure.
	#[error(transparent)]
	Io(#[from] io::Error),
}

/// Returns the top-level router.
///
/// Every request is dispatched to the demo routes, behind [`RecoverLayer`].
pub fn router(config: &RecoveryConfig) -> axum::Router
{
	let handler = RecoverLayer::new()
		.expose_diagnostics(config.expose_diagnostics)
		.layer(routes::demo::routes());

	axum::Router::new()
		.fallback_service(HandlerService::new(handler))
		.layer(middleware::trace::layer())
		.layer(middleware::request_id::propagate_layer())
		.layer(middleware::request_id::set_layer())
}

impl Server
{
	/// Binds to the configured address.
	pub async fn bind(config: &Config) -> Result<Self, RunError>
	{
		let addr = config.http.socket_addr();
		let listener = TcpListener::bind(addr)
			.await
			.map_err(|source| RunError::Bind { addr, source })?;

		if !config.recovery.expose_diagnostics {
			debug!("panic diagnostics will not be included in responses");
		}

		Ok(Self {
			listener,
			router: router(&config.recovery),
			shutdown_timeout: config.http.shutdown_timeout,
		})
	}

	/// The address we're actually listening on.
	pub fn local_addr(&self) -> io::Result<SocketAddr>
	{
		self.listener.local_addr()
	}

	/// Serves requests until we receive SIGINT or SIGTERM.
	pub async fn run(self) -> Result<(), RunError>
	{
		self.run_until(crate::signal::shutdown()).await
	}

	/// Serves requests until `shutdown` resolves.
	///
	/// In-flight requests get [`shutdown-timeout`] to finish afterwards.
	///
	/// [`shutdown-timeout`]: crate::config::HttpConfig::shutdown_timeout
	pub async fn run_until<F>(self, shutdown: F) -> Result<(), RunError>
	where
		F: Future<Output = ()> + Send + 'static,
	{
		let Self { listener, router, shutdown_timeout } = self;
		let addr = listener.local_addr()?;
		let (shutdown_tx, shutdown_rx) = oneshot::channel();
		let service = router.into_make_service_with_connect_info::<SocketAddr>();

		info!(%addr, "listening for http requests");

		let serve = axum::serve(listener, service)
			.with_graceful_shutdown(async move {
				shutdown.await;
				let _ = shutdown_tx.send(());
			})
			.into_future();

		tokio::pin!(serve);

		tokio::select! {
			result = &mut serve => return result.map_err(RunError::Serve),
			Ok(()) = shutdown_rx => {},
		}

		warn!(timeout = ?shutdown_timeout, "waiting for in-flight requests");

		match tokio::time::timeout(shutdown_timeout, serve).await {
			Ok(result) => result.map_err(RunError::Serve),
			Err(_elapsed) => {
				warn!("in-flight requests did not finish in time");
				Ok(())
			},
		}
	}
}

#[cfg(test)]
mod tests
{
	use http::StatusCode;
	use tower::ServiceExt;

	use super::*;
	use crate::http::{Body, Request};
	use crate::middleware::recover::FAULT_MESSAGE;
	use crate::testing;

	fn get(path: &str) -> testing::Result<Request>
	{
		Ok(http::Request::builder().uri(path).body(Body::empty())?)
	}

	#[tokio::test]
	async fn hello() -> testing::Result
	{
		let response = router(&RecoveryConfig::default()).oneshot(get("/")?).await?;

		testing::assert_eq!(response.status(), StatusCode::OK);
		testing::assert_eq!(
			response.headers()[http::header::CONTENT_TYPE],
			"text/html; charset=utf-8"
		);
		testing::assert!(response.headers().contains_key("x-request-id"));
		testing::assert_eq!(testing::collect_body(response).await?, "<h1>Hello!</h1>\n");

		Ok(())
	}

	#[tokio::test]
	async fn panic_after_write() -> testing::Result
	{
		let response = router(&RecoveryConfig::default())
			.oneshot(get("/panic/")?)
			.await?;

		testing::assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
		testing::assert!(response.headers().contains_key("x-request-id"));

		let body = testing::collect_body(response).await?;
		let body = std::str::from_utf8(&body)?;

		testing::assert!(body.starts_with(FAULT_MESSAGE));
		testing::assert!(body.contains(routes::demo::PANIC_MESSAGE));
		testing::assert!(!body.contains("Hello!"));

		Ok(())
	}

	#[tokio::test]
	async fn panic_without_write() -> testing::Result
	{
		let config = RecoveryConfig { expose_diagnostics: false };
		let router = router(&config);
		let after_write = router.clone().oneshot(get("/panic/")?).await?;
		let immediately = router.oneshot(get("/panic-after/")?).await?;

		testing::assert_eq!(after_write.status(), StatusCode::INTERNAL_SERVER_ERROR);
		testing::assert_eq!(immediately.status(), StatusCode::INTERNAL_SERVER_ERROR);
		testing::assert_eq!(
			testing::collect_body(after_write).await?,
			testing::collect_body(immediately).await?
		);

		Ok(())
	}

	#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
	async fn panics_do_not_affect_other_requests() -> testing::Result
	{
		let router = router(&RecoveryConfig::default());
		let mut tasks = tokio::task::JoinSet::new();

		for idx in 0..64 {
			let router = router.clone();
			let path = match idx % 3 {
				0 => "/",
				1 => "/panic/",
				_ => "/panic-after/",
			};

			tasks.spawn(async move {
				let response = router.oneshot(get(path)?).await?;
				testing::Result::<_>::Ok((path, response.status(), testing::collect_body(response).await?))
			});
		}

		while let Some(result) = tasks.join_next().await {
			let (path, status, body) = result??;

			if path == "/" {
				testing::assert_eq!(status, StatusCode::OK);
				testing::assert_eq!(body, "<h1>Hello!</h1>\n");
			} else {
				testing::assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{path}");
			}
		}

		let response = router.oneshot(get("/")?).await?;

		testing::assert_eq!(response.status(), StatusCode::OK);

		Ok(())
	}
}
