//! Request spans.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::time::Duration;

use axum::extract::ConnectInfo;
use axum::response::IntoResponse;
use axum::routing::Route;
use tower_http::classify::ServerErrorsFailureClass;
use tower_http::request_id::RequestId;
use tower_http::trace::TraceLayer;

pub(crate) fn layer() -> impl tower::Layer<
	Route,
	Service: tower::Service<
		crate::http::Request,
		Response: IntoResponse + 'static,
		Error: Into<Infallible> + 'static,
		Future: Send + 'static,
	> + Clone
	             + Send
	             + Sync
	             + 'static,
> + Clone
       + Send
       + Sync
       + 'static
{
	TraceLayer::new_for_http()
		.make_span_with(make_span)
		.on_response(on_response)
		.on_failure(on_failure)
}

fn make_span(request: &crate::http::Request) -> tracing::Span
{
	let span = info_span! {
		target: "safety_net::http",
		"request",
		request.id = tracing::field::Empty,
		request.peer_addr = tracing::field::Empty,
		request.method = %request.method(),
		request.uri = %request.uri(),
		response.status = tracing::field::Empty,
		latency = tracing::field::Empty,
	};

	if let Some(request_id) = request
		.extensions()
		.get::<RequestId>()
		.and_then(|request_id| request_id.header_value().to_str().ok())
	{
		span.record("request.id", request_id);
	}

	if let Some(ConnectInfo(peer_addr)) = request.extensions().get::<ConnectInfo<SocketAddr>>() {
		span.record("request.peer_addr", format_args!("{peer_addr}"));
	}

	span
}

fn on_response(response: &crate::http::Response, latency: Duration, span: &tracing::Span)
{
	span.record("response.status", format_args!("{}", response.status()))
		.record("latency", format_args!("{latency:?}"));

	debug!(target: "safety_net::http", "finished processing request");
}

fn on_failure(failure: ServerErrorsFailureClass, _latency: Duration, _span: &tracing::Span)
{
	match failure {
		ServerErrorsFailureClass::Error(error) => {
			error!(target: "safety_net::http", %error, "error occurred during request");
		},
		ServerErrorsFailureClass::StatusCode(status) => {
			error!(target: "safety_net::http", %status, "request failed");
		},
	}
}
