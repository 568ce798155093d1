//! Recovering from panicking handlers.
//!
//! [`Recover`] wraps a [`Handler`] and runs it against a [`BufferedResponse`]
//! instead of the real response. If the handler returns normally, the buffered
//! output is committed. If it panics, the buffered output is thrown away and a
//! `500 Internal Server Error` is written to the real response instead.

use http::{HeaderValue, StatusCode, header};

use crate::fault::{self, Fault};
use crate::handler::Handler;
use crate::http::{BufferedResponse, Request, ResponseSink};

/// The body line every panic response starts with.
pub const FAULT_MESSAGE: &str = "Something went wrong!\n";

/// A [`tower::Layer`] producing [`Recover`] handlers.
#[derive(Debug, Clone, Copy)]
pub struct RecoverLayer
{
	expose_diagnostics: bool,
}

impl RecoverLayer
{
	pub fn new() -> Self
	{
		Self { expose_diagnostics: true }
	}

	/// Whether panic messages and backtraces should be included in the
	/// response body.
	pub fn expose_diagnostics(self, expose_diagnostics: bool) -> Self
	{
		Self { expose_diagnostics }
	}
}

impl Default for RecoverLayer
{
	fn default() -> Self
	{
		Self::new()
	}
}

impl<H> tower::Layer<H> for RecoverLayer
{
	type Service = Recover<H>;

	fn layer(&self, handler: H) -> Self::Service
	{
		Recover::new(handler).expose_diagnostics(self.expose_diagnostics)
	}
}

/// A [`Handler`] that turns panics in the wrapped handler into error
/// responses.
#[derive(Debug, Clone)]
pub struct Recover<H>
{
	handler: H,
	expose_diagnostics: bool,
}

impl<H> Recover<H>
{
	/// Wraps `handler`.
	///
	/// Panic diagnostics are included in error responses by default. Use
	/// [`expose_diagnostics()`] to turn this off.
	///
	/// [`expose_diagnostics()`]: Recover::expose_diagnostics
	pub fn new(handler: H) -> Self
	{
		fault::install_hook();

		Self { handler, expose_diagnostics: true }
	}

	pub fn expose_diagnostics(self, expose_diagnostics: bool) -> Self
	{
		Self { expose_diagnostics, ..self }
	}

	fn respond_with_fault(&self, response: &mut dyn ResponseSink, fault: &Fault)
	{
		error! {
			target: "safety_net::faults",
			payload = %fault.payload(),
			location = fault.location(),
			backtrace = %fault.backtrace(),
			"request handler panicked",
		};

		let headers = response.headers_mut();

		headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"));
		headers.insert(header::X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
		headers.remove(header::CONTENT_LENGTH);

		response.set_status(StatusCode::INTERNAL_SERVER_ERROR);

		if let Err(error) = response.write_str(FAULT_MESSAGE) {
			warn!(%error, "failed to write panic response");
			return;
		}

		if !self.expose_diagnostics {
			return;
		}

		if let Err(error) = write!(response, "{fault}") {
			warn!(%error, "failed to write panic diagnostics");
		}
	}
}

impl<H: Handler> Handler for Recover<H>
{
	fn serve(&self, response: &mut dyn ResponseSink, request: &Request)
	{
		let mut buffered = BufferedResponse::new(&mut *response);

		match fault::catch(|| self.handler.serve(&mut buffered, request)) {
			Ok(()) => {
				if let Err(error) = buffered.commit() {
					warn!(%error, "failed to commit buffered response");
				}
			},
			Err(fault) => {
				drop(buffered);
				self.respond_with_fault(response, &fault);
			},
		}
	}
}
