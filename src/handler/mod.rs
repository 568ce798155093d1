//! Request handlers.
//!
//! A [`Handler`] receives the request and a [`ResponseSink`] to write its
//! response into. Handlers run to completion synchronously; they never yield
//! back to the runtime.

use crate::http::{Request, ResponseSink};

mod service;
pub use service::HandlerService;

/// Something that can respond to HTTP requests.
///
/// This is implemented for plain functions and closures with the right
/// signature:
///
/// ```
/// use safety_net::handler::Handler;
/// use safety_net::http::{Request, ResponseSink};
///
/// fn hello(response: &mut dyn ResponseSink, _: &Request)
/// {
///     let _ = response.write(b"hello");
/// }
///
/// fn assert_handler(_: impl Handler) {}
///
/// assert_handler(hello);
/// ```
pub trait Handler: Send + Sync + 'static
{
	/// Handles `request` by writing a response into `response`.
	fn serve(&self, response: &mut dyn ResponseSink, request: &Request);
}

impl<F> Handler for F
where
	F: Fn(&mut dyn ResponseSink, &Request) + Send + Sync + 'static,
{
	fn serve(&self, response: &mut dyn ResponseSink, request: &Request)
	{
		self(response, request);
	}
}
