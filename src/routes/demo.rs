//! Demo handlers.
//!
//! Two of these panic on purpose, one of them after it already wrote part of
//! its response.

use http::{HeaderValue, header};

use super::Routes;
use crate::http::{Request, ResponseSink};

/// The message our panicking handlers panic with.
pub const PANIC_MESSAGE: &str = "Oh no!";

/// Returns the demo routes.
///
/// | Path | Handler |
/// |---|---|
/// | `/panic/` | [`write_then_panic()`] |
/// | `/panic-after/` | [`panic_immediately()`] |
/// | everything else | [`hello()`] |
pub fn routes() -> Routes
{
	Routes::new()
		.route("/panic/", write_then_panic)
		.route("/panic-after/", panic_immediately)
		.route("/", hello)
}

pub fn hello(response: &mut dyn ResponseSink, _: &Request)
{
	write_hello(response);
}

/// Writes the same thing as [`hello()`], and then panics.
pub fn write_then_panic(response: &mut dyn ResponseSink, _: &Request)
{
	write_hello(response);
	panic_deep_inside();
}

pub fn panic_immediately(_: &mut dyn ResponseSink, _: &Request)
{
	panic_deep_inside();
}

fn write_hello(response: &mut dyn ResponseSink)
{
	response
		.headers_mut()
		.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/html; charset=utf-8"));

	if let Err(error) = writeln!(response, "<h1>Hello!</h1>") {
		warn!(%error, "failed to write response");
	}
}

#[inline(never)]
fn panic_deep_inside() -> !
{
	panic!("{PANIC_MESSAGE}");
}
