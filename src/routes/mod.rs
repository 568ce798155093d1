//! Path-based dispatch.

use std::fmt;

use http::{HeaderValue, StatusCode, header};

use crate::handler::Handler;
use crate::http::{Request, ResponseSink};

pub mod demo;

/// Dispatches requests to handlers by path.
///
/// A pattern ending in `/` matches every path starting with it; any other
/// pattern only matches that exact path. If several patterns match, the
/// longest one wins. Requests that match nothing get a `404 Not Found`.
///
/// There are no redirects: `/panic` is not sent to `/panic/`, it is matched
/// like any other path.
#[derive(Default)]
pub struct Routes
{
	routes: Vec<(Box<str>, Box<dyn Handler>)>,
}

impl Routes
{
	pub fn new() -> Self
	{
		Self::default()
	}

	/// Registers `handler` for `pattern`.
	///
	/// # Panics
	///
	/// This function will panic if `pattern` is empty or has already been
	/// registered.
	#[track_caller]
	pub fn route(mut self, pattern: &str, handler: impl Handler) -> Self
	{
		assert!(!pattern.is_empty(), "route patterns cannot be empty");
		assert!(
			self.routes.iter().all(|(existing, _)| **existing != *pattern),
			"route `{pattern}` has already been registered",
		);

		self.routes.push((pattern.into(), Box::new(handler)));

		// longest pattern first
		self.routes
			.sort_by(|(lhs, _), (rhs, _)| rhs.len().cmp(&lhs.len()));

		self
	}

	fn find(&self, path: &str) -> Option<&dyn Handler>
	{
		self.routes
			.iter()
			.find(|(pattern, _)| {
				if pattern.ends_with('/') {
					path.starts_with(&**pattern)
				} else {
					path == &**pattern
				}
			})
			.map(|(_, handler)| &**handler)
	}
}

impl fmt::Debug for Routes
{
	fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result
	{
		fmt.debug_list()
			.entries(self.routes.iter().map(|(pattern, _)| pattern))
			.finish()
	}
}

impl Handler for Routes
{
	fn serve(&self, response: &mut dyn ResponseSink, request: &Request)
	{
		match self.find(request.uri().path()) {
			Some(handler) => handler.serve(response, request),
			None => not_found(response),
		}
	}
}

fn not_found(response: &mut dyn ResponseSink)
{
	response
		.headers_mut()
		.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"));
	response.set_status(StatusCode::NOT_FOUND);

	if let Err(error) = response.write(b"404 page not found\n") {
		warn!(%error, "failed to write response");
	}
}
