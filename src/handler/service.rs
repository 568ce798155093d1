use std::convert::Infallible;
use std::future::{self, Ready};
use std::sync::Arc;
use std::task::{self, Poll};

use axum::response::IntoResponse;

use super::Handler;
use crate::http::{Request, Response, ResponseWriter};

/// A [`tower::Service`] that runs a [`Handler`].
///
/// Every request gets its own [`ResponseWriter`], which is turned into the
/// response once the handler returns.
#[derive(derive_more::Debug)]
pub struct HandlerService<H>
{
	#[debug(skip)]
	handler: Arc<H>,
}

impl<H: Handler> HandlerService<H>
{
	pub fn new(handler: H) -> Self
	{
		Self { handler: Arc::new(handler) }
	}
}

impl<H> Clone for HandlerService<H>
{
	fn clone(&self) -> Self
	{
		Self { handler: Arc::clone(&self.handler) }
	}
}

impl<H: Handler> tower::Service<Request> for HandlerService<H>
{
	type Response = Response;
	type Error = Infallible;
	type Future = Ready<Result<Response, Infallible>>;

	fn poll_ready(&mut self, _: &mut task::Context<'_>) -> Poll<Result<(), Self::Error>>
	{
		Poll::Ready(Ok(()))
	}

	fn call(&mut self, request: Request) -> Self::Future
	{
		let mut writer = ResponseWriter::new();

		self.handler.serve(&mut writer, &request);

		future::ready(Ok(writer.into_response()))
	}
}
