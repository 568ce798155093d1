use std::io;

use axum::response::IntoResponse;
use bytes::BytesMut;
use http::{HeaderMap, StatusCode};

use super::{Body, Response, ResponseSink};

/// The real response.
///
/// Behaves like a response that is being streamed to the client: the first
/// status write wins, and writing any body bytes locks in `200 OK` if no
/// status was set yet. Everything after that is ignored.
#[derive(Debug, Default)]
pub struct ResponseWriter
{
	status: Option<StatusCode>,
	headers: HeaderMap,
	body: BytesMut,

	/// How many times [`ResponseSink::set_status()`] was called, including
	/// calls we ignored.
	status_writes: usize,
}

impl ResponseWriter
{
	pub fn new() -> Self
	{
		Self::default()
	}

	/// The status the response will be sent with.
	pub fn status(&self) -> StatusCode
	{
		self.status.unwrap_or(StatusCode::OK)
	}

	/// The number of status writes this response has received.
	pub fn status_writes(&self) -> usize
	{
		self.status_writes
	}

	pub fn headers(&self) -> &HeaderMap
	{
		&self.headers
	}

	pub fn body(&self) -> &[u8]
	{
		&self.body
	}
}

impl ResponseSink for ResponseWriter
{
	fn set_status(&mut self, status: StatusCode)
	{
		self.status_writes += 1;

		if let Some(current) = self.status {
			warn!(%current, ignored = %status, "superfluous status write");
			return;
		}

		self.status = Some(status);
	}

	fn headers_mut(&mut self) -> &mut HeaderMap
	{
		&mut self.headers
	}

	fn write(&mut self, bytes: &[u8]) -> io::Result<usize>
	{
		self.status.get_or_insert(StatusCode::OK);
		self.body.extend_from_slice(bytes);

		Ok(bytes.len())
	}
}

impl IntoResponse for ResponseWriter
{
	fn into_response(self) -> Response
	{
		let status = self.status();
		let mut response = Response::new(Body::from(self.body.freeze()));

		*response.status_mut() = status;
		*response.headers_mut() = self.headers;

		response
	}
}
