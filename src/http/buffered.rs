use std::io;

use bytes::Bytes;
use http::{HeaderMap, StatusCode};

use super::ResponseSink;

/// A [`ResponseSink`] that holds back the status and body until it is
/// committed.
///
/// Headers are not buffered; they go straight to the wrapped sink. This means
/// headers set by a handler are kept even if the rest of its output is
/// discarded.
///
/// Dropping a `BufferedResponse` without calling [`commit()`] discards the
/// buffered output.
///
/// [`commit()`]: BufferedResponse::commit
#[derive(derive_more::Debug)]
pub struct BufferedResponse<'a>
{
	#[debug(skip)]
	inner: &'a mut dyn ResponseSink,

	/// The last status that was set, if any.
	pending_status: Option<StatusCode>,

	/// Body chunks in the order they were written.
	pending_writes: Vec<Bytes>,
}

impl<'a> BufferedResponse<'a>
{
	pub fn new(inner: &'a mut dyn ResponseSink) -> Self
	{
		Self { inner, pending_status: None, pending_writes: Vec::new() }
	}

	/// The status that will be forwarded on commit.
	pub fn pending_status(&self) -> Option<StatusCode>
	{
		self.pending_status
	}

	/// The chunks that will be forwarded on commit.
	pub fn pending_writes(&self) -> &[Bytes]
	{
		&self.pending_writes
	}

	/// Replays the buffered status and body onto the wrapped sink.
	///
	/// The status is forwarded at most once, followed by one write per chunk,
	/// in the order they were written.
	pub fn commit(self) -> io::Result<()>
	{
		let Self { inner, pending_status, pending_writes } = self;

		if let Some(status) = pending_status {
			inner.set_status(status);
		}

		for chunk in pending_writes {
			inner.write(&chunk)?;
		}

		Ok(())
	}
}

impl ResponseSink for BufferedResponse<'_>
{
	/// Only the last status set before [`commit()`] is forwarded.
	///
	/// [`commit()`]: BufferedResponse::commit
	fn set_status(&mut self, status: StatusCode)
	{
		self.pending_status = Some(status);
	}

	fn headers_mut(&mut self) -> &mut HeaderMap
	{
		self.inner.headers_mut()
	}

	fn write(&mut self, bytes: &[u8]) -> io::Result<usize>
	{
		self.pending_writes.push(Bytes::copy_from_slice(bytes));
		Ok(bytes.len())
	}
}
