//! Utilities for unit tests.

use std::io;
use std::sync::{Arc, Mutex, PoisonError};

use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use http_body_util::BodyExt;
use tracing::field::{Field, Visit};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::{Context, SubscriberExt};

use crate::http::ResponseSink;

mod macros;

#[allow(unused_imports)] // these may be used later
pub(crate) use macros::*;

pub(crate) type Error = anyhow::Error;
pub(crate) type Result<T = (), E = Error> = std::result::Result<T, E>;

/// Collects an entire response body into memory.
pub(crate) async fn collect_body(response: crate::http::Response) -> Result<Bytes>
{
	Ok(response.into_body().collect().await?.to_bytes())
}

/// A single call made on a [`RecordingSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call
{
	SetStatus(StatusCode),
	Write(Bytes),
}

/// A [`ResponseSink`] that remembers every status and body write it receives.
#[derive(Debug, Default)]
pub(crate) struct RecordingSink
{
	pub calls: Vec<Call>,
	pub headers: HeaderMap,
}

impl RecordingSink
{
	pub(crate) fn status_writes(&self) -> usize
	{
		self.calls
			.iter()
			.filter(|call| matches!(call, Call::SetStatus(_)))
			.count()
	}

	/// All body writes concatenated.
	pub(crate) fn body(&self) -> Vec<u8>
	{
		self.calls
			.iter()
			.filter_map(|call| match call {
				Call::Write(bytes) => Some(&bytes[..]),
				Call::SetStatus(_) => None,
			})
			.flatten()
			.copied()
			.collect()
	}
}

impl ResponseSink for RecordingSink
{
	fn set_status(&mut self, status: StatusCode)
	{
		self.calls.push(Call::SetStatus(status));
	}

	fn headers_mut(&mut self) -> &mut HeaderMap
	{
		&mut self.headers
	}

	fn write(&mut self, bytes: &[u8]) -> io::Result<usize>
	{
		self.calls.push(Call::Write(Bytes::copy_from_slice(bytes)));
		Ok(bytes.len())
	}
}

/// A log event emitted for an intercepted panic.
#[derive(Debug, Default, Clone)]
pub(crate) struct FaultEvent
{
	pub payload: String,
	pub backtrace: String,
}

/// Records every event logged under the `safety_net::faults` target.
#[derive(Debug, Default, Clone)]
pub(crate) struct FaultEvents(Arc<Mutex<Vec<FaultEvent>>>);

impl FaultEvents
{
	/// Runs `func` with a subscriber that records fault events on the current
	/// thread.
	pub(crate) fn capture<R>(func: impl FnOnce() -> R) -> (R, Vec<FaultEvent>)
	{
		let events = Self::default();
		let subscriber = tracing_subscriber::registry().with(events.clone());
		let output = tracing::subscriber::with_default(subscriber, func);
		let captured = events
			.0
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.clone();

		(output, captured)
	}
}

impl<S> Layer<S> for FaultEvents
where
	S: tracing::Subscriber,
{
	fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>)
	{
		if event.metadata().target() != "safety_net::faults" {
			return;
		}

		let mut fault_event = FaultEvent::default();
		event.record(&mut fault_event);

		self.0
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.push(fault_event);
	}
}

impl Visit for FaultEvent
{
	fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug)
	{
		match field.name() {
			"payload" => self.payload = format!("{value:?}"),
			"backtrace" => self.backtrace = format!("{value:?}"),
			_ => {},
		}
	}
}
