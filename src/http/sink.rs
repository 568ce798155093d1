use std::{fmt, io};

use http::{HeaderMap, StatusCode};

/// Something a handler can write an HTTP response into.
///
/// This is the only view of the response a [`Handler`] ever gets, which is
/// what allows middleware to swap the real response out for something else.
///
/// [`Handler`]: crate::handler::Handler
pub trait ResponseSink
{
	/// Sets the response status.
	fn set_status(&mut self, status: StatusCode);

	/// Returns the response headers.
	fn headers_mut(&mut self) -> &mut HeaderMap;

	/// Appends `bytes` to the response body.
	///
	/// Returns the number of bytes written.
	fn write(&mut self, bytes: &[u8]) -> io::Result<usize>;

	/// Appends `text` to the response body.
	fn write_str(&mut self, text: &str) -> io::Result<()>
	{
		self.write(text.as_bytes()).map(drop)
	}

	/// Appends formatted text to the response body.
	///
	/// This makes `write!()` and `writeln!()` work on sinks.
	fn write_fmt(&mut self, args: fmt::Arguments<'_>) -> io::Result<()>
	{
		match args.as_str() {
			Some(text) => self.write_str(text),
			None => self.write_str(&args.to_string()),
		}
	}
}
