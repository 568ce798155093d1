//! Capturing panics raised by request handlers.
//!
//! By the time [`catch_unwind()`] hands us a panic payload, the stack of the
//! code that panicked is already gone. To still be able to report where the
//! panic happened, [`install_hook()`] installs a panic hook that captures a
//! backtrace while the panicking frames are still alive, and stashes it in a
//! thread-local slot for [`catch()`] to pick up.
//!
//! Panics outside of [`catch()`] are passed on to whatever hook was installed
//! before.
//!
//! [`catch_unwind()`]: std::panic::catch_unwind

use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::{Cell, RefCell};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Once;
use std::{fmt, thread};

thread_local! {
	/// How many calls to [`catch()`] are currently on this thread's stack.
	static BOUNDARY_DEPTH: Cell<usize> = const { Cell::new(0) };

	/// The last panic captured by our hook on this thread.
	static CAPTURED: RefCell<Option<Fault>> = const { RefCell::new(None) };
}

/// Diagnostic information about a panic.
#[derive(Debug)]
pub struct Fault
{
	payload: Box<str>,
	location: Option<Box<str>>,
	backtrace: Backtrace,
}

impl Fault
{
	/// The panic message, if it had one.
	pub fn payload(&self) -> &str
	{
		&self.payload
	}

	/// The source location the panic originated from.
	pub fn location(&self) -> Option<&str>
	{
		self.location.as_deref()
	}

	/// The stack at the time of the panic.
	pub fn backtrace(&self) -> &Backtrace
	{
		&self.backtrace
	}

	fn from_payload(payload: &(dyn Any + Send)) -> Self
	{
		Self {
			payload: payload_as_str(payload).into(),
			location: None,
			backtrace: Backtrace::force_capture(),
		}
	}
}

impl fmt::Display for Fault
{
	fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result
	{
		write!(fmt, "panic: {}", self.payload)?;

		if let Some(location) = self.location() {
			write!(fmt, " (at {location})")?;
		}

		write!(fmt, "\n\nstack backtrace:\n{}", self.backtrace)
	}
}

/// Installs the panic hook that captures backtraces for [`catch()`].
///
/// Only the first call has any effect.
pub fn install_hook()
{
	static INSTALL: Once = Once::new();

	INSTALL.call_once(|| {
		let previous_hook = panic::take_hook();

		panic::set_hook(Box::new(move |info| {
			let inside_boundary = BOUNDARY_DEPTH
				.try_with(Cell::get)
				.is_ok_and(|depth| depth > 0);

			if !inside_boundary {
				return previous_hook(info);
			}

			let fault = Fault {
				payload: payload_as_str(info.payload()).into(),
				location: info.location().map(|location| location.to_string().into()),
				backtrace: Backtrace::force_capture(),
			};

			// the thread is being torn down; there is nobody left to report to
			let _ = CAPTURED.try_with(|slot| slot.replace(Some(fault)));
		}));
	});
}

/// Runs `func`, catching any panic it raises.
///
/// The unwound stack is dropped before this function returns.
pub fn catch<F, R>(func: F) -> Result<R, Fault>
where
	F: FnOnce() -> R,
{
	let _boundary = Boundary::enter();

	match panic::catch_unwind(AssertUnwindSafe(func)) {
		Ok(output) => Ok(output),
		Err(payload) => {
			// The slot may hold a panic that was caught further down the stack,
			// followed by one that bypassed the hook (`resume_unwind()`).
			let fault = CAPTURED
				.with(RefCell::take)
				.filter(|fault| *fault.payload == *payload_as_str(&*payload))
				.unwrap_or_else(|| Fault::from_payload(&*payload));

			drop_payload(payload);

			Err(fault)
		},
	}
}

/// Marks the current thread as being inside [`catch()`] for as long as it is
/// alive.
struct Boundary;

impl Boundary
{
	fn enter() -> Self
	{
		BOUNDARY_DEPTH.with(|depth| depth.set(depth.get() + 1));

		if BOUNDARY_DEPTH.with(Cell::get) == 1 {
			CAPTURED.with(RefCell::take);
		}

		Self
	}
}

impl Drop for Boundary
{
	fn drop(&mut self)
	{
		BOUNDARY_DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
	}
}

fn payload_as_str(payload: &(dyn Any + Send)) -> &str
{
	payload
		.downcast_ref::<&str>()
		.copied()
		.or_else(|| payload.downcast_ref::<String>().map(String::as_str))
		.unwrap_or("Box<dyn Any>")
}

/// Drops a panic payload, which may itself panic.
fn drop_payload(payload: Box<dyn Any + Send>)
{
	if panic::catch_unwind(AssertUnwindSafe(move || drop(payload))).is_err() {
		error!(thread = ?thread::current().name(), "panic payload panicked on drop");
	}
}
