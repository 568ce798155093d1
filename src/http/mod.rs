//! HTTP types shared by handlers and middleware.
//!
//! A handler produces its response by writing into a [`ResponseSink`]. There
//! are two sinks: [`ResponseWriter`], which builds the response we actually
//! send, and [`BufferedResponse`], which records everything and only forwards
//! it on [`commit()`].
//!
//! [`commit()`]: BufferedResponse::commit

mod sink;
pub use sink::ResponseSink;

mod writer;
pub use writer::ResponseWriter;

mod buffered;
pub use buffered::BufferedResponse;

pub type Body = axum::body::Body;
pub type Request<B = Body> = http::Request<B>;
pub type Response<B = Body> = http::Response<B>;
