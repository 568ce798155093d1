//! Various middlewares.

pub mod recover;
pub use recover::{Recover, RecoverLayer};

pub(crate) mod request_id;
pub(crate) mod trace;
