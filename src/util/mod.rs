//! Helpers shared by the reader, the dump service and the CLI.
//!
//! - **Remote sources**: checks a feed URL before it is handed to a
//!   [`RemoteSource`](crate::feed::RemoteSource)
//! - **Atomic writes**: dumped feeds never appear half-written

mod atomic;
mod remote;

pub use atomic::write_atomic;
pub use remote::{validate_remote_source, SourceError};
