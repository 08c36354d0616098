//! Shared type definitions for the Spotinst SDK crates.
//!
//! - [`FieldState`] records per-instance presence information (force-sent
//!   zero values and explicit nulls) consumed by the request encoder.
//! - [`Envelope`] and friends describe the `{request, response}` wrapper the
//!   API puts around every payload.

mod envelope;
mod presence;

pub use envelope::{Envelope, RequestInfo, ResponseBody, ResponseError, ResponseStatus};
pub use presence::FieldState;
