//! Request layer for the Nomie Server REST API.
//!
//! All storage calls funnel through [`RequestClient`], which attaches the
//! bearer token and builds `{endpoint}/api/{path}` URLs.

mod client;
mod envelope;
mod types;
mod validate;

pub use client::RequestClient;
pub use envelope::{decode_envelope, unwrap_envelope};
pub use types::{EngineError, EngineResult, ListRequest, Profile, ValidationResult};
pub use validate::{ConnectionValidator, Validation, VALIDATION_PATH};
