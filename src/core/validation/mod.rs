//! Request validation at the HTTP boundary
//!
//! Payload shapes derive `validator::Validate`; the extractor here rejects
//! malformed or invalid bodies before they reach a handler.

pub mod extractor;

pub use extractor::ValidatedJson;
