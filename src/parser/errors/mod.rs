//! Diagnostic codes and the errors the engine records

mod codes;
mod error;

pub use codes::ErrorCode;
pub use error::{RelatedInfo, Severity, SyntaxError};
