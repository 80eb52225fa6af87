//! Diagnostic types for error reporting.

mod error;
mod span;

pub use error::EngineError;
pub use span::Span;

/// Result alias used throughout the engine.
pub type Result<T> = std::result::Result<T, EngineError>;
