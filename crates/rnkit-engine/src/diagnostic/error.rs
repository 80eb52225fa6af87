//! Engine error types.
#![allow(unused_assignments)]

use std::path::PathBuf;
use miette::Diagnostic;
use thiserror::Error;

/// Errors that can occur while reading, editing or writing project files.
#[allow(unused_assignments)]
#[derive(Error, Diagnostic, Debug)]
pub enum EngineError {
    // =========================================================================
    // IO Errors
    // =========================================================================
    #[error("Failed to access '{}': {message}", path.display())]
    #[diagnostic(code(rnkit::io::access_failed))]
    IoError {
        path: PathBuf,
        message: String,
    },

    #[error("File not found: {}", path.display())]
    #[diagnostic(code(rnkit::io::not_found))]
    FileNotFound {
        path: PathBuf,
    },

    // =========================================================================
    // Parse Errors
    // =========================================================================
    #[error("Failed to initialize parser")]
    #[diagnostic(code(rnkit::parse::init_failed))]
    ParserInitFailed,

    #[error("Unsupported source file extension: {}", path.display())]
    #[diagnostic(
        code(rnkit::parse::unsupported_extension),
        help("Only .ts, .tsx, .js and .jsx files can be edited")
    )]
    UnsupportedExtension {
        path: PathBuf,
    },

    #[error("Syntax error in {}:{}:{}: {message}", file.display(), line + 1, column + 1)]
    #[diagnostic(
        code(rnkit::parse::syntax_error),
        help("Fix the file by hand before running the generator again")
    )]
    SyntaxError {
        message: String,
        file: PathBuf,
        line: usize,
        column: usize,
    },

    // =========================================================================
    // Structure Errors
    // =========================================================================
    #[error("{} is malformed: {message}", path.display())]
    #[diagnostic(
        code(rnkit::structure::malformed),
        help("The file no longer matches the shape rnkit generated. Restore it or edit it by hand.")
    )]
    Malformed {
        path: PathBuf,
        message: String,
    },

    #[error("Could not find {what} in {}", path.display())]
    #[diagnostic(code(rnkit::structure::declaration_not_found))]
    DeclarationNotFound {
        what: String,
        path: PathBuf,
    },

    #[error("Field '{field}' needs an initial value to be placed in a class state initializer")]
    #[diagnostic(
        code(rnkit::structure::missing_initial_value),
        help("Mark the field optional or give it an initial value")
    )]
    MissingInitialValue {
        field: String,
    },

    // =========================================================================
    // Edit Errors
    // =========================================================================
    #[error("Overlapping edits to {} at bytes {first_start}..{first_end} and {second_start}..{second_end}", path.display())]
    #[diagnostic(code(rnkit::edit::conflicting_edits))]
    ConflictingEdits {
        path: PathBuf,
        first_start: usize,
        first_end: usize,
        second_start: usize,
        second_end: usize,
    },

    #[error("Node reference into {} is stale (revision {expected}, file is at {actual})", path.display())]
    #[diagnostic(code(rnkit::edit::stale_reference))]
    StaleReference {
        path: PathBuf,
        expected: u64,
        actual: u64,
    },

    #[error("Refusing to write {} because it was never loaded or created in this session", path.display())]
    #[diagnostic(code(rnkit::edit::untracked_file))]
    UntrackedFile {
        path: PathBuf,
    },

    #[error("{} already exists", path.display())]
    #[diagnostic(
        code(rnkit::edit::conflict),
        help("Pick another name or remove the existing artifact")
    )]
    Conflict {
        path: PathBuf,
    },

    // =========================================================================
    // Input Errors
    // =========================================================================
    #[error("Invalid input: {message}")]
    #[diagnostic(code(rnkit::input::validation))]
    Validation {
        message: String,
    },

    #[error("Cancelled")]
    #[diagnostic(code(rnkit::input::cancelled))]
    Cancelled,

    #[error("Invalid configuration in {}: {message}", path.display())]
    #[diagnostic(code(rnkit::config::invalid))]
    Config {
        path: PathBuf,
        message: String,
    },
}

impl EngineError {
    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::IoError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a malformed-structure error.
    pub fn malformed(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Malformed {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Returns true for errors that mean "nothing there yet" rather than
    /// "something is wrong".
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::FileNotFound { .. } | Self::DeclarationNotFound { .. })
    }
}
