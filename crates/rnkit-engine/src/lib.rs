//! # rnkit engine
//!
//! Query-and-mutate core for scaffolding React Native projects. Generators
//! never rewrite a file wholesale: they parse it, locate the declarations
//! they care about and apply small text edits, so hand-written code around
//! generated code survives every run.
//!
//! ## Architecture
//!
//! ```text
//! TS / TSX file
//!        │
//!        ▼
//! ┌──────────────┐
//! │    Source    │  tree-sitter parse, owned syntax tree,
//! │ (text → AST) │  atomic edit batches with reparse
//! └──────┬───────┘
//!        │
//!        ▼
//! ┌──────────────┐
//! │    Locate    │  components, interfaces, reducers,
//! │ (AST → refs) │  decorators, hooks
//! └──────┬───────┘
//!        │
//!        ▼
//! ┌──────────────┐
//! │    Mutate    │  idempotent edits: fields, imports,
//! │ (refs → AST) │  union members, cases, wrappers
//! └──────┬───────┘
//!        │
//!        ▼
//! ┌──────────────┐
//! │    Format    │  import organization, whitespace
//! │  (AST → TS)  │
//! └──────┬───────┘
//!        │
//!        ▼
//!     commit       every dirty file written at once
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use rnkit_engine::generate::{execute, CreateReducer, GeneratorContext};
//! use rnkit_engine::FieldSpec;
//!
//! let mut ctx = GeneratorContext::load(".")?;
//! let reducer = CreateReducer {
//!     name: Some("task".into()),
//!     fields: Some(vec![FieldSpec::new("title", "string").with_initial("''")]),
//!     setters: Some(vec!["title".into()]),
//!     actions: Some(vec![]),
//! };
//! let report = execute(&reducer, &mut ctx)?;
//! ```

pub mod config;
pub mod diagnostic;
pub mod format;
pub mod generate;
pub mod locate;
pub mod model;
pub mod mutate;
pub mod naming;
pub mod source;

pub use config::{find_project_root, ProjectConfig, CONFIG_FILE};
pub use diagnostic::{EngineError, Result};
pub use generate::{execute, run, Generator, GeneratorContext, Prompter, Report};
pub use model::{ComponentInfo, ComponentKind, FieldSpec, ObjectProperty};
pub use naming::NamingPolicy;
pub use source::{Project, SourceFile};
