//! # itemsync-compiler
//!
//! Turns desired definition parts into compiled payloads.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use itemsync_compiler::Compiler;
//! use itemsync_core::types::DefinitionConfig;
//!
//! fn compile(config: &DefinitionConfig) {
//!     if let Ok(definition) = Compiler::new("manifests").compile_definition(config) {
//!         for (path, part) in &definition.parts {
//!             println!("{path}: {}", part.fingerprint);
//!         }
//!     }
//! }
//! ```

pub mod engine;
pub mod error;
pub mod jsonpath;
pub mod params;
pub mod payload;
pub mod transforms;

pub use engine::{is_valid_token_key, TemplateEngine};
pub use error::CompileError;
pub use jsonpath::JsonPath;
pub use params::apply_parameters;
pub use payload::{compile_inline, fingerprint, Compiler};
