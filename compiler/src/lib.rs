//! idlc-compiler
//!
//! This crate implements:
//!  1) A parser-combinator engine over a positioned, immutable input cursor,
//!  2) The lexical and structural grammar of `.idl` files (`data`, `choice`,
//!     `enum`, `topic`), producing a typed AST,
//!  3) A validator (duplicate types, fields, tags and options),
//!  4) A scanner that parses every `.idl` file of a source tree,
//!  5) Error types (`IdlError`).

pub mod error;
pub mod state;
pub mod combinator;
pub mod types;
pub mod utils;
pub mod lexer;
pub mod parser;
pub mod verifier;
pub mod compiler;
pub mod scanner;

pub use compiler::{compile_source, parse_source};
pub use parser::parse_file;
pub use scanner::{scan, ScanConfig, ScanReport};
pub use verifier::{check_project_uniqueness, validate, validate_all};
