//! libclang front-end for the CppUTest mock generator.
//!
//! This crate provides:
//! - Parsing of a header (file or in-memory source) with libclang
//! - Lowering of every function, method and destructor cursor of the main
//!   file into [`mockgen_core::FunctionDecl`], in source order
//!
//! Declarations are not filtered here; the translation core decides what is
//! mockable.

mod lower;
mod parse;

pub use parse::{ClangParser, Language, ParseOptions};
