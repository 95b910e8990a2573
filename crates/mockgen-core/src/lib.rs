//! Translation core of the CppUTest mock generator.
//!
//! This crate provides:
//! - A parser-independent model of C/C++ function declarations
//! - Type classification onto the typed API of CppUTest's mock library
//! - Per-slot overrides keyed by function, argument or type
//! - Rendering of mock bodies and `expect::` helper functions
//!
//! # Architecture
//!
//! ```text
//! FunctionDecl → gate → Signature (overrides / classifier) → mock + expectation text
//! ```

mod builder;
mod classify;
mod config;
mod decl;
mod error;
mod gate;
mod generator;
mod naming;
mod overrides;
mod render;
mod signature;

pub use classify::{
    classify, const_pointer_to, primitive_mapping, ClassifyContext, ReferenceKind, SlotContext,
    TypeClassification,
};
pub use config::{Config, MockConfig, MockedType, OverrideSpec};
pub use decl::{
    strip_const, strip_tag_keyword, AccessSpecifier, DeclKind, ExceptionSpec, FunctionDecl,
    ParamDecl, ParsedType, ScopeKind, ScopeSegment, SourceLocation, TypeKind,
};
pub use error::{ClassifyError, MockGenError, Result, SkipReason};
pub use gate::{check_mockable, DeclarationGate};
pub use generator::{MockGenerator, Outcome};
pub use naming::{emission_namespaces, expectation_name, owner_class, qualified_name};
pub use overrides::{argument_key, argument_type_key, return_key, return_type_key, OverrideResolver};
pub use render::{render_expectation, render_mock, ExpectationPart, GeneratedMock};
pub use signature::{Parameter, ReturnSlot, Signature, SlotMapping};
