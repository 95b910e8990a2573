//! Error types for the translation core.

use crate::decl::SourceLocation;
use miette::Diagnostic;
use thiserror::Error;

/// Result type for translation operations.
pub type Result<T> = std::result::Result<T, MockGenError>;

/// Failure to classify a single type.
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
pub enum ClassifyError {
    /// The type cannot be expressed through the mock library API.
    #[error("unsupported type `{spelling}`")]
    #[diagnostic(
        code(mockgen::classify::unsupported_type),
        help("add a parameter or type override for this slot")
    )]
    UnsupportedType { spelling: String },
}

/// Errors surfaced to the caller while translating a declaration.
#[derive(Error, Diagnostic, Debug)]
pub enum MockGenError {
    /// A slot could not be classified and no override applied.
    #[error("{location}: cannot mock `{function}`: {slot} has unsupported type `{spelling}`")]
    #[diagnostic(
        code(mockgen::unsupported_type),
        severity(Warning),
        help("use an override such as `{override_key}=<MockedType>` to mock this function")
    )]
    UnsupportedType {
        function: String,
        slot: String,
        spelling: String,
        override_key: String,
        location: SourceLocation,
    },

    /// The cursor-providing front-end failed.
    #[error("parser failure: {0}")]
    #[diagnostic(code(mockgen::parser_failure))]
    ParserFailure(String),
}

impl MockGenError {
    /// Whether the driver may continue with the next declaration.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, MockGenError::UnsupportedType { .. })
    }
}

/// Why a declaration produced no output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The declaration carries a body
    Definition,
    /// Private or protected non-virtual member
    NonPublicMember,
    PureVirtual,
    /// An enclosing class is not reachable from namespace scope
    NonPublicScope,
    /// Inside an anonymous namespace or record
    AnonymousScope,
    /// Function template pattern or specialization
    Template,
    /// Constructors and other unmockable cursor kinds
    UnsupportedKind,
    /// Same canonical USR was already emitted
    Duplicate,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            SkipReason::Definition => "has a definition",
            SkipReason::NonPublicMember => "is a non-public member",
            SkipReason::PureVirtual => "is pure virtual",
            SkipReason::NonPublicScope => "is inside a non-public class",
            SkipReason::AnonymousScope => "is inside an anonymous scope",
            SkipReason::Template => "is a template",
            SkipReason::UnsupportedKind => "is not a function, method or destructor",
            SkipReason::Duplicate => "was already generated",
        };
        f.write_str(reason)
    }
}
