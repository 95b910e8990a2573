//! Text rendering of mocks and expectation helpers.

mod expectation;
mod mock;

pub use expectation::{render_expectation, ExpectationPart};
pub use mock::render_mock;

use crate::classify::const_pointer_to;
use crate::config::OverrideSpec;
use crate::decl::{ExceptionSpec, ParsedType, TypeKind};

/// Everything emitted for one declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedMock {
    /// Out-of-line definition forwarding to `mock().actualCall`
    pub mock: String,
    /// Prototypes of the two expectation helpers
    pub expectation_header: String,
    /// Definitions of the two expectation helpers
    pub expectation_impl: String,
}

/// `T name`, placing the name where a declarator needs it.
pub(crate) fn declaration_text(ty: &ParsedType, name: &str) -> String {
    let spelling = ty.spelling.trim();
    if let Some(pos) = spelling.find("(*)") {
        // Function pointer: `void (*)(int)` -> `void (*cb)(int)`
        return format!("{}(*{}){}", &spelling[..pos], name, &spelling[pos + 3..]);
    }
    if ty.kind.is_array() {
        if let Some(pos) = spelling.find('[') {
            return format!("{} {}{}", spelling[..pos].trim_end(), name, &spelling[pos..]);
        }
    }
    format!("{} {}", spelling, name)
}

/// Exception specifier as emitted after the parameter list, if any.
pub(crate) fn exception_suffix(spec: &ExceptionSpec, function: &str) -> Option<String> {
    match spec {
        ExceptionSpec::None => None,
        ExceptionSpec::Noexcept => Some("noexcept".to_string()),
        ExceptionSpec::NoexceptIf(operand) => Some(format!("noexcept({})", operand)),
        ExceptionSpec::ThrowAny => Some("throw(...)".to_string()),
        ExceptionSpec::Throw(types) if types.is_empty() => Some("throw()".to_string()),
        ExceptionSpec::Throw(types) => {
            log::warn!(
                "`{}` throws ({}); fill in the exception types of its mock by hand",
                function,
                types.join(", ")
            );
            Some("throw(__put_exception_types_manually_here__)".to_string())
        }
    }
}

/// Reinterpret `expr` as a byte pointer for `withMemoryBufferParameter`.
pub(crate) fn byte_pointer(expr: &str) -> String {
    format!(
        "static_cast<const unsigned char *>(static_cast<const void *>({}))",
        expr
    )
}

/// `sizeof` of the object pointed to by `expr`.
pub(crate) fn pointee_size(expr: &str) -> String {
    if is_identifier(expr) {
        format!("sizeof(*{})", expr)
    } else {
        format!("sizeof(*({}))", expr)
    }
}

fn is_identifier(expr: &str) -> bool {
    !expr.is_empty() && expr.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Unqualified type an override slot points at, or the slot type itself.
pub(crate) fn override_target(declared: &ParsedType) -> String {
    let canonical = declared.canonical();
    match canonical.pointee() {
        Some(target) if canonical.kind.is_indirection() || canonical.kind.is_array() => {
            target.unqualified_spelling()
        }
        _ => declared.unqualified_spelling(),
    }
}

/// Whether an override slot is declared as a pointer to `void`.
pub(crate) fn targets_void(declared: &ParsedType) -> bool {
    let canonical = declared.canonical();
    canonical.kind == TypeKind::Pointer
        && canonical
            .pointee()
            .is_some_and(|target| target.canonical().kind == TypeKind::Void)
}

/// Pointer to whatever a reference slot refers to, keeping constness.
pub(crate) fn pointer_to_referee(declared: &ParsedType) -> Option<String> {
    let canonical = declared.canonical();
    if !matches!(
        canonical.kind,
        TypeKind::LValueReference | TypeKind::RValueReference
    ) {
        return None;
    }
    let target = canonical.pointee()?;
    let unqualified = target.unqualified_spelling();
    Some(if target.is_const_qualified() {
        const_pointer_to(&unqualified)
    } else {
        format!("{} *", unqualified)
    })
}

/// Exposed type tag of an `InputOfType`/`OutputOfType` override.
pub(crate) fn exposed_type(spec: &OverrideSpec, declared: &ParsedType) -> String {
    spec.exposed_type_name
        .clone()
        .unwrap_or_else(|| override_target(declared))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declaration_text() {
        let int = ParsedType::builtin(TypeKind::Int);
        assert_eq!(declaration_text(&int, "p"), "int p");
        assert_eq!(declaration_text(&int.clone().pointer_to(), "p"), "int * p");
        assert_eq!(declaration_text(&int.clone().array_of(4), "a"), "int a[4]");
        assert_eq!(declaration_text(&int.incomplete_array_of(), "a"), "int a[]");

        let mut callback = ParsedType::function("void (int)").pointer_to();
        callback.spelling = "void (*)(int)".to_string();
        assert_eq!(declaration_text(&callback, "cb"), "void (*cb)(int)");
    }

    #[test]
    fn test_exception_suffix() {
        assert_eq!(exception_suffix(&ExceptionSpec::None, "f"), None);
        assert_eq!(exception_suffix(&ExceptionSpec::Noexcept, "f").as_deref(), Some("noexcept"));
        assert_eq!(
            exception_suffix(&ExceptionSpec::NoexceptIf("false".into()), "f").as_deref(),
            Some("noexcept(false)")
        );
        assert_eq!(
            exception_suffix(&ExceptionSpec::Throw(Vec::new()), "f").as_deref(),
            Some("throw()")
        );
        assert_eq!(exception_suffix(&ExceptionSpec::ThrowAny, "f").as_deref(), Some("throw(...)"));
        assert_eq!(
            exception_suffix(&ExceptionSpec::Throw(vec!["std::exception".into()]), "f").as_deref(),
            Some("throw(__put_exception_types_manually_here__)")
        );
    }

    #[test]
    fn test_pointee_size() {
        assert_eq!(pointee_size("p"), "sizeof(*p)");
        assert_eq!(pointee_size("&(p2->a)"), "sizeof(*(&(p2->a)))");
    }

    #[test]
    fn test_override_targets() {
        let class1 = ParsedType::record("Class1");
        assert_eq!(override_target(&class1.clone().constant().pointer_to()), "Class1");
        assert_eq!(override_target(&class1.clone().lvalue_ref_to()), "Class1");
        assert_eq!(override_target(&class1.clone().constant()), "Class1");
        assert!(targets_void(&ParsedType::void().pointer_to()));
        assert!(!targets_void(&class1.clone().pointer_to()));
        assert_eq!(
            pointer_to_referee(&class1.clone().constant().lvalue_ref_to()).as_deref(),
            Some("const Class1 *")
        );
        assert_eq!(pointer_to_referee(&class1), None);
    }
}
