//! Names used in the emitted code.

use crate::decl::{DeclKind, FunctionDecl, ScopeKind};

/// Source-order path `A::B::name` used as the mock call identifier.
pub fn qualified_name(decl: &FunctionDecl) -> String {
    let mut name = scope_path(decl);
    if !name.is_empty() {
        name.push_str("::");
    }
    name.push_str(&decl.name);
    name
}

/// Joined semantic parents of `decl` (`ns1::class1`), empty at global scope.
pub fn scope_path(decl: &FunctionDecl) -> String {
    decl.scopes
        .iter()
        .map(|scope| scope.name.as_str())
        .collect::<Vec<_>>()
        .join("::")
}

/// Namespaces wrapping the expectation helpers, one `<parent>$` per semantic parent.
pub fn emission_namespaces(decl: &FunctionDecl) -> Vec<String> {
    decl.scopes
        .iter()
        .map(|scope| format!("{}$", scope.name))
        .collect()
}

/// Qualified name of the class owning a member, if any.
pub fn owner_class(decl: &FunctionDecl) -> Option<String> {
    let owned_by_class = decl
        .scopes
        .last()
        .is_some_and(|scope| scope.kind == ScopeKind::Class);
    if decl.is_member() && owned_by_class {
        Some(scope_path(decl))
    } else {
        None
    }
}

/// Name of the expectation helper pair for `decl`.
///
/// Destructors become `<class>$dtor`. Operators are spelled verbatim in the
/// mock, but a helper needs a plain identifier, so the operator token is
/// mapped to a word (`operator==` becomes `operator$equal`).
pub fn expectation_name(decl: &FunctionDecl) -> String {
    if decl.kind == DeclKind::Destructor {
        return destructor_expectation_name(&decl.name);
    }
    match decl.name.strip_prefix("operator") {
        Some(rest) if is_operator_suffix(rest) => operator_expectation_name(rest),
        _ => decl.name.clone(),
    }
}

/// `~class1` -> `class1$dtor`.
pub fn destructor_expectation_name(name: &str) -> String {
    format!("{}$dtor", name.trim_start_matches('~'))
}

// `operator_x` is an ordinary identifier, `operator==` and `operator int` are not.
fn is_operator_suffix(rest: &str) -> bool {
    match rest.chars().next() {
        None => false,
        Some(c) => !(c.is_ascii_alphanumeric() || c == '_'),
    }
}

fn operator_expectation_name(rest: &str) -> String {
    let token = rest.trim();
    let word = match token {
        "=" => "assignment",
        "==" => "equal",
        "!=" => "notEqual",
        "<" => "less",
        ">" => "greater",
        "<=" => "lessOrEqual",
        ">=" => "greaterOrEqual",
        "<=>" => "threeWayCompare",
        "+" => "plus",
        "-" => "minus",
        "*" => "asterisk",
        "/" => "slash",
        "%" => "percent",
        "+=" => "plusAssignment",
        "-=" => "minusAssignment",
        "*=" => "asteriskAssignment",
        "/=" => "slashAssignment",
        "%=" => "percentAssignment",
        "^" => "caret",
        "&" => "ampersand",
        "|" => "pipe",
        "~" => "tilde",
        "!" => "not",
        "&&" => "and",
        "||" => "or",
        "^=" => "caretAssignment",
        "&=" => "ampersandAssignment",
        "|=" => "pipeAssignment",
        "<<" => "leftShift",
        ">>" => "rightShift",
        "<<=" => "leftShiftAssignment",
        ">>=" => "rightShiftAssignment",
        "++" => "increment",
        "--" => "decrement",
        "," => "comma",
        "->*" => "arrowStar",
        "->" => "arrow",
        "()" => "call",
        "[]" => "subscript",
        "new" => "new",
        "delete" => "delete",
        "new[]" => "newArray",
        "delete[]" => "deleteArray",
        // Conversion operators and anything unforeseen
        other => return format!("operator${}", sanitize_identifier(other)),
    };
    format!("operator${}", word)
}

/// Replace every character that cannot appear in an identifier with `_`.
pub fn sanitize_identifier(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

/// Name given to the `index`-th parameter when it has none.
pub fn unnamed_argument(index: usize) -> String {
    format!("_unnamedArg{}", index)
}
