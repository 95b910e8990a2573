//! Parser for override options.
//!
//! An override reads `<key>=<spec>`, with `<key>` one of `func@`,
//! `func#arg` (parameter overrides) or `@Type`, `#Type` (type overrides),
//! and `<spec>`:
//!
//! ```text
//! <MockedType>[:<arg>][/<front>$<back>][~<expectation-arg-type>]
//! ```
//!
//! `<arg>` ends at the first `/` or `~`; the expression section ends at the
//! last `~`.

use miette::Diagnostic;
use mockgen_core::{MockedType, OverrideSpec};
use thiserror::Error;

/// Which family of keys an override option accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverrideScope {
    /// `func@` and `func#arg`
    Parameter,
    /// `@Type` and `#Type`
    Type,
}

/// A malformed override option.
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
pub enum OverrideParseError {
    #[error("invalid override `{text}`: expected `<key>=<spec>`")]
    #[diagnostic(code("mockgen::override::syntax"))]
    MissingSeparator { text: String },

    #[error("invalid override `{text}`: bad key `{key}`")]
    #[diagnostic(
        code("mockgen::override::key"),
        help("parameter overrides use `func@` or `func#arg`, type overrides use `@Type` or `#Type`")
    )]
    InvalidKey { text: String, key: String },

    #[error("invalid override `{text}`: unknown mocked type `{name}`")]
    #[diagnostic(code("mockgen::override::mocked_type"))]
    UnknownType { text: String, name: String },

    #[error("invalid override `{text}`: `{kind}` requires an argument after `:`")]
    #[diagnostic(code("mockgen::override::missing_argument"))]
    MissingArgument { text: String, kind: MockedType },

    #[error("invalid override `{text}`: `{kind}` takes no argument")]
    #[diagnostic(code("mockgen::override::unexpected_argument"))]
    UnexpectedArgument { text: String, kind: MockedType },

    #[error("invalid override `{text}`: `{section}` must contain exactly one `$`")]
    #[diagnostic(code("mockgen::override::placeholder"))]
    Placeholder { text: String, section: String },

    #[error("invalid override `{text}`: `{kind}` cannot be used for a return value")]
    #[diagnostic(code("mockgen::override::return_type"))]
    NotReturnable { text: String, kind: MockedType },

    #[error("invalid override `{text}`: unexpected `{rest}`")]
    #[diagnostic(code("mockgen::override::syntax"))]
    Trailing { text: String, rest: String },

    #[error("invalid override `{text}`: empty expectation argument type")]
    #[diagnostic(code("mockgen::override::expectation_type"))]
    EmptyExpectationType { text: String },
}

/// Parse one `<key>=<spec>` override option.
pub fn parse_override(
    text: &str,
    scope: OverrideScope,
) -> Result<(String, OverrideSpec), OverrideParseError> {
    let (key, spec) = split_option(text)
        .or_else(|| text.split_once('='))
        .ok_or_else(|| OverrideParseError::MissingSeparator {
            text: text.to_string(),
        })?;

    let is_return = check_key(key, scope).ok_or_else(|| OverrideParseError::InvalidKey {
        text: text.to_string(),
        key: key.to_string(),
    })?;

    let spec = parse_spec(spec, text)?;
    if is_return && !spec.kind.is_valid_for_return() {
        return Err(OverrideParseError::NotReturnable {
            text: text.to_string(),
            kind: spec.kind,
        });
    }

    Ok((key.to_string(), spec))
}

/// Split at the first `=` followed by a mocked type name.
///
/// Keys may contain `=` themselves (`C::operator=@`).
fn split_option(text: &str) -> Option<(&str, &str)> {
    text.match_indices('=').find_map(|(pos, _)| {
        let (key, spec) = (&text[..pos], &text[pos + 1..]);
        let name_len = type_name_len(spec);
        let name = &spec[..name_len];
        let next = spec[name_len..].chars().next();
        let is_spec = name.parse::<MockedType>().is_ok()
            && matches!(next, None | Some(':') | Some('/') | Some('~'));
        (is_spec && !key.is_empty()).then_some((key, spec))
    })
}

fn type_name_len(spec: &str) -> usize {
    spec.find(|c: char| !c.is_ascii_alphanumeric())
        .unwrap_or(spec.len())
}

/// Validate a key against `scope`; returns whether it names a return value.
fn check_key(key: &str, scope: OverrideScope) -> Option<bool> {
    match scope {
        OverrideScope::Parameter => {
            if let Some(function) = key.strip_suffix('@') {
                (!function.is_empty() && !function.contains(['@', '#'])).then_some(true)
            } else {
                let (function, arg) = key.split_once('#')?;
                let valid = !function.is_empty()
                    && !arg.is_empty()
                    && !function.contains('@')
                    && !arg.contains(['@', '#']);
                valid.then_some(false)
            }
        }
        OverrideScope::Type => {
            let (is_return, type_name) = match key.chars().next()? {
                '@' => (true, &key[1..]),
                '#' => (false, &key[1..]),
                _ => return None,
            };
            (!type_name.trim().is_empty()).then_some(is_return)
        }
    }
}

fn parse_spec(spec: &str, text: &str) -> Result<OverrideSpec, OverrideParseError> {
    let name_len = type_name_len(spec);
    let name = &spec[..name_len];
    let kind: MockedType = name.parse().map_err(|_| OverrideParseError::UnknownType {
        text: text.to_string(),
        name: name.to_string(),
    })?;
    let mut rest = &spec[name_len..];

    let argument = match rest.strip_prefix(':') {
        Some(after) => {
            let end = after.find(['/', '~']).unwrap_or(after.len());
            rest = &after[end..];
            Some(&after[..end])
        }
        None => None,
    };

    let expression = match rest.strip_prefix('/') {
        Some(after) => {
            let end = after.rfind('~').unwrap_or(after.len());
            rest = &after[end..];
            Some(&after[..end])
        }
        None => None,
    };

    let expectation_type = match rest.strip_prefix('~') {
        Some(after) => Some(after),
        None if rest.is_empty() => None,
        None => {
            return Err(OverrideParseError::Trailing {
                text: text.to_string(),
                rest: rest.to_string(),
            })
        }
    };

    let mut result = OverrideSpec::new(kind);

    match (kind, argument) {
        (MockedType::InputOfType | MockedType::OutputOfType, Some(name)) if !name.is_empty() => {
            result = result.with_exposed_type(name);
        }
        (MockedType::MemoryBuffer, Some(size)) if !size.is_empty() => {
            if size.matches('$').count() > 1 {
                return Err(OverrideParseError::Placeholder {
                    text: text.to_string(),
                    section: size.to_string(),
                });
            }
            result = result.with_size_expr(size);
        }
        (MockedType::InputOfType | MockedType::OutputOfType | MockedType::MemoryBuffer, _) => {
            return Err(OverrideParseError::MissingArgument {
                text: text.to_string(),
                kind,
            });
        }
        (_, Some(_)) => {
            return Err(OverrideParseError::UnexpectedArgument {
                text: text.to_string(),
                kind,
            });
        }
        (_, None) => {}
    }

    if let Some(expression) = expression {
        let (front, back) = expression
            .split_once('$')
            .filter(|(_, back)| !back.contains('$'))
            .ok_or_else(|| OverrideParseError::Placeholder {
                text: text.to_string(),
                section: expression.to_string(),
            })?;
        result = result.with_expr(front, back);
    }

    if let Some(expectation_type) = expectation_type {
        let expectation_type = expectation_type.trim();
        if expectation_type.is_empty() {
            return Err(OverrideParseError::EmptyExpectationType {
                text: text.to_string(),
            });
        }
        result = result.with_expectation_type(expectation_type);
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn param(text: &str) -> (String, OverrideSpec) {
        parse_override(text, OverrideScope::Parameter).unwrap()
    }

    #[test]
    fn test_parse_plain_kind() {
        let (key, spec) = param("f#p=Int");
        assert_eq!(key, "f#p");
        assert_eq!(spec, OverrideSpec::new(MockedType::Int));

        let (key, spec) = param("ns::Class1::method@=UnsignedLong");
        assert_eq!(key, "ns::Class1::method@");
        assert_eq!(spec.kind, MockedType::UnsignedLong);
    }

    #[test]
    fn test_parse_full_spec() {
        let (_, spec) = param("f#p2=InputOfType:Struct1/##%%$&&//~OtherStruct3");
        assert_eq!(
            spec,
            OverrideSpec::new(MockedType::InputOfType)
                .with_exposed_type("Struct1")
                .with_expr("##%%", "&&//")
                .with_expectation_type("OtherStruct3")
        );
    }

    #[test]
    fn test_parse_memory_buffer() {
        let (_, spec) = param("f#buf=MemoryBuffer:strlen($)+1");
        assert!(spec.has_size_placeholder);
        assert_eq!(spec.size_expr("buf"), "strlen(buf)+1");

        let (_, spec) = param("f#buf=MemoryBuffer:16");
        assert!(!spec.has_size_placeholder);
        assert_eq!(spec.size_expr("buf"), "16");
    }

    #[test]
    fn test_parse_type_overrides() {
        let (key, spec) = parse_override("#const char *=Pointer", OverrideScope::Type).unwrap();
        assert_eq!(key, "#const char *");
        assert_eq!(spec.kind, MockedType::Pointer);

        let (key, _) = parse_override("@Type1=Int/$.value", OverrideScope::Type).unwrap();
        assert_eq!(key, "@Type1");
    }

    #[test]
    fn test_operator_keys() {
        let (key, spec) = param("C::operator=@=Bool");
        assert_eq!(key, "C::operator=@");
        assert_eq!(spec.kind, MockedType::Bool);

        let (key, _) = param("C::operator==#other=ConstPointer");
        assert_eq!(key, "C::operator==#other");
    }

    #[test]
    fn test_key_scope_is_checked() {
        assert!(matches!(
            parse_override("@Type1=Int", OverrideScope::Parameter),
            Err(OverrideParseError::InvalidKey { .. })
        ));
        assert!(matches!(
            parse_override("f#p=Int", OverrideScope::Type),
            Err(OverrideParseError::InvalidKey { .. })
        ));
        assert!(matches!(
            parse_override("f=Int", OverrideScope::Parameter),
            Err(OverrideParseError::InvalidKey { .. })
        ));
    }

    #[test]
    fn test_malformed_specs() {
        let err = |text: &str| parse_override(text, OverrideScope::Parameter).unwrap_err();

        assert!(matches!(err("f#p"), OverrideParseError::MissingSeparator { .. }));
        assert!(matches!(err("f#p=Integer"), OverrideParseError::UnknownType { .. }));
        assert!(matches!(err("f#p=Int extra"), OverrideParseError::Trailing { .. }));
        assert!(matches!(
            err("f#p=InputOfType"),
            OverrideParseError::MissingArgument { kind: MockedType::InputOfType, .. }
        ));
        assert!(matches!(
            err("f#p=Int:long"),
            OverrideParseError::UnexpectedArgument { .. }
        ));
        assert!(matches!(err("f#p=Int/no_placeholder"), OverrideParseError::Placeholder { .. }));
        assert!(matches!(err("f#p=Int/$$"), OverrideParseError::Placeholder { .. }));
        assert!(matches!(
            err("f#p=MemoryBuffer:$+$"),
            OverrideParseError::Placeholder { .. }
        ));
        assert!(matches!(err("f#p=Int~"), OverrideParseError::EmptyExpectationType { .. }));
    }

    #[test]
    fn test_return_kinds_are_restricted() {
        for kind in MockedType::ALL {
            let text = match kind {
                MockedType::InputOfType | MockedType::OutputOfType => format!("f@={}:T", kind),
                MockedType::MemoryBuffer => format!("f@={}:4", kind),
                _ => format!("f@={}", kind),
            };
            let result = parse_override(&text, OverrideScope::Parameter);
            assert_eq!(result.is_ok(), kind.is_valid_for_return(), "{}", text);
        }
    }
}
