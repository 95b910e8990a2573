//! Override lookup.
//!
//! Keys are `<qualified-name>@` for the return value and
//! `<qualified-name>#<arg>` for an argument, with `@<type>` / `#<type>`
//! wildcards as fall-backs.

use crate::config::{MockConfig, OverrideSpec};

/// Key of the return-value override of `function`.
pub fn return_key(function: &str) -> String {
    format!("{}@", function)
}

/// Key of the override of argument `arg` of `function`.
pub fn argument_key(function: &str, arg: &str) -> String {
    format!("{}#{}", function, arg)
}

/// Key of the wildcard override for return values of type `type_spelling`.
pub fn return_type_key(type_spelling: &str) -> String {
    format!("@{}", type_spelling)
}

/// Key of the wildcard override for arguments of type `type_spelling`.
pub fn argument_type_key(type_spelling: &str) -> String {
    format!("#{}", type_spelling)
}

/// Borrowing view over a configuration's override table.
pub struct OverrideResolver<'a, C: MockConfig + ?Sized> {
    config: &'a C,
}

impl<'a, C: MockConfig + ?Sized> OverrideResolver<'a, C> {
    pub fn new(config: &'a C) -> Self {
        Self { config }
    }

    /// Override for the return value of `function`, declared as `type_spelling`.
    pub fn resolve_return(&self, function: &str, type_spelling: &str) -> Option<&'a OverrideSpec> {
        self.lookup(&return_key(function), &return_type_key(type_spelling))
    }

    /// Override for argument `arg` of `function`, declared as `type_spelling`.
    pub fn resolve_argument(
        &self,
        function: &str,
        arg: &str,
        type_spelling: &str,
    ) -> Option<&'a OverrideSpec> {
        self.lookup(
            &argument_key(function, arg),
            &argument_type_key(type_spelling),
        )
    }

    fn lookup(&self, identifier_key: &str, type_key: &str) -> Option<&'a OverrideSpec> {
        if let Some(spec) = self.config.type_override(identifier_key) {
            log::trace!("override `{}` -> {}", identifier_key, spec.kind);
            return Some(spec);
        }
        let spec = self.config.type_override(type_key)?;
        log::trace!("override `{}` -> {}", type_key, spec.kind);
        Some(spec)
    }
}
