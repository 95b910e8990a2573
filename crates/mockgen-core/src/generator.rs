//! Per-unit mock generation.

use crate::config::MockConfig;
use crate::decl::FunctionDecl;
use crate::error::{Result, SkipReason};
use crate::gate::DeclarationGate;
use crate::render::{render_expectation, render_mock, ExpectationPart, GeneratedMock};
use crate::signature::Signature;

/// What became of one declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Generated(GeneratedMock),
    Skipped(SkipReason),
}

/// Translates the declarations of one input unit, in order.
///
/// Keeps the set of already emitted declarations, so a generator must not be
/// shared between units.
pub struct MockGenerator<'c, C: MockConfig + ?Sized> {
    config: &'c C,
    gate: DeclarationGate,
}

impl<'c, C: MockConfig + ?Sized> MockGenerator<'c, C> {
    pub fn new(config: &'c C) -> Self {
        Self {
            config,
            gate: DeclarationGate::new(),
        }
    }

    /// Translate `decl`, producing both the mock and its expectation helpers or nothing.
    pub fn generate(&mut self, decl: &FunctionDecl) -> Result<Outcome> {
        if let Err(reason) = self.gate.check(decl) {
            log::debug!("{}: skipping `{}`: {}", decl.location, decl.name, reason);
            return Ok(Outcome::Skipped(reason));
        }

        let sig = Signature::build(decl, self.config)?;
        let generated = GeneratedMock {
            mock: render_mock(&sig),
            expectation_header: render_expectation(&sig, ExpectationPart::Header),
            expectation_impl: render_expectation(&sig, ExpectationPart::Implementation),
        };

        self.gate.mark_emitted(decl);
        log::debug!("generated mock for `{}`", sig.qualified_name);
        Ok(Outcome::Generated(generated))
    }

    /// Number of declarations that produced output so far.
    pub fn generated_count(&self) -> usize {
        self.gate.emitted_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::decl::{ParsedType, TypeKind};

    #[test]
    fn test_generate_then_skip_duplicate() {
        let config = Config::default();
        let mut generator = MockGenerator::new(&config);
        let decl = FunctionDecl::function("f", ParsedType::void())
            .with_param("p", ParsedType::builtin(TypeKind::Int));

        assert!(matches!(generator.generate(&decl), Ok(Outcome::Generated(_))));
        assert_eq!(
            generator.generate(&decl).unwrap(),
            Outcome::Skipped(SkipReason::Duplicate)
        );
        assert_eq!(generator.generated_count(), 1);
    }

    #[test]
    fn test_failed_declaration_is_not_marked() {
        let config = Config::default();
        let mut generator = MockGenerator::new(&config);
        let decl = FunctionDecl::function("f", ParsedType::void())
            .with_param("cb", ParsedType::function("void ()").pointer_to());

        assert!(generator.generate(&decl).is_err());
        assert!(generator.generate(&decl).is_err());
        assert_eq!(generator.generated_count(), 0);
    }

    #[test]
    fn test_definition_is_skipped() {
        let config = Config::default();
        let mut generator = MockGenerator::new(&config);
        let mut decl = FunctionDecl::function("f", ParsedType::void());
        decl.is_definition = true;
        assert_eq!(
            generator.generate(&decl).unwrap(),
            Outcome::Skipped(SkipReason::Definition)
        );
    }
}
