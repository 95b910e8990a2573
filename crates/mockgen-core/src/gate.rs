//! Mockability checks and redeclaration tracking.

use crate::decl::{AccessSpecifier, DeclKind, FunctionDecl, ScopeKind};
use crate::error::SkipReason;
use rustc_hash::FxHashSet;

/// Decide whether `decl` can be mocked, ignoring redeclarations.
pub fn check_mockable(decl: &FunctionDecl) -> Result<(), SkipReason> {
    match decl.kind {
        DeclKind::Function | DeclKind::Method | DeclKind::Conversion | DeclKind::Destructor => {}
        DeclKind::FunctionTemplate => return Err(SkipReason::Template),
        DeclKind::Constructor => return Err(SkipReason::UnsupportedKind),
    }

    if decl.is_template_specialization {
        return Err(SkipReason::Template);
    }
    if decl.is_definition {
        return Err(SkipReason::Definition);
    }

    for scope in &decl.scopes {
        if scope.name.is_empty() {
            return Err(SkipReason::AnonymousScope);
        }
        match scope.kind {
            ScopeKind::Namespace => {}
            ScopeKind::Class if scope.access == AccessSpecifier::Public => {}
            ScopeKind::Class => return Err(SkipReason::NonPublicScope),
            // Class templates and other parents that cannot be named out of line
            ScopeKind::Other => return Err(SkipReason::Template),
        }
    }

    if decl.is_member() {
        if decl.is_pure_virtual {
            return Err(SkipReason::PureVirtual);
        }
        if decl.access != AccessSpecifier::Public && !decl.is_virtual {
            return Err(SkipReason::NonPublicMember);
        }
    }

    Ok(())
}

/// Per-unit gate remembering which canonical declarations were already emitted.
#[derive(Debug, Default)]
pub struct DeclarationGate {
    emitted: FxHashSet<String>,
}

impl DeclarationGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check mockability and redeclaration of `decl`.
    pub fn check(&self, decl: &FunctionDecl) -> Result<(), SkipReason> {
        check_mockable(decl)?;
        if self.is_emitted(decl) {
            return Err(SkipReason::Duplicate);
        }
        Ok(())
    }

    /// Record that `decl` produced output.
    pub fn mark_emitted(&mut self, decl: &FunctionDecl) {
        self.emitted.insert(decl.usr.clone());
    }

    pub fn is_emitted(&self, decl: &FunctionDecl) -> bool {
        self.emitted.contains(&decl.usr)
    }

    pub fn emitted_count(&self) -> usize {
        self.emitted.len()
    }
}
