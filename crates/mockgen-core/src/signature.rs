//! Per-declaration signature model.
//!
//! A [`Signature`] pairs every slot of a declaration with the decision taken
//! for it: either the classifier's verdict or a user override. Renderers only
//! read from it.

use crate::classify::{classify, ClassifyContext, TypeClassification};
use crate::config::{MockConfig, OverrideSpec};
use crate::decl::{ExceptionSpec, FunctionDecl, ParsedType, SourceLocation, TypeKind};
use crate::error::{MockGenError, Result};
use crate::naming;
use crate::overrides::{argument_key, return_key, OverrideResolver};

/// How a slot reaches the mock library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotMapping<'a> {
    Classified(TypeClassification),
    Overridden(&'a OverrideSpec),
}

impl SlotMapping<'_> {
    pub fn mocked(&self) -> crate::config::MockedType {
        match self {
            SlotMapping::Classified(class) => class.mocked,
            SlotMapping::Overridden(spec) => spec.kind,
        }
    }

    pub fn is_overridden(&self) -> bool {
        matches!(self, SlotMapping::Overridden(_))
    }
}

/// One parameter of a signature.
#[derive(Debug, Clone)]
pub struct Parameter<'a> {
    /// Declared name, or `_unnamedArgN`
    pub name: String,
    pub is_unnamed: bool,
    pub declared_type: &'a ParsedType,
    pub mapping: SlotMapping<'a>,
}

/// The non-void return value of a signature.
#[derive(Debug, Clone)]
pub struct ReturnSlot<'a> {
    pub declared_type: &'a ParsedType,
    pub mapping: SlotMapping<'a>,
}

#[derive(Debug, Clone)]
pub struct Signature<'a> {
    pub qualified_name: String,
    pub expectation_name: String,
    pub emission_namespaces: Vec<String>,
    pub parameters: Vec<Parameter<'a>>,
    /// Declared return spelling, kept for `void` and its aliases
    pub return_spelling: String,
    /// None iff the declaration returns `void`
    pub return_slot: Option<ReturnSlot<'a>>,
    pub is_const_method: bool,
    pub is_destructor: bool,
    /// Conversion operators are declared without a return type
    pub is_conversion: bool,
    pub is_static: bool,
    pub is_variadic: bool,
    pub exception_spec: ExceptionSpec,
    pub owner_class: Option<String>,
    pub location: SourceLocation,
}

impl<'a> Signature<'a> {
    /// Resolve every slot of `decl` against `config`.
    ///
    /// Fails on the first slot that neither an override nor the classifier
    /// can express.
    pub fn build<C: MockConfig + ?Sized>(decl: &'a FunctionDecl, config: &'a C) -> Result<Self> {
        let qualified_name = naming::qualified_name(decl);
        let resolver = OverrideResolver::new(config);
        let use_underlying = config.use_underlying_typedef();

        let return_slot = if decl.return_type.canonical().kind == TypeKind::Void {
            None
        } else {
            let declared_type = &decl.return_type;
            let spec = resolver
                .resolve_return(&qualified_name, &declared_type.spelling)
                .filter(|spec| {
                    let valid = spec.kind.is_valid_for_return();
                    if !valid {
                        log::warn!(
                            "{}: ignoring {} override for the return of `{}`",
                            decl.location,
                            spec.kind,
                            qualified_name
                        );
                    }
                    valid
                });
            let mapping = match spec {
                Some(spec) => SlotMapping::Overridden(spec),
                None => classify(declared_type, &ClassifyContext::ret(use_underlying))
                    .map(SlotMapping::Classified)
                    .map_err(|_| {
                        unsupported(decl, &qualified_name, "return", declared_type, return_key(&qualified_name))
                    })?,
            };
            Some(ReturnSlot {
                declared_type,
                mapping,
            })
        };

        let mut parameters = Vec::with_capacity(decl.params.len());
        for (index, param) in decl.params.iter().enumerate() {
            let is_unnamed = param.name.is_empty();
            let name = if is_unnamed {
                naming::unnamed_argument(index)
            } else {
                param.name.clone()
            };
            let mapping = match resolver.resolve_argument(&qualified_name, &name, &param.ty.spelling) {
                Some(spec) => SlotMapping::Overridden(spec),
                None => classify(&param.ty, &ClassifyContext::argument(use_underlying))
                    .map(SlotMapping::Classified)
                    .map_err(|_| {
                        let slot = format!("parameter `{}`", name);
                        let key = argument_key(&qualified_name, &name);
                        unsupported(decl, &qualified_name, &slot, &param.ty, key)
                    })?,
            };
            parameters.push(Parameter {
                name,
                is_unnamed,
                declared_type: &param.ty,
                mapping,
            });
        }

        Ok(Self {
            expectation_name: naming::expectation_name(decl),
            emission_namespaces: naming::emission_namespaces(decl),
            owner_class: naming::owner_class(decl),
            qualified_name,
            parameters,
            return_spelling: decl.return_type.spelling.clone(),
            return_slot,
            is_const_method: decl.is_const,
            is_destructor: decl.kind == crate::decl::DeclKind::Destructor,
            is_conversion: decl.kind == crate::decl::DeclKind::Conversion,
            is_static: decl.is_static,
            is_variadic: decl.is_variadic,
            exception_spec: decl.exception_spec.clone(),
            location: decl.location.clone(),
        })
    }

    /// Class whose instance is the receiver of the call, if any.
    pub fn receiver(&self) -> Option<&str> {
        if self.is_static {
            None
        } else {
            self.owner_class.as_deref()
        }
    }

    /// Whether any parameter is matched through `Skip`.
    pub fn has_skipped_parameter(&self) -> bool {
        self.parameters
            .iter()
            .any(|p| p.mapping.mocked() == crate::config::MockedType::Skip)
    }
}

fn unsupported(
    decl: &FunctionDecl,
    function: &str,
    slot: &str,
    ty: &ParsedType,
    override_key: String,
) -> MockGenError {
    log::warn!(
        "{}: `{}` not mocked, {} has unsupported type `{}`",
        decl.location,
        function,
        slot,
        ty.spelling
    );
    MockGenError::UnsupportedType {
        function: function.to_string(),
        slot: slot.to_string(),
        spelling: ty.spelling.clone(),
        override_key,
        location: decl.location.clone(),
    }
}
