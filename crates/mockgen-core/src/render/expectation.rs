//! Expectation helpers.
//!
//! Every declaration gets a pair of overloads inside `namespace expect`: one
//! taking the number of expected calls and one fixing it to a single call.
//! Slots are passed through `CppUMockGen::Parameter<T>` so a test can leave
//! them unspecified, except byte buffers which come with an explicit size.

use super::{byte_pointer, exposed_type, override_target, targets_void};
use crate::builder::CodeBuilder;
use crate::classify::{const_pointer_to, TypeClassification};
use crate::config::{MockedType, OverrideSpec};
use crate::decl::ParsedType;
use crate::signature::{Parameter, ReturnSlot, Signature, SlotMapping};

const PARAMETER: &str = "CppUMockGen::Parameter";
const IGNORE_DEFAULT: &str = "CppUMockGen::IgnoreParameter::YES";

/// Which half of the expectation output to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectationPart {
    /// Prototypes, with default arguments
    Header,
    /// Definitions
    Implementation,
}

/// A formal parameter of the expectation helpers.
#[derive(Clone)]
struct Formal {
    ty: String,
    name: String,
    /// Default argument, only spelled in the header
    default: Option<&'static str>,
}

impl Formal {
    fn new(ty: String, name: &str) -> Self {
        Self {
            ty,
            name: name.to_string(),
            default: None,
        }
    }

    fn wrapped(ty: &str, name: &str) -> Self {
        Self::new(format!("{}<{}>", PARAMETER, ty), name)
    }

    fn render(&self, part: ExpectationPart) -> String {
        match (part, self.default) {
            (ExpectationPart::Header, Some(default)) => {
                format!("{} {} = {}", self.ty, self.name, default)
            }
            _ => format!("{} {}", self.ty, self.name),
        }
    }
}

/// How one parameter is matched in the N-call body.
enum Matcher {
    /// `Parameter<T>` formal; holds the `.withX(...)` fragment
    Wrapped { name: String, call: String },
    /// Plain formals; holds the full statement
    Unwrapped(String),
}

struct SlotPlan {
    formals: Vec<Formal>,
    matcher: Matcher,
}

impl SlotPlan {
    fn wrapped(ty: &str, name: &str, call: String) -> Self {
        Self {
            formals: vec![Formal::wrapped(ty, name)],
            matcher: Matcher::Wrapped {
                name: name.to_string(),
                call,
            },
        }
    }

    fn buffer(buffer_ty: String, name: &str, statement: String) -> Self {
        Self {
            formals: vec![
                Formal::new(buffer_ty, name),
                Formal::new("size_t".to_string(), &format!("__sizeof_{}", name)),
            ],
            matcher: Matcher::Unwrapped(statement),
        }
    }
}

/// Render one half of the expectation helper pair for `sig`.
pub fn render_expectation(sig: &Signature<'_>, part: ExpectationPart) -> String {
    let plans: Vec<SlotPlan> = sig.parameters.iter().filter_map(plan_parameter).collect();
    let returns = sig.return_slot.as_ref().map(plan_return);

    let mut formals = Vec::new();
    if let Some(owner) = sig.receiver() {
        let mut object = Formal::wrapped(&format!("const {}*", owner), "__object__");
        if sig.is_destructor {
            object.default = Some(IGNORE_DEFAULT);
        }
        formals.push(object);
    }
    for plan in &plans {
        formals.extend(plan.formals.iter().cloned());
    }
    if let Some((ty, _)) = &returns {
        formals.push(Formal::new(ty.clone(), "__return__"));
    }

    let rendered: Vec<String> = formals.iter().map(|f| f.render(part)).collect();
    let single_head = format!(
        "MockExpectedCall& {}({})",
        sig.expectation_name,
        rendered.join(", ")
    );
    let mut counted = vec!["unsigned int __numCalls__".to_string()];
    counted.extend(rendered);
    let counted_head = format!(
        "MockExpectedCall& {}({})",
        sig.expectation_name,
        counted.join(", ")
    );

    let mut out = CodeBuilder::new();
    out.open_namespaces(&sig.emission_namespaces);
    match part {
        ExpectationPart::Header => {
            out.writeln(&format!("{};", single_head));
            out.writeln(&format!("{};", counted_head));
        }
        ExpectationPart::Implementation => {
            let mut args = vec!["1".to_string()];
            args.extend(formals.iter().map(|f| f.name.clone()));
            out.writeln(&single_head);
            out.block(|out| {
                out.writeln(&format!("return {}({});", sig.expectation_name, args.join(", ")));
            });
            out.writeln(&counted_head);
            out.block(|out| counted_body(out, sig, &plans, returns.as_ref().map(|(_, s)| s)));
        }
    }
    out.close_namespaces(&sig.emission_namespaces);
    out.finish()
}

fn counted_body(
    out: &mut CodeBuilder,
    sig: &Signature<'_>,
    plans: &[SlotPlan],
    return_statement: Option<&String>,
) {
    let skipping = sig.has_skipped_parameter();
    let any_wrapped = plans
        .iter()
        .any(|plan| matches!(plan.matcher, Matcher::Wrapped { .. }));
    let track_ignored = any_wrapped && !skipping;

    if track_ignored {
        out.writeln("bool __ignoreOtherParams__ = false;");
    }
    out.writeln(&format!(
        "MockExpectedCall& __expectedCall__ = mock().expectNCalls(__numCalls__, \"{}\");",
        sig.qualified_name
    ));
    if let Some(owner) = sig.receiver() {
        out.writeln(&format!(
            "if (!__object__.isIgnored()) {{ __expectedCall__.onObject(const_cast<{}*>(__object__.getValue())); }}",
            owner
        ));
    }
    for plan in plans {
        match &plan.matcher {
            Matcher::Wrapped { name, call } if skipping => {
                out.writeln(&format!(
                    "if (!{}.isIgnored()) {{ __expectedCall__{}; }}",
                    name, call
                ));
            }
            Matcher::Wrapped { name, call } => {
                out.writeln(&format!(
                    "if ({}.isIgnored()) {{ __ignoreOtherParams__ = true; }} else {{ __expectedCall__{}; }}",
                    name, call
                ));
            }
            Matcher::Unwrapped(statement) => out.writeln(statement),
        }
    }
    if let Some(statement) = return_statement {
        out.writeln(statement);
    }
    if skipping {
        out.writeln("__expectedCall__.ignoreOtherParameters();");
    } else if track_ignored {
        out.writeln("if (__ignoreOtherParams__) { __expectedCall__.ignoreOtherParameters(); }");
    }
    out.writeln("return __expectedCall__;");
}

fn plan_parameter(param: &Parameter<'_>) -> Option<SlotPlan> {
    match &param.mapping {
        SlotMapping::Classified(class) => plan_classified(&param.name, class),
        SlotMapping::Overridden(spec) => plan_overridden(&param.name, spec, param.declared_type),
    }
}

fn plan_classified(name: &str, class: &TypeClassification) -> Option<SlotPlan> {
    let value = format!("{}.getValue()", name);

    let plan = match class.mocked {
        kind if kind.is_arithmetic() => {
            let matched = if class.cast_required {
                format!("static_cast<{}>({})", kind.library_type()?, value)
            } else {
                value
            };
            SlotPlan::wrapped(
                &class.value_type(),
                name,
                format!(".with{}Parameter(\"{}\", {})", kind.api_suffix()?, name, matched),
            )
        }
        MockedType::String | MockedType::Pointer | MockedType::ConstPointer => {
            let ty = if class.dereference_needed {
                class.target_pointer()
            } else {
                class.value_type()
            };
            SlotPlan::wrapped(
                &ty,
                name,
                format!(".with{}Parameter(\"{}\", {})", class.mocked.api_suffix()?, name, value),
            )
        }
        MockedType::Output if class.is_byte_buffer() => SlotPlan::buffer(
            class.const_target_pointer(),
            name,
            output_buffer_statement(name),
        ),
        MockedType::Output => SlotPlan::wrapped(
            &class.const_target_pointer(),
            name,
            output_call(name),
        ),
        MockedType::InputOfType => SlotPlan::wrapped(
            &class.const_target_pointer(),
            name,
            format!(
                ".withParameterOfType(\"{}\", \"{}\", {})",
                class.underlying_struct_name.as_deref()?,
                name,
                value
            ),
        ),
        MockedType::OutputOfType => SlotPlan::wrapped(
            &class.const_target_pointer(),
            name,
            format!(
                ".withOutputParameterOfTypeReturning(\"{}\", \"{}\", {})",
                class.underlying_struct_name.as_deref()?,
                name,
                value
            ),
        ),
        _ => return None,
    };
    Some(plan)
}

fn plan_overridden(name: &str, spec: &OverrideSpec, declared: &ParsedType) -> Option<SlotPlan> {
    let value = format!("{}.getValue()", name);
    let expectation_type = spec.expectation_arg_type_name.as_deref();
    let target = || expectation_type.map(str::to_string).unwrap_or_else(|| override_target(declared));

    let plan = match spec.kind {
        MockedType::Skip => return None,
        kind if kind.is_primitive_slot() => {
            let library_type = kind.library_type()?;
            let (ty, matched) = match expectation_type {
                Some(ty) => (ty, format!("static_cast<{}>({})", library_type, value)),
                None => (library_type, value),
            };
            SlotPlan::wrapped(
                ty,
                name,
                format!(".with{}Parameter(\"{}\", {})", kind.api_suffix()?, name, matched),
            )
        }
        MockedType::Output if expectation_type.is_none() && targets_void(declared) => {
            SlotPlan::buffer(
                "const void *".to_string(),
                name,
                output_buffer_statement(name),
            )
        }
        MockedType::Output | MockedType::OutputPOD => {
            SlotPlan::wrapped(&const_pointer_to(&target()), name, output_call(name))
        }
        MockedType::InputOfType => SlotPlan::wrapped(
            &format!("const {}*", expectation_type.map(str::to_string).unwrap_or_else(|| exposed_type(spec, declared))),
            name,
            format!(
                ".withParameterOfType(\"{}\", \"{}\", {})",
                exposed_type(spec, declared),
                name,
                value
            ),
        ),
        MockedType::OutputOfType => SlotPlan::wrapped(
            &format!("const {}*", expectation_type.map(str::to_string).unwrap_or_else(|| exposed_type(spec, declared))),
            name,
            format!(
                ".withOutputParameterOfTypeReturning(\"{}\", \"{}\", {})",
                exposed_type(spec, declared),
                name,
                value
            ),
        ),
        MockedType::InputPOD => SlotPlan::wrapped(
            &const_pointer_to(&target()),
            name,
            format!(
                ".withMemoryBufferParameter(\"{}\", {}, sizeof(*{}))",
                name,
                byte_pointer(&value),
                value
            ),
        ),
        MockedType::MemoryBuffer => SlotPlan::buffer(
            const_pointer_to(&target()),
            name,
            format!(
                "__expectedCall__.withMemoryBufferParameter(\"{}\", {}, __sizeof_{});",
                name,
                byte_pointer(name),
                name
            ),
        ),
        _ => return None,
    };
    Some(plan)
}

fn output_call(name: &str) -> String {
    format!(
        ".withOutputParameterReturning(\"{}\", {}.getValue(), sizeof(*{}.getValue()))",
        name, name, name
    )
}

fn output_buffer_statement(name: &str) -> String {
    format!(
        "__expectedCall__.withOutputParameterReturning(\"{}\", {}, __sizeof_{});",
        name, name, name
    )
}

/// Formal type of `__return__` and the statement registering it.
fn plan_return(slot: &ReturnSlot<'_>) -> (String, String) {
    let (ty, value) = match &slot.mapping {
        SlotMapping::Classified(class) => classified_return(class),
        SlotMapping::Overridden(spec) => {
            let library_type = spec.kind.library_type().unwrap_or("const void *");
            match spec.expectation_arg_type_name.as_deref() {
                Some(ty) => (
                    ty.to_string(),
                    format!("static_cast<{}>(__return__)", library_type),
                ),
                None => (library_type.to_string(), "__return__".to_string()),
            }
        }
    };
    (ty, format!("__expectedCall__.andReturnValue({});", value))
}

fn classified_return(class: &TypeClassification) -> (String, String) {
    let library_type = class.mocked.library_type().unwrap_or("const void *");
    match class.mocked {
        MockedType::Pointer | MockedType::ConstPointer if class.dereference_needed => (
            class.target_reference(),
            format!("static_cast<{}>(&__return__)", library_type),
        ),
        _ if class.cast_required => (
            class.value_type(),
            format!("static_cast<{}>(__return__)", library_type),
        ),
        _ => (class.value_type(), "__return__".to_string()),
    }
}
