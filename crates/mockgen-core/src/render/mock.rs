//! Mock function bodies.

use super::{
    byte_pointer, declaration_text, exception_suffix, exposed_type, pointee_size,
    pointer_to_referee,
};
use crate::builder::CodeBuilder;
use crate::classify::{ReferenceKind, TypeClassification};
use crate::config::{MockedType, OverrideSpec};
use crate::decl::ParsedType;
use crate::signature::{Parameter, ReturnSlot, Signature, SlotMapping};

/// Render the out-of-line definition that forwards a call to the mock library.
pub fn render_mock(sig: &Signature<'_>) -> String {
    let mut out = CodeBuilder::new();
    out.writeln(&head(sig));
    out.block(|out| out.writeln(&body(sig)));
    out.finish()
}

fn head(sig: &Signature<'_>) -> String {
    let mut params: Vec<String> = sig
        .parameters
        .iter()
        .map(|p| declaration_text(p.declared_type, &p.name))
        .collect();
    if sig.is_variadic {
        params.push("...".to_string());
    }

    let mut head = String::new();
    if !sig.is_destructor && !sig.is_conversion {
        head.push_str(&sig.return_spelling);
        head.push(' ');
    }
    head.push_str(&sig.qualified_name);
    head.push('(');
    head.push_str(&params.join(", "));
    head.push(')');
    if sig.is_const_method {
        head.push_str(" const");
    }
    if let Some(suffix) = exception_suffix(&sig.exception_spec, &sig.qualified_name) {
        head.push(' ');
        head.push_str(&suffix);
    }
    head
}

fn body(sig: &Signature<'_>) -> String {
    let mut call = format!("mock().actualCall(\"{}\")", sig.qualified_name);
    if let Some(owner) = sig.receiver() {
        if sig.is_const_method {
            call.push_str(&format!(".onObject(const_cast<{}*>(this))", owner));
        } else {
            call.push_str(".onObject(this)");
        }
    }
    for param in &sig.parameters {
        if let Some(fragment) = parameter_call(param) {
            call.push_str(&fragment);
        }
    }

    match &sig.return_slot {
        None => format!("{};", call),
        Some(slot) => format!("return {};", return_expr(slot, &call, &sig.qualified_name)),
    }
}

fn parameter_call(param: &Parameter<'_>) -> Option<String> {
    match &param.mapping {
        SlotMapping::Classified(class) => classified_parameter(&param.name, class),
        SlotMapping::Overridden(spec) => overridden_parameter(&param.name, spec, param.declared_type),
    }
}

fn classified_parameter(name: &str, class: &TypeClassification) -> Option<String> {
    let arg = if class.dereference_needed {
        format!("&{}", name)
    } else {
        name.to_string()
    };

    let fragment = match class.mocked {
        kind if kind.is_arithmetic() => {
            let value = if class.cast_required {
                format!("static_cast<{}>({})", kind.library_type()?, arg)
            } else {
                arg
            };
            format!(".with{}Parameter(\"{}\", {})", kind.api_suffix()?, name, value)
        }
        MockedType::String | MockedType::Pointer | MockedType::ConstPointer => {
            format!(".with{}Parameter(\"{}\", {})", class.mocked.api_suffix()?, name, arg)
        }
        MockedType::Output => format!(".withOutputParameter(\"{}\", {})", name, arg),
        MockedType::InputOfType => format!(
            ".withParameterOfType(\"{}\", \"{}\", {})",
            class.underlying_struct_name.as_deref()?,
            name,
            arg
        ),
        MockedType::OutputOfType => format!(
            ".withOutputParameterOfType(\"{}\", \"{}\", {})",
            class.underlying_struct_name.as_deref()?,
            name,
            arg
        ),
        _ => return None,
    };
    Some(fragment)
}

fn overridden_parameter(name: &str, spec: &OverrideSpec, declared: &ParsedType) -> Option<String> {
    let arg = spec.wrap_expr(name);

    let fragment = match spec.kind {
        kind if kind.is_arithmetic() => format!(
            ".with{}Parameter(\"{}\", static_cast<{}>({}))",
            kind.api_suffix()?,
            name,
            kind.library_type()?,
            arg
        ),
        MockedType::String | MockedType::Pointer | MockedType::ConstPointer => {
            format!(".with{}Parameter(\"{}\", {})", spec.kind.api_suffix()?, name, arg)
        }
        MockedType::Output | MockedType::OutputPOD => {
            format!(".withOutputParameter(\"{}\", {})", name, arg)
        }
        MockedType::InputOfType => format!(
            ".withParameterOfType(\"{}\", \"{}\", {})",
            exposed_type(spec, declared),
            name,
            arg
        ),
        MockedType::OutputOfType => format!(
            ".withOutputParameterOfType(\"{}\", \"{}\", {})",
            exposed_type(spec, declared),
            name,
            arg
        ),
        MockedType::InputPOD => format!(
            ".withMemoryBufferParameter(\"{}\", {}, {})",
            name,
            byte_pointer(&arg),
            pointee_size(&arg)
        ),
        MockedType::MemoryBuffer => format!(
            ".withMemoryBufferParameter(\"{}\", {}, {})",
            name,
            byte_pointer(&arg),
            spec.size_expr(name)
        ),
        // Skip
        _ => return None,
    };
    Some(fragment)
}

fn return_expr(slot: &ReturnSlot<'_>, call: &str, function: &str) -> String {
    let kind = slot.mapping.mocked();
    let suffix = kind.api_suffix().unwrap_or("Pointer");
    let raw = format!("{}.return{}Value()", call, suffix);

    match &slot.mapping {
        SlotMapping::Classified(class) => classified_return(class, raw, function),
        SlotMapping::Overridden(spec) => overridden_return(spec, slot.declared_type, raw),
    }
}

fn classified_return(class: &TypeClassification, raw: String, function: &str) -> String {
    match class.mocked {
        MockedType::Pointer | MockedType::ConstPointer => match class.reference {
            ReferenceKind::RValue => {
                log::warn!(
                    "`{}` returns an rvalue reference; its mock returns the referee as an lvalue moved out",
                    function
                );
                let target = class.target_reference();
                format!(
                    "static_cast<{} &&>(*static_cast<{}>({}))",
                    target.trim_end_matches('&').trim_end(),
                    class.target_pointer(),
                    raw
                )
            }
            _ if class.dereference_needed => {
                format!("*static_cast<{}>({})", class.target_pointer(), raw)
            }
            _ if class.cast_required => format!("static_cast<{}>({})", class.value_type(), raw),
            _ => raw,
        },
        _ if class.cast_required => format!("static_cast<{}>({})", class.value_type(), raw),
        _ => raw,
    }
}

fn overridden_return(spec: &OverrideSpec, declared: &ParsedType, raw: String) -> String {
    if !spec.expr_front.is_empty() || !spec.expr_back.is_empty() {
        return spec.wrap_expr(&raw);
    }
    match spec.kind {
        MockedType::String => raw,
        MockedType::Pointer | MockedType::ConstPointer => match pointer_to_referee(declared) {
            Some(pointer) => format!("*static_cast<{}>({})", pointer, raw),
            None => format!("static_cast<{}>({})", declared.unqualified_spelling(), raw),
        },
        _ => format!("static_cast<{}>({})", declared.unqualified_spelling(), raw),
    }
}
