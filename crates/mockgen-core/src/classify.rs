//! Type classification.
//!
//! Walks a parsed type and decides which typed API of the mock library a
//! slot maps to, together with the hints the renderers need to build a
//! compilable argument or return expression.

use crate::config::MockedType;
use crate::decl::{strip_const, strip_tag_keyword, ParsedType, TypeKind};
use crate::error::ClassifyError;

/// Position of a slot in the signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotContext {
    Return,
    Argument,
}

/// Kind of reference the slot type was declared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReferenceKind {
    #[default]
    None,
    LValue,
    RValue,
}

/// Options threaded through classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifyContext {
    pub slot: SlotContext,
    pub use_underlying_typedef: bool,
}

impl ClassifyContext {
    pub fn argument(use_underlying_typedef: bool) -> Self {
        Self {
            slot: SlotContext::Argument,
            use_underlying_typedef,
        }
    }

    pub fn ret(use_underlying_typedef: bool) -> Self {
        Self {
            slot: SlotContext::Return,
            use_underlying_typedef,
        }
    }

    fn is_return(&self) -> bool {
        self.slot == SlotContext::Return
    }
}

/// Result of classifying one slot type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeClassification {
    pub mocked: MockedType,
    /// Spelling used in the emitted signature
    pub rendered_type: String,
    /// The value must go through `static_cast` to or from the library type
    pub cast_required: bool,
    /// References and by-value records: `&arg` on input, `*ptr` on return
    pub dereference_needed: bool,
    pub is_const: bool,
    pub is_pointer_like: bool,
    /// Type tag for `withParameterOfType` and friends
    pub underlying_struct_name: Option<String>,
    pub array_decayed: bool,
    pub reference: ReferenceKind,
    /// Unqualified spelling of the pointed-to, referenced or by-value type
    pub target_type: Option<String>,
    pub target_const: bool,
    /// Output buffer whose size only the caller knows
    pub unsized_buffer: bool,
}

impl TypeClassification {
    fn new(mocked: MockedType, rendered_type: String) -> Self {
        Self {
            mocked,
            rendered_type,
            cast_required: false,
            dereference_needed: false,
            is_const: false,
            is_pointer_like: false,
            underlying_struct_name: None,
            array_decayed: false,
            reference: ReferenceKind::None,
            target_type: None,
            target_const: false,
            unsized_buffer: false,
        }
    }

    /// Rendered type without a top-level const, as held by value.
    pub fn value_type(&self) -> String {
        let spelling = match self.reference {
            ReferenceKind::RValue => self.rendered_type.trim_end_matches('&').trim_end(),
            _ => self.rendered_type.as_str(),
        };
        if self.is_const {
            strip_const(spelling, self.is_pointer_like).to_string()
        } else {
            spelling.to_string()
        }
    }

    /// `const T *` spelling of the target, for expectation formals.
    pub fn const_target_pointer(&self) -> String {
        match &self.target_type {
            Some(target) => const_pointer_to(target),
            None => "const void *".to_string(),
        }
    }

    /// `T *` spelling of the target keeping its own constness.
    pub fn target_pointer(&self) -> String {
        match &self.target_type {
            Some(target) if self.target_const => const_pointer_to(target),
            Some(target) => format!("{} *", target),
            None if self.target_const => "const void *".to_string(),
            None => "void *".to_string(),
        }
    }

    /// `T &` spelling of the target keeping its own constness.
    pub fn target_reference(&self) -> String {
        let target = self.target_type.as_deref().unwrap_or("void");
        if self.target_const {
            if target.ends_with('*') {
                format!("{} const &", target)
            } else {
                format!("const {} &", target)
            }
        } else {
            format!("{} &", target)
        }
    }

    /// Whether the expectation helper needs an explicit byte count.
    pub fn is_byte_buffer(&self) -> bool {
        self.mocked == MockedType::Output && self.unsized_buffer
    }
}

/// Spell a pointer to const `target`, handling pointer targets.
pub fn const_pointer_to(target: &str) -> String {
    let target = target.trim();
    if target.ends_with('*') {
        format!("{} const *", target)
    } else {
        format!("const {} *", target)
    }
}

/// Map a builtin type to its mocked slot and whether it is narrower than the library type.
pub fn primitive_mapping(kind: TypeKind) -> Option<(MockedType, bool)> {
    let mapping = match kind {
        TypeKind::Bool => (MockedType::Bool, false),
        TypeKind::Int => (MockedType::Int, false),
        TypeKind::UInt => (MockedType::UnsignedInt, false),
        TypeKind::Short => (MockedType::Int, true),
        TypeKind::UShort => (MockedType::UnsignedInt, true),
        TypeKind::CharS => (MockedType::Int, true),
        TypeKind::SChar => (MockedType::Int, true),
        TypeKind::UChar => (MockedType::UnsignedInt, true),
        TypeKind::Long => (MockedType::Long, false),
        TypeKind::ULong => (MockedType::UnsignedLong, false),
        TypeKind::LongLong => (MockedType::Long, true),
        TypeKind::ULongLong => (MockedType::UnsignedLong, true),
        TypeKind::Float => (MockedType::Double, true),
        TypeKind::Double => (MockedType::Double, false),
        TypeKind::LongDouble => (MockedType::Double, true),
        TypeKind::WChar => (MockedType::Int, true),
        TypeKind::Char16 => (MockedType::UnsignedInt, true),
        TypeKind::Char32 => (MockedType::UnsignedLong, true),
        _ => return None,
    };
    Some(mapping)
}

/// Classify `ty` for the given slot context.
///
/// `void` is not a valid input: the caller handles the empty return slot.
pub fn classify(
    ty: &ParsedType,
    ctx: &ClassifyContext,
) -> Result<TypeClassification, ClassifyError> {
    let canonical = ty.canonical();

    if canonical.kind.is_array() && !ctx.is_return() {
        return classify_decayed_array(ty, canonical, ctx);
    }

    let mut result = match canonical.kind {
        kind if kind.is_builtin_scalar() => classify_scalar(ty, canonical)?,
        TypeKind::Enum => {
            let mut result = TypeClassification::new(MockedType::Int, ty.spelling.clone());
            result.cast_required = true;
            result
        }
        TypeKind::Record => classify_record_value(ty, canonical, ctx)?,
        TypeKind::Pointer | TypeKind::LValueReference | TypeKind::RValueReference => {
            classify_indirection(ty, canonical, ctx)?
        }
        _ => return Err(unsupported(ty)),
    };

    // An rvalue argument carries the constness of its referee
    result.is_const |= ty.is_const_qualified();
    Ok(result)
}

fn unsupported(ty: &ParsedType) -> ClassifyError {
    ClassifyError::UnsupportedType {
        spelling: ty.spelling.clone(),
    }
}

fn classify_scalar(
    ty: &ParsedType,
    canonical: &ParsedType,
) -> Result<TypeClassification, ClassifyError> {
    let (mocked, narrow) = primitive_mapping(canonical.kind).ok_or_else(|| unsupported(ty))?;
    let mut result = TypeClassification::new(mocked, ty.spelling.clone());
    // A typedef spelling never matches the library type exactly
    result.cast_required = narrow || ty.kind == TypeKind::Typedef;
    Ok(result)
}

fn classify_record_value(
    ty: &ParsedType,
    canonical: &ParsedType,
    ctx: &ClassifyContext,
) -> Result<TypeClassification, ClassifyError> {
    if !canonical.is_complete {
        return Err(unsupported(ty));
    }

    let mocked = if ctx.is_return() {
        MockedType::ConstPointer
    } else {
        MockedType::InputOfType
    };
    let mut result = TypeClassification::new(mocked, ty.spelling.clone());
    result.dereference_needed = true;
    result.cast_required = ctx.is_return();
    result.target_type = Some(ty.unqualified_spelling());
    result.target_const = true;
    if !ctx.is_return() {
        result.underlying_struct_name = Some(record_tag(ty, ctx.use_underlying_typedef));
    }
    Ok(result)
}

fn classify_decayed_array(
    ty: &ParsedType,
    canonical: &ParsedType,
    ctx: &ClassifyContext,
) -> Result<TypeClassification, ClassifyError> {
    let element = canonical.pointee().ok_or_else(|| unsupported(ty))?;
    let rendered = format!("{} *", element.spelling);
    let mut result = classify_target(ty, element, rendered, ctx)?;
    result.array_decayed = true;
    result.is_pointer_like = true;
    if result.mocked == MockedType::Output {
        result.unsized_buffer = true;
    }
    Ok(result)
}

fn classify_indirection(
    ty: &ParsedType,
    canonical: &ParsedType,
    ctx: &ClassifyContext,
) -> Result<TypeClassification, ClassifyError> {
    let pointee = canonical.pointee().ok_or_else(|| unsupported(ty))?;

    let reference = match canonical.kind {
        TypeKind::LValueReference => ReferenceKind::LValue,
        TypeKind::RValueReference => ReferenceKind::RValue,
        _ => ReferenceKind::None,
    };

    // Move semantics are erased by the mock library: an rvalue argument is a value.
    if reference == ReferenceKind::RValue && !ctx.is_return() {
        let mut result = classify(pointee, ctx)?;
        result.rendered_type = ty.spelling.clone();
        result.reference = reference;
        return Ok(result);
    }

    let mut result = classify_target(ty, pointee, ty.spelling.clone(), ctx)?;
    result.reference = reference;
    result.is_pointer_like = true;
    if reference != ReferenceKind::None {
        result.dereference_needed = true;
        if ctx.is_return() {
            result.cast_required = true;
        }
    }
    Ok(result)
}

/// Classify a pointer-like slot from its target type.
fn classify_target(
    ty: &ParsedType,
    target: &ParsedType,
    rendered: String,
    ctx: &ClassifyContext,
) -> Result<TypeClassification, ClassifyError> {
    let target_canonical = target.canonical();
    let target_const = target.is_const_qualified();
    let is_pointer = ty.canonical().kind == TypeKind::Pointer || ty.canonical().kind.is_array();

    let pointer_slot = if target_const {
        MockedType::ConstPointer
    } else {
        MockedType::Pointer
    };

    let mocked = match target_canonical.kind {
        TypeKind::FunctionProto => return Err(unsupported(ty)),
        TypeKind::Void => pointer_slot,
        TypeKind::CharS if is_pointer && target_const => MockedType::String,
        TypeKind::Record => {
            if ctx.is_return() {
                pointer_slot
            } else if target_const {
                MockedType::InputOfType
            } else {
                MockedType::OutputOfType
            }
        }
        _ if target_const => MockedType::ConstPointer,
        _ if ctx.is_return() => MockedType::Pointer,
        _ => MockedType::Output,
    };

    let mut result = TypeClassification::new(mocked, rendered);
    result.target_const = target_const;
    if target_canonical.kind != TypeKind::Void {
        result.target_type = Some(target.unqualified_spelling());
    }

    match mocked {
        MockedType::InputOfType | MockedType::OutputOfType => {
            result.underlying_struct_name = Some(record_tag(target, ctx.use_underlying_typedef));
        }
        MockedType::Output => {
            // Plain char pointers are strings the caller sizes
            result.unsized_buffer = target_canonical.kind == TypeKind::CharS;
        }
        MockedType::Pointer | MockedType::ConstPointer => {
            result.cast_required = ctx.is_return() && target_canonical.kind != TypeKind::Void;
        }
        _ => {}
    }

    Ok(result)
}

/// Type tag of a record slot honouring the typedef policy.
fn record_tag(ty: &ParsedType, use_underlying_typedef: bool) -> String {
    let named = if ty.kind == TypeKind::Typedef && !use_underlying_typedef {
        ty
    } else {
        ty.canonical()
    };
    let name = named
        .decl_name
        .clone()
        .unwrap_or_else(|| named.unqualified_spelling());
    strip_tag_keyword(&name).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arg(ty: &ParsedType) -> TypeClassification {
        classify(ty, &ClassifyContext::argument(false)).unwrap()
    }

    fn ret(ty: &ParsedType) -> TypeClassification {
        classify(ty, &ClassifyContext::ret(false)).unwrap()
    }

    #[test]
    fn test_primitive_table() {
        let table = [
            (TypeKind::Bool, MockedType::Bool, false),
            (TypeKind::Int, MockedType::Int, false),
            (TypeKind::UInt, MockedType::UnsignedInt, false),
            (TypeKind::Short, MockedType::Int, true),
            (TypeKind::UShort, MockedType::UnsignedInt, true),
            (TypeKind::CharS, MockedType::Int, true),
            (TypeKind::SChar, MockedType::Int, true),
            (TypeKind::UChar, MockedType::UnsignedInt, true),
            (TypeKind::Long, MockedType::Long, false),
            (TypeKind::ULong, MockedType::UnsignedLong, false),
            (TypeKind::Float, MockedType::Double, true),
            (TypeKind::Double, MockedType::Double, false),
            (TypeKind::WChar, MockedType::Int, true),
            (TypeKind::Char16, MockedType::UnsignedInt, true),
            (TypeKind::Char32, MockedType::UnsignedLong, true),
        ];

        for (kind, mocked, cast) in table {
            let result = arg(&ParsedType::builtin(kind));
            assert_eq!(result.mocked, mocked, "{:?}", kind);
            assert_eq!(result.cast_required, cast, "{:?}", kind);
            assert!(!result.is_pointer_like);
        }
    }

    #[test]
    fn test_enum_is_int_with_cast() {
        let result = arg(&ParsedType::enumeration("Enum1"));
        assert_eq!(result.mocked, MockedType::Int);
        assert!(result.cast_required);
        assert_eq!(result.rendered_type, "Enum1");
    }

    #[test]
    fn test_typedef_of_int_keeps_spelling_and_casts() {
        let ty = ParsedType::typedef_of("Type1", ParsedType::builtin(TypeKind::Int));
        let result = ret(&ty);
        assert_eq!(result.mocked, MockedType::Int);
        assert_eq!(result.rendered_type, "Type1");
        assert!(result.cast_required);
    }

    #[test]
    fn test_void_pointers() {
        let ty = ParsedType::void().pointer_to();
        assert_eq!(arg(&ty).mocked, MockedType::Pointer);
        assert!(!ret(&ty).cast_required);

        let ty = ParsedType::void().constant().pointer_to();
        assert_eq!(arg(&ty).mocked, MockedType::ConstPointer);
        assert_eq!(ret(&ty).mocked, MockedType::ConstPointer);
    }

    #[test]
    fn test_char_pointers() {
        let ty = ParsedType::builtin(TypeKind::CharS).constant().pointer_to();
        let result = arg(&ty);
        assert_eq!(result.mocked, MockedType::String);
        assert_eq!(result.rendered_type, "const char *");
        assert_eq!(ret(&ty).mocked, MockedType::String);

        let ty = ParsedType::builtin(TypeKind::CharS).pointer_to();
        let result = arg(&ty);
        assert_eq!(result.mocked, MockedType::Output);
        assert!(result.is_byte_buffer());
        assert_eq!(ret(&ty).mocked, MockedType::Pointer);
    }

    #[test]
    fn test_const_char_reference_is_const_pointer() {
        let ty = ParsedType::builtin(TypeKind::CharS).constant().lvalue_ref_to();
        let result = arg(&ty);
        assert_eq!(result.mocked, MockedType::ConstPointer);
        assert!(result.dereference_needed);
    }

    #[test]
    fn test_primitive_pointers() {
        let ty = ParsedType::builtin(TypeKind::Int).pointer_to();
        let result = arg(&ty);
        assert_eq!(result.mocked, MockedType::Output);
        assert!(!result.is_byte_buffer());
        assert_eq!(result.target_type.as_deref(), Some("int"));
        assert_eq!(result.const_target_pointer(), "const int *");

        let result = ret(&ty);
        assert_eq!(result.mocked, MockedType::Pointer);
        assert!(result.cast_required);

        let ty = ParsedType::builtin(TypeKind::Int).constant().pointer_to();
        assert_eq!(arg(&ty).mocked, MockedType::ConstPointer);
        assert_eq!(ret(&ty).mocked, MockedType::ConstPointer);
    }

    #[test]
    fn test_record_slots() {
        let class1 = ParsedType::record("Class1");

        let result = arg(&class1.clone().constant().pointer_to());
        assert_eq!(result.mocked, MockedType::InputOfType);
        assert_eq!(result.underlying_struct_name.as_deref(), Some("Class1"));

        let result = arg(&class1.clone().lvalue_ref_to());
        assert_eq!(result.mocked, MockedType::OutputOfType);
        assert!(result.dereference_needed);

        let result = arg(&class1);
        assert_eq!(result.mocked, MockedType::InputOfType);
        assert!(result.dereference_needed);

        let result = ret(&class1);
        assert_eq!(result.mocked, MockedType::ConstPointer);
        assert!(result.dereference_needed);
        assert_eq!(result.target_pointer(), "const Class1 *");

        let result = ret(&ParsedType::record("Class1").pointer_to());
        assert_eq!(result.mocked, MockedType::Pointer);
    }

    #[test]
    fn test_typedef_policy_for_record_tags() {
        let alias = ParsedType::typedef_of("TStruct1", ParsedType::record("Struct1"));
        let ty = alias.constant().pointer_to();

        let result = classify(&ty, &ClassifyContext::argument(false)).unwrap();
        assert_eq!(result.underlying_struct_name.as_deref(), Some("TStruct1"));

        let result = classify(&ty, &ClassifyContext::argument(true)).unwrap();
        assert_eq!(result.underlying_struct_name.as_deref(), Some("Struct1"));
    }

    #[test]
    fn test_elaborated_record_tag_drops_keyword() {
        let mut record = ParsedType::record("Struct2");
        record.spelling = "struct Struct2".to_string();
        record.decl_name = None;
        let result = arg(&record.pointer_to());
        assert_eq!(result.underlying_struct_name.as_deref(), Some("Struct2"));
        assert_eq!(result.target_type.as_deref(), Some("struct Struct2"));
    }

    #[test]
    fn test_array_decay() {
        let ty = ParsedType::builtin(TypeKind::Int).incomplete_array_of();
        let result = arg(&ty);
        assert!(result.array_decayed);
        assert_eq!(result.rendered_type, "int *");
        assert_eq!(result.mocked, MockedType::Output);
        assert!(result.is_byte_buffer());

        let ty = ParsedType::builtin(TypeKind::CharS).constant().array_of(10);
        let result = arg(&ty);
        assert_eq!(result.mocked, MockedType::String);
        assert_eq!(result.rendered_type, "const char *");
    }

    #[test]
    fn test_rvalue_argument_passes_by_value() {
        let ty = ParsedType::record("Class1").rvalue_ref_to();
        let result = arg(&ty);
        assert_eq!(result.mocked, MockedType::InputOfType);
        assert_eq!(result.rendered_type, "Class1 &&");
        assert_eq!(result.reference, ReferenceKind::RValue);

        let ty = ParsedType::builtin(TypeKind::Int).rvalue_ref_to();
        assert_eq!(arg(&ty).mocked, MockedType::Int);
    }

    #[test]
    fn test_value_type_drops_top_level_const() {
        assert_eq!(arg(&ParsedType::builtin(TypeKind::Short).constant()).value_type(), "short");
        let ty = ParsedType::builtin(TypeKind::CharS).constant().pointer_to();
        assert_eq!(arg(&ty).value_type(), "const char *");
        assert_eq!(arg(&ty.constant()).value_type(), "const char *");
        let ty = ParsedType::builtin(TypeKind::Int).constant().rvalue_ref_to();
        assert_eq!(arg(&ty).value_type(), "int");
    }

    #[test]
    fn test_rvalue_return_collapses_to_lvalue() {
        let ty = ParsedType::record("Class1").rvalue_ref_to();
        let result = ret(&ty);
        assert_eq!(result.mocked, MockedType::Pointer);
        assert_eq!(result.reference, ReferenceKind::RValue);
        assert_eq!(result.target_reference(), "Class1 &");
    }

    #[test]
    fn test_pointer_to_pointer() {
        let ty = ParsedType::builtin(TypeKind::CharS).pointer_to().pointer_to();
        let result = arg(&ty);
        assert_eq!(result.mocked, MockedType::Output);
        assert_eq!(result.const_target_pointer(), "char * const *");
    }

    #[test]
    fn test_unsupported_types() {
        let fn_ptr = ParsedType::function("void (int)").pointer_to();
        assert!(classify(&fn_ptr, &ClassifyContext::argument(false)).is_err());

        let incomplete = ParsedType::incomplete_record("Opaque");
        assert_eq!(
            classify(&incomplete, &ClassifyContext::argument(false)),
            Err(ClassifyError::UnsupportedType {
                spelling: "Opaque".to_string()
            })
        );

        // Pointers to incomplete records only need the tag
        let result = arg(&ParsedType::incomplete_record("Opaque").pointer_to());
        assert_eq!(result.mocked, MockedType::OutputOfType);
    }
}
