//! Lowering of libclang cursors and types into the declaration model.

use mockgen_core::{
    strip_const, AccessSpecifier, DeclKind, ExceptionSpec, FunctionDecl, ParamDecl, ParsedType,
    ScopeKind, ScopeSegment, SourceLocation, TypeKind,
};
use std::ffi::CStr;
use std::ptr;

/// Map a cursor kind to the function-like declaration it introduces.
pub(crate) fn function_kind(kind: clang_sys::CXCursorKind) -> Option<DeclKind> {
    match kind {
        clang_sys::CXCursor_FunctionDecl => Some(DeclKind::Function),
        clang_sys::CXCursor_CXXMethod => Some(DeclKind::Method),
        clang_sys::CXCursor_ConversionFunction => Some(DeclKind::Conversion),
        clang_sys::CXCursor_Destructor => Some(DeclKind::Destructor),
        clang_sys::CXCursor_Constructor => Some(DeclKind::Constructor),
        clang_sys::CXCursor_FunctionTemplate => Some(DeclKind::FunctionTemplate),
        _ => None,
    }
}

/// Lower a function, method or destructor cursor.
pub(crate) fn lower_function(cursor: clang_sys::CXCursor, kind: DeclKind) -> FunctionDecl {
    unsafe {
        let cursor_type = clang_sys::clang_getCursorType(cursor);
        let is_method = matches!(kind, DeclKind::Method | DeclKind::Conversion | DeclKind::Destructor);

        let num_args = clang_sys::clang_Cursor_getNumArguments(cursor).max(0);
        let mut params = Vec::with_capacity(num_args as usize);
        for i in 0..num_args {
            let arg = clang_sys::clang_Cursor_getArgument(cursor, i as u32);
            params.push(ParamDecl {
                name: cursor_spelling(arg),
                ty: lower_type(clang_sys::clang_getCursorType(arg)),
            });
        }

        let is_definition = clang_sys::clang_isCursorDefinition(cursor) != 0
            || (is_method
                && (clang_sys::clang_CXXMethod_isDefaulted(cursor) != 0
                    || clang_sys::clang_CXXMethod_isDeleted(cursor) != 0));
        let specialized = clang_sys::clang_getSpecializedCursorTemplate(cursor);

        FunctionDecl {
            kind,
            name: cursor_spelling(cursor),
            usr: cursor_usr(clang_sys::clang_getCanonicalCursor(cursor)),
            scopes: semantic_scopes(cursor),
            access: access_specifier(cursor),
            is_definition,
            is_virtual: is_method && clang_sys::clang_CXXMethod_isVirtual(cursor) != 0,
            is_pure_virtual: is_method && clang_sys::clang_CXXMethod_isPureVirtual(cursor) != 0,
            is_const: is_method && clang_sys::clang_CXXMethod_isConst(cursor) != 0,
            is_static: is_method && clang_sys::clang_CXXMethod_isStatic(cursor) != 0,
            is_variadic: clang_sys::clang_isFunctionTypeVariadic(cursor_type) != 0,
            is_template_specialization: clang_sys::clang_Cursor_isNull(specialized) == 0,
            exception_spec: exception_spec(cursor, cursor_type),
            return_type: lower_type(clang_sys::clang_getCursorResultType(cursor)),
            params,
            location: cursor_location(cursor),
        }
    }
}

/// Lower a type into a [`ParsedType`] tree, keeping clang's spelling.
pub(crate) fn lower_type(ty: clang_sys::CXType) -> ParsedType {
    unsafe {
        let spelling = type_spelling(ty);
        let is_const = clang_sys::clang_isConstQualifiedType(ty) != 0;

        let kind = match ty.kind {
            clang_sys::CXType_Void => TypeKind::Void,
            clang_sys::CXType_Bool => TypeKind::Bool,
            clang_sys::CXType_Char_S | clang_sys::CXType_Char_U => TypeKind::CharS,
            clang_sys::CXType_SChar => TypeKind::SChar,
            clang_sys::CXType_UChar => TypeKind::UChar,
            clang_sys::CXType_Short => TypeKind::Short,
            clang_sys::CXType_UShort => TypeKind::UShort,
            clang_sys::CXType_Int => TypeKind::Int,
            clang_sys::CXType_UInt => TypeKind::UInt,
            clang_sys::CXType_Long => TypeKind::Long,
            clang_sys::CXType_ULong => TypeKind::ULong,
            clang_sys::CXType_LongLong => TypeKind::LongLong,
            clang_sys::CXType_ULongLong => TypeKind::ULongLong,
            clang_sys::CXType_Float => TypeKind::Float,
            clang_sys::CXType_Double => TypeKind::Double,
            clang_sys::CXType_LongDouble => TypeKind::LongDouble,
            clang_sys::CXType_WChar => TypeKind::WChar,
            clang_sys::CXType_Char16 => TypeKind::Char16,
            clang_sys::CXType_Char32 => TypeKind::Char32,

            clang_sys::CXType_Pointer
            | clang_sys::CXType_LValueReference
            | clang_sys::CXType_RValueReference => {
                let kind = match ty.kind {
                    clang_sys::CXType_Pointer => TypeKind::Pointer,
                    clang_sys::CXType_LValueReference => TypeKind::LValueReference,
                    _ => TypeKind::RValueReference,
                };
                let mut node = node(kind, spelling, is_const);
                node.pointee = Some(Box::new(lower_type(clang_sys::clang_getPointeeType(ty))));
                return node;
            }

            clang_sys::CXType_ConstantArray | clang_sys::CXType_IncompleteArray => {
                let kind = if ty.kind == clang_sys::CXType_ConstantArray {
                    TypeKind::ConstantArray
                } else {
                    TypeKind::IncompleteArray
                };
                let mut node = node(kind, spelling, is_const);
                node.pointee = Some(Box::new(lower_type(clang_sys::clang_getArrayElementType(ty))));
                return node;
            }

            // Sugar: lower the named type and keep the spelling as written
            clang_sys::CXType_Elaborated => {
                let mut named = lower_type(clang_sys::clang_Type_getNamedType(ty));
                named.spelling = spelling;
                named.is_const |= is_const;
                return named;
            }

            clang_sys::CXType_Typedef => {
                let decl = clang_sys::clang_getTypeDeclaration(ty);
                let underlying = clang_sys::clang_getTypedefDeclUnderlyingType(decl);
                let mut node = node(TypeKind::Typedef, spelling, is_const);
                node.decl_name = Some(qualified_cursor_name(decl));
                node.underlying = Some(Box::new(lower_type(underlying)));
                return node;
            }

            clang_sys::CXType_Record => {
                let mut node = node(TypeKind::Record, spelling, is_const);
                node.decl_name = Some(record_name(ty));
                node.is_complete = clang_sys::clang_Type_getSizeOf(ty) >= 0;
                return node;
            }

            clang_sys::CXType_Enum => {
                let decl = clang_sys::clang_getTypeDeclaration(ty);
                let mut node = node(TypeKind::Enum, spelling, is_const);
                node.decl_name = Some(qualified_cursor_name(decl));
                return node;
            }

            clang_sys::CXType_FunctionProto | clang_sys::CXType_FunctionNoProto => {
                TypeKind::FunctionProto
            }

            clang_sys::CXType_Dependent => TypeKind::Dependent,

            // Template specializations and decayed parameters surface as unexposed
            _ => {
                let canonical = clang_sys::clang_getCanonicalType(ty);
                if canonical.kind != ty.kind && canonical.kind != clang_sys::CXType_Unexposed {
                    let mut lowered = lower_type(canonical);
                    lowered.spelling = spelling;
                    lowered.is_const |= is_const;
                    return lowered;
                }
                TypeKind::Other
            }
        };

        node(kind, spelling, is_const)
    }
}

fn node(kind: TypeKind, spelling: String, is_const: bool) -> ParsedType {
    ParsedType {
        kind,
        spelling,
        is_const,
        pointee: None,
        underlying: None,
        decl_name: None,
        is_complete: true,
    }
}

/// Qualified name of a record type, as spelled by its canonical type.
fn record_name(ty: clang_sys::CXType) -> String {
    unsafe {
        let canonical = type_spelling(clang_sys::clang_getCanonicalType(ty));
        mockgen_core::strip_tag_keyword(strip_const(&canonical, false)).to_string()
    }
}

/// Semantic parents of `cursor`, outermost first.
///
/// Linkage specifications (`extern "C"`) are transparent.
pub(crate) fn semantic_scopes(cursor: clang_sys::CXCursor) -> Vec<ScopeSegment> {
    unsafe {
        let mut scopes = Vec::new();
        let mut current = cursor;

        loop {
            let parent = clang_sys::clang_getCursorSemanticParent(current);
            if clang_sys::clang_Cursor_isNull(parent) != 0
                || clang_sys::clang_equalCursors(current, parent) != 0
            {
                break;
            }

            let kind = clang_sys::clang_getCursorKind(parent);
            if kind == clang_sys::CXCursor_TranslationUnit {
                break;
            }

            let name = if clang_sys::clang_Cursor_isAnonymous(parent) != 0 {
                String::new()
            } else {
                cursor_spelling(parent)
            };
            match kind {
                clang_sys::CXCursor_LinkageSpec => {}
                clang_sys::CXCursor_Namespace => scopes.push(ScopeSegment::namespace(&name)),
                clang_sys::CXCursor_ClassDecl
                | clang_sys::CXCursor_StructDecl
                | clang_sys::CXCursor_UnionDecl => {
                    scopes.push(ScopeSegment::class(&name).with_access(access_specifier(parent)));
                }
                _ => scopes.push(ScopeSegment {
                    name,
                    kind: ScopeKind::Other,
                    access: access_specifier(parent),
                }),
            }

            current = parent;
        }

        scopes.reverse();
        scopes
    }
}

/// Fully qualified name of a declaration cursor (`ns1::Class1::Type`).
fn qualified_cursor_name(cursor: clang_sys::CXCursor) -> String {
    let mut path: Vec<String> = semantic_scopes(cursor)
        .into_iter()
        .map(|scope| scope.name)
        .filter(|name| !name.is_empty())
        .collect();
    path.push(cursor_spelling(cursor));
    path.join("::")
}

/// Get the access specifier for a cursor; namespace-scope declarations are public.
fn access_specifier(cursor: clang_sys::CXCursor) -> AccessSpecifier {
    unsafe {
        match clang_sys::clang_getCXXAccessSpecifier(cursor) {
            clang_sys::CX_CXXProtected => AccessSpecifier::Protected,
            clang_sys::CX_CXXPrivate => AccessSpecifier::Private,
            _ => AccessSpecifier::Public,
        }
    }
}

/// Exception specification as written on the declaration.
///
/// libclang also reports implicit specifications (destructors are implicitly
/// `noexcept`), so the keyword must appear among the declaration's tokens.
fn exception_spec(cursor: clang_sys::CXCursor, cursor_type: clang_sys::CXType) -> ExceptionSpec {
    let kind = unsafe { clang_sys::clang_getExceptionSpecificationType(cursor_type) } as i32;
    let tokens = cursor_tokens(cursor);
    let has = |keyword: &str| tokens.iter().any(|t| t == keyword);

    let basic_noexcept = clang_sys::CXCursor_ExceptionSpecificationKind_BasicNoexcept as i32;
    let computed_noexcept = clang_sys::CXCursor_ExceptionSpecificationKind_ComputedNoexcept as i32;
    let dynamic_none = clang_sys::CXCursor_ExceptionSpecificationKind_DynamicNone as i32;
    let dynamic = clang_sys::CXCursor_ExceptionSpecificationKind_Dynamic as i32;
    let ms_any = clang_sys::CXCursor_ExceptionSpecificationKind_MSAny as i32;

    if kind == basic_noexcept && has("noexcept") {
        ExceptionSpec::Noexcept
    } else if kind == computed_noexcept && has("noexcept") {
        match noexcept_operand(&tokens) {
            Some(operand) => ExceptionSpec::NoexceptIf(operand),
            None => ExceptionSpec::Noexcept,
        }
    } else if kind == dynamic_none && has("throw") {
        ExceptionSpec::Throw(Vec::new())
    } else if kind == ms_any && has("throw") {
        ExceptionSpec::ThrowAny
    } else if kind == dynamic && has("throw") {
        ExceptionSpec::Throw(throw_types(&tokens))
    } else {
        ExceptionSpec::None
    }
}

/// Operand of the last `noexcept( ... )` of a token stream, tokens joined by spaces.
fn noexcept_operand(tokens: &[String]) -> Option<String> {
    let start = tokens.iter().rposition(|t| t == "noexcept")?;
    let mut rest = tokens.iter().skip(start + 1);
    if rest.next().map(String::as_str) != Some("(") {
        return None;
    }

    let mut operand = Vec::new();
    let mut depth = 1usize;
    for token in rest {
        match token.as_str() {
            "(" => depth += 1,
            ")" => {
                depth -= 1;
                if depth == 0 {
                    return Some(operand.join(" "));
                }
            }
            _ => {}
        }
        operand.push(token.as_str());
    }
    None
}

/// Types listed in the last `throw( ... )` of a token stream.
fn throw_types(tokens: &[String]) -> Vec<String> {
    let Some(start) = tokens.iter().rposition(|t| t == "throw") else {
        return Vec::new();
    };

    let mut types = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    for token in tokens.iter().skip(start + 1) {
        match token.as_str() {
            "(" if depth == 0 => depth = 1,
            ")" if depth == 1 => break,
            "," if depth == 1 => types.push(std::mem::take(&mut current)),
            other => {
                match other {
                    "(" | "<" => depth += 1,
                    ")" | ">" => depth = depth.saturating_sub(1),
                    _ => {}
                }
                if !current.is_empty() && !other.starts_with(':') && !current.ends_with(':') {
                    current.push(' ');
                }
                current.push_str(other);
            }
        }
    }
    if !current.is_empty() {
        types.push(current);
    }
    types
}

/// Spellings of the tokens covered by a cursor.
fn cursor_tokens(cursor: clang_sys::CXCursor) -> Vec<String> {
    unsafe {
        let tu = clang_sys::clang_Cursor_getTranslationUnit(cursor);
        let extent = clang_sys::clang_getCursorExtent(cursor);
        let mut tokens: *mut clang_sys::CXToken = ptr::null_mut();
        let mut count: u32 = 0;
        clang_sys::clang_tokenize(tu, extent, &mut tokens, &mut count);
        if tokens.is_null() {
            return Vec::new();
        }

        let spellings = (0..count as usize)
            .map(|i| cx_string_to_string(clang_sys::clang_getTokenSpelling(tu, *tokens.add(i))))
            .collect();
        clang_sys::clang_disposeTokens(tu, tokens, count);
        spellings
    }
}

/// Get source location from cursor.
pub(crate) fn cursor_location(cursor: clang_sys::CXCursor) -> SourceLocation {
    unsafe {
        let loc = clang_sys::clang_getCursorLocation(cursor);
        let mut file: clang_sys::CXFile = ptr::null_mut();
        let mut line: u32 = 0;
        let mut column: u32 = 0;

        clang_sys::clang_getSpellingLocation(loc, &mut file, &mut line, &mut column, ptr::null_mut());

        let file_name = if !file.is_null() {
            Some(cx_string_to_string(clang_sys::clang_getFileName(file)))
        } else {
            None
        };

        SourceLocation {
            file: file_name,
            line,
            column,
        }
    }
}

/// Convert a CXString to a Rust String.
pub(crate) fn cx_string_to_string(cx_string: clang_sys::CXString) -> String {
    unsafe {
        let c_str = clang_sys::clang_getCString(cx_string);
        let result = if c_str.is_null() {
            String::new()
        } else {
            CStr::from_ptr(c_str).to_string_lossy().into_owned()
        };
        clang_sys::clang_disposeString(cx_string);
        result
    }
}

/// Get the spelling of a cursor.
pub(crate) fn cursor_spelling(cursor: clang_sys::CXCursor) -> String {
    unsafe { cx_string_to_string(clang_sys::clang_getCursorSpelling(cursor)) }
}

fn cursor_usr(cursor: clang_sys::CXCursor) -> String {
    unsafe { cx_string_to_string(clang_sys::clang_getCursorUSR(cursor)) }
}

fn type_spelling(ty: clang_sys::CXType) -> String {
    unsafe { cx_string_to_string(clang_sys::clang_getTypeSpelling(ty)) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(text: &str) -> Vec<String> {
        text.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn test_throw_types() {
        assert_eq!(
            throw_types(&tokens("void f ( ) throw ( std :: exception , int )")),
            vec!["std::exception", "int"]
        );
        assert!(throw_types(&tokens("void f ( ) throw ( )")).is_empty());
        assert_eq!(
            throw_types(&tokens("void f ( ) throw ( Err < int , long > )")),
            vec!["Err < int , long >"]
        );
        assert!(throw_types(&tokens("void f ( )")).is_empty());
    }

    #[test]
    fn test_noexcept_operand() {
        assert_eq!(
            noexcept_operand(&tokens("void f ( ) noexcept ( false )")).as_deref(),
            Some("false")
        );
        assert_eq!(
            noexcept_operand(&tokens("void g ( ) noexcept ( sizeof ( T ) == 4 )")).as_deref(),
            Some("sizeof ( T ) == 4")
        );
        assert_eq!(noexcept_operand(&tokens("void h ( ) noexcept")), None);
    }

    #[test]
    fn test_function_kinds() {
        assert_eq!(function_kind(clang_sys::CXCursor_FunctionDecl), Some(DeclKind::Function));
        assert_eq!(function_kind(clang_sys::CXCursor_Destructor), Some(DeclKind::Destructor));
        assert_eq!(
            function_kind(clang_sys::CXCursor_ConversionFunction),
            Some(DeclKind::Conversion)
        );
        assert_eq!(function_kind(clang_sys::CXCursor_Namespace), None);
    }
}
