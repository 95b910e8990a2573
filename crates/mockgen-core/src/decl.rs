//! Declaration model consumed by the translation core.
//!
//! This is a simplified view of what libclang reports for a function
//! declaration: the cursor facts needed to decide mockability plus a type
//! tree for every parameter and the return value. The front-end lowers
//! cursors into these structures so the core never touches FFI.

use std::fmt;

/// Kind of a parsed type node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Void,
    Bool,
    /// Plain `char` (signed or unsigned depending on the target)
    CharS,
    SChar,
    UChar,
    Short,
    UShort,
    Int,
    UInt,
    Long,
    ULong,
    LongLong,
    ULongLong,
    Float,
    Double,
    LongDouble,
    WChar,
    Char16,
    Char32,
    /// `T *`
    Pointer,
    /// `T &`
    LValueReference,
    /// `T &&`
    RValueReference,
    /// `T [N]`
    ConstantArray,
    /// `T []`
    IncompleteArray,
    /// Struct, class, union or template specialization
    Record,
    /// Scoped or unscoped enumeration
    Enum,
    /// Typedef or alias declaration
    Typedef,
    /// Function type (only reachable through pointers)
    FunctionProto,
    /// Type depending on a template parameter
    Dependent,
    /// Anything the front-end could not map
    Other,
}

impl TypeKind {
    /// Whether this is a builtin arithmetic or character type.
    pub fn is_builtin_scalar(self) -> bool {
        matches!(
            self,
            TypeKind::Bool
                | TypeKind::CharS
                | TypeKind::SChar
                | TypeKind::UChar
                | TypeKind::Short
                | TypeKind::UShort
                | TypeKind::Int
                | TypeKind::UInt
                | TypeKind::Long
                | TypeKind::ULong
                | TypeKind::LongLong
                | TypeKind::ULongLong
                | TypeKind::Float
                | TypeKind::Double
                | TypeKind::LongDouble
                | TypeKind::WChar
                | TypeKind::Char16
                | TypeKind::Char32
        )
    }

    /// Whether this is a pointer or a reference.
    pub fn is_indirection(self) -> bool {
        matches!(
            self,
            TypeKind::Pointer | TypeKind::LValueReference | TypeKind::RValueReference
        )
    }

    /// Whether this is an array type.
    pub fn is_array(self) -> bool {
        matches!(self, TypeKind::ConstantArray | TypeKind::IncompleteArray)
    }

    /// Default C++ spelling of a builtin type.
    pub fn builtin_spelling(self) -> Option<&'static str> {
        let spelling = match self {
            TypeKind::Void => "void",
            TypeKind::Bool => "bool",
            TypeKind::CharS => "char",
            TypeKind::SChar => "signed char",
            TypeKind::UChar => "unsigned char",
            TypeKind::Short => "short",
            TypeKind::UShort => "unsigned short",
            TypeKind::Int => "int",
            TypeKind::UInt => "unsigned int",
            TypeKind::Long => "long",
            TypeKind::ULong => "unsigned long",
            TypeKind::LongLong => "long long",
            TypeKind::ULongLong => "unsigned long long",
            TypeKind::Float => "float",
            TypeKind::Double => "double",
            TypeKind::LongDouble => "long double",
            TypeKind::WChar => "wchar_t",
            TypeKind::Char16 => "char16_t",
            TypeKind::Char32 => "char32_t",
            _ => return None,
        };
        Some(spelling)
    }
}

/// A node of a parsed C/C++ type tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedType {
    pub kind: TypeKind,
    /// Spelling as printed by the parser, including qualifiers (e.g. `const Class1 *`)
    pub spelling: String,
    /// Whether the outermost node is const-qualified
    pub is_const: bool,
    /// Target of pointers and references, element of arrays
    pub pointee: Option<Box<ParsedType>>,
    /// Aliased type of a typedef
    pub underlying: Option<Box<ParsedType>>,
    /// Qualified name of the named declaration (record, enum, typedef)
    pub decl_name: Option<String>,
    /// False for forward-declared records
    pub is_complete: bool,
}

impl ParsedType {
    fn node(kind: TypeKind, spelling: impl Into<String>) -> Self {
        Self {
            kind,
            spelling: spelling.into(),
            is_const: false,
            pointee: None,
            underlying: None,
            decl_name: None,
            is_complete: true,
        }
    }

    /// Create a builtin type (`void`, `int`, `unsigned char`, ...).
    pub fn builtin(kind: TypeKind) -> Self {
        Self::node(kind, kind.builtin_spelling().unwrap_or("<unknown>"))
    }

    /// Create `void`.
    pub fn void() -> Self {
        Self::builtin(TypeKind::Void)
    }

    /// Create a complete struct/class type.
    pub fn record(name: &str) -> Self {
        let mut ty = Self::node(TypeKind::Record, name);
        ty.decl_name = Some(name.to_string());
        ty
    }

    /// Create a forward-declared struct/class type.
    pub fn incomplete_record(name: &str) -> Self {
        let mut ty = Self::record(name);
        ty.is_complete = false;
        ty
    }

    /// Create an enumeration type.
    pub fn enumeration(name: &str) -> Self {
        let mut ty = Self::node(TypeKind::Enum, name);
        ty.decl_name = Some(name.to_string());
        ty
    }

    /// Create a typedef named `name` aliasing `underlying`.
    pub fn typedef_of(name: &str, underlying: ParsedType) -> Self {
        let mut ty = Self::node(TypeKind::Typedef, name);
        ty.decl_name = Some(name.to_string());
        ty.underlying = Some(Box::new(underlying));
        ty
    }

    /// Create a function type with the given spelling.
    pub fn function(spelling: &str) -> Self {
        Self::node(TypeKind::FunctionProto, spelling)
    }

    /// Return a const-qualified copy of this type.
    pub fn constant(mut self) -> Self {
        if !self.is_const {
            self.is_const = true;
            self.spelling = match self.kind {
                TypeKind::Pointer => format!("{} const", self.spelling),
                _ => format!("const {}", self.spelling),
            };
        }
        self
    }

    /// Create `T *`.
    pub fn pointer_to(self) -> Self {
        let spelling = format!("{} *", self.spelling);
        let mut ty = Self::node(TypeKind::Pointer, spelling);
        ty.pointee = Some(Box::new(self));
        ty
    }

    /// Create `T &`.
    pub fn lvalue_ref_to(self) -> Self {
        let spelling = format!("{} &", self.spelling);
        let mut ty = Self::node(TypeKind::LValueReference, spelling);
        ty.pointee = Some(Box::new(self));
        ty
    }

    /// Create `T &&`.
    pub fn rvalue_ref_to(self) -> Self {
        let spelling = format!("{} &&", self.spelling);
        let mut ty = Self::node(TypeKind::RValueReference, spelling);
        ty.pointee = Some(Box::new(self));
        ty
    }

    /// Create `T []`.
    pub fn incomplete_array_of(self) -> Self {
        let spelling = format!("{} []", self.spelling);
        let mut ty = Self::node(TypeKind::IncompleteArray, spelling);
        ty.pointee = Some(Box::new(self));
        ty
    }

    /// Create `T [size]`.
    pub fn array_of(self, size: usize) -> Self {
        let spelling = format!("{} [{}]", self.spelling, size);
        let mut ty = Self::node(TypeKind::ConstantArray, spelling);
        ty.pointee = Some(Box::new(self));
        ty
    }

    /// Create a type the front-end could not map.
    pub fn other(spelling: &str) -> Self {
        Self::node(TypeKind::Other, spelling)
    }

    /// Target of a pointer/reference or element of an array.
    pub fn pointee(&self) -> Option<&ParsedType> {
        self.pointee.as_deref()
    }

    /// Aliased type of a typedef.
    pub fn underlying(&self) -> Option<&ParsedType> {
        self.underlying.as_deref()
    }

    /// Follow typedef chains down to the first non-typedef node.
    pub fn canonical(&self) -> &ParsedType {
        let mut current = self;
        while current.kind == TypeKind::Typedef {
            match current.underlying() {
                Some(next) => current = next,
                None => break,
            }
        }
        current
    }

    /// Whether this node is const, either directly or through its typedef chain.
    pub fn is_const_qualified(&self) -> bool {
        let mut current = self;
        loop {
            if current.is_const {
                return true;
            }
            match (current.kind, current.underlying()) {
                (TypeKind::Typedef, Some(next)) => current = next,
                _ => return false,
            }
        }
    }

    /// Spelling with the top-level `const` removed.
    pub fn unqualified_spelling(&self) -> String {
        if !self.is_const_qualified() {
            return self.spelling.clone();
        }
        strip_const(&self.spelling, self.canonical().kind.is_indirection()).to_string()
    }
}

/// Remove the top-level `const` from a spelling.
///
/// Pointers carry it at the end (`char *const`), everything else at the front.
pub fn strip_const(spelling: &str, pointer_like: bool) -> &str {
    let trimmed = spelling.trim();
    if pointer_like {
        match trimmed.strip_suffix("const") {
            Some(rest) if rest.ends_with(|c: char| c == '*' || c == '&' || c == ' ') => {
                rest.trim_end()
            }
            _ => trimmed,
        }
    } else {
        trimmed
            .strip_prefix("const ")
            .map(str::trim_start)
            .unwrap_or(trimmed)
    }
}

/// Remove an elaborated-type keyword (`struct Foo` -> `Foo`).
pub fn strip_tag_keyword(spelling: &str) -> &str {
    ["struct ", "class ", "union ", "enum "]
        .iter()
        .find_map(|kw| spelling.strip_prefix(kw))
        .unwrap_or(spelling)
}

/// C++ access specifier for class members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccessSpecifier {
    /// Public access, or no access specifier at all (namespace scope)
    #[default]
    Public,
    Protected,
    Private,
}

/// Kind of an enclosing semantic parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Namespace,
    /// Class, struct or union
    Class,
    /// Anything else (class templates, linkage specs, ...)
    Other,
}

/// One enclosing semantic parent of a declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeSegment {
    /// Empty for anonymous namespaces and records
    pub name: String,
    pub kind: ScopeKind,
    /// Access of this scope within its own parent
    pub access: AccessSpecifier,
}

impl ScopeSegment {
    pub fn namespace(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: ScopeKind::Namespace,
            access: AccessSpecifier::Public,
        }
    }

    pub fn class(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: ScopeKind::Class,
            access: AccessSpecifier::Public,
        }
    }

    pub fn with_access(mut self, access: AccessSpecifier) -> Self {
        self.access = access;
        self
    }
}

/// Cursor kind of a function-like declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    Function,
    Method,
    /// `operator T()`, declared without a return type
    Conversion,
    Destructor,
    Constructor,
    FunctionTemplate,
}

/// Exception specification of a function.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ExceptionSpec {
    #[default]
    None,
    /// `noexcept`
    Noexcept,
    /// `noexcept(expr)`, operand as written
    NoexceptIf(String),
    /// `throw(A, B)`; empty for `throw()`
    Throw(Vec<String>),
    /// `throw(...)`
    ThrowAny,
}

/// Source location for diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: Option<String>,
    pub line: u32,
    pub column: u32,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.file {
            Some(file) => write!(f, "{}:{}:{}", file, self.line, self.column),
            None => write!(f, "<input>:{}:{}", self.line, self.column),
        }
    }
}

/// A parameter of a function declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamDecl {
    /// Empty for unnamed parameters
    pub name: String,
    pub ty: ParsedType,
}

impl ParamDecl {
    pub fn new(name: &str, ty: ParsedType) -> Self {
        Self {
            name: name.to_string(),
            ty,
        }
    }

    pub fn unnamed(ty: ParsedType) -> Self {
        Self::new("", ty)
    }
}

/// A function, method or destructor declaration as reported by the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDecl {
    pub kind: DeclKind,
    /// Unqualified spelling (`method1`, `~class1`, `operator==`)
    pub name: String,
    /// USR of the canonical declaration
    pub usr: String,
    /// Semantic parents, outermost first
    pub scopes: Vec<ScopeSegment>,
    pub access: AccessSpecifier,
    pub is_definition: bool,
    pub is_virtual: bool,
    pub is_pure_virtual: bool,
    /// `const`-qualified method
    pub is_const: bool,
    pub is_static: bool,
    pub is_variadic: bool,
    pub is_template_specialization: bool,
    pub exception_spec: ExceptionSpec,
    pub return_type: ParsedType,
    pub params: Vec<ParamDecl>,
    pub location: SourceLocation,
}

impl FunctionDecl {
    /// Create a free function declaration returning `return_type`.
    pub fn function(name: &str, return_type: ParsedType) -> Self {
        Self {
            kind: DeclKind::Function,
            name: name.to_string(),
            usr: format!("c:@F@{}", name),
            scopes: Vec::new(),
            access: AccessSpecifier::Public,
            is_definition: false,
            is_virtual: false,
            is_pure_virtual: false,
            is_const: false,
            is_static: false,
            is_variadic: false,
            is_template_specialization: false,
            exception_spec: ExceptionSpec::None,
            return_type,
            params: Vec::new(),
            location: SourceLocation::default(),
        }
    }

    /// Create a public method of the innermost class in `scopes`.
    pub fn method(scopes: Vec<ScopeSegment>, name: &str, return_type: ParsedType) -> Self {
        let mut decl = Self::function(name, return_type);
        decl.kind = DeclKind::Method;
        decl.usr = synth_usr(&scopes, name);
        decl.scopes = scopes;
        decl
    }

    /// Create a public destructor of the innermost class in `scopes`.
    pub fn destructor(scopes: Vec<ScopeSegment>) -> Self {
        let class_name = scopes.last().map(|s| s.name.clone()).unwrap_or_default();
        let name = format!("~{}", class_name);
        let mut decl = Self::method(scopes, &name, ParsedType::void());
        decl.kind = DeclKind::Destructor;
        decl
    }

    pub fn with_param(mut self, name: &str, ty: ParsedType) -> Self {
        self.params.push(ParamDecl::new(name, ty));
        self
    }

    pub fn with_unnamed_param(mut self, ty: ParsedType) -> Self {
        self.params.push(ParamDecl::unnamed(ty));
        self
    }

    /// Whether the declaration is a member of a class.
    pub fn is_member(&self) -> bool {
        matches!(
            self.kind,
            DeclKind::Method | DeclKind::Conversion | DeclKind::Destructor | DeclKind::Constructor
        )
    }
}

fn synth_usr(scopes: &[ScopeSegment], name: &str) -> String {
    let mut usr = String::from("c:");
    for scope in scopes {
        let tag = match scope.kind {
            ScopeKind::Namespace => "N",
            ScopeKind::Class => "S",
            ScopeKind::Other => "X",
        };
        usr.push_str(&format!("@{}@{}", tag, scope.name));
    }
    usr.push_str(&format!("@F@{}#", name));
    usr
}
