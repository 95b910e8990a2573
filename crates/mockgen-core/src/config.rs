//! Generation options and user-supplied type overrides.

use rustc_hash::FxHashMap;
use std::fmt;
use std::str::FromStr;

/// Canonical tag selecting which typed mock-library API a slot uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockedType {
    Bool,
    Int,
    UnsignedInt,
    Long,
    UnsignedLong,
    Double,
    String,
    Pointer,
    ConstPointer,
    Output,
    InputOfType,
    OutputOfType,
    InputPOD,
    OutputPOD,
    MemoryBuffer,
    Skip,
}

impl MockedType {
    pub const ALL: [MockedType; 16] = [
        MockedType::Bool,
        MockedType::Int,
        MockedType::UnsignedInt,
        MockedType::Long,
        MockedType::UnsignedLong,
        MockedType::Double,
        MockedType::String,
        MockedType::Pointer,
        MockedType::ConstPointer,
        MockedType::Output,
        MockedType::InputOfType,
        MockedType::OutputOfType,
        MockedType::InputPOD,
        MockedType::OutputPOD,
        MockedType::MemoryBuffer,
        MockedType::Skip,
    ];

    /// Variant name as used in override specifications.
    pub fn name(self) -> &'static str {
        match self {
            MockedType::Bool => "Bool",
            MockedType::Int => "Int",
            MockedType::UnsignedInt => "UnsignedInt",
            MockedType::Long => "Long",
            MockedType::UnsignedLong => "UnsignedLong",
            MockedType::Double => "Double",
            MockedType::String => "String",
            MockedType::Pointer => "Pointer",
            MockedType::ConstPointer => "ConstPointer",
            MockedType::Output => "Output",
            MockedType::InputOfType => "InputOfType",
            MockedType::OutputOfType => "OutputOfType",
            MockedType::InputPOD => "InputPOD",
            MockedType::OutputPOD => "OutputPOD",
            MockedType::MemoryBuffer => "MemoryBuffer",
            MockedType::Skip => "Skip",
        }
    }

    /// The nine slots backed by a scalar `withXParameter` / `returnXValue` pair.
    pub fn is_primitive_slot(self) -> bool {
        matches!(
            self,
            MockedType::Bool
                | MockedType::Int
                | MockedType::UnsignedInt
                | MockedType::Long
                | MockedType::UnsignedLong
                | MockedType::Double
                | MockedType::String
                | MockedType::Pointer
                | MockedType::ConstPointer
        )
    }

    /// Whether the slot carries a number or a bool by value.
    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            MockedType::Bool
                | MockedType::Int
                | MockedType::UnsignedInt
                | MockedType::Long
                | MockedType::UnsignedLong
                | MockedType::Double
        )
    }

    /// Whether the slot may be used for a return value.
    pub fn is_valid_for_return(self) -> bool {
        self.is_primitive_slot()
    }

    /// Suffix of the mock library's typed API (`withIntParameter`, `returnIntValue`).
    pub fn api_suffix(self) -> Option<&'static str> {
        let suffix = match self {
            MockedType::Bool => "Bool",
            MockedType::Int => "Int",
            MockedType::UnsignedInt => "UnsignedInt",
            MockedType::Long => "LongInt",
            MockedType::UnsignedLong => "UnsignedLongInt",
            MockedType::Double => "Double",
            MockedType::String => "String",
            MockedType::Pointer => "Pointer",
            MockedType::ConstPointer => "ConstPointer",
            _ => return None,
        };
        Some(suffix)
    }

    /// C++ type the mock library stores for this slot.
    pub fn library_type(self) -> Option<&'static str> {
        let ty = match self {
            MockedType::Bool => "bool",
            MockedType::Int => "int",
            MockedType::UnsignedInt => "unsigned int",
            MockedType::Long => "long",
            MockedType::UnsignedLong => "unsigned long",
            MockedType::Double => "double",
            MockedType::String => "const char *",
            MockedType::Pointer => "void *",
            MockedType::ConstPointer => "const void *",
            _ => return None,
        };
        Some(ty)
    }
}

impl fmt::Display for MockedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MockedType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MockedType::ALL
            .iter()
            .copied()
            .find(|ty| ty.name() == s)
            .ok_or_else(|| format!("unknown mocked type `{}`", s))
    }
}

/// A per-slot substitution that bypasses type classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideSpec {
    pub kind: MockedType,
    /// Text placed before the argument expression
    pub expr_front: String,
    /// Text placed after the argument expression
    pub expr_back: String,
    /// Type tag for `InputOfType` / `OutputOfType`
    pub exposed_type_name: Option<String>,
    /// Type of the matching formal in the expectation helper
    pub expectation_arg_type_name: Option<String>,
    /// Whether the size expression wraps the argument name
    pub has_size_placeholder: bool,
    pub size_expr_front: String,
    pub size_expr_back: String,
}

impl OverrideSpec {
    /// Create an override forcing `kind` with no expression shaping.
    pub fn new(kind: MockedType) -> Self {
        Self {
            kind,
            expr_front: String::new(),
            expr_back: String::new(),
            exposed_type_name: None,
            expectation_arg_type_name: None,
            has_size_placeholder: false,
            size_expr_front: String::new(),
            size_expr_back: String::new(),
        }
    }

    /// Wrap the argument expression in `front` ... `back`.
    pub fn with_expr(mut self, front: &str, back: &str) -> Self {
        self.expr_front = front.to_string();
        self.expr_back = back.to_string();
        self
    }

    pub fn with_exposed_type(mut self, name: &str) -> Self {
        self.exposed_type_name = Some(name.to_string());
        self
    }

    pub fn with_expectation_type(mut self, name: &str) -> Self {
        self.expectation_arg_type_name = Some(name.to_string());
        self
    }

    /// Size expression for `MemoryBuffer`, with `$` standing for the argument name.
    pub fn with_size_expr(mut self, expr: &str) -> Self {
        match expr.split_once('$') {
            Some((front, back)) => {
                self.has_size_placeholder = true;
                self.size_expr_front = front.to_string();
                self.size_expr_back = back.to_string();
            }
            None => {
                self.has_size_placeholder = false;
                self.size_expr_front = expr.to_string();
                self.size_expr_back.clear();
            }
        }
        self
    }

    /// Apply the argument expression fragments to `expr`.
    pub fn wrap_expr(&self, expr: &str) -> String {
        format!("{}{}{}", self.expr_front, expr, self.expr_back)
    }

    /// Byte-count expression for the argument named `arg`.
    pub fn size_expr(&self, arg: &str) -> String {
        if self.has_size_placeholder {
            format!("{}{}{}", self.size_expr_front, arg, self.size_expr_back)
        } else {
            self.size_expr_front.clone()
        }
    }
}

/// Read-only source of generation options.
///
/// The driver supplies [`Config`]; tests may supply a stub.
pub trait MockConfig {
    /// Register `InputOfType`/`OutputOfType` slots with the ultimate record
    /// name instead of the typedef alias.
    fn use_underlying_typedef(&self) -> bool;

    /// Look up an override by key (`func@`, `func#arg`, `@Type`, `#Type`).
    fn type_override(&self, key: &str) -> Option<&OverrideSpec>;
}

/// Generation options owning the override table.
#[derive(Debug, Clone, Default)]
pub struct Config {
    use_underlying_typedef: bool,
    overrides: FxHashMap<String, OverrideSpec>,
}

impl Config {
    pub fn new(use_underlying_typedef: bool) -> Self {
        Self {
            use_underlying_typedef,
            overrides: FxHashMap::default(),
        }
    }

    /// Register an override. A later registration for the same key replaces the earlier one.
    pub fn add_override(&mut self, key: impl Into<String>, spec: OverrideSpec) {
        self.overrides.insert(key.into(), spec);
    }

    pub fn with_override(mut self, key: &str, spec: OverrideSpec) -> Self {
        self.add_override(key, spec);
        self
    }

    pub fn set_use_underlying_typedef(&mut self, value: bool) {
        self.use_underlying_typedef = value;
    }

    pub fn override_count(&self) -> usize {
        self.overrides.len()
    }
}

impl MockConfig for Config {
    fn use_underlying_typedef(&self) -> bool {
        self.use_underlying_typedef
    }

    fn type_override(&self, key: &str) -> Option<&OverrideSpec> {
        self.overrides.get(key)
    }
}
