//! End-to-end translation of hand-built declarations.

use mockgen_core::{
    Config, FunctionDecl, MockConfig, MockGenerator, MockedType, Outcome, OverrideSpec, ParsedType,
    ScopeSegment, SkipReason, TypeKind,
};
use pretty_assertions::assert_eq;

fn generate<C: MockConfig>(decl: &FunctionDecl, config: &C) -> mockgen_core::GeneratedMock {
    let mut generator = MockGenerator::new(config);
    match generator.generate(decl).expect("translation failed") {
        Outcome::Generated(generated) => generated,
        Outcome::Skipped(reason) => panic!("unexpectedly skipped: {}", reason),
    }
}

fn builtin(kind: TypeKind) -> ParsedType {
    ParsedType::builtin(kind)
}

fn const_char_ptr() -> ParsedType {
    builtin(TypeKind::CharS).constant().pointer_to()
}

/// Stub configuration with a single override, standing in for the driver's table.
struct OneOverride {
    key: &'static str,
    spec: OverrideSpec,
}

impl MockConfig for OneOverride {
    fn use_underlying_typedef(&self) -> bool {
        false
    }

    fn type_override(&self, key: &str) -> Option<&OverrideSpec> {
        (key == self.key).then_some(&self.spec)
    }
}

#[test]
fn test_free_function_with_int_parameter() {
    let decl = FunctionDecl::function("f", ParsedType::void()).with_param("p", builtin(TypeKind::Int));
    let generated = generate(&decl, &Config::default());
    assert!(generated
        .mock
        .contains("mock().actualCall(\"f\").withIntParameter(\"p\", p);"));
}

#[test]
fn test_unsigned_long_return() {
    let decl = FunctionDecl::function("g", builtin(TypeKind::ULong));
    let generated = generate(&decl, &Config::default());
    assert_eq!(
        generated.mock,
        "unsigned long g()\n{\n    return mock().actualCall(\"g\").returnUnsignedLongIntValue();\n}\n"
    );
}

#[test]
fn test_destructor_in_namespace() {
    let decl = FunctionDecl::destructor(vec![
        ScopeSegment::namespace("ns1"),
        ScopeSegment::class("class1"),
    ]);
    let generated = generate(&decl, &Config::default());

    assert!(generated.mock.starts_with(
        "ns1::class1::~class1()\n{\n    mock().actualCall(\"ns1::class1::~class1\").onObject(this);\n}\n"
    ));

    let expected_impl = "\
namespace expect { namespace ns1$ { namespace class1$ {
MockExpectedCall& class1$dtor(CppUMockGen::Parameter<const ns1::class1*> __object__)
{
    return class1$dtor(1, __object__);
}
MockExpectedCall& class1$dtor(unsigned int __numCalls__, CppUMockGen::Parameter<const ns1::class1*> __object__)
{
    MockExpectedCall& __expectedCall__ = mock().expectNCalls(__numCalls__, \"ns1::class1::~class1\");
    if (!__object__.isIgnored()) { __expectedCall__.onObject(const_cast<ns1::class1*>(__object__.getValue())); }
    return __expectedCall__;
}
} } }
";
    assert_eq!(generated.expectation_impl, expected_impl);
}

#[test]
fn test_const_method_returning_void() {
    let mut decl = FunctionDecl::method(vec![ScopeSegment::class("C")], "m", ParsedType::void());
    decl.is_const = true;
    let generated = generate(&decl, &Config::default());
    assert_eq!(
        generated.mock,
        "void C::m() const\n{\n    mock().actualCall(\"C::m\").onObject(const_cast<C*>(this));\n}\n"
    );
}

#[test]
fn test_unnamed_parameters() {
    let decl = FunctionDecl::function("h", ParsedType::void())
        .with_unnamed_param(builtin(TypeKind::Int))
        .with_unnamed_param(const_char_ptr());
    let generated = generate(&decl, &Config::default());

    assert!(generated.mock.starts_with("void h(int _unnamedArg0, const char * _unnamedArg1)\n"));
    assert!(generated.expectation_header.contains(
        "MockExpectedCall& h(CppUMockGen::Parameter<int> _unnamedArg0, CppUMockGen::Parameter<const char *> _unnamedArg1);"
    ));
}

#[test]
fn test_struct_pointer_override() {
    let mut struct2 = ParsedType::record("Struct2");
    struct2.spelling = "struct Struct2".to_string();
    let decl = FunctionDecl::function("f", builtin(TypeKind::ULong))
        .with_param("p1", builtin(TypeKind::Int).constant().pointer_to())
        .with_param("p2", struct2.pointer_to())
        .with_param("p3", builtin(TypeKind::Double));
    let config = OneOverride {
        key: "f#p2",
        spec: OverrideSpec::new(MockedType::InputOfType)
            .with_exposed_type("Struct1")
            .with_expectation_type("OtherStruct3")
            .with_expr("##%%", "&&//"),
    };
    let generated = generate(&decl, &config);

    assert!(generated
        .expectation_impl
        .contains("CppUMockGen::Parameter<const OtherStruct3*> p2"));
    assert!(generated.expectation_impl.contains(
        "if (p2.isIgnored()) { __ignoreOtherParams__ = true; } else { __expectedCall__.withParameterOfType(\"Struct1\", \"p2\", p2.getValue()); }"
    ));
    assert!(generated
        .mock
        .contains(".withParameterOfType(\"Struct1\", \"p2\", ##%%p2&&//)"));
}

#[test]
fn test_single_actual_call_named_after_function() {
    let decl = FunctionDecl::method(
        vec![ScopeSegment::namespace("ns"), ScopeSegment::class("Class1")],
        "operator==",
        builtin(TypeKind::Bool),
    )
    .with_param("other", ParsedType::record("ns::Class1").constant().lvalue_ref_to());
    let generated = generate(&decl, &Config::default());

    assert_eq!(generated.mock.matches("actualCall(").count(), 1);
    assert!(generated.mock.contains("actualCall(\"ns::Class1::operator==\")"));
    assert!(generated.expectation_header.contains("MockExpectedCall& operator$equal("));
}

#[test]
fn test_every_parameter_matched_once() {
    let decl = FunctionDecl::function("mix", builtin(TypeKind::Int))
        .with_param("a", builtin(TypeKind::Short))
        .with_param("b", const_char_ptr())
        .with_param("c", ParsedType::record("Class1").constant().lvalue_ref_to())
        .with_param("d", ParsedType::void().pointer_to())
        .with_param("e", builtin(TypeKind::Long).pointer_to());
    let generated = generate(&decl, &Config::default());

    for name in ["a", "b", "c", "d", "e"] {
        let literal = format!("\"{}\"", name);
        assert_eq!(generated.mock.matches(&literal).count(), 1, "mock, {}", name);
        assert_eq!(
            generated.expectation_impl.matches(&literal).count(),
            1,
            "expectation, {}",
            name
        );
        assert!(generated
            .expectation_impl
            .contains(&format!("if ({}.isIgnored())", name)));
    }
}

#[test]
fn test_return_value_presence() {
    let with_return = generate(
        &FunctionDecl::function("r", builtin(TypeKind::Int)),
        &Config::default(),
    );
    assert!(with_return.mock.contains("    return mock()"));
    assert_eq!(with_return.expectation_impl.matches(".andReturnValue(").count(), 1);

    let without_return = generate(&FunctionDecl::function("v", ParsedType::void()), &Config::default());
    assert!(!without_return.mock.contains("return"));
    assert!(!without_return.expectation_impl.contains(".andReturnValue("));
    assert!(!without_return.expectation_impl.contains("__return__"));
}

#[test]
fn test_cast_follows_classification() {
    let decl = FunctionDecl::function("k", ParsedType::void())
        .with_param("narrow", builtin(TypeKind::Short))
        .with_param("exact", builtin(TypeKind::Int))
        .with_param("alias", ParsedType::typedef_of("Type1", builtin(TypeKind::Int)));
    let generated = generate(&decl, &Config::default());

    assert!(generated
        .mock
        .contains(".withIntParameter(\"narrow\", static_cast<int>(narrow))"));
    assert!(generated.mock.contains(".withIntParameter(\"exact\", exact)"));
    assert!(generated
        .mock
        .contains(".withIntParameter(\"alias\", static_cast<int>(alias))"));
}

#[test]
fn test_redeclaration_emits_once() {
    let decl = FunctionDecl::function("f", builtin(TypeKind::Int)).with_param("p", builtin(TypeKind::Int));
    let config = Config::default();

    let mut once = MockGenerator::new(&config);
    let single: Vec<_> = [&decl]
        .into_iter()
        .filter_map(|d| match once.generate(d).unwrap() {
            Outcome::Generated(g) => Some(g),
            Outcome::Skipped(_) => None,
        })
        .collect();

    let mut twice = MockGenerator::new(&config);
    let redeclared = decl.clone();
    let double: Vec<_> = [&decl, &redeclared]
        .into_iter()
        .filter_map(|d| match twice.generate(d).unwrap() {
            Outcome::Generated(g) => Some(g),
            Outcome::Skipped(reason) => {
                assert_eq!(reason, SkipReason::Duplicate);
                None
            }
        })
        .collect();

    assert_eq!(single, double);
}

#[test]
fn test_destructor_expectation_pair() {
    let decl = FunctionDecl::destructor(vec![ScopeSegment::class("Widget")]);
    let generated = generate(&decl, &Config::default());

    let prototypes: Vec<&str> = generated
        .expectation_header
        .lines()
        .filter(|line| line.starts_with("MockExpectedCall& Widget$dtor("))
        .collect();
    assert_eq!(prototypes.len(), 2);
    for prototype in prototypes {
        assert!(prototype.ends_with(
            "CppUMockGen::Parameter<const Widget*> __object__ = CppUMockGen::IgnoreParameter::YES);"
        ));
    }
}

#[test]
fn test_typedef_policy_changes_type_tag() {
    let alias = ParsedType::typedef_of("TStruct1", ParsedType::record("Struct1"));
    let decl = FunctionDecl::function("use", ParsedType::void()).with_param("s", alias.constant().pointer_to());

    let generated = generate(&decl, &Config::new(false));
    assert!(generated.mock.contains(".withParameterOfType(\"TStruct1\", \"s\", s)"));

    let generated = generate(&decl, &Config::new(true));
    assert!(generated.mock.contains(".withParameterOfType(\"Struct1\", \"s\", s)"));
}
