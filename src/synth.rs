//! `FileModel` → NUnit/Moq test stubs, one artifact per class.
//!
//! Generated tests are stubs, not oracles:
//! - `expected` values are always `default(T)` (or a fresh mock), never inferred.
//! - every test ends in `Assert.Fail("autogenerated")` so it fails until a
//!   human fills in real expectations.
//! - only interface-shaped dependencies (`IFoo`) are mocked; concrete
//!   constructor dependencies are left at `default(T)`.
//! - a parameter named `actual` or `expected` gets an `Arg` suffix on its
//!   arrange local so it cannot clash with the act and assert locals.
//!
//! Known gaps in the emitted C#, which a human fixes by hand:
//! - a class without a public constructor (e.g. a `static` class) is still
//!   called through `new <Class>()`.
//! - generic classes are instantiated without type arguments, and fields of
//!   a type parameter keep its bare name (`T`).
//! - `ref`/`out`/`in` modifiers are dropped from arguments.
pub mod writer;

use crate::model::{ClassInfo, FileModel, MethodInfo, ParameterInfo, TestArtifact, TypeRef};
use writer::CodeWriter;

pub const TEST_CLASS_SUFFIX: &str = "Tests";
pub const TEST_METHOD_SUFFIX: &str = "Test";
pub const TEST_FILE_EXTENSION: &str = ".cs";
pub const TEST_NAMESPACE_SUFFIX: &str = "Tests";
pub const FAIL_MESSAGE: &str = "autogenerated";

/// Appended after the file's own usings, in this order.
const FRAMEWORK_USINGS: [&str; 2] = ["NUnit.Framework", "Moq"];

const ACTUAL: &str = "actual";
const EXPECTED: &str = "expected";

pub trait TemplateSynthesizer: Send + Sync {
    /// Pure and total: same model in, byte-identical artifacts out.
    fn synthesize(&self, model: &FileModel) -> Vec<TestArtifact>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NUnitSynthesizer;

impl NUnitSynthesizer {
    pub fn new() -> Self {
        Self
    }
}

impl TemplateSynthesizer for NUnitSynthesizer {
    fn synthesize(&self, model: &FileModel) -> Vec<TestArtifact> {
        model
            .classes
            .iter()
            .map(|class| TestArtifact {
                file_name: test_file_name(class),
                content: render_test_file(&model.usings, class),
            })
            .collect()
    }
}

pub fn test_file_name(class: &ClassInfo) -> String {
    format!("{}{TEST_CLASS_SUFFIX}{TEST_FILE_EXTENSION}", class.name)
}

pub fn test_namespace(class: &ClassInfo) -> String {
    if class.namespace.is_empty() {
        TEST_NAMESPACE_SUFFIX.to_string()
    } else {
        format!("{}.{TEST_NAMESPACE_SUFFIX}", class.namespace)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// RENDERING
// ————————————————————————————————————————————————————————————————————————————

fn render_test_file(usings: &[String], class: &ClassInfo) -> String {
    let mut w = CodeWriter::new();

    for using in usings.iter().map(String::as_str).chain(FRAMEWORK_USINGS) {
        w.line(format!("using {using};"));
    }
    if !class.namespace.is_empty() {
        w.line(format!("using {};", class.namespace));
    }
    w.blank();

    w.line(format!("namespace {}", test_namespace(class)));
    w.open();
    w.line("[TestFixture]");
    w.line(format!("public class {}{TEST_CLASS_SUFFIX}", class.name));
    w.open();
    render_scaffolding(&mut w, class);
    for method in &class.methods {
        w.blank();
        render_test_method(&mut w, class, method);
    }
    w.close();
    w.close();

    w.into_string()
}

/// Fields and `SetUp` for the instance under test. Nothing for a
/// parameterless constructor.
fn render_scaffolding(w: &mut CodeWriter, class: &ClassInfo) {
    let ctor = &class.constructor;
    if ctor.is_parameterless() {
        return;
    }
    let under_test = under_test_field(&class.name);

    w.line(format!("private {} {under_test};", class.name));
    w.blank();
    for p in ctor.mockable() {
        w.line(format!("private Mock<{}> {};", p.ty.name(), private_field(&p.name)));
    }
    w.blank();
    for p in ctor.concrete() {
        let ty = p.ty.name();
        w.line(format!("private {ty} {} = default({ty});", private_field(&p.name)));
    }
    w.blank();

    w.line("[SetUp]");
    w.line("public void SetUp()");
    w.open();
    for p in ctor.mockable() {
        w.line(format!("{} = new Mock<{}>();", private_field(&p.name), p.ty.name()));
    }
    let args = ctor
        .parameters
        .iter()
        .map(|p| argument(&private_field(&p.name), &p.ty))
        .collect::<Vec<_>>()
        .join(", ");
    w.line(format!("{under_test} = new {}({args});", class.name));
    w.close();
}

fn render_test_method(w: &mut CodeWriter, class: &ClassInfo, method: &MethodInfo) {
    w.line("[Test]");
    w.line(format!("public void {}{TEST_METHOD_SUFFIX}()", method.name));
    w.open();

    // arrange
    for p in &method.parameters {
        w.line(local_declaration(&arrange_local(&p.name), &p.ty));
    }
    w.blank();

    // act + assert
    if let Some(returns) = &method.return_type {
        w.line(format!(
            "{} {ACTUAL} = {}.{}({});",
            returns.name(),
            receiver(class),
            method.name,
            call_arguments(&method.parameters),
        ));
        w.blank();
        w.line(local_declaration(EXPECTED, returns));
        w.line(format!("Assert.AreEqual({}, {ACTUAL});", argument(EXPECTED, returns)));
    }
    w.line(format!("Assert.Fail(\"{FAIL_MESSAGE}\");"));

    w.close();
}

/// Instance the act step calls into: the `SetUp`-built field, or a fresh
/// instance when there is no scaffolding.
fn receiver(class: &ClassInfo) -> String {
    if class.constructor.is_parameterless() {
        format!("new {}()", class.name)
    } else {
        under_test_field(&class.name)
    }
}

fn call_arguments(parameters: &[ParameterInfo]) -> String {
    parameters
        .iter()
        .map(|p| argument(&arrange_local(&p.name), &p.ty))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Local holding a method argument; never shadows `actual`/`expected`.
fn arrange_local(parameter: &str) -> String {
    let local = lower_camel(parameter);
    if local == ACTUAL || local == EXPECTED {
        format!("{local}Arg")
    } else {
        local
    }
}

fn local_declaration(name: &str, ty: &TypeRef) -> String {
    let mockable = ty.is_mockable();
    let ty = ty.name();
    if mockable {
        format!("Mock<{ty}> {name} = new Mock<{ty}>();")
    } else {
        format!("{ty} {name} = default({ty});")
    }
}

/// Mocks are passed through their `.Object` accessor.
fn argument(name: &str, ty: &TypeRef) -> String {
    if ty.is_mockable() {
        format!("{name}.Object")
    } else {
        name.to_string()
    }
}

// ————————————————————————————————————————————————————————————————————————————
// NAMING
// ————————————————————————————————————————————————————————————————————————————

pub fn lower_camel(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn private_field(name: &str) -> String {
    format!("_{}", lower_camel(name))
}

pub fn under_test_field(class_name: &str) -> String {
    format!("{}UnderTest", private_field(class_name))
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ConstructorInfo;

    fn param(name: &str, ty: &str) -> ParameterInfo {
        ParameterInfo::new(name, TypeRef::new(ty))
    }

    fn method(name: &str, returns: Option<&str>, parameters: Vec<ParameterInfo>) -> MethodInfo {
        MethodInfo {
            name: name.into(),
            return_type: returns.map(TypeRef::new),
            parameters,
        }
    }

    fn class(name: &str, ctor: Vec<ParameterInfo>, methods: Vec<MethodInfo>) -> ClassInfo {
        ClassInfo {
            namespace: "N".into(),
            name: name.into(),
            constructor: ConstructorInfo::new(ctor),
            methods,
        }
    }

    fn foo_model() -> FileModel {
        FileModel {
            usings: vec!["System".into()],
            classes: vec![class(
                "Foo",
                vec![param("bar", "IBar"), param("x", "int")],
                vec![method("Compute", Some("int"), vec![param("y", "int")])],
            )],
        }
    }

    const FOO_TESTS: &str = r#"using System;
using NUnit.Framework;
using Moq;
using N;

namespace N.Tests
{
    [TestFixture]
    public class FooTests
    {
        private Foo _fooUnderTest;

        private Mock<IBar> _bar;

        private int _x = default(int);

        [SetUp]
        public void SetUp()
        {
            _bar = new Mock<IBar>();
            _fooUnderTest = new Foo(_bar.Object, _x);
        }

        [Test]
        public void ComputeTest()
        {
            int y = default(int);

            int actual = _fooUnderTest.Compute(y);

            int expected = default(int);
            Assert.AreEqual(expected, actual);
            Assert.Fail("autogenerated");
        }
    }
}
"#;

    fn count(haystack: &str, needle: &str) -> usize {
        haystack.matches(needle).count()
    }

    #[test]
    fn golden_foo_with_injected_dependencies() {
        let artifacts = NUnitSynthesizer.synthesize(&foo_model());
        assert_eq!(artifacts.len(), 1);
        assert_eq!(artifacts[0].file_name, "FooTests.cs");
        assert_eq!(artifacts[0].content, FOO_TESTS);
    }

    #[test]
    fn one_artifact_per_class_in_declaration_order() {
        let model = FileModel {
            usings: vec![],
            classes: vec![
                class("First", vec![], vec![]),
                class("Second", vec![], vec![]),
                class("Third", vec![], vec![]),
            ],
        };
        let names: Vec<_> = NUnitSynthesizer
            .synthesize(&model)
            .into_iter()
            .map(|a| a.file_name)
            .collect();
        assert_eq!(names, ["FirstTests.cs", "SecondTests.cs", "ThirdTests.cs"]);
    }

    #[test]
    fn no_classes_no_artifacts() {
        let model = FileModel { usings: vec!["System".into()], classes: vec![] };
        assert!(NUnitSynthesizer.synthesize(&model).is_empty());
    }

    #[test]
    fn parameterless_class_has_no_scaffolding() {
        let model = FileModel {
            usings: vec![],
            classes: vec![class(
                "Clock",
                vec![],
                vec![
                    method("Now", Some("long"), vec![param("Zone", "ITimeZone")]),
                    method("Reset", None, vec![]),
                ],
            )],
        };
        let text = &NUnitSynthesizer.synthesize(&model)[0].content;
        assert!(!text.contains("[SetUp]"));
        assert!(!text.contains("private "));
        assert!(!text.contains("UnderTest"));
        assert!(text.contains("            Mock<ITimeZone> zone = new Mock<ITimeZone>();\n"));
        assert!(text.contains("            long actual = new Clock().Now(zone.Object);\n"));
        assert!(text.contains(
            "        [Test]\n        public void ResetTest()\n        {\n            Assert.Fail(\"autogenerated\");\n        }\n"
        ));
    }

    #[test]
    fn class_without_methods_keeps_fixture_shell() {
        let model = FileModel { usings: vec![], classes: vec![class("Empty", vec![], vec![])] };
        let text = &NUnitSynthesizer.synthesize(&model)[0].content;
        assert_eq!(
            text,
            "using NUnit.Framework;\nusing Moq;\nusing N;\n\nnamespace N.Tests\n{\n    [TestFixture]\n    public class EmptyTests\n    {\n    }\n}\n"
        );
    }

    #[test]
    fn field_counts_follow_mockability() {
        let model = FileModel {
            usings: vec![],
            classes: vec![class(
                "Service",
                vec![
                    param("repo", "IRepository"),
                    param("retries", "int"),
                    param("log", "ILogger<Service>"),
                    param("options", "ServiceOptions"),
                    param("name", "string"),
                ],
                vec![],
            )],
        };
        let text = &NUnitSynthesizer.synthesize(&model)[0].content;
        assert_eq!(count(text, "private Mock<"), 2);
        assert_eq!(count(text, "= default("), 3);
        assert_eq!(count(text, "private Service _serviceUnderTest;"), 1);
        assert!(text.contains(
            "_serviceUnderTest = new Service(_repo.Object, _retries, _log.Object, _options, _name);"
        ));
        // mock assignments follow constructor order
        let repo = text.find("_repo = new Mock<IRepository>();").unwrap();
        let log = text.find("_log = new Mock<ILogger<Service>>();").unwrap();
        assert!(repo < log);
    }

    #[test]
    fn every_test_fails_exactly_once_and_asserts_equality_only_with_a_value() {
        let model = FileModel {
            usings: vec![],
            classes: vec![class(
                "Calc",
                vec![param("bar", "IBar")],
                vec![
                    method("Add", Some("int"), vec![param("a", "int"), param("b", "int")]),
                    method("Clear", None, vec![param("reason", "string")]),
                    method("Source", Some("IBar"), vec![]),
                ],
            )],
        };
        let text = &NUnitSynthesizer.synthesize(&model)[0].content;
        assert_eq!(count(text, "Assert.Fail(\"autogenerated\");"), 3);
        assert_eq!(count(text, "Assert.AreEqual("), 2);
        assert!(text.contains("            int actual = _calcUnderTest.Add(a, b);\n"));
        assert!(text.contains("            Mock<IBar> expected = new Mock<IBar>();\n"));
        assert!(text.contains("            Assert.AreEqual(expected.Object, actual);\n"));
        assert!(text.contains(
            "            string reason = default(string);\n\n            Assert.Fail(\"autogenerated\");\n"
        ));
    }

    #[test]
    fn usings_order_is_file_then_framework_then_namespace() {
        let model = FileModel {
            usings: vec!["System.Linq".into(), "System".into()],
            classes: vec![class("Foo", vec![], vec![])],
        };
        let text = &NUnitSynthesizer.synthesize(&model)[0].content;
        assert!(text.starts_with(
            "using System.Linq;\nusing System;\nusing NUnit.Framework;\nusing Moq;\nusing N;\n\n"
        ));
    }

    #[test]
    fn global_namespace_classes_land_in_tests_namespace() {
        let mut loose = class("Loose", vec![], vec![]);
        loose.namespace.clear();
        let model = FileModel { usings: vec![], classes: vec![loose] };
        let text = &NUnitSynthesizer.synthesize(&model)[0].content;
        assert!(text.starts_with("using NUnit.Framework;\nusing Moq;\n\nnamespace Tests\n"));
    }

    #[test]
    fn synthesis_is_idempotent() {
        let model = foo_model();
        assert_eq!(NUnitSynthesizer.synthesize(&model), NUnitSynthesizer.synthesize(&model));
    }

    #[test]
    fn naming_helpers() {
        assert_eq!(lower_camel("Foo"), "foo");
        assert_eq!(lower_camel("X"), "x");
        assert_eq!(lower_camel(""), "");
        assert_eq!(private_field("Bar"), "_bar");
        assert_eq!(under_test_field("HttpClient"), "_httpClientUnderTest");
        assert_eq!(arrange_local("Expected"), "expectedArg");
        assert_eq!(arrange_local("actualValue"), "actualValue");
    }

    #[test]
    fn arguments_named_like_assert_locals_are_renamed() {
        let model = FileModel {
            usings: vec![],
            classes: vec![class(
                "Cmp",
                vec![],
                vec![method(
                    "Check",
                    Some("bool"),
                    vec![param("expected", "int"), param("actual", "IValue")],
                )],
            )],
        };
        let text = &NUnitSynthesizer.synthesize(&model)[0].content;
        assert!(text.contains("            int expectedArg = default(int);\n"));
        assert!(text.contains("            Mock<IValue> actualArg = new Mock<IValue>();\n"));
        assert!(text.contains(
            "            bool actual = new Cmp().Check(expectedArg, actualArg.Object);\n"
        ));
        assert!(text.contains("            bool expected = default(bool);\n"));
        assert_eq!(count(text, " actual = "), 1);
        assert_eq!(count(text, " expected = "), 1);
    }
}
