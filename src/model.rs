//! Structural model of a C# source file: usings, classes, constructors, methods.
//!
//! Built once per source file by a `StructureParser`, read once by a
//! `TemplateSynthesizer`. Declaration order is kept everywhere because it
//! decides output order.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// Interface-marker naming convention: `IFoo`, `IList<T>`, but not `Int32` or `I`.
static MOCKABLE_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^I[A-Z]").unwrap());

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeRef {
    name: String,
    is_mockable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterInfo {
    pub name: String,
    pub ty: TypeRef,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConstructorInfo {
    pub parameters: Vec<ParameterInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodInfo {
    pub name: String,
    pub return_type: Option<TypeRef>, // None == `void`
    pub parameters: Vec<ParameterInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassInfo {
    pub namespace: String,           // empty for the global namespace
    pub name: String,
    pub constructor: ConstructorInfo, // public constructor with the most parameters
    pub methods: Vec<MethodInfo>,     // public methods only
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FileModel {
    pub usings: Vec<String>,
    pub classes: Vec<ClassInfo>,
}

/// One generated test file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestArtifact {
    pub file_name: String,
    pub content: String,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl TypeRef {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        debug_assert!(!name.is_empty(), "type names are never empty");
        let is_mockable = MOCKABLE_NAME.is_match(&name);
        Self { name, is_mockable }
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn is_mockable(&self) -> bool {
        self.is_mockable
    }
}

impl ParameterInfo {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self { name: name.into(), ty }
    }
}

impl ConstructorInfo {
    pub fn new(parameters: Vec<ParameterInfo>) -> Self {
        Self { parameters }
    }
    pub fn is_parameterless(&self) -> bool {
        self.parameters.is_empty()
    }
    pub fn mockable(&self) -> impl Iterator<Item = &ParameterInfo> {
        self.parameters.iter().filter(|p| p.ty.is_mockable())
    }
    pub fn concrete(&self) -> impl Iterator<Item = &ParameterInfo> {
        self.parameters.iter().filter(|p| !p.ty.is_mockable())
    }
}

impl MethodInfo {
    pub fn returns_value(&self) -> bool {
        self.return_type.is_some()
    }
}

impl FileModel {
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

// ------------------------------- Tests ------------------------------------ //
