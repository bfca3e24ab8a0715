//! C# front end on tree-sitter.
//!
//! Only declarations matter here: usings, namespaces, classes and their
//! public constructors/methods. Bodies are never inspected.
use tree_sitter::{Language, Node, Parser};

use super::{StructureParser, select_constructor};
use crate::error::ParseError;
use crate::model::{ClassInfo, ConstructorInfo, FileModel, MethodInfo, ParameterInfo, TypeRef};

#[derive(Debug, Clone, Copy, Default)]
pub struct CSharpParser;

impl CSharpParser {
    pub fn new() -> Self {
        Self
    }
}

impl StructureParser for CSharpParser {
    fn parse(&self, source: &str) -> Result<FileModel, ParseError> {
        let language: Language = tree_sitter_c_sharp::LANGUAGE.into();
        let mut parser = Parser::new();
        parser.set_language(&language).map_err(|error| ParseError {
            line: 1,
            column: 1,
            message: format!("C# grammar unavailable: {error}"),
        })?;

        let tree = parser.parse(source, None).ok_or_else(|| ParseError {
            line: 1,
            column: 1,
            message: "parser produced no syntax tree".into(),
        })?;

        let root = tree.root_node();
        if root.has_error() {
            return Err(first_syntax_error(root));
        }

        let mut collector = Collector::new(source);
        collector.visit(root);
        Ok(collector.model)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// WALK
// ————————————————————————————————————————————————————————————————————————————

struct Collector<'s> {
    source: &'s str,
    model: FileModel,
    namespaces: Vec<String>,        // enclosing block namespaces
    file_namespace: Option<String>, // `namespace X;`
}

impl<'s> Collector<'s> {
    fn new(source: &'s str) -> Self {
        Self {
            source,
            model: FileModel::default(),
            namespaces: Vec::new(),
            file_namespace: None,
        }
    }

    fn visit(&mut self, node: Node) {
        match node.kind() {
            "using_directive" => {
                let target = using_target(self.text(node));
                if !target.is_empty() {
                    self.model.usings.push(target);
                }
                return;
            }
            "namespace_declaration" => {
                let name = self.declared_name(node, &["identifier", "qualified_name"]);
                self.namespaces.push(name);
                self.visit_children(node);
                self.namespaces.pop();
                return;
            }
            "file_scoped_namespace_declaration" => {
                let name = self.declared_name(node, &["identifier", "qualified_name"]);
                self.file_namespace = Some(name);
            }
            "class_declaration" => {
                if let Some(class) = self.class_info(node) {
                    self.model.classes.push(class);
                }
            }
            _ => {}
        }
        self.visit_children(node);
    }

    fn visit_children(&mut self, node: Node) {
        let mut cursor = node.walk();
        let children: Vec<Node> = node.named_children(&mut cursor).collect();
        for child in children {
            self.visit(child);
        }
    }

    fn current_namespace(&self) -> String {
        self.file_namespace
            .iter()
            .chain(self.namespaces.iter())
            .cloned()
            .collect::<Vec<_>>()
            .join(".")
    }

    fn class_info(&self, node: Node) -> Option<ClassInfo> {
        let name = self.text(node.child_by_field_name("name")?).to_string();

        let mut constructors = Vec::new();
        let mut methods = Vec::new();

        // C# 12 primary constructor: `class Foo(IBar bar)`
        if let Some(list) = child_of_kind(node, "parameter_list") {
            constructors.push(ConstructorInfo::new(self.parameter_list(list)));
        }

        let body = node
            .child_by_field_name("body")
            .or_else(|| child_of_kind(node, "declaration_list"));
        if let Some(body) = body {
            let mut cursor = body.walk();
            for member in body.named_children(&mut cursor) {
                match member.kind() {
                    "constructor_declaration" if self.is_public(member) => {
                        constructors.push(ConstructorInfo::new(self.parameters(member)));
                    }
                    "method_declaration" if self.is_public(member) => {
                        if let Some(method) = self.method_info(member) {
                            methods.push(method);
                        }
                    }
                    _ => {}
                }
            }
        }

        Some(ClassInfo {
            namespace: self.current_namespace(),
            name,
            constructor: select_constructor(constructors),
            methods,
        })
    }

    fn method_info(&self, node: Node) -> Option<MethodInfo> {
        let name = self.text(node.child_by_field_name("name")?).to_string();
        let returns = node
            .child_by_field_name("returns")
            .or_else(|| node.child_by_field_name("type"))
            .map(|ty| collapse_whitespace(self.text(ty)))?;
        let return_type = match returns.as_str() {
            "void" => None,
            _ => Some(TypeRef::new(returns)),
        };
        Some(MethodInfo {
            name,
            return_type,
            parameters: self.parameters(node),
        })
    }

    fn parameters(&self, node: Node) -> Vec<ParameterInfo> {
        node.child_by_field_name("parameters")
            .or_else(|| child_of_kind(node, "parameter_list"))
            .map(|list| self.parameter_list(list))
            .unwrap_or_default()
    }

    fn parameter_list(&self, list: Node) -> Vec<ParameterInfo> {
        let mut cursor = list.walk();
        list.named_children(&mut cursor)
            .filter(|p| p.kind() == "parameter")
            .filter_map(|p| self.parameter(p))
            .collect()
    }

    fn parameter(&self, node: Node) -> Option<ParameterInfo> {
        let name = node.child_by_field_name("name")?;
        let ty = node.child_by_field_name("type").or_else(|| {
            // fall back to the last type-ish node before the identifier
            let mut cursor = node.walk();
            let preceding = node
                .named_children(&mut cursor)
                .take_while(|child| child.id() != name.id())
                .filter(|child| {
                    !matches!(child.kind(), "attribute_list" | "modifier" | "parameter_modifier")
                })
                .last();
            preceding
        })?;
        let ty = collapse_whitespace(self.text(ty));
        if ty.is_empty() {
            return None;
        }
        Some(ParameterInfo::new(self.text(name), TypeRef::new(ty)))
    }

    fn is_public(&self, node: Node) -> bool {
        let mut cursor = node.walk();
        let public = node.children(&mut cursor).any(|child| match child.kind() {
            "modifier" => self.text(child) == "public",
            kind => kind == "public",
        });
        public
    }

    fn declared_name(&self, node: Node, kinds: &[&str]) -> String {
        node.child_by_field_name("name")
            .or_else(|| {
                let mut cursor = node.walk();
                let found = node.named_children(&mut cursor).find(|c| kinds.contains(&c.kind()));
                found
            })
            .map(|n| collapse_whitespace(self.text(n)))
            .unwrap_or_default()
    }

    fn text(&self, node: Node) -> &'s str {
        self.source.get(node.byte_range()).unwrap_or("")
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn child_of_kind<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
    let mut cursor = node.walk();
    let found = node.named_children(&mut cursor).find(|c| c.kind() == kind);
    found
}

/// `global using static  System.Math ;` → `static System.Math`
fn using_target(directive: &str) -> String {
    let mut words = directive.trim().trim_end_matches(';').split_whitespace().peekable();
    if words.peek() == Some(&"global") {
        words.next();
    }
    if words.peek() == Some(&"using") {
        words.next();
    }
    words.collect::<Vec<_>>().join(" ")
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn first_syntax_error(root: Node) -> ParseError {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            let at = node.start_position();
            let message = if node.is_missing() {
                format!("missing `{}`", node.kind())
            } else {
                "unexpected input".to_string()
            };
            return ParseError { line: at.row + 1, column: at.column + 1, message };
        }
        let mut cursor = node.walk();
        let children: Vec<Node> = node.children(&mut cursor).collect();
        // reversed so the leftmost error is found first
        stack.extend(children.into_iter().rev().filter(|c| c.has_error() || c.is_missing()));
    }
    let at = root.start_position();
    ParseError {
        line: at.row + 1,
        column: at.column + 1,
        message: "unexpected input".into(),
    }
}

// ------------------------------- Tests ------------------------------------ //
