//! Class and method metadata read from PHP source files.

use std::path::Path;
use std::rc::Rc;
use std::sync::Arc;

use crate::syntax::{ParsedFile, PhpParser, SyntaxError};

use super::metadata::{
    ClassInfo, ClassMetadata, MethodInfo, MethodMetadata, NativeParameter, NativeTypeHint,
    Visibility,
};
use super::signature::{MethodSignature, SignatureResolver};

/// Reflects class-like declarations (classes, interfaces, traits, enums).
#[derive(Clone, Default)]
pub struct SourceReflector {
    parser: PhpParser,
}

impl SourceReflector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reflect every class-like declared in `path`.
    ///
    /// Files with syntax errors are rejected.
    pub fn reflect_file(&self, path: &Path) -> Result<Vec<ClassInfo>, SyntaxError> {
        let parsed = self.parser.parse_valid_file(path)?;
        Ok(self.reflect(&parsed))
    }

    /// Reflect an already parsed file.
    pub fn reflect(&self, parsed: &ParsedFile) -> Vec<ClassInfo> {
        let mut classes = Vec::new();
        let mut namespace = String::new();
        collect_classes(parsed, parsed.tree.root_node(), &mut namespace, &mut classes);
        classes
    }
}

fn collect_classes(
    parsed: &ParsedFile,
    node: tree_sitter::Node,
    namespace: &mut String,
    out: &mut Vec<ClassInfo>,
) {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "namespace_definition" => {
                let name = parsed.field_text(child, "name").unwrap_or("").to_string();
                match child.child_by_field_name("body") {
                    Some(body) => {
                        let mut scoped = name;
                        collect_classes(parsed, body, &mut scoped, out);
                    }
                    // `namespace Foo;` applies to the rest of the file
                    None => *namespace = name,
                }
            }
            "class_declaration" | "interface_declaration" | "trait_declaration"
            | "enum_declaration" => {
                if let Some(class) = reflect_class(parsed, child, namespace) {
                    out.push(class);
                }
            }
            "function_definition"
            | "method_declaration"
            | "anonymous_function"
            | "anonymous_function_creation_expression"
            | "arrow_function" => {}
            _ => collect_classes(parsed, child, namespace, out),
        }
    }
}

fn reflect_class(parsed: &ParsedFile, node: tree_sitter::Node, namespace: &str) -> Option<ClassInfo> {
    let short_name = parsed.field_text(node, "name")?;
    let name = if namespace.is_empty() {
        short_name.to_string()
    } else {
        format!("{}\\{}", namespace.trim_start_matches('\\'), short_name)
    };

    let mut class = ClassInfo::new(name).defined_in(&parsed.path);
    if let Some(body) = node.child_by_field_name("body") {
        let mut cursor = body.walk();
        for member in body.named_children(&mut cursor) {
            if member.kind() == "method_declaration" {
                if let Some(method) = reflect_method(parsed, member) {
                    class.methods.push(Arc::new(method));
                }
            }
        }
    }

    Some(class)
}

fn reflect_method(parsed: &ParsedFile, node: tree_sitter::Node) -> Option<MethodInfo> {
    let mut method = MethodInfo::new(parsed.field_text(node, "name")?);
    method.is_abstract = node.child_by_field_name("body").is_none();

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "visibility_modifier" => {
                if let Some(visibility) = Visibility::parse(parsed.node_text(child)) {
                    method.visibility = visibility;
                }
            }
            "static_modifier" => method.is_static = true,
            "abstract_modifier" => method.is_abstract = true,
            _ => {}
        }
    }

    if let Some(params) = node.child_by_field_name("parameters") {
        let mut cursor = params.walk();
        method.parameters = params
            .named_children(&mut cursor)
            .filter_map(|p| reflect_parameter(parsed, p))
            .collect();
    }

    method.return_type = node
        .child_by_field_name("return_type")
        .map(|t| type_hint(parsed.node_text(t), false));

    Some(method)
}

fn reflect_parameter(parsed: &ParsedFile, node: tree_sitter::Node) -> Option<NativeParameter> {
    let is_variadic = match node.kind() {
        "simple_parameter" | "property_promotion_parameter" => false,
        "variadic_parameter" => true,
        _ => return None,
    };

    let raw_name = parsed.field_text(node, "name")?;
    let by_reference = raw_name.starts_with('&') || has_child(node, "reference_modifier");
    let mut param = NativeParameter::new(raw_name.trim_start_matches(['&', '$']).trim());

    let default = parsed.field_text(node, "default_value");
    let default_null = default.is_some_and(|d| d.trim().eq_ignore_ascii_case("null"));
    if let Some(hint) = parsed.field_text(node, "type") {
        param = param.typed(type_hint(hint, default_null));
    }
    if default.is_some() {
        param = param.optional();
    }
    if by_reference {
        param = param.by_reference();
    }
    if is_variadic {
        param = param.variadic();
    }

    Some(param)
}

/// Build a hint from source text such as `?int` or `string|null`.
fn type_hint(text: &str, implicitly_nullable: bool) -> NativeTypeHint {
    let text = text.trim();
    if let Some(inner) = text.strip_prefix('?') {
        return NativeTypeHint::new(inner.trim(), true);
    }
    let has_null = text
        .split('|')
        .any(|part| part.trim().eq_ignore_ascii_case("null"));
    NativeTypeHint::new(text, implicitly_nullable || has_null)
}

fn has_child(node: tree_sitter::Node, kind: &str) -> bool {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).any(|c| c.kind() == kind);
    found
}

/// Classes reflected from a set of files, with case-insensitive lookup.
#[derive(Debug, Default)]
pub struct ClassRegistry {
    classes: Vec<Arc<ClassInfo>>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, class: ClassInfo) {
        self.classes.push(Arc::new(class));
    }

    /// Reflect `path` and add its classes. Returns how many were added.
    pub fn load_file(&mut self, reflector: &SourceReflector, path: &Path) -> Result<usize, SyntaxError> {
        let classes = reflector.reflect_file(path)?;
        let count = classes.len();
        for class in classes {
            self.add(class);
        }
        Ok(count)
    }

    /// Look up a class by name. A leading separator is ignored.
    pub fn find(&self, name: &str) -> Option<&Arc<ClassInfo>> {
        let name = name.trim_start_matches('\\');
        self.classes.iter().find(|c| c.name.eq_ignore_ascii_case(name))
    }

    pub fn classes(&self) -> &[Arc<ClassInfo>] {
        &self.classes
    }

    /// Resolve the signature of `class::method`. `None` if either is unknown.
    pub fn method_signature(
        &self,
        resolver: &SignatureResolver,
        class: &str,
        method: &str,
    ) -> Option<Rc<MethodSignature>> {
        let class = self.find(class)?;
        let method: Arc<dyn MethodMetadata> = class.find_method(method)?.clone();
        let class: Arc<dyn ClassMetadata> = class.clone();
        Some(resolver.signature(class, method))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflection::metadata::MethodMetadata;
    use tempfile::TempDir;

    fn reflect(source: &str) -> Vec<ClassInfo> {
        let parsed = PhpParser::new()
            .parse_source(Path::new("test.php"), source.as_bytes().to_vec())
            .unwrap();
        SourceReflector::new().reflect(&parsed)
    }

    #[test]
    fn test_reflect_namespaced_class() {
        let classes = reflect("<?php\nnamespace App\\Models;\n\nclass User {}\ninterface HasName {}\n");
        let names: Vec<_> = classes.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["App\\Models\\User", "App\\Models\\HasName"]);
        assert_eq!(classes[0].file.as_deref(), Some(Path::new("test.php")));
    }

    #[test]
    fn test_reflect_method_modifiers() {
        let classes = reflect(
            r#"<?php
abstract class Shape {
    public static function make(): self { return new static(); }
    private function secret() {}
    protected function hidden() {}
    abstract public function area(): float;
    function implicitPublic() {}
}
"#,
        );
        let shape = &classes[0];

        let make = shape.find_method("make").unwrap();
        assert!(make.is_static && make.is_public());
        assert_eq!(make.return_type, Some(NativeTypeHint::new("self", false)));

        assert!(shape.find_method("secret").unwrap().is_private());
        let hidden = shape.find_method("hidden").unwrap();
        assert!(!hidden.is_public() && !hidden.is_private());

        let area = shape.find_method("area").unwrap();
        assert!(area.is_abstract);
        assert!(shape.find_method("implicitPublic").unwrap().is_public());
    }

    #[test]
    fn test_reflect_parameters() {
        let classes = reflect(
            r#"<?php
class Svc {
    public function call(int $id, ?string $name, array &$out, $opt = 5, Foo $f = null, ...$rest) {}
}
"#,
        );
        let call = classes[0].find_method("call").unwrap();
        let params = call.parameters();
        assert_eq!(params.len(), 6);

        assert_eq!(params[0].name, "id");
        assert_eq!(params[0].type_hint, Some(NativeTypeHint::new("int", false)));
        assert!(!params[0].is_optional);

        assert_eq!(params[1].type_hint, Some(NativeTypeHint::new("string", true)));

        assert_eq!(params[2].name, "out");
        assert!(params[2].passed_by_reference);

        assert!(params[3].is_optional);
        assert_eq!(params[3].type_hint, None);

        assert_eq!(params[4].type_hint, Some(NativeTypeHint::new("Foo", true)));

        assert_eq!(params[5].name, "rest");
        assert!(params[5].is_variadic && params[5].is_optional);
        assert!(call.is_variadic());
    }

    #[test]
    fn test_registry_load_and_find() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("a.php");
        std::fs::write(&file, "<?php\nnamespace N;\nclass A { function f() {} }\nclass B {}\n").unwrap();

        let mut registry = ClassRegistry::new();
        let added = registry.load_file(&SourceReflector::new(), &file).unwrap();
        assert_eq!(added, 2);
        assert!(registry.find("\\n\\a").is_some());
        assert!(registry.find("N\\C").is_none());
        assert_eq!(registry.classes().len(), 2);
    }

    #[test]
    fn test_registry_method_signature() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("svc.php");
        std::fs::write(
            &file,
            "<?php\nclass Svc {\n    public function log() { $a = func_get_args(); }\n}\n",
        )
        .unwrap();

        let mut registry = ClassRegistry::new();
        registry.load_file(&SourceReflector::new(), &file).unwrap();
        let resolver = SignatureResolver::new(
            Arc::new(crate::syntax::PhpSyntaxIndex::new()),
            Arc::new(crate::reflection::QuirkTable::empty()),
        );

        let log = registry.method_signature(&resolver, "svc", "LOG").unwrap();
        assert_eq!(log.name(), "log");
        assert!(log.is_variadic());

        assert!(registry.method_signature(&resolver, "Svc", "missing").is_none());
        assert!(registry.method_signature(&resolver, "Other", "log").is_none());
    }
}
