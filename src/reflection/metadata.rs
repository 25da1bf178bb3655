//! Introspection metadata for loaded class and method definitions.
//!
//! The traits are the query surface the signature resolver depends on.
//! `ClassInfo` and `MethodInfo` are plain in-memory implementations, filled
//! either by hand or by the source reflector.

use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Read-only metadata about a class-like definition.
pub trait ClassMetadata {
    /// Fully qualified name, without a leading separator.
    fn name(&self) -> &str;

    /// File the class was defined in. `None` for platform built-ins.
    fn file_name(&self) -> Option<&Path>;
}

/// Read-only metadata about a method, as reported by introspection.
pub trait MethodMetadata {
    fn name(&self) -> &str;
    fn is_static(&self) -> bool;
    fn is_public(&self) -> bool;
    fn is_private(&self) -> bool;
    /// Declared without a body (abstract or interface method).
    fn is_abstract(&self) -> bool;
    /// Whether the method declares a native variadic parameter.
    fn is_variadic(&self) -> bool;
    /// Parameters in declaration order.
    fn parameters(&self) -> &[NativeParameter];
    /// Declared return type, if any.
    fn return_type(&self) -> Option<&NativeTypeHint>;
}

/// Member visibility. Members without a modifier are public.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Private,
}

impl Visibility {
    pub fn parse(keyword: &str) -> Option<Self> {
        match keyword.to_ascii_lowercase().as_str() {
            "public" => Some(Visibility::Public),
            "protected" => Some(Visibility::Protected),
            "private" => Some(Visibility::Private),
            _ => None,
        }
    }
}

/// A declared type as introspection reports it: the raw token plus nullability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeTypeHint {
    pub name: String,
    pub allows_null: bool,
}

impl NativeTypeHint {
    pub fn new(name: impl Into<String>, allows_null: bool) -> Self {
        Self {
            name: name.into(),
            allows_null,
        }
    }
}

/// One introspected parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeParameter {
    /// Name without the `$` sigil.
    pub name: String,
    pub type_hint: Option<NativeTypeHint>,
    pub is_optional: bool,
    pub passed_by_reference: bool,
    pub is_variadic: bool,
}

impl NativeParameter {
    /// A required, untyped, by-value parameter.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_hint: None,
            is_optional: false,
            passed_by_reference: false,
            is_variadic: false,
        }
    }

    pub fn typed(mut self, hint: NativeTypeHint) -> Self {
        self.type_hint = Some(hint);
        self
    }

    pub fn optional(mut self) -> Self {
        self.is_optional = true;
        self
    }

    pub fn by_reference(mut self) -> Self {
        self.passed_by_reference = true;
        self
    }

    /// Variadic parameters are always optional.
    pub fn variadic(mut self) -> Self {
        self.is_variadic = true;
        self.is_optional = true;
        self
    }
}

/// In-memory method metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodInfo {
    pub name: String,
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_abstract: bool,
    pub parameters: Vec<NativeParameter>,
    pub return_type: Option<NativeTypeHint>,
}

impl MethodInfo {
    /// A public, non-static method with no parameters.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visibility: Visibility::Public,
            is_static: false,
            is_abstract: false,
            parameters: Vec::new(),
            return_type: None,
        }
    }

    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn static_method(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn abstract_method(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    pub fn parameter(mut self, parameter: NativeParameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn returns(mut self, hint: NativeTypeHint) -> Self {
        self.return_type = Some(hint);
        self
    }
}

impl MethodMetadata for MethodInfo {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_static(&self) -> bool {
        self.is_static
    }

    fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }

    fn is_private(&self) -> bool {
        self.visibility == Visibility::Private
    }

    fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    fn is_variadic(&self) -> bool {
        self.parameters.iter().any(|p| p.is_variadic)
    }

    fn parameters(&self) -> &[NativeParameter] {
        &self.parameters
    }

    fn return_type(&self) -> Option<&NativeTypeHint> {
        self.return_type.as_ref()
    }
}

/// In-memory class metadata.
#[derive(Debug, Clone)]
pub struct ClassInfo {
    pub name: String,
    pub file: Option<PathBuf>,
    pub methods: Vec<Arc<MethodInfo>>,
}

impl ClassInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            file: None,
            methods: Vec::new(),
        }
    }

    pub fn defined_in(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn method(mut self, method: MethodInfo) -> Self {
        self.methods.push(Arc::new(method));
        self
    }

    /// Look up a method by name. Method names are case-insensitive.
    pub fn find_method(&self, name: &str) -> Option<&Arc<MethodInfo>> {
        self.methods.iter().find(|m| m.name.eq_ignore_ascii_case(name))
    }
}

impl ClassMetadata for ClassInfo {
    fn name(&self) -> &str {
        &self.name
    }

    fn file_name(&self) -> Option<&Path> {
        self.file.as_deref()
    }
}
