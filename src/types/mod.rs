//! Semantic type values produced by reflection.
//!
//! A `Type` is immutable and compared structurally. Every variant carries a
//! nullability flag, including `Void` and `Null`, so callers never need to
//! special-case the flag's presence.

use std::fmt;

use serde::Serialize;

mod hint;

pub use hint::TypeHintResolver;

/// A resolved PHP type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Type {
    Mixed { nullable: bool },
    Integer { nullable: bool },
    Float { nullable: bool },
    String { nullable: bool },
    Boolean { nullable: bool },
    Array { nullable: bool },
    Iterable { nullable: bool },
    Callable { nullable: bool },
    Void { nullable: bool },
    Null { nullable: bool },
    Object { class_name: String, nullable: bool },
}

impl Type {
    /// Object reference to the named class.
    pub fn object(class_name: impl Into<String>, nullable: bool) -> Self {
        Type::Object {
            class_name: class_name.into(),
            nullable,
        }
    }

    pub fn is_nullable(&self) -> bool {
        match self {
            Type::Mixed { nullable }
            | Type::Integer { nullable }
            | Type::Float { nullable }
            | Type::String { nullable }
            | Type::Boolean { nullable }
            | Type::Array { nullable }
            | Type::Iterable { nullable }
            | Type::Callable { nullable }
            | Type::Void { nullable }
            | Type::Null { nullable }
            | Type::Object { nullable, .. } => *nullable,
        }
    }

    /// The type name without nullability decoration.
    pub fn base_name(&self) -> &str {
        match self {
            Type::Mixed { .. } => "mixed",
            Type::Integer { .. } => "int",
            Type::Float { .. } => "float",
            Type::String { .. } => "string",
            Type::Boolean { .. } => "bool",
            Type::Array { .. } => "array",
            Type::Iterable { .. } => "iterable",
            Type::Callable { .. } => "callable",
            Type::Void { .. } => "void",
            Type::Null { .. } => "null",
            Type::Object { class_name, .. } => class_name,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // mixed and null already admit null
        let decorate = self.is_nullable() && !matches!(self, Type::Mixed { .. } | Type::Null { .. });
        if decorate {
            write!(f, "?{}", self.base_name())
        } else {
            write!(f, "{}", self.base_name())
        }
    }
}
