//! Mapping of raw type-hint tokens to `Type` values.

use phf::phf_map;

use super::Type;

#[derive(Debug, Clone, Copy)]
enum Keyword {
    Int,
    Float,
    String,
    Bool,
    Array,
    Iterable,
    Callable,
    Void,
    Null,
    Mixed,
    SelfRef,
}

/// Reserved hint keywords, lowercased.
static KEYWORDS: phf::Map<&'static str, Keyword> = phf_map! {
    "int" => Keyword::Int,
    "integer" => Keyword::Int,
    "float" => Keyword::Float,
    "double" => Keyword::Float,
    "string" => Keyword::String,
    "bool" => Keyword::Bool,
    "boolean" => Keyword::Bool,
    "array" => Keyword::Array,
    "iterable" => Keyword::Iterable,
    "callable" => Keyword::Callable,
    "void" => Keyword::Void,
    "null" => Keyword::Null,
    "mixed" => Keyword::Mixed,
    "self" => Keyword::SelfRef,
    "static" => Keyword::SelfRef,
};

/// Resolves raw hints such as `int`, `?string` or `self`.
///
/// Never fails: anything it cannot classify becomes `mixed`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeHintResolver;

impl TypeHintResolver {
    pub fn new() -> Self {
        Self
    }

    /// Resolve `raw_hint` with the given nullability.
    ///
    /// `context_type` is the declaring class and anchors `self` and `static`.
    pub fn resolve(&self, raw_hint: &str, nullable: bool, context_type: &str) -> Type {
        let mut hint = raw_hint.trim();
        let mut nullable = nullable;
        if let Some(rest) = hint.strip_prefix('?') {
            hint = rest.trim();
            nullable = true;
        }

        if let Some(keyword) = KEYWORDS.get(hint.to_ascii_lowercase().as_str()) {
            return match keyword {
                Keyword::Int => Type::Integer { nullable },
                Keyword::Float => Type::Float { nullable },
                Keyword::String => Type::String { nullable },
                Keyword::Bool => Type::Boolean { nullable },
                Keyword::Array => Type::Array { nullable },
                Keyword::Iterable => Type::Iterable { nullable },
                Keyword::Callable => Type::Callable { nullable },
                Keyword::Void => Type::Void { nullable },
                Keyword::Null => Type::Null { nullable },
                Keyword::Mixed => Type::Mixed { nullable },
                Keyword::SelfRef => Type::object(context_type, nullable),
            };
        }

        let class_name = hint.strip_prefix('\\').unwrap_or(hint);
        if is_class_name(class_name) {
            Type::object(class_name, nullable)
        } else {
            Type::Mixed { nullable }
        }
    }
}

/// A possibly namespaced PHP identifier, e.g. `Foo\Bar_Baz`.
fn is_class_name(name: &str) -> bool {
    !name.is_empty()
        && name.split('\\').all(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(c) if c == '_' || c.is_alphabetic() => {
                    chars.all(|c| c == '_' || c.is_alphanumeric())
                }
                _ => false,
            }
        })
}
