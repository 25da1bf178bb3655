//! Known gaps between introspected and real signatures of platform built-ins.
//!
//! Each row appends synthetic optional parameters to a method whose
//! introspected parameter list is known to be short. Add a row to
//! [`BUILTIN_QUIRKS`] to correct another method.

use std::collections::HashMap;

use crate::types::{Type, TypeHintResolver};

/// A synthetic trailing parameter. Always optional.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntheticParameter {
    pub name: String,
    pub type_: Type,
}

/// A static table row.
struct QuirkRow {
    class: &'static str,
    method: &'static str,
    /// Introspected parameter count the correction applies to.
    observed_count: usize,
    /// `(name, type hint)` pairs. Hints are resolved as non-nullable.
    append: &'static [(&'static str, &'static str)],
}

/// Built-in corrections.
static BUILTIN_QUIRKS: &[QuirkRow] = &[
    // ArrayObject::__construct reports only $input (php bug #71077)
    QuirkRow {
        class: "ArrayObject",
        method: "__construct",
        observed_count: 1,
        append: &[("flags", "int"), ("iterator_class", "string")],
    },
];

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct QuirkKey {
    class: String,
    method: String,
    observed_count: usize,
}

impl QuirkKey {
    /// Class and method names are case-insensitive, so keys are lowercased.
    fn new(class: &str, method: &str, observed_count: usize) -> Self {
        Self {
            class: class.trim_start_matches('\\').to_ascii_lowercase(),
            method: method.to_ascii_lowercase(),
            observed_count,
        }
    }
}

/// Read-only lookup of signature corrections.
#[derive(Debug, Clone, Default)]
pub struct QuirkTable {
    entries: HashMap<QuirkKey, Vec<SyntheticParameter>>,
}

impl QuirkTable {
    /// A table with no corrections.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The table of known platform corrections.
    pub fn builtin() -> Self {
        let hints = TypeHintResolver::new();
        BUILTIN_QUIRKS.iter().fold(Self::empty(), |table, row| {
            let params = row
                .append
                .iter()
                .map(|(name, hint)| SyntheticParameter {
                    name: name.to_string(),
                    type_: hints.resolve(hint, false, row.class),
                })
                .collect();
            table.with_entry(row.class, row.method, row.observed_count, params)
        })
    }

    /// Add or replace the correction for `(class, method, observed_count)`.
    pub fn with_entry(
        mut self,
        class: &str,
        method: &str,
        observed_count: usize,
        append: Vec<SyntheticParameter>,
    ) -> Self {
        self.entries
            .insert(QuirkKey::new(class, method, observed_count), append);
        self
    }

    /// Synthetic parameters to append, if the key has a correction.
    pub fn lookup(
        &self,
        class: &str,
        method: &str,
        observed_count: usize,
    ) -> Option<&[SyntheticParameter]> {
        self.entries
            .get(&QuirkKey::new(class, method, observed_count))
            .map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
