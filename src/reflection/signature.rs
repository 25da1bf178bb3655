//! Method signatures built from introspection metadata and syntax evidence.
//!
//! A [`MethodSignature`] resolves its parameters, variadic flag and return
//! type lazily. Each field is computed on first access and cached for the
//! lifetime of the signature; the caches are write-once and never
//! invalidated, since sources are assumed unchanged during a run.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;
use std::sync::Arc;

use once_cell::unsync::OnceCell;
use serde::Serialize;

use crate::syntax::{Element, NodeKind, SyntaxIndex};
use crate::types::{Type, TypeHintResolver};

use super::finder::FunctionCallFinder;
use super::metadata::{ClassMetadata, MethodMetadata, NativeParameter};
use super::quirks::{QuirkTable, SyntheticParameter};

/// Runtime function that collects a callable's full argument list.
pub const IMPLICIT_VARIADIC_CALL: &str = "func_get_args";

/// One resolved parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterSignature {
    pub name: String,
    #[serde(rename = "type")]
    pub type_: Type,
    pub is_optional: bool,
    pub passed_by_reference: bool,
    pub is_variadic: bool,
}

impl ParameterSignature {
    fn from_native(param: &NativeParameter, hints: &TypeHintResolver, class_name: &str) -> Self {
        let type_ = match &param.type_hint {
            Some(hint) => hints.resolve(&hint.name, hint.allows_null, class_name),
            None => Type::Mixed { nullable: true },
        };
        Self {
            name: param.name.clone(),
            type_,
            is_optional: param.is_optional,
            passed_by_reference: param.passed_by_reference,
            is_variadic: param.is_variadic,
        }
    }

    fn synthetic(param: &SyntheticParameter) -> Self {
        Self {
            name: param.name.clone(),
            type_: param.type_.clone(),
            is_optional: true,
            passed_by_reference: false,
            is_variadic: false,
        }
    }
}

/// Collaborators shared by every signature of a run.
#[derive(Clone)]
struct Services {
    syntax: Arc<dyn SyntaxIndex>,
    quirks: Arc<QuirkTable>,
    finder: FunctionCallFinder,
    hints: TypeHintResolver,
    look_for_implicit_variadic: bool,
}

/// The signature of one method of one declaring class.
///
/// Not meant for concurrent use: give each thread its own instances.
pub struct MethodSignature {
    declaring_class: Arc<dyn ClassMetadata>,
    method: Arc<dyn MethodMetadata>,
    services: Services,
    parameters: OnceCell<Vec<ParameterSignature>>,
    variadic: OnceCell<bool>,
    return_type: OnceCell<Type>,
}

impl MethodSignature {
    pub fn new(
        declaring_class: Arc<dyn ClassMetadata>,
        method: Arc<dyn MethodMetadata>,
        syntax: Arc<dyn SyntaxIndex>,
        quirks: Arc<QuirkTable>,
        look_for_implicit_variadic: bool,
    ) -> Self {
        let services = Services {
            syntax,
            quirks,
            finder: FunctionCallFinder::new(),
            hints: TypeHintResolver::new(),
            look_for_implicit_variadic,
        };
        Self::with_services(declaring_class, method, services)
    }

    fn with_services(
        declaring_class: Arc<dyn ClassMetadata>,
        method: Arc<dyn MethodMetadata>,
        services: Services,
    ) -> Self {
        Self {
            declaring_class,
            method,
            services,
            parameters: OnceCell::new(),
            variadic: OnceCell::new(),
            return_type: OnceCell::new(),
        }
    }

    pub fn declaring_class(&self) -> &dyn ClassMetadata {
        self.declaring_class.as_ref()
    }

    pub fn name(&self) -> &str {
        self.method.name()
    }

    pub fn is_static(&self) -> bool {
        self.method.is_static()
    }

    pub fn is_public(&self) -> bool {
        self.method.is_public()
    }

    pub fn is_private(&self) -> bool {
        self.method.is_private()
    }

    pub fn is_abstract(&self) -> bool {
        self.method.is_abstract()
    }

    /// Parameters in declaration order, followed by any quirk-table additions.
    pub fn parameters(&self) -> &[ParameterSignature] {
        self.parameters.get_or_init(|| {
            let class_name = self.declaring_class.name();
            let mut params: Vec<ParameterSignature> = self
                .method
                .parameters()
                .iter()
                .map(|p| ParameterSignature::from_native(p, &self.services.hints, class_name))
                .collect();

            if let Some(extra) =
                self.services
                    .quirks
                    .lookup(class_name, self.method.name(), params.len())
            {
                params.extend(extra.iter().map(ParameterSignature::synthetic));
            }

            params
        })
    }

    /// Whether the method accepts arbitrary trailing arguments.
    ///
    /// True when natively variadic or, with the implicit-variadic lookup
    /// enabled, when the method body calls `func_get_args()`. If the defining
    /// file cannot be read or parsed the lookup is skipped and the native flag
    /// stands (fallback disabled on unreadable source).
    pub fn is_variadic(&self) -> bool {
        *self.variadic.get_or_init(|| {
            if self.method.is_variadic() {
                return true;
            }
            if !self.services.look_for_implicit_variadic {
                return false;
            }
            match self.declaring_class.file_name() {
                Some(file) => self.body_calls_func_get_args(file),
                None => false,
            }
        })
    }

    /// Declared return type, `mixed` (nullable) when none is declared.
    pub fn return_type(&self) -> &Type {
        self.return_type
            .get_or_init(|| match self.method.return_type() {
                None => Type::Mixed { nullable: true },
                Some(hint) => self.services.hints.resolve(
                    &hint.name,
                    hint.allows_null,
                    self.declaring_class.name(),
                ),
            })
    }

    fn body_calls_func_get_args(&self, file: &Path) -> bool {
        let tree = match self.services.syntax.parse_file(file) {
            Ok(tree) => tree,
            Err(e) => {
                tracing::debug!(
                    "implicit variadic lookup disabled for {}::{}: {}",
                    self.declaring_class.name(),
                    self.method.name(),
                    e
                );
                return false;
            }
        };

        self.search_method_body(tree.nodes()).unwrap_or(false)
    }

    /// Walk the tree for the first method with this name that has a body and
    /// report whether its body calls `func_get_args()`.
    ///
    /// `None` means no such method was found under `elements`.
    fn search_method_body(&self, elements: &[Element]) -> Option<bool> {
        for element in elements {
            let node = match element {
                Element::Seq(items) => {
                    if let Some(found) = self.search_method_body(items) {
                        return Some(found);
                    }
                    continue;
                }
                Element::Node(node) => node,
            };

            if let NodeKind::Method { name } = &node.kind {
                let Some(stmts) = &node.stmts else {
                    // abstract or interface method
                    continue;
                };
                if name.eq_ignore_ascii_case(self.method.name()) {
                    return Some(
                        self.services
                            .finder
                            .find_call(IMPLICIT_VARIADIC_CALL, stmts)
                            .is_some(),
                    );
                }
            }

            for seq in node.child_sequences() {
                if let Some(found) = self.search_method_body(seq) {
                    return Some(found);
                }
            }
        }

        None
    }
}

impl std::fmt::Debug for MethodSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MethodSignature")
            .field("class", &self.declaring_class.name())
            .field("name", &self.method.name())
            .finish_non_exhaustive()
    }
}

/// Hands out one memoized [`MethodSignature`] per (class, method) pair.
pub struct SignatureResolver {
    services: Services,
    signatures: RefCell<HashMap<(String, String), Rc<MethodSignature>>>,
}

impl SignatureResolver {
    /// Create a resolver with the implicit-variadic lookup enabled.
    pub fn new(syntax: Arc<dyn SyntaxIndex>, quirks: Arc<QuirkTable>) -> Self {
        Self {
            services: Services {
                syntax,
                quirks,
                finder: FunctionCallFinder::new(),
                hints: TypeHintResolver::new(),
                look_for_implicit_variadic: true,
            },
            signatures: RefCell::new(HashMap::new()),
        }
    }

    /// Set whether method bodies are searched for `func_get_args()` calls.
    pub fn look_for_implicit_variadic(mut self, enabled: bool) -> Self {
        self.services.look_for_implicit_variadic = enabled;
        self
    }

    /// Signature for `method` of `class`, created on first request.
    pub fn signature(
        &self,
        class: Arc<dyn ClassMetadata>,
        method: Arc<dyn MethodMetadata>,
    ) -> Rc<MethodSignature> {
        let key = (
            class.name().to_ascii_lowercase(),
            method.name().to_ascii_lowercase(),
        );
        let mut signatures = self.signatures.borrow_mut();
        let signature = signatures.entry(key).or_insert_with(|| {
            Rc::new(MethodSignature::with_services(
                class,
                method,
                self.services.clone(),
            ))
        });
        Rc::clone(signature)
    }
}
