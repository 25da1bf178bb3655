//! Method reflection: introspection metadata merged with syntax evidence.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌──────────────────┐     ┌─────────────────┐
//! │ ClassMetadata / │────▶│ MethodSignature  │◀────│ SyntaxIndex     │
//! │ MethodMetadata  │     │ (lazy, memoized) │     │ (func_get_args  │
//! └─────────────────┘     └──────────────────┘     │  fallback)      │
//!                            ▲            ▲        └─────────────────┘
//!                            │            │
//!                    ┌───────────┐  ┌──────────────────┐
//!                    │QuirkTable │  │ TypeHintResolver │
//!                    └───────────┘  └──────────────────┘
//! ```

mod finder;
mod metadata;
mod quirks;
mod signature;
mod source;

pub use finder::FunctionCallFinder;
pub use metadata::{
    ClassInfo, ClassMetadata, MethodInfo, MethodMetadata, NativeParameter, NativeTypeHint,
    Visibility,
};
pub use quirks::{QuirkTable, SyntheticParameter};
pub use signature::{MethodSignature, ParameterSignature, SignatureResolver, IMPLICIT_VARIADIC_CALL};
pub use source::{ClassRegistry, SourceReflector};
