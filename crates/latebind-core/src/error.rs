//! Error types for registration, descriptor construction and compilation.
//!
//! ## Error Hierarchy
//!
//! ```text
//! RegistrationError  - building the type registry
//! DescriptorError    - deriving a function reference descriptor (unlocated)
//! CompilationError   - analysis and emission diagnostics (always located)
//! ```
//!
//! A `DescriptorError` never escapes analysis on its own: the function
//! reference node that triggered it wraps it into
//! [`CompilationError::InvalidFunctionRef`] together with its span.

use thiserror::Error;

use crate::Span;

// ============================================================================
// Registration Errors
// ============================================================================

/// Errors raised while populating the type registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// A type with this name is already registered.
    #[error("type '{name}' is already registered")]
    DuplicateType { name: String },

    /// A member was added to a type that does not exist.
    #[error("unknown type '{name}'")]
    UnknownType { name: String },

    /// Two members share a lookup key (name and arity).
    #[error("duplicate member '{owner}::{name}' with {arity} parameter(s)")]
    DuplicateMember {
        owner: String,
        name: String,
        arity: usize,
    },

    /// No member with this name and arity is registered on the type.
    #[error("unknown member '{owner}::{name}' with {arity} parameter(s)")]
    UnknownMember {
        owner: String,
        name: String,
        arity: usize,
    },

    /// A functional interface was used where a class is required.
    #[error("'{name}' is a functional interface and cannot declare members")]
    NotAClass { name: String },
}

// ============================================================================
// Descriptor Errors
// ============================================================================

/// Errors raised while deriving a function reference descriptor.
///
/// `reference` is always the `Type::member` text of the reference and
/// `expected` the name of the functional interface it was converted to.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorError {
    /// The owner type of the reference does not exist.
    #[error("unknown type '{name}' in function reference")]
    UnknownType { name: String },

    /// The expected type has no single abstract method.
    #[error("cannot convert function reference [{reference}] to [{expected}], not a functional interface")]
    NotFunctional { reference: String, expected: String },

    /// No method of the owner matches the interface arity.
    #[error("unknown reference [{reference}] matching [{expected}]")]
    UnknownReference { reference: String, expected: String },

    /// A method was found but its signature cannot be adapted.
    #[error("incompatible reference [{reference}] for [{expected}]: {detail}")]
    IncompatibleSignature {
        reference: String,
        expected: String,
        detail: String,
    },
}

// ============================================================================
// Compilation Errors
// ============================================================================

/// Errors reported during analysis and emission.
///
/// Every variant carries the span it is attributed to.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompilationError {
    /// A referenced type could not be found.
    #[error("at {span}: unknown type '{name}'")]
    UnknownType { name: String, span: Span },

    /// A referenced local variable could not be found.
    #[error("at {span}: unknown variable '{name}'")]
    UnknownVariable { name: String, span: Span },

    /// A variable was redeclared in the same scope.
    #[error("at {new_span}: variable '{name}' redeclared (originally declared at {original_span})")]
    VariableRedeclaration {
        name: String,
        original_span: Span,
        new_span: Span,
    },

    /// A value cannot be converted to the type its context requires.
    #[error("at {span}: {message}")]
    TypeMismatch { message: String, span: Span },

    /// A function reference could not be described against its target type.
    #[error("at {span}: {error}")]
    InvalidFunctionRef { error: DescriptorError, span: Span },

    /// The construct is outside what this compiler supports.
    #[error("at {span}: {message}")]
    Unsupported { message: String, span: Span },

    /// An expression without effect was used as a statement.
    #[error("at {span}: not a statement")]
    NotAStatement { span: Span },

    /// Assignment to something that is not assignable.
    #[error("at {span}: left side of assignment is not assignable")]
    NotAnLvalue { span: Span },

    /// The tree reached a shape earlier phases should have ruled out.
    #[error("at {span}: internal compiler error: {message}")]
    Internal { message: String, span: Span },
}

impl CompilationError {
    /// Get the span where this error occurred.
    pub fn span(&self) -> Span {
        match self {
            CompilationError::UnknownType { span, .. } => *span,
            CompilationError::UnknownVariable { span, .. } => *span,
            CompilationError::VariableRedeclaration { new_span, .. } => *new_span,
            CompilationError::TypeMismatch { span, .. } => *span,
            CompilationError::InvalidFunctionRef { span, .. } => *span,
            CompilationError::Unsupported { span, .. } => *span,
            CompilationError::NotAStatement { span } => *span,
            CompilationError::NotAnLvalue { span } => *span,
            CompilationError::Internal { span, .. } => *span,
        }
    }

    /// Whether this error signals a compiler bug rather than a script error.
    pub fn is_internal(&self) -> bool {
        matches!(self, CompilationError::Internal { .. })
    }
}
