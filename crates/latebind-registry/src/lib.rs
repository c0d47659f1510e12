//! Type registry for the latebind compiler.
//!
//! The registry is the whitelist of script-visible types: classes with their
//! static methods, instance methods and constructors, and functional
//! interfaces with their single abstract method. It also derives
//! [`FunctionRef`] descriptors for `Type::member` references.

mod entries;
mod function_ref;
mod registry;

pub use entries::{InterfaceMethod, MethodEntry, MethodKey, TypeEntry, TypeKind};
pub use function_ref::{CONSTRUCTOR_NAME, FunctionRef};
pub use registry::TypeRegistry;
