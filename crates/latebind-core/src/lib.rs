//! Core types shared by the latebind compiler, registry and runtime linker.
//!
//! ## Modules
//!
//! - [`span`]: source locations
//! - [`type_hash`]: deterministic identity hashes
//! - [`data_type`]: static types and their descriptors
//! - [`method_type`]: method signatures and method handles
//! - [`recipe`]: deferred-argument bitsets for dynamic call sites
//! - [`error`]: registration, descriptor and compilation errors

pub mod data_type;
pub mod error;
pub mod method_type;
pub mod recipe;
pub mod span;
pub mod type_hash;

pub use data_type::{DEF_TYPE_NAME, DataType, PrimitiveKind, STRING_TYPE_NAME};
pub use error::{CompilationError, DescriptorError, RegistrationError};
pub use method_type::{HandleKind, MethodHandle, MethodType};
pub use recipe::ArgRecipe;
pub use span::Span;
pub use type_hash::TypeHash;
