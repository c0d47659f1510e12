//! latebind runtime
//!
//! Links the call sites a compiled chunk carries. Each `InvokeDynamic`
//! operand indexes a [`CallSite`] in a [`CallSiteTable`]; the host supplies
//! a [`Resolver`] that decides what a site binds to.
//!
//! - `DefCall` sites dispatch on the receiver's runtime type and
//!   materialize recipe-flagged `"Type.member"` arguments before the call.
//! - `LambdaFactory` sites produce a [`FunctionObject`], wrapped in a
//!   [`bridge`] adapter when the interface and implementation signatures
//!   differ.

pub mod adapter;
pub mod call_site;
pub mod error;
pub mod factory;
pub mod value;

pub use adapter::bridge;
pub use call_site::{CallSite, CallSiteTable, LinkedTarget, Resolver};
pub use error::LinkError;
pub use factory::{FactorySpec, link_factory};
pub use value::{FunctionObject, ObjectHandle, Target, Value};
