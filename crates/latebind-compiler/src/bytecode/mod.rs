//! Bytecode types for the latebind compiler.
//!
//! - [`OpCode`] - the instruction set
//! - [`BytecodeChunk`] - compiled code plus its call-site and position tables
//! - [`Constant`] and [`ConstantPool`] - script-level constant storage
//! - [`CallSiteDescriptor`] - link-time metadata of one `InvokeDynamic`

mod call_site;
mod chunk;
mod constant;
mod opcode;

pub use call_site::{Bootstrap, CallSiteDescriptor, FactoryFlags, StaticArg, site_kind};
pub use chunk::BytecodeChunk;
pub use constant::{Constant, ConstantPool};
pub use opcode::OpCode;
