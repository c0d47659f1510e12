//! Implicit conversions between static types.
//!
//! Checked in order:
//! 1. Identity
//! 2. Primitive widening (`int -> long -> float -> double`)
//! 3. Any value into `def` (boxing)
//! 4. `def` into any value type (checked when it executes)

use latebind_core::{CompilationError, DataType, PrimitiveKind, Span, TypeHash};

use crate::bytecode::OpCode;
use crate::emit::{BytecodeEmitter, EmitError};

/// An implicit conversion applied after a node's value is produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Conversion {
    /// No conversion needed (exact match).
    Identity,
    /// Primitive widening through a single conversion opcode.
    Primitive { op: OpCode },
    /// Box into `def`.
    ToDef,
    /// Unbox from `def`, checking the runtime type.
    FromDef { target: TypeHash },
}

impl Conversion {
    pub fn is_identity(&self) -> bool {
        matches!(self, Conversion::Identity)
    }

    /// Emit the instructions performing this conversion.
    pub fn emit(&self, emitter: &mut BytecodeEmitter<'_>) -> Result<(), EmitError> {
        match self {
            Conversion::Identity => {}
            Conversion::Primitive { op } => emitter.emit_conversion(*op),
            Conversion::ToDef => emitter.emit_conversion(OpCode::ToDef),
            Conversion::FromDef { target } => return emitter.emit_from_def(*target),
        }
        Ok(())
    }
}

/// Find the implicit conversion from `source` to `target`, if any.
pub fn find_implicit_conversion(source: &DataType, target: &DataType) -> Option<Conversion> {
    if source == target {
        return Some(Conversion::Identity);
    }

    match (source, target) {
        (DataType::Void, _) | (_, DataType::Void) => None,
        (_, DataType::Def) => Some(Conversion::ToDef),
        (DataType::Def, _) => Some(Conversion::FromDef {
            target: target.type_hash(),
        }),
        (DataType::Primitive(from), DataType::Primitive(to)) => {
            widening_op(*from, *to).map(|op| Conversion::Primitive { op })
        }
        _ => None,
    }
}

/// Conversion from `source` to `target`, or a located mismatch error.
pub fn require_conversion(
    source: &DataType,
    target: &DataType,
    span: Span,
) -> Result<Conversion, CompilationError> {
    find_implicit_conversion(source, target).ok_or_else(|| CompilationError::TypeMismatch {
        message: format!("cannot implicitly convert '{}' to '{}'", source, target),
        span,
    })
}

fn widening_op(from: PrimitiveKind, to: PrimitiveKind) -> Option<OpCode> {
    use PrimitiveKind::*;
    match (from, to) {
        (Int, Long) => Some(OpCode::I32toI64),
        (Int, Float) => Some(OpCode::I32toF32),
        (Int, Double) => Some(OpCode::I32toF64),
        (Long, Float) => Some(OpCode::I64toF32),
        (Long, Double) => Some(OpCode::I64toF64),
        (Float, Double) => Some(OpCode::F32toF64),
        _ => None,
    }
}
