//! Literal values.

use latebind_core::DataType;

use crate::ast::Literal;
use crate::emit::{BytecodeEmitter, EmitError};

pub(super) fn analyze(literal: &Literal) -> DataType {
    literal.data_type()
}

pub(super) fn load(
    emitter: &mut BytecodeEmitter<'_>,
    literal: &Literal,
) -> Result<(), EmitError> {
    match literal {
        Literal::Bool(value) => {
            emitter.emit_bool(*value);
            Ok(())
        }
        Literal::Int(value) => emitter.emit_int(i64::from(*value)),
        Literal::Long(value) => emitter.emit_int(*value),
        Literal::Float(value) => emitter.emit_f32(*value),
        Literal::Double(value) => emitter.emit_f64(*value),
        Literal::String(value) => emitter.emit_string(value),
    }
}
