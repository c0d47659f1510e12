//! Bytecode emitter for the latebind compiler.
//!
//! The [`BytecodeEmitter`] wraps a [`BytecodeChunk`] under construction and the
//! script's shared [`ConstantPool`], and tracks the current source line and
//! debug position table.
//!
//! # Example
//!
//! ```
//! use latebind_compiler::bytecode::{Bootstrap, ConstantPool, OpCode, StaticArg, site_kind};
//! use latebind_compiler::emit::BytecodeEmitter;
//! use latebind_core::{ArgRecipe, Span};
//!
//! let mut constants = ConstantPool::new();
//! let mut emitter = BytecodeEmitter::new(&mut constants);
//!
//! emitter.record_position(Span::new(3, 1, 9));
//! emitter.emit_get_local(0).unwrap();
//! emitter
//!     .emit_dynamic_call(
//!         "size",
//!         "(Ldef;)Ldef;",
//!         Bootstrap::DefCall,
//!         vec![StaticArg::Int(site_kind::METHOD_CALL), StaticArg::Recipe(ArgRecipe::empty())],
//!     )
//!     .unwrap();
//!
//! let chunk = emitter.finish();
//! chunk.assert_opcodes(&[OpCode::GetLocal, OpCode::InvokeDynamic]);
//! assert_eq!(chunk.call_sites().len(), 1);
//! ```

use latebind_core::{CompilationError, Span, TypeHash};

use crate::bytecode::{
    Bootstrap, BytecodeChunk, CallSiteDescriptor, Constant, ConstantPool, OpCode, StaticArg,
};

/// Writes instructions into a chunk, interning operands in the script's
/// constant pool.
pub struct BytecodeEmitter<'pool> {
    chunk: BytecodeChunk,
    constants: &'pool mut ConstantPool,
    /// Line attributed to every byte written next.
    line: u32,
    /// Whether `record_position` fills the position table.
    debug_info: bool,
}

impl<'pool> BytecodeEmitter<'pool> {
    pub fn new(constants: &'pool mut ConstantPool) -> Self {
        Self {
            chunk: BytecodeChunk::default(),
            constants,
            line: 1,
            debug_info: true,
        }
    }

    pub fn with_debug_info(mut self, debug_info: bool) -> Self {
        self.debug_info = debug_info;
        self
    }

    /// Attribute subsequent bytes to `line`.
    pub fn set_line(&mut self, line: u32) {
        self.line = line;
    }

    pub fn current_line(&self) -> u32 {
        self.line
    }

    /// Attribute the next instruction to `span`.
    ///
    /// Always moves the current line; the position table only grows when
    /// debug info is on.
    pub fn record_position(&mut self, span: Span) {
        self.line = span.line;
        if self.debug_info {
            self.chunk.add_position(self.chunk.current_offset(), span);
        }
    }

    pub fn emit(&mut self, op: OpCode) {
        self.chunk.write_op(op, self.line);
    }

    /// `op` followed by a one-byte operand.
    pub fn emit_byte(&mut self, op: OpCode, operand: u8) {
        self.emit(op);
        self.chunk.write_byte(operand, self.line);
    }

    /// `op` followed by a two-byte operand.
    pub fn emit_u16(&mut self, op: OpCode, operand: u16) {
        self.emit(op);
        self.chunk.write_u16(operand, self.line);
    }

    /// `narrow` when `index` fits a byte, `wide` when it fits two.
    ///
    /// Nothing is written when it fits neither.
    fn emit_indexed(
        &mut self,
        narrow: OpCode,
        wide: OpCode,
        index: u32,
        overflow: EmitError,
    ) -> Result<(), EmitError> {
        if let Ok(small) = u8::try_from(index) {
            self.emit_byte(narrow, small);
        } else {
            let index = u16::try_from(index).map_err(|_| overflow)?;
            self.emit_u16(wide, index);
        }
        Ok(())
    }

    /// Intern `constant` and push it.
    pub fn emit_constant(&mut self, constant: Constant) -> Result<(), EmitError> {
        let index = self.constants.add(constant);
        self.emit_indexed(
            OpCode::Constant,
            OpCode::ConstantWide,
            index,
            EmitError::TooManyConstants,
        )
    }

    /// Push an integer; `0` and `1` have dedicated opcodes.
    pub fn emit_int(&mut self, value: i64) -> Result<(), EmitError> {
        match value {
            0 => self.emit(OpCode::PushZero),
            1 => self.emit(OpCode::PushOne),
            other => return self.emit_constant(Constant::Int(other)),
        }
        Ok(())
    }

    pub fn emit_f32(&mut self, value: f32) -> Result<(), EmitError> {
        self.emit_constant(Constant::Float32(value))
    }

    pub fn emit_f64(&mut self, value: f64) -> Result<(), EmitError> {
        self.emit_constant(Constant::Float64(value))
    }

    pub fn emit_string(&mut self, value: &str) -> Result<(), EmitError> {
        self.emit_constant(Constant::StringData(value.into()))
    }

    pub fn emit_bool(&mut self, value: bool) {
        let op = match value {
            true => OpCode::PushTrue,
            false => OpCode::PushFalse,
        };
        self.emit(op);
    }

    /// Push local `slot`.
    pub fn emit_get_local(&mut self, slot: u32) -> Result<(), EmitError> {
        self.emit_indexed(
            OpCode::GetLocal,
            OpCode::GetLocalWide,
            slot,
            EmitError::TooManyLocals,
        )
    }

    /// Pop into local `slot`.
    pub fn emit_set_local(&mut self, slot: u32) -> Result<(), EmitError> {
        self.emit_indexed(
            OpCode::SetLocal,
            OpCode::SetLocalWide,
            slot,
            EmitError::TooManyLocals,
        )
    }

    /// Emit an `InvokeDynamic` linked through `bootstrap`.
    ///
    /// Every call adds a fresh call-site table entry. Returns its index.
    pub fn emit_dynamic_call(
        &mut self,
        name: &str,
        signature: &str,
        bootstrap: Bootstrap,
        static_args: Vec<StaticArg>,
    ) -> Result<u16, EmitError> {
        let index = self
            .chunk
            .add_call_site(CallSiteDescriptor {
                name: name.to_string(),
                signature: signature.to_string(),
                bootstrap,
                static_args,
            })
            .ok_or(EmitError::TooManyCallSites)?;
        self.emit_u16(OpCode::InvokeDynamic, index);
        Ok(index)
    }

    /// A conversion opcode without operands (`I32toI64`, `ToDef`, ...).
    pub fn emit_conversion(&mut self, op: OpCode) {
        debug_assert_eq!(op.operand_size(), 0);
        self.emit(op);
    }

    /// Checked conversion out of `def` into the type hashed as `target`.
    pub fn emit_from_def(&mut self, target: TypeHash) -> Result<(), EmitError> {
        let index = self.constants.add(Constant::TypeHash(target));
        let index = u16::try_from(index).map_err(|_| EmitError::TooManyConstants)?;
        self.emit_u16(OpCode::FromDef, index);
        Ok(())
    }

    pub fn emit_pop(&mut self) {
        self.emit(OpCode::Pop);
    }

    pub fn emit_return(&mut self) {
        self.emit(OpCode::Return);
    }

    pub fn emit_return_void(&mut self) {
        self.emit(OpCode::ReturnVoid);
    }

    pub fn finish(self) -> BytecodeChunk {
        self.chunk
    }

    /// Bytes written so far.
    pub fn code_size(&self) -> usize {
        self.chunk.len()
    }
}

/// An operand that does not fit its encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitError {
    TooManyConstants,
    TooManyLocals,
    TooManyCallSites,
}

impl EmitError {
    /// Attach the span of the node being emitted.
    pub fn at(self, span: Span) -> CompilationError {
        CompilationError::Unsupported {
            message: self.to_string(),
            span,
        }
    }
}

impl std::fmt::Display for EmitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmitError::TooManyConstants => {
                write!(f, "more than {} constants in one script", u16::MAX as u32 + 1)
            }
            EmitError::TooManyLocals => {
                write!(f, "more than {} locals in one script", u16::MAX as u32 + 1)
            }
            EmitError::TooManyCallSites => {
                write!(f, "more than {} call sites in one script", u16::MAX as u32 + 1)
            }
        }
    }
}
