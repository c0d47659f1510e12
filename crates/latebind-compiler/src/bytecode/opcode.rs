//! Instruction set.
//!
//! One byte per opcode; operands follow inline, 16-bit ones big-endian.

use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Stack machine instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum OpCode {
    /// Push a pool constant. Operand: u8 index.
    Constant = 0,
    /// Push a pool constant. Operand: u16 index.
    ConstantWide,
    PushTrue,
    PushFalse,
    PushZero,
    PushOne,

    /// Discard the top of stack.
    Pop,

    /// Operand: u8 slot.
    GetLocal,
    /// Pops into the slot. Operand: u8 slot.
    SetLocal,
    /// Operand: u16 slot.
    GetLocalWide,
    /// Operand: u16 slot.
    SetLocalWide,

    I32toI64,
    I32toF32,
    I32toF64,
    I64toF32,
    I64toF64,
    F32toF64,
    /// Box the top of stack as an untyped value.
    ToDef,
    /// Unbox an untyped value, failing unless it has the expected type.
    /// Operand: u16 index of a `TypeHash` constant.
    FromDef,

    /// Run a late-bound call site. Operand: u16 call-site table index.
    ///
    /// Pops the parameters of the site's signature and pushes its result.
    InvokeDynamic,

    Return,
    ReturnVoid,
}

impl OpCode {
    pub fn from_u8(value: u8) -> Option<Self> {
        Self::try_from(value).ok()
    }

    /// Operand bytes after the opcode byte.
    pub fn operand_size(&self) -> usize {
        use OpCode::*;
        match self {
            Constant | GetLocal | SetLocal => 1,
            ConstantWide | GetLocalWide | SetLocalWide | FromDef | InvokeDynamic => 2,
            PushTrue | PushFalse | PushZero | PushOne | Pop | I32toI64 | I32toF32 | I32toF64
            | I64toF32 | I64toF64 | F32toF64 | ToDef | Return | ReturnVoid => 0,
        }
    }

    /// Disassembly mnemonic.
    pub fn name(&self) -> &'static str {
        use OpCode::*;
        match self {
            Constant => "CONSTANT",
            ConstantWide => "CONSTANT_WIDE",
            PushTrue => "PUSH_TRUE",
            PushFalse => "PUSH_FALSE",
            PushZero => "PUSH_ZERO",
            PushOne => "PUSH_ONE",
            Pop => "POP",
            GetLocal => "GET_LOCAL",
            SetLocal => "SET_LOCAL",
            GetLocalWide => "GET_LOCAL_WIDE",
            SetLocalWide => "SET_LOCAL_WIDE",
            I32toI64 => "I32_TO_I64",
            I32toF32 => "I32_TO_F32",
            I32toF64 => "I32_TO_F64",
            I64toF32 => "I64_TO_F32",
            I64toF64 => "I64_TO_F64",
            F32toF64 => "F32_TO_F64",
            ToDef => "TO_DEF",
            FromDef => "FROM_DEF",
            InvokeDynamic => "INVOKE_DYNAMIC",
            Return => "RETURN",
            ReturnVoid => "RETURN_VOID",
        }
    }
}
