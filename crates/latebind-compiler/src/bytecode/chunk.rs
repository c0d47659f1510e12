//! Bytecode chunk for a compiled script.
//!
//! A `BytecodeChunk` holds the instruction stream, per-byte line numbers, the
//! call-site table indexed by `InvokeDynamic`, and the debug position table.

use latebind_core::Span;

use super::{CallSiteDescriptor, OpCode};

/// A chunk of compiled bytecode.
///
/// Constants live in the script's `ConstantPool`. Call sites live here and are
/// never shared: two textually identical calls get two table entries, so each
/// keeps its own runtime cache.
#[derive(Debug, Clone, Default)]
pub struct BytecodeChunk {
    code: Vec<u8>,
    /// Source line of each byte in `code`.
    lines: Vec<u32>,
    /// Late-bound call sites, in emission order.
    call_sites: Vec<CallSiteDescriptor>,
    /// `(offset, span)` pairs recorded before position-sensitive instructions.
    positions: Vec<(usize, Span)>,
}

impl BytecodeChunk {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, byte: u8, line: u32) {
        self.code.push(byte);
        self.lines.push(line);
    }

    pub fn write_op(&mut self, op: OpCode, line: u32) {
        self.push(op.into(), line);
    }

    pub fn write_byte(&mut self, byte: u8, line: u32) {
        self.push(byte, line);
    }

    /// Big-endian.
    pub fn write_u16(&mut self, value: u16, line: u32) {
        for byte in value.to_be_bytes() {
            self.push(byte, line);
        }
    }

    /// Append a call site and return its table index.
    ///
    /// `None` once every `u16` index is taken; the table is left unchanged.
    pub fn add_call_site(&mut self, site: CallSiteDescriptor) -> Option<u16> {
        let index = u16::try_from(self.call_sites.len()).ok()?;
        self.call_sites.push(site);
        Some(index)
    }

    /// Record a source position for the instruction at `offset`.
    pub fn add_position(&mut self, offset: usize, span: Span) {
        self.positions.push((offset, span));
    }

    /// Offset the next byte will be written at.
    pub fn current_offset(&self) -> usize {
        self.code.len()
    }

    pub fn code(&self) -> &[u8] {
        &self.code
    }

    pub fn lines(&self) -> &[u32] {
        &self.lines
    }

    pub fn line_at(&self, offset: usize) -> Option<u32> {
        self.lines.get(offset).copied()
    }

    pub fn call_site(&self, index: u16) -> Option<&CallSiteDescriptor> {
        self.call_sites.get(usize::from(index))
    }

    /// All call sites in emission order.
    pub fn call_sites(&self) -> &[CallSiteDescriptor] {
        &self.call_sites
    }

    pub fn positions(&self) -> &[(usize, Span)] {
        &self.positions
    }

    /// The most recent position recorded at or before `offset`.
    pub fn position_at(&self, offset: usize) -> Option<Span> {
        self.positions
            .iter()
            .rev()
            .find(|(at, _)| *at <= offset)
            .map(|(_, span)| *span)
    }

    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    pub fn read_byte(&self, offset: usize) -> Option<u8> {
        self.code.get(offset).copied()
    }

    /// Big-endian; `None` when fewer than two bytes remain.
    pub fn read_u16(&self, offset: usize) -> Option<u16> {
        match self.code.get(offset..offset.checked_add(2)?)? {
            &[hi, lo] => Some(u16::from_be_bytes([hi, lo])),
            _ => None,
        }
    }

    pub fn read_op(&self, offset: usize) -> Option<OpCode> {
        self.read_byte(offset).and_then(OpCode::from_u8)
    }

    /// `(offset, opcode)` for each instruction. Undecodable bytes are skipped.
    fn instructions(&self) -> impl Iterator<Item = (usize, OpCode)> + '_ {
        let mut offset = 0;
        std::iter::from_fn(move || {
            while offset < self.code.len() {
                let at = offset;
                match self.read_op(at) {
                    Some(op) => {
                        offset += 1 + op.operand_size();
                        return Some((at, op));
                    }
                    None => offset += 1,
                }
            }
            None
        })
    }

    /// Opcodes in code order, without operands.
    pub fn opcodes(&self) -> Vec<OpCode> {
        self.instructions().map(|(_, op)| op).collect()
    }

    /// Call-site indices of every `InvokeDynamic`, in code order.
    pub fn invoked_sites(&self) -> Vec<u16> {
        self.instructions()
            .filter(|(_, op)| *op == OpCode::InvokeDynamic)
            .filter_map(|(at, _)| self.read_u16(at + 1))
            .collect()
    }

    /// Assert the opcode sequence, ignoring operands.
    #[track_caller]
    pub fn assert_opcodes(&self, expected: &[OpCode]) {
        let actual = self.opcodes();
        let names = |ops: &[OpCode]| ops.iter().map(OpCode::name).collect::<Vec<_>>();
        assert_eq!(
            actual,
            expected,
            "Bytecode mismatch.\nExpected: {:?}\nActual:   {:?}",
            names(expected),
            names(&actual),
        );
    }
}
