//! Script-level constant pool.
//!
//! Holds numeric literals, string data (including untyped function reference
//! names) and the type hashes `FromDef` checks against. Equal constants share
//! one slot.

use latebind_core::TypeHash;
use ordered_float::OrderedFloat;
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    /// `int` and `long` literals alike.
    Int(i64),
    Float32(f32),
    Float64(f64),
    StringData(Vec<u8>),
    TypeHash(TypeHash),
}

impl Constant {
    fn key(&self) -> ConstantKey {
        match self {
            Constant::Int(v) => ConstantKey::Int(*v),
            Constant::Float32(v) => ConstantKey::Float32(OrderedFloat(*v)),
            Constant::Float64(v) => ConstantKey::Float64(OrderedFloat(*v)),
            Constant::StringData(bytes) => ConstantKey::StringData(bytes.clone()),
            Constant::TypeHash(hash) => ConstantKey::TypeHash(*hash),
        }
    }
}

/// [`Constant`] with floats made hashable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum ConstantKey {
    Int(i64),
    Float32(OrderedFloat<f32>),
    Float64(OrderedFloat<f64>),
    StringData(Vec<u8>),
    TypeHash(TypeHash),
}

/// Deduplicating constant storage.
#[derive(Debug, Clone, Default)]
pub struct ConstantPool {
    constants: Vec<Constant>,
    slots: FxHashMap<ConstantKey, u32>,
}

impl ConstantPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern `constant`, returning its index.
    pub fn add(&mut self, constant: Constant) -> u32 {
        let next = self.constants.len() as u32;
        let index = *self.slots.entry(constant.key()).or_insert(next);
        if index == next {
            self.constants.push(constant);
        }
        index
    }

    pub fn add_string(&mut self, value: &str) -> u32 {
        self.add(Constant::StringData(value.into()))
    }

    pub fn get(&self, index: u32) -> Option<&Constant> {
        self.constants.get(index as usize)
    }

    /// String constant at `index`, if it holds valid UTF-8 string data.
    pub fn get_str(&self, index: u32) -> Option<&str> {
        match self.get(index)? {
            Constant::StringData(bytes) => std::str::from_utf8(bytes).ok(),
            _ => None,
        }
    }

    pub fn constants(&self) -> &[Constant] {
        &self.constants
    }

    pub fn len(&self) -> usize {
        self.constants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constants.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deduplication() {
        let mut pool = ConstantPool::new();

        let a = pool.add(Constant::Int(100));
        let b = pool.add(Constant::Int(200));
        let c = pool.add(Constant::Int(100));

        assert_eq!((a, b, c), (0, 1, 0));
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn float_kinds_do_not_alias() {
        let mut pool = ConstantPool::new();
        let a = pool.add(Constant::Float32(1.5));
        let b = pool.add(Constant::Float64(1.5));
        let c = pool.add(Constant::Float64(1.5));
        assert_ne!(a, b);
        assert_eq!(b, c);
    }

    #[test]
    fn strings() {
        let mut pool = ConstantPool::new();
        let idx = pool.add_string("Math.abs");
        assert_eq!(pool.add_string("Math.abs"), idx);
        assert_eq!(pool.get_str(idx), Some("Math.abs"));
        assert_eq!(pool.get_str(99), None);
    }

    #[test]
    fn type_hash_is_not_a_string() {
        let mut pool = ConstantPool::new();
        let idx = pool.add(Constant::TypeHash(TypeHash::from_name("List")));
        assert_eq!(pool.get_str(idx), None);
    }
}
