//! Deferred-argument recipe for dynamic call sites.
//!
//! A dynamic call site tells its resolver which arguments are function
//! references that were compiled to their `"Type.member"` string form and
//! still need converting into functional-interface instances once the target
//! method (and therefore the parameter type) is known.

use std::fmt;

/// Bitset over argument positions: bit `i` set means argument `i` is deferred.
///
/// Fixed at 64 bits; positions `0..MAX_ARGS` are usable.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct ArgRecipe(u64);

impl ArgRecipe {
    /// Largest argument count a dynamic call may carry.
    pub const MAX_ARGS: usize = 63;

    /// A recipe with no deferred arguments.
    pub const fn empty() -> Self {
        ArgRecipe(0)
    }

    /// Rebuild a recipe from its raw bits (e.g. decoded from a call site).
    pub const fn from_bits(bits: u64) -> Self {
        ArgRecipe(bits)
    }

    /// Raw bits.
    pub const fn bits(self) -> u64 {
        self.0
    }

    /// Mark argument `index` as deferred.
    ///
    /// # Panics
    ///
    /// Panics if `index >= MAX_ARGS`; callers check arity first.
    pub fn mark(&mut self, index: usize) {
        assert!(
            index < Self::MAX_ARGS,
            "argument index {} exceeds recipe capacity",
            index
        );
        self.0 |= 1u64 << index;
    }

    /// Whether argument `index` is deferred.
    pub fn is_deferred(self, index: usize) -> bool {
        index < Self::MAX_ARGS && self.0 & (1u64 << index) != 0
    }

    /// Number of deferred arguments.
    pub fn count(self) -> u32 {
        self.0.count_ones()
    }

    /// Whether no argument is deferred.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Deferred argument positions in ascending order.
    pub fn positions(self) -> impl Iterator<Item = usize> {
        (0..Self::MAX_ARGS).filter(move |&i| self.is_deferred(i))
    }
}

impl fmt::Debug for ArgRecipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ArgRecipe({:#b})", self.0)
    }
}

impl fmt::Display for ArgRecipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#b}", self.0)
    }
}
