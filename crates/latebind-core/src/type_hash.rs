//! Deterministic hash-based identity for types and methods.
//!
//! [`TypeHash`] is computed from names and signatures, so the registry, the
//! emitted constant pool and the runtime linker all agree on the identity of a
//! type or method without sharing any registration order.

use std::fmt;
use xxhash_rust::xxh64::xxh64;

/// Domain-specific mixing constants.
///
/// Keep a type named `abs` and a method named `abs` from colliding.
mod domain {
    pub const SEP: u64 = 0x4bc94d6bd06053ad;
    pub const TYPE: u64 = 0x2fac10b63a6cc57c;
    pub const METHOD: u64 = 0x7d3c8b4a92e15f6d;
    pub const STATIC: u64 = 0x5ea77ffbcdf5f302;
    pub const CONSTRUCTOR: u64 = 0x9a7f3d5e2b8c4601;
}

/// A deterministic 64-bit hash identifying a type or method.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TypeHash(pub u64);

impl TypeHash {
    /// Empty/invalid hash constant.
    pub const EMPTY: TypeHash = TypeHash(0);

    /// Create a type hash from a type name.
    ///
    /// ```
    /// use latebind_core::TypeHash;
    ///
    /// assert_eq!(TypeHash::from_name("Math"), TypeHash::from_name("Math"));
    /// assert_ne!(TypeHash::from_name("Math"), TypeHash::from_name("List"));
    /// ```
    #[inline]
    pub fn from_name(name: &str) -> Self {
        TypeHash(domain::TYPE ^ xxh64(name.as_bytes(), 0))
    }

    /// Create a hash for an instance method of `owner`.
    #[inline]
    pub fn from_method(owner: TypeHash, name: &str, params: &[TypeHash]) -> Self {
        let seed = domain::METHOD ^ owner.0 ^ xxh64(name.as_bytes(), 0);
        TypeHash(mix_params(seed, params))
    }

    /// Create a hash for a static method of `owner`.
    ///
    /// Distinct from [`TypeHash::from_method`] so a static and an instance
    /// method sharing name and parameters never alias.
    #[inline]
    pub fn from_static(owner: TypeHash, name: &str, params: &[TypeHash]) -> Self {
        let seed = domain::STATIC ^ owner.0 ^ xxh64(name.as_bytes(), 0);
        TypeHash(mix_params(seed, params))
    }

    /// Create a constructor hash from owner type and parameter hashes.
    #[inline]
    pub fn from_constructor(owner: TypeHash, params: &[TypeHash]) -> Self {
        TypeHash(mix_params(domain::CONSTRUCTOR ^ owner.0, params))
    }

    /// Check if this is an empty/invalid hash.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Get the underlying u64 value.
    #[inline]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

/// Fold parameter hashes in order; `(a, b)` and `(b, a)` differ.
fn mix_params(seed: u64, params: &[TypeHash]) -> u64 {
    params.iter().enumerate().fold(seed, |hash, (i, param)| {
        let marker = xxh64(&(i as u64).to_le_bytes(), domain::SEP);
        hash.wrapping_mul(domain::SEP).wrapping_add(marker ^ param.0)
    })
}

impl fmt::Debug for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeHash({:#018x})", self.0)
    }
}

impl fmt::Display for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_hash_determinism() {
        assert_eq!(TypeHash::from_name("long"), TypeHash::from_name("long"));
        assert_ne!(TypeHash::from_name("long"), TypeHash::from_name("int"));
    }

    #[test]
    fn parameter_order_matters() {
        let owner = TypeHash::from_name("Math");
        let int = TypeHash::from_name("int");
        let long = TypeHash::from_name("long");

        let a = TypeHash::from_static(owner, "max", &[int, long]);
        let b = TypeHash::from_static(owner, "max", &[long, int]);
        assert_ne!(a, b);
    }

    #[test]
    fn static_and_instance_methods_differ() {
        let owner = TypeHash::from_name("List");
        let int = TypeHash::from_name("int");

        assert_ne!(
            TypeHash::from_static(owner, "get", &[int]),
            TypeHash::from_method(owner, "get", &[int])
        );
        assert_ne!(
            TypeHash::from_constructor(owner, &[int]),
            TypeHash::from_method(owner, "get", &[int])
        );
    }

    #[test]
    fn empty_hash() {
        assert!(TypeHash::EMPTY.is_empty());
        assert!(!TypeHash::from_name("def").is_empty());
    }
}
