//! Function reference descriptors.
//!
//! A [`FunctionRef`] describes how `Type::member` implements a functional
//! interface: which interface method the materialized object answers to,
//! which concrete method it forwards to, and the two signatures a call-site
//! factory needs to build the forwarding object.
//!
//! ## Signatures
//!
//! - `interface_method_type`: the interface method with every reference type
//!   erased to `def`. This is the shape callers of the object see.
//! - `sam_method_type`: the implementation's natural signature (receiver
//!   first for instance methods, owner as the return for constructors), with
//!   the return dropped to `void` when the interface returns `void`.
//!
//! When the two differ the materialized object needs a bridge adapter that
//! converts arguments and the result between them.
//!
//! ## Lookup
//!
//! For an interface method with `n` parameters, `Type::new` names the
//! constructor of arity `n`; any other member is looked up as a static method
//! of arity `n`, then as an instance method of arity `n - 1` whose receiver is
//! the first interface argument.

use latebind_core::{DataType, DescriptorError, HandleKind, MethodHandle, MethodType};

use crate::entries::{MethodEntry, TypeEntry};
use crate::registry::TypeRegistry;

/// Member name that refers to a constructor.
pub const CONSTRUCTOR_NAME: &str = "new";

/// A fully derived function reference.
///
/// Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionRef {
    /// Name of the interface method (the call-site name of the factory).
    pub invoked_name: String,
    /// Factory signature: captured values in, interface instance out.
    pub invoked_type: MethodType,
    /// Erased interface method signature.
    pub interface_method_type: MethodType,
    /// Implementation signature adapted to the interface shape.
    pub sam_method_type: MethodType,
    /// The implementation the factory links to.
    pub impl_method: MethodHandle,
}

impl FunctionRef {
    /// Derive the descriptor for `owner::member` converted to `expected`.
    pub fn new(
        registry: &TypeRegistry,
        expected: &DataType,
        owner: &str,
        member: &str,
    ) -> Result<Self, DescriptorError> {
        let reference = format!("{}::{}", owner, member);

        let interface = registry.functional_method(expected).ok_or_else(|| {
            DescriptorError::NotFunctional {
                reference: reference.clone(),
                expected: expected.to_string(),
            }
        })?;

        let owner_entry = registry
            .get(owner)
            .ok_or_else(|| DescriptorError::UnknownType {
                name: owner.to_string(),
            })?;
        let receiver = registry
            .resolve(owner)
            .unwrap_or_else(|| DataType::object(owner));

        let arity = interface.params.len();
        let (kind, method) = lookup(owner_entry, member, arity).ok_or_else(|| {
            DescriptorError::UnknownReference {
                reference: reference.clone(),
                expected: expected.to_string(),
            }
        })?;

        let declared = method.method_type();
        let natural = match kind {
            HandleKind::Static => declared.clone(),
            HandleKind::Virtual => declared.with_leading(receiver),
            HandleKind::Constructor => declared.with_return(receiver),
        };

        let interface_type = interface.method_type();
        check_compatible(&interface_type, &natural).map_err(|detail| {
            DescriptorError::IncompatibleSignature {
                reference: reference.clone(),
                expected: expected.to_string(),
                detail,
            }
        })?;

        let sam_method_type = if interface_type.ret.is_void() {
            natural.with_return(DataType::Void)
        } else {
            natural
        };

        Ok(Self {
            invoked_name: interface.name.clone(),
            invoked_type: MethodType::returning(expected.clone()),
            interface_method_type: interface_type.erased(),
            sam_method_type,
            impl_method: MethodHandle {
                kind,
                owner: owner.to_string(),
                name: method.name.clone(),
                method_type: declared,
            },
        })
    }

    /// Whether the materialized object needs an adapter between the
    /// interface signature and the implementation signature.
    pub fn requires_bridge(&self) -> bool {
        self.interface_method_type != self.sam_method_type
    }
}

fn lookup<'r>(
    owner: &'r TypeEntry,
    member: &str,
    arity: usize,
) -> Option<(HandleKind, &'r MethodEntry)> {
    if member == CONSTRUCTOR_NAME {
        return owner
            .constructor(arity)
            .map(|ctor| (HandleKind::Constructor, ctor));
    }
    if let Some(method) = owner.static_method(member, arity) {
        return Some((HandleKind::Static, method));
    }
    arity
        .checked_sub(1)
        .and_then(|n| owner.method(member, n))
        .map(|method| (HandleKind::Virtual, method))
}

/// Interface arguments must adapt to implementation parameters, and the
/// implementation result must adapt to the interface result unless the
/// interface discards it.
fn check_compatible(interface: &MethodType, natural: &MethodType) -> Result<(), String> {
    if interface.arity() != natural.arity() {
        return Err(format!(
            "expected {} parameter(s), implementation takes {}",
            interface.arity(),
            natural.arity()
        ));
    }
    for (i, (from, to)) in interface.params.iter().zip(&natural.params).enumerate() {
        if !from.adapts_to(to) {
            return Err(format!(
                "parameter {} of type '{}' cannot be passed as '{}'",
                i, from, to
            ));
        }
    }
    if !interface.ret.is_void() && !natural.ret.adapts_to(&interface.ret) {
        return Err(format!(
            "return type '{}' cannot be returned as '{}'",
            natural.ret, interface.ret
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use latebind_core::PrimitiveKind;

    fn registry() -> TypeRegistry {
        TypeRegistry::with_standard_types()
    }

    #[test]
    fn static_reference_without_bridge() {
        let registry = registry();
        let fref = FunctionRef::new(
            &registry,
            &DataType::object("LongUnaryOperator"),
            "Math",
            "abs",
        )
        .unwrap();

        assert_eq!(fref.invoked_name, "applyAsLong");
        assert_eq!(fref.invoked_type.descriptor(), "()LLongUnaryOperator;");
        assert_eq!(fref.interface_method_type.descriptor(), "(J)J");
        assert_eq!(fref.sam_method_type.descriptor(), "(J)J");
        assert_eq!(fref.impl_method.kind, HandleKind::Static);
        assert!(!fref.requires_bridge());
    }

    #[test]
    fn virtual_reference_takes_receiver_first() {
        let registry = registry();
        let fref =
            FunctionRef::new(&registry, &DataType::object("ToIntFunction"), "string", "length")
                .unwrap();

        assert_eq!(fref.impl_method.kind, HandleKind::Virtual);
        assert_eq!(fref.impl_method.method_type.descriptor(), "()I");
        assert_eq!(fref.sam_method_type.descriptor(), "(Lstring;)I");
        assert_eq!(fref.interface_method_type.descriptor(), "(Ldef;)I");
        assert!(fref.requires_bridge());
    }

    #[test]
    fn constructor_reference() {
        let registry = registry();
        let fref =
            FunctionRef::new(&registry, &DataType::object("Supplier"), "List", "new").unwrap();

        assert_eq!(fref.impl_method.kind, HandleKind::Constructor);
        assert_eq!(fref.sam_method_type.descriptor(), "()LList;");
        assert_eq!(fref.interface_method_type.descriptor(), "()Ldef;");
        assert!(fref.requires_bridge());
    }

    #[test]
    fn void_interface_drops_result() {
        let registry = registry();
        let fref =
            FunctionRef::new(&registry, &DataType::object("Consumer"), "List", "size").unwrap();
        assert_eq!(fref.sam_method_type.ret, DataType::Void);
        assert_eq!(fref.sam_method_type.descriptor(), "(LList;)V");
    }

    #[test]
    fn static_preferred_over_virtual() {
        let mut registry = TypeRegistry::new();
        let long = DataType::Primitive(PrimitiveKind::Long);
        registry.register_class("Box").unwrap();
        registry.add_static("Box", "of", vec![long.clone()], long.clone()).unwrap();
        registry.add_method("Box", "of", vec![], long.clone()).unwrap();
        registry
            .register_functional_interface("Op", "run", vec![long.clone()], long)
            .unwrap();

        let fref = FunctionRef::new(&registry, &DataType::object("Op"), "Box", "of").unwrap();
        assert_eq!(fref.impl_method.kind, HandleKind::Static);
    }

    #[test]
    fn not_a_functional_interface() {
        let registry = registry();
        let err = FunctionRef::new(&registry, &DataType::object("Math"), "Math", "abs").unwrap_err();
        assert_eq!(
            err,
            DescriptorError::NotFunctional {
                reference: "Math::abs".into(),
                expected: "Math".into(),
            }
        );

        let err = FunctionRef::new(&registry, &DataType::Def, "Math", "abs").unwrap_err();
        assert!(matches!(err, DescriptorError::NotFunctional { .. }));
    }

    #[test]
    fn unknown_owner() {
        let registry = registry();
        let err = FunctionRef::new(&registry, &DataType::object("Function"), "Bogus", "nope")
            .unwrap_err();
        assert_eq!(err, DescriptorError::UnknownType { name: "Bogus".into() });
    }

    #[test]
    fn unknown_member_or_arity() {
        let registry = registry();
        let err = FunctionRef::new(&registry, &DataType::object("LongBinaryOperator"), "Math", "abs")
            .unwrap_err();
        assert!(matches!(err, DescriptorError::UnknownReference { .. }));

        let err = FunctionRef::new(&registry, &DataType::object("Supplier"), "string", "length")
            .unwrap_err();
        assert!(matches!(err, DescriptorError::UnknownReference { .. }));
    }

    #[test]
    fn incompatible_signature() {
        let registry = registry();
        // long widens to double on the way in, but double cannot narrow back to long.
        let err = FunctionRef::new(&registry, &DataType::object("LongUnaryOperator"), "Math", "sqrt")
            .unwrap_err();
        assert!(matches!(err, DescriptorError::IncompatibleSignature { .. }));
    }

    #[test]
    fn descriptor_is_deterministic() {
        let registry = registry();
        let expected = DataType::object("Comparator");
        let a = FunctionRef::new(&registry, &expected, "string", "compareTo").unwrap();
        let b = FunctionRef::new(&registry, &expected, "string", "compareTo").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.sam_method_type.descriptor(), "(Lstring;Lstring;)I");
    }
}
