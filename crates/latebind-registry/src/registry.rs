//! TypeRegistry - the whitelist of types visible to scripts.
//!
//! Types are stored by name. Classes expose static methods, instance methods
//! and constructors; functional interfaces expose exactly one abstract method
//! and are the only valid targets of a typed function reference.
//!
//! # Thread Safety
//!
//! The registry is populated single-threaded before compilation and is only
//! read afterwards. Compilation borrows it immutably.
//!
//! # Example
//!
//! ```
//! use latebind_core::{DataType, PrimitiveKind};
//! use latebind_registry::TypeRegistry;
//!
//! let long = DataType::Primitive(PrimitiveKind::Long);
//! let mut registry = TypeRegistry::new();
//! registry.register_class("Math").unwrap();
//! registry.add_static("Math", "abs", vec![long.clone()], long.clone()).unwrap();
//! registry
//!     .register_functional_interface("LongUnaryOperator", "applyAsLong", vec![long.clone()], long)
//!     .unwrap();
//!
//! assert!(registry.get("Math").is_some());
//! ```

use rustc_hash::FxHashMap;

use latebind_core::{DataType, DescriptorError, PrimitiveKind, RegistrationError, TypeHash};

use crate::entries::{InterfaceMethod, MethodEntry, MethodKey, TypeEntry, TypeKind};
use crate::function_ref::FunctionRef;

/// Registry of whitelisted types.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: FxHashMap<String, TypeEntry>,
}

impl TypeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the standard script types.
    ///
    /// Classes: `Math`, `string`, `List`. Functional interfaces:
    /// `LongUnaryOperator`, `LongBinaryOperator`, `Function`, `Predicate`,
    /// `ToIntFunction`, `Comparator`, `Supplier`, `Consumer`.
    pub fn with_standard_types() -> Self {
        let mut registry = Self::new();
        // Registration into an empty registry cannot collide.
        let _ = registry.register_standard_types();
        registry
    }

    fn register_standard_types(&mut self) -> Result<(), RegistrationError> {
        let long = DataType::Primitive(PrimitiveKind::Long);
        let int = DataType::Primitive(PrimitiveKind::Int);
        let boolean = DataType::Primitive(PrimitiveKind::Bool);
        let double = DataType::Primitive(PrimitiveKind::Double);

        self.register_class("Math")?;
        self.add_static("Math", "abs", vec![long.clone()], long.clone())?;
        self.add_static("Math", "max", vec![long.clone(), long.clone()], long.clone())?;
        self.add_static("Math", "sqrt", vec![double.clone()], double)?;

        self.register_class("string")?;
        self.add_method("string", "length", vec![], int.clone())?;
        self.add_method("string", "isEmpty", vec![], boolean.clone())?;
        self.add_method("string", "compareTo", vec![DataType::String], int.clone())?;

        self.register_class("List")?;
        self.add_constructor("List", vec![])?;
        self.add_method("List", "add", vec![DataType::Def], boolean.clone())?;
        self.add_method("List", "size", vec![], int.clone())?;

        self.register_functional_interface(
            "LongUnaryOperator",
            "applyAsLong",
            vec![long.clone()],
            long.clone(),
        )?;
        self.register_functional_interface(
            "LongBinaryOperator",
            "applyAsLong",
            vec![long.clone(), long.clone()],
            long,
        )?;
        self.register_functional_interface("Function", "apply", vec![DataType::Def], DataType::Def)?;
        self.register_functional_interface("Predicate", "test", vec![DataType::Def], boolean)?;
        self.register_functional_interface(
            "ToIntFunction",
            "applyAsInt",
            vec![DataType::Def],
            int.clone(),
        )?;
        self.register_functional_interface(
            "Comparator",
            "compare",
            vec![DataType::Def, DataType::Def],
            int,
        )?;
        self.register_functional_interface("Supplier", "get", vec![], DataType::Def)?;
        self.register_functional_interface("Consumer", "accept", vec![DataType::Def], DataType::Void)?;
        Ok(())
    }

    // ==========================================================================
    // Registration
    // ==========================================================================

    /// Register a class.
    pub fn register_class(&mut self, name: &str) -> Result<TypeHash, RegistrationError> {
        self.insert(TypeEntry::new(name, TypeKind::Class))
    }

    /// Register a functional interface with its single abstract method.
    pub fn register_functional_interface(
        &mut self,
        name: &str,
        method_name: &str,
        params: Vec<DataType>,
        return_type: DataType,
    ) -> Result<TypeHash, RegistrationError> {
        let method = InterfaceMethod {
            name: method_name.to_string(),
            params,
            return_type,
        };
        self.insert(TypeEntry::new(name, TypeKind::FunctionalInterface(method)))
    }

    /// Add a static method to a registered class.
    pub fn add_static(
        &mut self,
        owner: &str,
        name: &str,
        params: Vec<DataType>,
        return_type: DataType,
    ) -> Result<TypeHash, RegistrationError> {
        let entry = self.class_mut(owner)?;
        let hash = TypeHash::from_static(entry.hash, name, &param_hashes(&params));
        let key = MethodKey::new(name, params.len());
        insert_member(&mut entry.static_methods, key, owner, name, params, return_type, hash)
    }

    /// Add an instance method to a registered class.
    pub fn add_method(
        &mut self,
        owner: &str,
        name: &str,
        params: Vec<DataType>,
        return_type: DataType,
    ) -> Result<TypeHash, RegistrationError> {
        let entry = self.class_mut(owner)?;
        let hash = TypeHash::from_method(entry.hash, name, &param_hashes(&params));
        let key = MethodKey::new(name, params.len());
        insert_member(&mut entry.methods, key, owner, name, params, return_type, hash)
    }

    /// Add a constructor to a registered class.
    pub fn add_constructor(
        &mut self,
        owner: &str,
        params: Vec<DataType>,
    ) -> Result<TypeHash, RegistrationError> {
        let return_type = self.resolve(owner).unwrap_or_else(|| DataType::object(owner));
        let entry = self.class_mut(owner)?;
        let arity = params.len();
        if entry.constructors.contains_key(&arity) {
            return Err(RegistrationError::DuplicateMember {
                owner: owner.to_string(),
                name: "new".to_string(),
                arity,
            });
        }
        let hash = TypeHash::from_constructor(entry.hash, &param_hashes(&params));
        entry.constructors.insert(
            arity,
            MethodEntry {
                owner: owner.to_string(),
                name: "new".to_string(),
                params,
                return_type,
                hash,
            },
        );
        Ok(hash)
    }

    fn insert(&mut self, entry: TypeEntry) -> Result<TypeHash, RegistrationError> {
        if self.types.contains_key(&entry.name) {
            return Err(RegistrationError::DuplicateType { name: entry.name });
        }
        let hash = entry.hash;
        self.types.insert(entry.name.clone(), entry);
        Ok(hash)
    }

    fn class_mut(&mut self, owner: &str) -> Result<&mut TypeEntry, RegistrationError> {
        let entry = self
            .types
            .get_mut(owner)
            .ok_or_else(|| RegistrationError::UnknownType {
                name: owner.to_string(),
            })?;
        match entry.kind {
            TypeKind::Class => Ok(entry),
            TypeKind::FunctionalInterface(_) => Err(RegistrationError::NotAClass {
                name: owner.to_string(),
            }),
        }
    }

    // ==========================================================================
    // Lookup
    // ==========================================================================

    /// Get a registered type by name.
    pub fn get(&self, name: &str) -> Option<&TypeEntry> {
        self.types.get(name)
    }

    /// Check whether a type is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether the registry has no types.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Resolve a type name to a static type.
    ///
    /// Built-in names (`void`, primitives, `def`, `string`) take precedence
    /// over registered entries, so registering a `string` class only adds
    /// members to the built-in string type.
    pub fn resolve(&self, name: &str) -> Option<DataType> {
        DataType::builtin(name).or_else(|| {
            self.types
                .contains_key(name)
                .then(|| DataType::object(name))
        })
    }

    /// The single abstract method of `ty`, if it is a functional interface.
    pub fn functional_method(&self, ty: &DataType) -> Option<&InterfaceMethod> {
        match ty {
            DataType::Object(name) => self.get(name).and_then(TypeEntry::functional_method),
            _ => None,
        }
    }

    /// Describe `owner::member` as an implementation of the functional
    /// interface `expected`.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn describe_functional_interface(
        &self,
        expected: &DataType,
        owner: &str,
        member: &str,
    ) -> Result<FunctionRef, DescriptorError> {
        FunctionRef::new(self, expected, owner, member)
    }
}

fn param_hashes(params: &[DataType]) -> Vec<TypeHash> {
    params.iter().map(DataType::type_hash).collect()
}

fn insert_member(
    table: &mut FxHashMap<MethodKey, MethodEntry>,
    key: MethodKey,
    owner: &str,
    name: &str,
    params: Vec<DataType>,
    return_type: DataType,
    hash: TypeHash,
) -> Result<TypeHash, RegistrationError> {
    if table.contains_key(&key) {
        return Err(RegistrationError::DuplicateMember {
            owner: owner.to_string(),
            name: name.to_string(),
            arity: key.arity,
        });
    }
    table.insert(
        key,
        MethodEntry {
            owner: owner.to_string(),
            name: name.to_string(),
            params,
            return_type,
            hash,
        },
    );
    Ok(hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn long() -> DataType {
        DataType::Primitive(PrimitiveKind::Long)
    }

    #[test]
    fn register_and_lookup_class() {
        let mut registry = TypeRegistry::new();
        let hash = registry.register_class("Math").unwrap();
        registry.add_static("Math", "abs", vec![long()], long()).unwrap();

        let entry = registry.get("Math").unwrap();
        assert_eq!(entry.hash, hash);
        assert!(entry.static_method("abs", 1).is_some());
        assert!(entry.static_method("abs", 2).is_none());
        assert!(entry.method("abs", 1).is_none());
    }

    #[test]
    fn duplicate_type_rejected() {
        let mut registry = TypeRegistry::new();
        registry.register_class("Math").unwrap();
        assert_eq!(
            registry.register_class("Math"),
            Err(RegistrationError::DuplicateType { name: "Math".into() })
        );
    }

    #[test]
    fn duplicate_member_rejected() {
        let mut registry = TypeRegistry::new();
        registry.register_class("Math").unwrap();
        registry.add_static("Math", "abs", vec![long()], long()).unwrap();
        let err = registry.add_static("Math", "abs", vec![DataType::Def], long());
        assert!(matches!(err, Err(RegistrationError::DuplicateMember { arity: 1, .. })));
    }

    #[test]
    fn members_require_a_class() {
        let mut registry = TypeRegistry::new();
        assert!(matches!(
            registry.add_method("Nope", "x", vec![], long()),
            Err(RegistrationError::UnknownType { .. })
        ));

        registry
            .register_functional_interface("Supplier", "get", vec![], DataType::Def)
            .unwrap();
        assert!(matches!(
            registry.add_method("Supplier", "x", vec![], long()),
            Err(RegistrationError::NotAClass { .. })
        ));
    }

    #[test]
    fn resolve_prefers_builtins() {
        let registry = TypeRegistry::with_standard_types();
        assert_eq!(registry.resolve("string"), Some(DataType::String));
        assert_eq!(registry.resolve("def"), Some(DataType::Def));
        assert_eq!(registry.resolve("List"), Some(DataType::object("List")));
        assert_eq!(registry.resolve("Bogus"), None);
    }

    #[test]
    fn constructor_returns_owner() {
        let registry = TypeRegistry::with_standard_types();
        let ctor = registry.get("List").unwrap().constructor(0).unwrap();
        assert_eq!(ctor.return_type, DataType::object("List"));
        assert_eq!(ctor.name, "new");
    }

    #[test]
    fn functional_method_lookup() {
        let registry = TypeRegistry::with_standard_types();
        let method = registry
            .functional_method(&DataType::object("Comparator"))
            .unwrap();
        assert_eq!(method.name, "compare");
        assert_eq!(method.params.len(), 2);
        assert!(registry.functional_method(&DataType::object("Math")).is_none());
        assert!(registry.functional_method(&DataType::Def).is_none());
    }
}
