//! Registry entries for types and their members.

use rustc_hash::FxHashMap;

use latebind_core::{DataType, MethodType, TypeHash};

/// Lookup key for methods: name plus arity.
///
/// Overloads are distinguished by parameter count only; the whitelist never
/// registers two members of the same name and arity on one type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodKey {
    pub name: String,
    pub arity: usize,
}

impl MethodKey {
    pub fn new(name: impl Into<String>, arity: usize) -> Self {
        Self {
            name: name.into(),
            arity,
        }
    }
}

/// A registered method, static method or constructor.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodEntry {
    /// Owning type name.
    pub owner: String,
    /// Method name (`new` for constructors).
    pub name: String,
    /// Declared parameter types (receiver excluded).
    pub params: Vec<DataType>,
    /// Declared return type.
    pub return_type: DataType,
    /// Identity hash.
    pub hash: TypeHash,
}

impl MethodEntry {
    /// Declared signature.
    pub fn method_type(&self) -> MethodType {
        MethodType::new(self.params.clone(), self.return_type.clone())
    }
}

/// The single abstract method of a functional interface.
#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceMethod {
    pub name: String,
    pub params: Vec<DataType>,
    pub return_type: DataType,
}

impl InterfaceMethod {
    /// Declared signature.
    pub fn method_type(&self) -> MethodType {
        MethodType::new(self.params.clone(), self.return_type.clone())
    }
}

/// What kind of type an entry describes.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind {
    /// A class with static methods, instance methods and constructors.
    Class,
    /// An interface with exactly one abstract method.
    FunctionalInterface(InterfaceMethod),
}

/// A registered type.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeEntry {
    pub name: String,
    pub hash: TypeHash,
    pub kind: TypeKind,
    pub(crate) static_methods: FxHashMap<MethodKey, MethodEntry>,
    pub(crate) methods: FxHashMap<MethodKey, MethodEntry>,
    pub(crate) constructors: FxHashMap<usize, MethodEntry>,
}

impl TypeEntry {
    pub(crate) fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        let name = name.into();
        Self {
            hash: TypeHash::from_name(&name),
            name,
            kind,
            static_methods: FxHashMap::default(),
            methods: FxHashMap::default(),
            constructors: FxHashMap::default(),
        }
    }

    /// The single abstract method, if this is a functional interface.
    pub fn functional_method(&self) -> Option<&InterfaceMethod> {
        match &self.kind {
            TypeKind::FunctionalInterface(method) => Some(method),
            TypeKind::Class => None,
        }
    }

    /// Look up a static method by name and arity.
    pub fn static_method(&self, name: &str, arity: usize) -> Option<&MethodEntry> {
        self.static_methods.get(&MethodKey::new(name, arity))
    }

    /// Look up an instance method by name and arity (receiver excluded).
    pub fn method(&self, name: &str, arity: usize) -> Option<&MethodEntry> {
        self.methods.get(&MethodKey::new(name, arity))
    }

    /// Look up a constructor by arity.
    pub fn constructor(&self, arity: usize) -> Option<&MethodEntry> {
        self.constructors.get(&arity)
    }

    /// Iterate over instance methods.
    pub fn methods(&self) -> impl Iterator<Item = &MethodEntry> {
        self.methods.values()
    }

    /// Iterate over static methods.
    pub fn static_methods(&self) -> impl Iterator<Item = &MethodEntry> {
        self.static_methods.values()
    }
}
