//! DataType - the static type of an expression or signature slot.
//!
//! Every type has a compact descriptor used in call-site signatures:
//!
//! ```text
//! void    -> V          def     -> Ldef;
//! bool    -> Z          string  -> Lstring;
//! int     -> I          Math    -> LMath;
//! long    -> J
//! float   -> F
//! double  -> D
//! ```
//!
//! # Example
//!
//! ```
//! use latebind_core::{DataType, PrimitiveKind};
//!
//! assert_eq!(DataType::Primitive(PrimitiveKind::Long).descriptor(), "J");
//! assert_eq!(DataType::Def.descriptor(), "Ldef;");
//! assert_eq!(DataType::object("Comparator").descriptor(), "LComparator;");
//! ```

use std::fmt::{self, Display, Formatter};

use crate::TypeHash;

/// Name of the untyped type.
pub const DEF_TYPE_NAME: &str = "def";
/// Name of the built-in string type.
pub const STRING_TYPE_NAME: &str = "string";

/// Built-in value types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Bool,
    Int,
    Long,
    Float,
    Double,
}

impl PrimitiveKind {
    /// Script-level name.
    pub fn name(self) -> &'static str {
        match self {
            PrimitiveKind::Bool => "bool",
            PrimitiveKind::Int => "int",
            PrimitiveKind::Long => "long",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Double => "double",
        }
    }

    /// Single-character descriptor.
    pub fn descriptor(self) -> char {
        match self {
            PrimitiveKind::Bool => 'Z',
            PrimitiveKind::Int => 'I',
            PrimitiveKind::Long => 'J',
            PrimitiveKind::Float => 'F',
            PrimitiveKind::Double => 'D',
        }
    }

    /// Resolve a primitive from its script name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "bool" => Some(PrimitiveKind::Bool),
            "int" => Some(PrimitiveKind::Int),
            "long" => Some(PrimitiveKind::Long),
            "float" => Some(PrimitiveKind::Float),
            "double" => Some(PrimitiveKind::Double),
            _ => None,
        }
    }

    /// Widening rank for numeric kinds. `None` for bool.
    fn numeric_rank(self) -> Option<u8> {
        match self {
            PrimitiveKind::Bool => None,
            PrimitiveKind::Int => Some(0),
            PrimitiveKind::Long => Some(1),
            PrimitiveKind::Float => Some(2),
            PrimitiveKind::Double => Some(3),
        }
    }

    /// Whether a value of `self` implicitly widens to `target`.
    ///
    /// Widening follows `int -> long -> float -> double`. A kind widens to
    /// itself.
    pub fn widens_to(self, target: PrimitiveKind) -> bool {
        match (self.numeric_rank(), target.numeric_rank()) {
            (Some(from), Some(to)) => from <= to,
            _ => self == target,
        }
    }
}

/// The static type of a value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DataType {
    /// No value.
    Void,
    /// A built-in value type.
    Primitive(PrimitiveKind),
    /// The untyped type; every operation on it is resolved at runtime.
    Def,
    /// The built-in string type.
    String,
    /// A registered class or functional interface, by name.
    Object(String),
}

impl DataType {
    /// Shorthand for a registered object type.
    pub fn object(name: impl Into<String>) -> Self {
        DataType::Object(name.into())
    }

    /// Resolve a built-in type name (`void`, primitives, `def`, `string`).
    ///
    /// Registered object types are resolved by the registry, not here.
    pub fn builtin(name: &str) -> Option<Self> {
        match name {
            "void" => Some(DataType::Void),
            DEF_TYPE_NAME => Some(DataType::Def),
            STRING_TYPE_NAME => Some(DataType::String),
            _ => PrimitiveKind::from_name(name).map(DataType::Primitive),
        }
    }

    /// Script-level name of this type.
    pub fn name(&self) -> &str {
        match self {
            DataType::Void => "void",
            DataType::Primitive(kind) => kind.name(),
            DataType::Def => DEF_TYPE_NAME,
            DataType::String => STRING_TYPE_NAME,
            DataType::Object(name) => name,
        }
    }

    /// Identity hash of this type.
    pub fn type_hash(&self) -> TypeHash {
        TypeHash::from_name(self.name())
    }

    /// Signature descriptor of this type.
    pub fn descriptor(&self) -> String {
        match self {
            DataType::Void => "V".to_string(),
            DataType::Primitive(kind) => kind.descriptor().to_string(),
            other => format!("L{};", other.name()),
        }
    }

    /// Whether this is the untyped type.
    pub fn is_def(&self) -> bool {
        matches!(self, DataType::Def)
    }

    /// Whether this is `void`.
    pub fn is_void(&self) -> bool {
        matches!(self, DataType::Void)
    }

    /// Whether values of this type are references (strings and objects).
    pub fn is_reference(&self) -> bool {
        matches!(self, DataType::String | DataType::Object(_) | DataType::Def)
    }

    /// Erase reference types to `def`, keeping primitives and `void`.
    ///
    /// Functional interfaces are declared over erased signatures so one
    /// interface can front implementations over many concrete object types.
    pub fn erased(&self) -> DataType {
        if self.is_reference() {
            DataType::Def
        } else {
            self.clone()
        }
    }

    /// Whether a value of `self` can be passed where `target` is expected,
    /// either directly, by primitive widening, or through a runtime-checked
    /// `def` conversion.
    pub fn adapts_to(&self, target: &DataType) -> bool {
        match (self, target) {
            (a, b) if a == b => true,
            (DataType::Void, _) | (_, DataType::Void) => false,
            (DataType::Def, _) | (_, DataType::Def) => true,
            (DataType::Primitive(from), DataType::Primitive(to)) => from.widens_to(*to),
            _ => false,
        }
    }
}

impl Display for DataType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
