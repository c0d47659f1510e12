//! Method signatures and method handles.
//!
//! A [`MethodType`] is the shape `(params) -> ret` that call sites carry as
//! descriptor strings; a [`MethodHandle`] names a concrete implementation that
//! a late-bound call site may link to.

use std::fmt;

use crate::{DataType, TypeHash};

/// A method signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodType {
    pub params: Vec<DataType>,
    pub ret: DataType,
}

impl MethodType {
    pub fn new(params: Vec<DataType>, ret: DataType) -> Self {
        Self { params, ret }
    }

    /// A signature with no parameters.
    pub fn returning(ret: DataType) -> Self {
        Self {
            params: Vec::new(),
            ret,
        }
    }

    /// Descriptor string, e.g. `(JLdef;)Z`.
    pub fn descriptor(&self) -> String {
        let mut out = String::from("(");
        for param in &self.params {
            out.push_str(&param.descriptor());
        }
        out.push(')');
        out.push_str(&self.ret.descriptor());
        out
    }

    /// Number of parameters.
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Same parameters, different return type.
    pub fn with_return(&self, ret: DataType) -> Self {
        Self {
            params: self.params.clone(),
            ret,
        }
    }

    /// Prepend a leading parameter (e.g. the receiver of a virtual method).
    pub fn with_leading(&self, first: DataType) -> Self {
        let mut params = Vec::with_capacity(self.params.len() + 1);
        params.push(first);
        params.extend(self.params.iter().cloned());
        Self {
            params,
            ret: self.ret.clone(),
        }
    }

    /// Every reference type replaced by `def`.
    pub fn erased(&self) -> Self {
        Self {
            params: self.params.iter().map(DataType::erased).collect(),
            ret: self.ret.erased(),
        }
    }
}

impl fmt::Display for MethodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", param)?;
        }
        write!(f, ") -> {}", self.ret)
    }
}

/// How a method handle is invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleKind {
    /// A static method; all arguments are explicit.
    Static,
    /// An instance method; the first argument is the receiver.
    Virtual,
    /// A constructor; returns a new instance of the owner.
    Constructor,
}

/// A reference to a concrete method implementation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodHandle {
    pub kind: HandleKind,
    pub owner: String,
    pub name: String,
    /// The implementation's declared signature (receiver excluded).
    pub method_type: MethodType,
}

impl MethodHandle {
    /// Identity hash of the implementation.
    pub fn hash(&self) -> TypeHash {
        let owner = TypeHash::from_name(&self.owner);
        let params: Vec<TypeHash> = self
            .method_type
            .params
            .iter()
            .map(DataType::type_hash)
            .collect();
        match self.kind {
            HandleKind::Static => TypeHash::from_static(owner, &self.name, &params),
            HandleKind::Virtual => TypeHash::from_method(owner, &self.name, &params),
            HandleKind::Constructor => TypeHash::from_constructor(owner, &params),
        }
    }
}

impl fmt::Display for MethodHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}::{}{}",
            self.owner,
            self.name,
            self.method_type.descriptor()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PrimitiveKind;

    fn long() -> DataType {
        DataType::Primitive(PrimitiveKind::Long)
    }

    #[test]
    fn descriptor_format() {
        let ty = MethodType::new(vec![long(), DataType::Def], DataType::Primitive(PrimitiveKind::Bool));
        assert_eq!(ty.descriptor(), "(JLdef;)Z");
        assert_eq!(MethodType::returning(DataType::Void).descriptor(), "()V");
    }

    #[test]
    fn leading_param() {
        let ty = MethodType::new(vec![long()], long()).with_leading(DataType::object("List"));
        assert_eq!(ty.descriptor(), "(LList;J)J");
        assert_eq!(ty.arity(), 2);
    }

    #[test]
    fn erasure() {
        let ty = MethodType::new(vec![DataType::String, long()], DataType::object("List"));
        assert_eq!(ty.erased().descriptor(), "(Ldef;J)Ldef;");
    }

    #[test]
    fn handle_hash_depends_on_kind() {
        let ty = MethodType::new(vec![long()], long());
        let stat = MethodHandle {
            kind: HandleKind::Static,
            owner: "Math".into(),
            name: "abs".into(),
            method_type: ty.clone(),
        };
        let virt = MethodHandle {
            kind: HandleKind::Virtual,
            ..stat.clone()
        };
        assert_ne!(stat.hash(), virt.hash());
        assert_eq!(stat.to_string(), "Math::abs(J)J");
    }
}
