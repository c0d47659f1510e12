//! Call-site descriptors for late-bound instructions.
//!
//! Every `InvokeDynamic` instruction indexes one [`CallSiteDescriptor`] in its
//! chunk. The descriptor is plain value data: the runtime builds one cache cell
//! per descriptor and hands the descriptor to the resolver on a cache miss.
//!
//! Two bootstrap procedures exist:
//!
//! - [`Bootstrap::LambdaFactory`] materializes a functional-interface object
//!   from a function reference. Static arguments:
//!   `[MethodType(sam), MethodHandle(impl), MethodType(sam), Int(flags)]`,
//!   followed by `Int(1), MethodType(interface)` when `flags` has
//!   [`FactoryFlags::BRIDGES`].
//! - [`Bootstrap::DefCall`] dispatches a method call on an untyped receiver.
//!   Static arguments: `[Int(site_kind::METHOD_CALL), Recipe(recipe)]`.

use std::fmt;

use bitflags::bitflags;
use latebind_core::{ArgRecipe, MethodHandle, MethodType};

/// Site kinds understood by the `DefCall` bootstrap.
pub mod site_kind {
    /// A method invocation on an untyped receiver.
    pub const METHOD_CALL: i32 = 0;
}

bitflags! {
    /// Flags passed to the lambda factory bootstrap.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FactoryFlags: i32 {
        /// Bridge signatures follow the flags.
        const BRIDGES = 1 << 2;
    }
}

/// The shared bootstrap procedure a call site links through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bootstrap {
    /// Untyped method dispatch.
    DefCall,
    /// Functional-interface materialization.
    LambdaFactory,
}

impl Bootstrap {
    pub fn name(self) -> &'static str {
        match self {
            Bootstrap::DefCall => "def_bootstrap",
            Bootstrap::LambdaFactory => "lambda_bootstrap",
        }
    }
}

/// A static argument carried by a call site.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StaticArg {
    Int(i32),
    MethodType(MethodType),
    MethodHandle(MethodHandle),
    Recipe(ArgRecipe),
}

impl fmt::Display for StaticArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StaticArg::Int(v) => write!(f, "{}", v),
            StaticArg::MethodType(ty) => write!(f, "{}", ty.descriptor()),
            StaticArg::MethodHandle(handle) => write!(f, "{}", handle),
            StaticArg::Recipe(recipe) => write!(f, "{}", recipe),
        }
    }
}

/// Everything the runtime needs to link one late-bound call site.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallSiteDescriptor {
    /// Method name (def calls) or interface method name (factories).
    pub name: String,
    /// Descriptor of the values the site consumes and produces.
    pub signature: String,
    pub bootstrap: Bootstrap,
    pub static_args: Vec<StaticArg>,
}

impl CallSiteDescriptor {
    /// The deferred-argument recipe of a def call site.
    pub fn recipe(&self) -> Option<ArgRecipe> {
        self.static_args.iter().find_map(|arg| match arg {
            StaticArg::Recipe(recipe) => Some(*recipe),
            _ => None,
        })
    }

    /// The site kind tag of a def call site.
    pub fn site_kind(&self) -> Option<i32> {
        match (self.bootstrap, self.static_args.first()) {
            (Bootstrap::DefCall, Some(StaticArg::Int(kind))) => Some(*kind),
            _ => None,
        }
    }

    /// The factory flags of a lambda factory site.
    ///
    /// `None` for other sites, or when the flags argument holds unknown bits.
    pub fn factory_flags(&self) -> Option<FactoryFlags> {
        match (self.bootstrap, self.static_args.get(3)) {
            (Bootstrap::LambdaFactory, Some(StaticArg::Int(bits))) => {
                FactoryFlags::from_bits(*bits)
            }
            _ => None,
        }
    }

    /// Number of parameters the site pops, parsed from its signature.
    pub fn param_count(&self) -> usize {
        let params = self
            .signature
            .strip_prefix('(')
            .and_then(|rest| rest.split(')').next())
            .unwrap_or("");
        let mut count = 0;
        let mut in_object = false;
        for ch in params.chars() {
            match (in_object, ch) {
                (true, ';') => in_object = false,
                (true, _) => {}
                (false, 'L') => {
                    in_object = true;
                    count += 1;
                }
                (false, _) => count += 1,
            }
        }
        count
    }
}

impl fmt::Display for CallSiteDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{} @{}", self.name, self.signature, self.bootstrap.name())?;
        for arg in &self.static_args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn def_site(recipe: u64) -> CallSiteDescriptor {
        CallSiteDescriptor {
            name: "foo".into(),
            signature: "(Ldef;ILdef;)Ldef;".into(),
            bootstrap: Bootstrap::DefCall,
            static_args: vec![
                StaticArg::Int(site_kind::METHOD_CALL),
                StaticArg::Recipe(ArgRecipe::from_bits(recipe)),
            ],
        }
    }

    #[test]
    fn def_site_accessors() {
        let site = def_site(0b10);
        assert_eq!(site.recipe(), Some(ArgRecipe::from_bits(0b10)));
        assert_eq!(site.site_kind(), Some(site_kind::METHOD_CALL));
        assert_eq!(site.factory_flags(), None);
        assert_eq!(site.param_count(), 3);
    }

    #[test]
    fn factory_flags_reject_unknown_bits() {
        let mut site = CallSiteDescriptor {
            name: "apply".into(),
            signature: "()LFunction;".into(),
            bootstrap: Bootstrap::LambdaFactory,
            static_args: vec![
                StaticArg::MethodType(MethodType::returning(latebind_core::DataType::Def)),
                StaticArg::MethodType(MethodType::returning(latebind_core::DataType::Def)),
                StaticArg::MethodType(MethodType::returning(latebind_core::DataType::Def)),
                StaticArg::Int(FactoryFlags::BRIDGES.bits()),
            ],
        };
        assert_eq!(site.factory_flags(), Some(FactoryFlags::BRIDGES));
        assert_eq!(site.param_count(), 0);

        site.static_args[3] = StaticArg::Int(1);
        assert_eq!(site.factory_flags(), None);
    }

    #[test]
    fn display() {
        assert_eq!(
            def_site(0b10).to_string(),
            "foo(Ldef;ILdef;)Ldef; @def_bootstrap 0 0b10"
        );
    }
}
