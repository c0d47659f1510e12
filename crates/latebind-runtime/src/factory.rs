//! Lambda factory linkage.
//!
//! Decodes the static arguments of a `LambdaFactory` call site and builds the
//! functional-interface object it produces.

use latebind_compiler::{Bootstrap, CallSiteDescriptor, FactoryFlags, StaticArg};
use latebind_core::{MethodHandle, MethodType};

use crate::adapter::bridge;
use crate::call_site::Resolver;
use crate::value::FunctionObject;
use crate::LinkError;

/// Decoded static arguments of a lambda factory site.
#[derive(Debug, Clone, PartialEq)]
pub struct FactorySpec {
    /// Functional interface the object implements.
    pub interface: String,
    /// Interface method name.
    pub method: String,
    pub sam: MethodType,
    pub implementation: MethodHandle,
    pub flags: FactoryFlags,
    /// Erased interface signature, present when a bridge is needed.
    pub bridge: Option<MethodType>,
}

impl FactorySpec {
    pub fn decode(site: &CallSiteDescriptor) -> Result<Self, LinkError> {
        let bad = |detail: &str| LinkError::BadStaticArgs {
            site: site.name.clone(),
            detail: detail.to_string(),
        };

        if site.bootstrap != Bootstrap::LambdaFactory {
            return Err(LinkError::WrongBootstrap {
                site: site.name.clone(),
                expected: Bootstrap::LambdaFactory.name(),
            });
        }

        let (sam, implementation, flags, rest) = match site.static_args.as_slice() {
            [
                StaticArg::MethodType(sam),
                StaticArg::MethodHandle(handle),
                StaticArg::MethodType(instantiated),
                StaticArg::Int(bits),
                rest @ ..,
            ] if sam == instantiated => (sam, handle, *bits, rest),
            _ => return Err(bad("expected [sam, impl, sam, flags]")),
        };
        let flags = FactoryFlags::from_bits(flags).ok_or_else(|| bad("unknown factory flags"))?;

        let bridge = match (flags.contains(FactoryFlags::BRIDGES), rest) {
            (false, []) => None,
            (true, [StaticArg::Int(1), StaticArg::MethodType(interface)]) => Some(interface.clone()),
            (true, _) => return Err(bad("expected one bridge signature")),
            (false, _) => return Err(bad("unexpected trailing arguments")),
        };

        let interface = site
            .signature
            .rsplit_once(")L")
            .and_then(|(_, ret)| ret.strip_suffix(';'))
            .ok_or_else(|| bad("factory signature must return an object"))?;

        Ok(Self {
            interface: interface.to_string(),
            method: site.name.clone(),
            sam: sam.clone(),
            implementation: implementation.clone(),
            flags,
            bridge,
        })
    }
}

/// Build the object a lambda factory site produces.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn link_factory(
    site: &CallSiteDescriptor,
    resolver: &dyn Resolver,
) -> Result<FunctionObject, LinkError> {
    let spec = FactorySpec::decode(site)?;
    let target = resolver.lookup(&spec.implementation)?;
    let callable = match spec.bridge {
        Some(interface) => bridge(interface, spec.sam, target),
        None => target,
    };
    Ok(FunctionObject::new(spec.interface, spec.method, callable))
}
