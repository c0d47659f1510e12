//! Bridge adapters between an interface signature and an implementation.

use std::sync::Arc;

use latebind_core::MethodType;

use crate::value::{Target, Value};
use crate::LinkError;

/// Wrap `target` so it can be called with `interface`'s signature.
///
/// Each incoming argument is converted to the matching parameter of
/// `implementation`, and the result to `interface`'s return type.
pub fn bridge(interface: MethodType, implementation: MethodType, target: Target) -> Target {
    Arc::new(move |args: &[Value]| {
        if args.len() != interface.arity() {
            return Err(LinkError::ArityMismatch {
                expected: interface.arity(),
                found: args.len(),
            });
        }
        let converted = args
            .iter()
            .zip(&implementation.params)
            .map(|(arg, param)| arg.clone().convert_to(param))
            .collect::<Result<Vec<_>, _>>()?;

        target(&converted)?.convert_to(&interface.ret)
    })
}
