//! Native implementations bound to registry members.
//!
//! [`NativeHost`] pairs a [`TypeRegistry`] with host closures for the members
//! it declares, and implements [`Resolver`] on top of them:
//!
//! - def calls resolve to the receiver type's instance method of matching
//!   name and arity, or to the object itself when the receiver is a
//!   function object and the name is its interface method;
//! - method handles resolve by identity hash;
//! - deferred `"Type.member"` references are described against the
//!   parameter's functional interface and built like a factory site.

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use latebind_compiler::expr::factory_static_args;
use latebind_compiler::{Bootstrap, CallSiteDescriptor};
use latebind_core::{DataType, HandleKind, MethodHandle, MethodType, RegistrationError, TypeHash};
use latebind_registry::{MethodEntry, TypeEntry, TypeRegistry};
use latebind_runtime::{
    LinkError, LinkedTarget, Resolver, Target, Value, bridge, link_factory,
};

/// A registry plus the native code behind its members.
pub struct NativeHost {
    registry: TypeRegistry,
    targets: FxHashMap<TypeHash, Target>,
}

impl NativeHost {
    pub fn new(registry: TypeRegistry) -> Self {
        Self {
            registry,
            targets: FxHashMap::default(),
        }
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// Bind a static method. `f` receives the declared arguments.
    pub fn bind_static<F>(
        &mut self,
        owner: &str,
        name: &str,
        arity: usize,
        f: F,
    ) -> Result<(), RegistrationError>
    where
        F: Fn(&[Value]) -> Result<Value, LinkError> + Send + Sync + 'static,
    {
        let entry = member(&self.registry, owner, name, arity, |ty| {
            ty.static_method(name, arity)
        })?;
        let handle = handle(HandleKind::Static, entry);
        self.targets.insert(handle.hash(), Arc::new(f));
        Ok(())
    }

    /// Bind an instance method. `f` receives the receiver first.
    pub fn bind_method<F>(
        &mut self,
        owner: &str,
        name: &str,
        arity: usize,
        f: F,
    ) -> Result<(), RegistrationError>
    where
        F: Fn(&[Value]) -> Result<Value, LinkError> + Send + Sync + 'static,
    {
        let entry = member(&self.registry, owner, name, arity, |ty| ty.method(name, arity))?;
        let handle = handle(HandleKind::Virtual, entry);
        self.targets.insert(handle.hash(), Arc::new(f));
        Ok(())
    }

    /// Bind a constructor.
    pub fn bind_constructor<F>(
        &mut self,
        owner: &str,
        arity: usize,
        f: F,
    ) -> Result<(), RegistrationError>
    where
        F: Fn(&[Value]) -> Result<Value, LinkError> + Send + Sync + 'static,
    {
        let entry = member(&self.registry, owner, "new", arity, |ty| ty.constructor(arity))?;
        let handle = handle(HandleKind::Constructor, entry);
        self.targets.insert(handle.hash(), Arc::new(f));
        Ok(())
    }

    /// Number of bound implementations.
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

impl fmt::Debug for NativeHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeHost")
            .field("registry", &self.registry)
            .field("bound", &self.targets.len())
            .finish()
    }
}

impl Resolver for NativeHost {
    fn resolve(
        &self,
        site: &CallSiteDescriptor,
        receiver_type: &str,
    ) -> Result<LinkedTarget, LinkError> {
        let arity = site.param_count().saturating_sub(1);
        let ty = self.registry.get(receiver_type);

        if let Some(method) = ty
            .and_then(TypeEntry::functional_method)
            .filter(|method| method.name == site.name && method.params.len() == arity)
        {
            return Ok(LinkedTarget {
                params: method.params.clone(),
                target: Arc::new(call_function_object),
            });
        }

        let entry = ty
            .and_then(|ty| ty.method(&site.name, arity))
            .ok_or_else(|| LinkError::NoSuchMethod {
                receiver: receiver_type.to_string(),
                name: site.name.clone(),
                arity,
            })?;

        let target = self.lookup(&handle(HandleKind::Virtual, entry))?;
        let receiver = self
            .registry
            .resolve(receiver_type)
            .unwrap_or_else(|| DataType::object(receiver_type));
        let untyped = MethodType::new(vec![DataType::Def; arity + 1], DataType::Def);

        Ok(LinkedTarget {
            params: entry.params.clone(),
            target: bridge(untyped, entry.method_type().with_leading(receiver), target),
        })
    }

    fn lookup(&self, handle: &MethodHandle) -> Result<Target, LinkError> {
        self.targets
            .get(&handle.hash())
            .cloned()
            .ok_or_else(|| LinkError::UnknownHandle {
                handle: handle.to_string(),
            })
    }

    #[cfg_attr(feature = "profiling", profiling::function)]
    fn materialize(&self, reference: &str, parameter: &DataType) -> Result<Value, LinkError> {
        let invalid = |detail: String| LinkError::InvalidReference {
            reference: reference.to_string(),
            detail,
        };

        let (owner, name) = reference
            .split_once('.')
            .ok_or_else(|| invalid("expected 'Type.member'".to_string()))?;
        let descriptor = self
            .registry
            .describe_functional_interface(parameter, owner, name)
            .map_err(|err| invalid(err.to_string()))?;

        let site = CallSiteDescriptor {
            name: descriptor.invoked_name.clone(),
            signature: descriptor.invoked_type.descriptor(),
            bootstrap: Bootstrap::LambdaFactory,
            static_args: factory_static_args(&descriptor),
        };
        link_factory(&site, self).map(Value::Function)
    }
}

/// Calling the interface method on a function object runs the object.
fn call_function_object(args: &[Value]) -> Result<Value, LinkError> {
    match args.split_first() {
        Some((Value::Function(function), rest)) => function.call(rest),
        Some((other, _)) => Err(LinkError::Conversion {
            from: other.type_name().to_string(),
            to: "function object".to_string(),
        }),
        None => Err(LinkError::ArityMismatch {
            expected: 1,
            found: 0,
        }),
    }
}

fn member<'r>(
    registry: &'r TypeRegistry,
    owner: &str,
    name: &str,
    arity: usize,
    find: impl FnOnce(&'r TypeEntry) -> Option<&'r MethodEntry>,
) -> Result<&'r MethodEntry, RegistrationError> {
    let ty = registry
        .get(owner)
        .ok_or_else(|| RegistrationError::UnknownType {
            name: owner.to_string(),
        })?;
    find(ty).ok_or_else(|| RegistrationError::UnknownMember {
        owner: owner.to_string(),
        name: name.to_string(),
        arity,
    })
}

fn handle(kind: HandleKind, entry: &MethodEntry) -> MethodHandle {
    MethodHandle {
        kind,
        owner: entry.owner.clone(),
        name: entry.name.clone(),
        method_type: entry.method_type(),
    }
}
