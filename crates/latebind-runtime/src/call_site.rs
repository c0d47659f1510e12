//! Memoizing call-site cells.
//!
//! A [`CallSite`] is created for each entry of a chunk's call-site table.
//! The first invocation asks the [`Resolver`] for a target and caches it
//! under a guard; later invocations whose guard matches reuse the cached
//! target without consulting the resolver.
//!
//! - `DefCall` sites guard on the receiver's runtime type name. A receiver
//!   of another type re-links the site (the cache holds one entry).
//! - `LambdaFactory` sites have no receiver and link exactly once.
//!
//! # Thread Safety
//!
//! The cache sits behind an `RwLock`. The resolver runs without the lock
//! held, so two threads racing on a cold site may both resolve; the last
//! one to finish wins, which is harmless as long as resolution is
//! idempotent.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use latebind_compiler::{Bootstrap, BytecodeChunk, CallSiteDescriptor};
use latebind_core::{DataType, MethodHandle};

use crate::factory::link_factory;
use crate::value::{FunctionObject, Target, Value};
use crate::LinkError;

/// A linked method target together with its parameter types
/// (receiver excluded).
#[derive(Clone)]
pub struct LinkedTarget {
    pub params: Vec<DataType>,
    pub target: Target,
}

impl std::fmt::Debug for LinkedTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkedTarget")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// Host-side linkage decisions.
pub trait Resolver: Send + Sync {
    /// Find the target of a def call site for a receiver of `receiver_type`.
    fn resolve(
        &self,
        site: &CallSiteDescriptor,
        receiver_type: &str,
    ) -> Result<LinkedTarget, LinkError>;

    /// Find the implementation a method handle names.
    fn lookup(&self, handle: &MethodHandle) -> Result<Target, LinkError>;

    /// Turn a deferred `"Type.member"` reference into a value of `parameter`.
    fn materialize(&self, reference: &str, parameter: &DataType) -> Result<Value, LinkError>;
}

#[derive(Clone)]
enum Linked {
    Method(LinkedTarget),
    Function(FunctionObject),
}

struct CacheEntry {
    guard: String,
    linked: Linked,
}

/// A late-bound call site with a single-entry cache.
pub struct CallSite {
    descriptor: CallSiteDescriptor,
    cache: RwLock<Option<CacheEntry>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl CallSite {
    pub fn new(descriptor: CallSiteDescriptor) -> Self {
        Self {
            descriptor,
            cache: RwLock::new(None),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn descriptor(&self) -> &CallSiteDescriptor {
        &self.descriptor
    }

    /// Invoke a def call site.
    ///
    /// Deferred arguments flagged by the site's recipe are materialized
    /// against the linked target's parameter types before the call.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn invoke(
        &self,
        resolver: &dyn Resolver,
        receiver: Value,
        mut args: Vec<Value>,
    ) -> Result<Value, LinkError> {
        if self.descriptor.bootstrap != Bootstrap::DefCall {
            return Err(self.wrong_bootstrap(Bootstrap::DefCall));
        }

        let guard = receiver.type_name().to_string();
        let linked = match self.link(&guard, || {
            resolver
                .resolve(&self.descriptor, &guard)
                .map(Linked::Method)
        })? {
            Linked::Method(linked) => linked,
            Linked::Function(_) => return Err(self.wrong_bootstrap(Bootstrap::DefCall)),
        };

        if args.len() != linked.params.len() {
            return Err(LinkError::ArityMismatch {
                expected: linked.params.len(),
                found: args.len(),
            });
        }

        if let Some(recipe) = self.descriptor.recipe() {
            for index in recipe.positions() {
                let arg = args.get_mut(index).ok_or_else(|| LinkError::BadDeferredArg {
                    index,
                    found: "nothing".to_string(),
                })?;
                let reference = match arg {
                    Value::String(text) if is_reference(text) => std::mem::take(text),
                    other => {
                        return Err(LinkError::BadDeferredArg {
                            index,
                            found: other.type_name().to_string(),
                        });
                    }
                };
                *arg = resolver.materialize(&reference, &linked.params[index])?;
            }
        }

        let mut call_args = Vec::with_capacity(args.len() + 1);
        call_args.push(receiver);
        call_args.extend(args);
        (linked.target)(&call_args)
    }

    /// Produce the functional-interface object of a lambda factory site.
    pub fn instantiate(&self, resolver: &dyn Resolver) -> Result<FunctionObject, LinkError> {
        if self.descriptor.bootstrap != Bootstrap::LambdaFactory {
            return Err(self.wrong_bootstrap(Bootstrap::LambdaFactory));
        }

        match self.link("", || {
            link_factory(&self.descriptor, resolver).map(Linked::Function)
        })? {
            Linked::Function(function) => Ok(function),
            Linked::Method(_) => Err(self.wrong_bootstrap(Bootstrap::LambdaFactory)),
        }
    }

    /// Number of invocations served from the cache.
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Number of invocations that consulted the resolver.
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Whether the site currently holds a linked target.
    pub fn is_linked(&self) -> Result<bool, LinkError> {
        let cache = self.cache.read().map_err(|_| LinkError::LockPoisoned)?;
        Ok(cache.is_some())
    }

    /// Drop the cached target; the next invocation resolves again.
    pub fn invalidate(&self) -> Result<(), LinkError> {
        let mut cache = self.cache.write().map_err(|_| LinkError::LockPoisoned)?;
        *cache = None;
        Ok(())
    }

    fn link(
        &self,
        guard: &str,
        resolve: impl FnOnce() -> Result<Linked, LinkError>,
    ) -> Result<Linked, LinkError> {
        {
            let cache = self.cache.read().map_err(|_| LinkError::LockPoisoned)?;
            if let Some(entry) = cache.as_ref().filter(|entry| entry.guard == guard) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Ok(entry.linked.clone());
            }
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let linked = resolve()?;

        let mut cache = self.cache.write().map_err(|_| LinkError::LockPoisoned)?;
        *cache = Some(CacheEntry {
            guard: guard.to_string(),
            linked: linked.clone(),
        });
        Ok(linked)
    }

    fn wrong_bootstrap(&self, expected: Bootstrap) -> LinkError {
        LinkError::WrongBootstrap {
            site: self.descriptor.name.clone(),
            expected: expected.name(),
        }
    }
}

impl std::fmt::Debug for CallSite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallSite")
            .field("descriptor", &self.descriptor)
            .field("hits", &self.hits())
            .field("misses", &self.misses())
            .finish_non_exhaustive()
    }
}

/// `Type.member` with both halves non-empty.
fn is_reference(text: &str) -> bool {
    text.split_once('.')
        .is_some_and(|(owner, member)| !owner.is_empty() && !member.is_empty())
}

/// One call-site cell per entry of a chunk's call-site table.
#[derive(Debug, Default)]
pub struct CallSiteTable {
    sites: Vec<CallSite>,
}

impl CallSiteTable {
    pub fn from_chunk(chunk: &BytecodeChunk) -> Self {
        Self {
            sites: chunk.call_sites().iter().cloned().map(CallSite::new).collect(),
        }
    }

    /// The cell for an `InvokeDynamic` operand.
    pub fn get(&self, index: u16) -> Option<&CallSite> {
        self.sites.get(index as usize)
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CallSite> {
        self.sites.iter()
    }
}
