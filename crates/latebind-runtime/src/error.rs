//! Linkage errors raised while resolving or invoking a call site.

use thiserror::Error;

/// Errors raised by call-site linkage and bridge adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkError {
    /// The resolver found no target for the receiver type.
    #[error("no method '{name}' with {arity} argument(s) on type '{receiver}'")]
    NoSuchMethod {
        receiver: String,
        name: String,
        arity: usize,
    },

    /// The resolver cannot provide an implementation for a method handle.
    #[error("unknown implementation {handle}")]
    UnknownHandle { handle: String },

    /// The site was invoked through the wrong entry point for its bootstrap.
    #[error("call site '{site}' is not a {expected} site")]
    WrongBootstrap { site: String, expected: &'static str },

    /// The site's static arguments do not follow the bootstrap's layout.
    #[error("malformed static arguments for call site '{site}': {detail}")]
    BadStaticArgs { site: String, detail: String },

    /// A recipe-flagged argument was not a `Type.member` reference string.
    #[error("deferred argument {index} must be a 'Type.member' string, found '{found}'")]
    BadDeferredArg { index: usize, found: String },

    /// A deferred reference could not be turned into an interface object.
    #[error("cannot materialize '{reference}': {detail}")]
    InvalidReference { reference: String, detail: String },

    /// A target was invoked with the wrong number of arguments.
    #[error("expected {expected} argument(s), found {found}")]
    ArityMismatch { expected: usize, found: usize },

    /// A value could not be converted to the type a target requires.
    #[error("cannot convert '{from}' to '{to}'")]
    Conversion { from: String, to: String },

    /// The call-site cache lock was poisoned by a panicking resolver.
    #[error("call site cache is poisoned")]
    LockPoisoned,
}
