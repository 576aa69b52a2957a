//! Object model
//!
//! Scopes (classes, modules, singleton classes), instances, methods and
//! their signatures. This is the host the memoizer wraps methods in:
//! method tables can be rewritten at setup time, signatures and visibility
//! are declared up front, and every instance knows whether it is frozen.

mod args;
mod instance;
mod method;
mod scope;
mod signature;

pub use args::{Arg, Args, Block};
pub use instance::{Instance, InstanceId};
pub use method::{CallContext, Callable, Invocation, Method, MethodBody};
pub use scope::{FreezeHook, Scope, ScopeId, ScopeKind};
pub use signature::{ArityKind, KeywordParam, Signature, Visibility};
