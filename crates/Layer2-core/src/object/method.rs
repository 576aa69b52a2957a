//! Methods and the `Callable` seam
//!
//! A `Method` pairs a name, a `Signature` and a `Visibility` with something
//! callable. Plain methods wrap a closure (`NativeMethod`); the memoizer
//! installs its own `Callable` under the same name, keeping the shape and
//! visibility of the method it replaces.

use memo_foundation::{Error, Result};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::args::{Args, Block};
use super::instance::Instance;
use super::scope::Scope;
use super::signature::{Signature, Visibility};
use crate::memo::WrappedMethodSpec;

/// Closure type of a native method body
pub type MethodBody = Arc<dyn Fn(&Invocation<'_>) -> Result<Value> + Send + Sync>;

/// Where a call is executing
pub struct CallContext<'a> {
    /// The object the method was called on
    pub receiver: &'a Instance,
    /// The scope whose method table holds `method`
    pub owner: &'a Arc<Scope>,
    pub method: &'a Method,
}

/// Something that can run as the body of a method
pub trait Callable: Send + Sync {
    fn call(&self, ctx: &CallContext<'_>, args: Args) -> Result<Value>;

    /// The memoization this callable applies, if it is a memoized wrapper
    fn memoized(&self) -> Option<&Arc<WrappedMethodSpec>> {
        None
    }
}

/// A named entry of a scope's method table
#[derive(Clone)]
pub struct Method {
    name: String,
    signature: Signature,
    visibility: Visibility,
    callable: Arc<dyn Callable>,
}

impl Method {
    pub fn new(
        name: impl Into<String>,
        signature: Signature,
        visibility: Visibility,
        callable: Arc<dyn Callable>,
    ) -> Self {
        Self {
            name: name.into(),
            signature,
            visibility,
            callable,
        }
    }

    /// A method backed by a closure
    pub fn native<F>(
        name: impl Into<String>,
        signature: Signature,
        visibility: Visibility,
        body: F,
    ) -> Self
    where
        F: Fn(&Invocation<'_>) -> Result<Value> + Send + Sync + 'static,
    {
        Self::new(
            name,
            signature,
            visibility,
            Arc::new(NativeMethod {
                body: Arc::new(body),
            }),
        )
    }

    /// Same body under another visibility
    pub fn with_visibility(&self, visibility: Visibility) -> Self {
        Self {
            visibility,
            ..self.clone()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn memoized_spec(&self) -> Option<&Arc<WrappedMethodSpec>> {
        self.callable.memoized()
    }

    pub fn is_memoized(&self) -> bool {
        self.memoized_spec().is_some()
    }

    /// Run this method on `receiver`, as found in `owner`'s table
    pub fn invoke(&self, receiver: &Instance, owner: &Arc<Scope>, args: Args) -> Result<Value> {
        let ctx = CallContext {
            receiver,
            owner,
            method: self,
        };
        self.callable.call(&ctx, args)
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Method")
            .field("name", &self.name)
            .field("signature", &self.signature)
            .field("visibility", &self.visibility)
            .field("memoized", &self.is_memoized())
            .finish()
    }
}

struct NativeMethod {
    body: MethodBody,
}

impl Callable for NativeMethod {
    fn call(&self, ctx: &CallContext<'_>, args: Args) -> Result<Value> {
        let (values, keywords, block) = args.into_parts()?;
        ctx.method
            .signature()
            .check(ctx.method.name(), values.len(), &keywords)?;

        let invocation = Invocation {
            receiver: ctx.receiver,
            owner: ctx.owner,
            name: ctx.method.name(),
            args: &values,
            keywords: &keywords,
            block: block.as_ref(),
        };
        (self.body)(&invocation)
    }
}

/// What a native method body sees: receiver, arguments and dispatch helpers
pub struct Invocation<'a> {
    receiver: &'a Instance,
    owner: &'a Arc<Scope>,
    name: &'a str,
    args: &'a [Value],
    keywords: &'a BTreeMap<String, Value>,
    block: Option<&'a Block>,
}

impl<'a> Invocation<'a> {
    pub fn receiver(&self) -> &'a Instance {
        self.receiver
    }

    pub fn owner(&self) -> &'a Arc<Scope> {
        self.owner
    }

    pub fn name(&self) -> &'a str {
        self.name
    }

    pub fn args(&self) -> &'a [Value] {
        self.args
    }

    pub fn arg(&self, index: usize) -> Option<&'a Value> {
        self.args.get(index)
    }

    /// Positional argument or its default
    pub fn arg_or(&self, index: usize, default: Value) -> Value {
        self.args.get(index).cloned().unwrap_or(default)
    }

    pub fn keywords(&self) -> &'a BTreeMap<String, Value> {
        self.keywords
    }

    pub fn keyword(&self, name: &str) -> Option<&'a Value> {
        self.keywords.get(name)
    }

    /// Typed state of the receiver
    pub fn state<T: 'static>(&self) -> Result<&'a T> {
        self.receiver.state::<T>()
    }

    /// Call another method on `self`, private and protected included
    pub fn call(&self, name: &str, args: Args) -> Result<Value> {
        self.receiver.send(name, args)
    }

    /// Call the next implementation of this method up the ancestor chain
    pub fn call_super(&self, args: Args) -> Result<Value> {
        let (scope, method) = self
            .receiver
            .class()
            .super_method(self.owner, self.name)
            .ok_or_else(|| Error::NoSuperMethod {
                method: self.name.to_string(),
            })?;
        method.invoke(self.receiver, &scope, args)
    }

    /// `super` with the arguments of the current call
    pub fn forward_super(&self) -> Result<Value> {
        let mut args = Args::from_values(self.args.iter().cloned());
        for (name, value) in self.keywords {
            args = args.keyword(name.clone(), value.clone());
        }
        self.call_super(args)
    }

    pub fn block(&self) -> Option<&'a Block> {
        self.block
    }

    pub fn yield_block(&self, values: &[Value]) -> Result<Value> {
        let block = self
            .block
            .ok_or_else(|| Error::InvalidArgument(format!("no block given to {}", self.name)))?;
        block(values)
    }
}
