//! The memoized replacement of a method
//!
//! Installed under the original name with the original's signature and
//! visibility. The store lock is released while the original runs, so a
//! recursive memoized call (fib calling fib) never deadlocks.

use memo_foundation::Result;
use serde_json::Value;
use std::sync::{Arc, Weak};
use tracing::trace;

use super::key::KeyBuilder;
use super::spec::WrappedMethodSpec;
use crate::object::{Args, CallContext, Callable, Method, Scope};

pub struct MemoizedMethod {
    spec: Arc<WrappedMethodSpec>,
    original: Arc<Method>,
    /// Scope the original was found in; `super` inside it resolves from there
    origin: Weak<Scope>,
    reload_on_true: bool,
    trace_calls: bool,
}

impl MemoizedMethod {
    pub fn new(
        spec: Arc<WrappedMethodSpec>,
        original: Arc<Method>,
        origin: &Arc<Scope>,
    ) -> Self {
        Self {
            spec,
            original,
            origin: Arc::downgrade(origin),
            reload_on_true: true,
            trace_calls: false,
        }
    }

    pub fn reload_on_true(mut self, enabled: bool) -> Self {
        self.reload_on_true = enabled;
        self
    }

    pub fn trace_calls(mut self, enabled: bool) -> Self {
        self.trace_calls = enabled;
        self
    }

    pub fn original(&self) -> &Arc<Method> {
        &self.original
    }
}

impl Callable for MemoizedMethod {
    fn call(&self, ctx: &CallContext<'_>, args: Args) -> Result<Value> {
        let prepared = KeyBuilder::new(&self.spec, self.original.signature())
            .reload_on_true(self.reload_on_true)
            .prepare(args)?;
        let receiver = ctx.receiver;

        if prepared.reload {
            receiver.memo().record_reload();
            if self.trace_calls {
                trace!(spec = %self.spec, instance = %receiver.id(), "memo reload");
            }
        } else {
            let cached = receiver.memo().read(&self.spec, prepared.key.as_ref());
            if let Some(value) = cached {
                if self.trace_calls {
                    trace!(spec = %self.spec, instance = %receiver.id(), "memo hit");
                }
                return Ok(value);
            }
            if self.trace_calls {
                trace!(
                    spec = %self.spec,
                    instance = %receiver.id(),
                    key = prepared.key.as_ref().map(|k| k.fingerprint()),
                    "memo miss"
                );
            }
        }

        let origin = self.origin.upgrade().unwrap_or_else(|| ctx.owner.clone());
        let value = self.original.invoke(receiver, &origin, prepared.args)?;

        let written = receiver
            .memo()
            .write(&self.spec, prepared.key, value.clone());
        if !written && self.trace_calls {
            trace!(spec = %self.spec, instance = %receiver.id(), "memo write skipped, instance frozen");
        }
        Ok(value)
    }

    fn memoized(&self) -> Option<&Arc<WrappedMethodSpec>> {
        Some(&self.spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{Signature, Visibility};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn install(scope: &Arc<Scope>, counter: Arc<AtomicUsize>) {
        let original = Arc::new(Method::native(
            "tick",
            Signature::niladic(),
            Visibility::Public,
            move |_| Ok(json!(counter.fetch_add(1, Ordering::SeqCst) + 1)),
        ));
        let spec = Arc::new(WrappedMethodSpec::new(
            scope,
            "tick",
            None,
            original.signature().arity_kind(),
            original.visibility(),
        ));
        let wrapper = MemoizedMethod::new(spec, original.clone(), scope);
        scope.define_method(Method::new(
            "tick",
            original.signature().clone(),
            original.visibility(),
            Arc::new(wrapper),
        ));
    }

    #[test]
    fn test_wrapper_caches_and_reloads() {
        let scope = Scope::class("Counter");
        let counter = Arc::new(AtomicUsize::new(0));
        install(&scope, counter.clone());
        let instance = scope.new_instance(()).unwrap();

        assert_eq!(instance.call("tick", Args::none()).unwrap(), json!(1));
        assert_eq!(instance.call("tick", Args::none()).unwrap(), json!(1));
        assert_eq!(instance.call("tick", Args::new().reload()).unwrap(), json!(2));
        assert_eq!(instance.call("tick", Args::none()).unwrap(), json!(2));
        assert_eq!(counter.load(Ordering::SeqCst), 2);

        let stats = instance.memo_stats();
        assert_eq!(stats.reloads, 1);
        assert_eq!(stats.hits, 2);
    }

    #[test]
    fn test_wrapper_reports_spec() {
        let scope = Scope::class("Counter");
        install(&scope, Arc::new(AtomicUsize::new(0)));
        let method = scope.own_method("tick").unwrap();
        assert!(method.is_memoized());
        assert_eq!(method.memoized_spec().unwrap().method_name(), "tick");
    }
}
