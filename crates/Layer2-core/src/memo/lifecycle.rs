//! Bulk cache control: prime, flush and the freeze hook

use memo_foundation::{Error, Result};
use std::sync::Arc;
use tracing::debug;

use super::spec::WrappedMethodSpec;
use crate::object::{Args, FreezeHook, Instance, Scope};

/// Name of the hook that primes caches before an instance freezes
pub const FREEZE_HOOK: &str = "memoize_all";

/// Specs applicable to `instance`, narrowed to `names` when given
fn select(instance: &Instance, names: &[&str]) -> Result<Vec<Arc<WrappedMethodSpec>>> {
    let specs = instance.class().all_memoized_specs();
    if names.is_empty() {
        return Ok(specs);
    }

    let mut selected: Vec<Arc<WrappedMethodSpec>> = Vec::new();
    for name in names {
        let matching: Vec<_> = specs
            .iter()
            .filter(|s| s.method_name() == *name)
            .cloned()
            .collect();
        if matching.is_empty() {
            return Err(Error::NotMemoized(name.to_string()));
        }
        for spec in matching {
            if !selected.iter().any(|s| Arc::ptr_eq(s, &spec)) {
                selected.push(spec);
            }
        }
    }
    Ok(selected)
}

/// Populate the caches of `names` (every memoized method when empty)
///
/// Niladic methods are computed once; methods with parameters only get an
/// empty slot since there are no arguments to compute them with.
pub fn prime_cache(instance: &Instance, names: &[&str]) -> Result<usize> {
    let specs = select(instance, names)?;
    let ancestors = instance.class().ancestors();
    let mut primed = 0;

    for spec in &specs {
        if spec.is_niladic() {
            // Call the declaring scope's own entry so a subclass override
            // does not stand in for an ancestor's spec.
            let declared = ancestors
                .iter()
                .find(|s| s.id() == spec.scope_id())
                .and_then(|scope| scope.own_method(spec.method_name()).map(|m| (scope, m)));
            let Some((scope, method)) = declared else {
                debug!(spec = %spec, "declaring scope no longer defines the method, not primed");
                continue;
            };
            method.invoke(instance, scope, Args::none())?;
        } else {
            instance.memo().ensure_slot(spec);
        }
        primed += 1;
    }

    debug!(instance = %instance.id(), primed, "caches primed");
    Ok(primed)
}

/// Clear the caches of `names` (every memoized method when empty)
///
/// A frozen instance keeps its values.
pub fn flush_cache(instance: &Instance, names: &[&str]) -> Result<usize> {
    let specs = select(instance, names)?;
    let mut store = instance.memo();
    let flushed = specs.iter().filter(|spec| store.clear(spec)).count();
    drop(store);

    debug!(instance = %instance.id(), flushed, "caches flushed");
    Ok(flushed)
}

pub fn memoize_all(instance: &Instance) -> Result<usize> {
    prime_cache(instance, &[])
}

pub fn unmemoize_all(instance: &Instance) -> Result<usize> {
    flush_cache(instance, &[])
}

/// Prime every memoized method of an instance right before it freezes
pub(crate) fn install_freeze_hook(scope: &Scope) {
    if scope.has_freeze_hook(FREEZE_HOOK) {
        return;
    }
    scope.add_freeze_hook(FreezeHook::new(FREEZE_HOOK, |instance| {
        let primed = memoize_all(instance)?;
        debug!(instance = %instance.id(), primed, "primed before freeze");
        Ok(())
    }));
}
