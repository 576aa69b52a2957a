//! Instances: receivers of method calls
//!
//! Each instance carries typed state, an immutability flag and its own cache
//! store. Cache slots are never shared between instances.

use memo_foundation::{Error, Result};
use parking_lot::{Mutex, MutexGuard, RwLock};
use serde_json::Value;
use std::any::{type_name, Any};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use super::args::Args;
use super::scope::{Scope, ScopeKind};
use super::signature::Visibility;
use crate::memo::{lifecycle, CacheSlot, CacheStore, MemoStats};

/// Instance identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstanceId(Uuid);

impl InstanceId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for InstanceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An object: class, state, frozen flag and memoized values
pub struct Instance {
    id: InstanceId,
    class: RwLock<Arc<Scope>>,
    state: Box<dyn Any + Send + Sync>,
    frozen: AtomicBool,
    memo: Mutex<CacheStore>,
}

impl Instance {
    pub(crate) fn new(class: Arc<Scope>, state: Box<dyn Any + Send + Sync>) -> Self {
        Self {
            id: InstanceId::new(),
            class: RwLock::new(class),
            state,
            frozen: AtomicBool::new(false),
            memo: Mutex::new(CacheStore::new()),
        }
    }

    pub fn id(&self) -> InstanceId {
        self.id
    }

    /// Current class, the singleton class once one exists
    pub fn class(&self) -> Arc<Scope> {
        self.class.read().clone()
    }

    pub fn state<T: 'static>(&self) -> Result<&T> {
        self.state
            .downcast_ref::<T>()
            .ok_or(Error::StateType(type_name::<T>()))
    }

    // ========================================================================
    // Dispatch
    // ========================================================================

    /// Public call: private and protected methods are refused
    pub fn call(&self, name: &str, args: Args) -> Result<Value> {
        self.dispatch(name, args, false)
    }

    /// Call ignoring visibility
    pub fn send(&self, name: &str, args: Args) -> Result<Value> {
        self.dispatch(name, args, true)
    }

    fn dispatch(&self, name: &str, args: Args, ignore_visibility: bool) -> Result<Value> {
        let class = self.class();
        let (owner, method) = class
            .find_method(name)
            .ok_or_else(|| Error::NoSuchMethod {
                scope: class.name().to_string(),
                method: name.to_string(),
            })?;

        if !ignore_visibility && method.visibility() != Visibility::Public {
            return Err(Error::Visibility {
                method: name.to_string(),
                visibility: method.visibility().to_string(),
            });
        }

        method.invoke(self, &owner, args)
    }

    /// Whether a public call of `name` would find a method
    pub fn responds_to(&self, name: &str) -> bool {
        self.class()
            .find_method(name)
            .is_some_and(|(_, m)| m.visibility() == Visibility::Public)
    }

    // ========================================================================
    // Singleton class
    // ========================================================================

    /// This object's own class, created on first use
    ///
    /// Methods defined or memoized here affect this object only.
    pub fn singleton_class(&self) -> Arc<Scope> {
        let mut class = self.class.write();
        if class.kind() != ScopeKind::Singleton {
            let singleton = Scope::singleton(class.name(), Some(class.clone()));
            *class = singleton;
        }
        class.clone()
    }

    /// Mix a module into this object only
    pub fn extend(&self, module: &Arc<Scope>) -> Result<()> {
        self.singleton_class().include(module)?;
        Ok(())
    }

    // ========================================================================
    // Freeze
    // ========================================================================

    pub fn is_frozen(&self) -> bool {
        self.frozen.load(Ordering::SeqCst)
    }

    /// Make the instance immutable
    ///
    /// Freeze hooks (cache priming among them) run first, while writes are
    /// still allowed. A failing hook leaves the instance unfrozen.
    pub fn freeze(&self) -> Result<()> {
        if self.is_frozen() {
            return Ok(());
        }

        let class = self.class();
        for hook in class.freeze_hooks() {
            hook.run(self)?;
        }

        self.memo.lock().freeze();
        self.frozen.store(true, Ordering::SeqCst);
        debug!(instance = %self.id, class = %class.name(), "instance frozen");
        Ok(())
    }

    // ========================================================================
    // Memoization
    // ========================================================================

    pub(crate) fn memo(&self) -> MutexGuard<'_, CacheStore> {
        self.memo.lock()
    }

    /// Populate every memoized method
    pub fn memoize_all(&self) -> Result<usize> {
        lifecycle::memoize_all(self)
    }

    /// Clear every memoized value
    pub fn unmemoize_all(&self) -> Result<usize> {
        lifecycle::unmemoize_all(self)
    }

    pub fn prime_cache(&self, names: &[&str]) -> Result<usize> {
        lifecycle::prime_cache(self, names)
    }

    pub fn flush_cache(&self, names: &[&str]) -> Result<usize> {
        lifecycle::flush_cache(self, names)
    }

    /// Content of the slot backing `name` under `identifier`, if any
    pub fn cached(&self, name: &str, identifier: Option<&str>) -> Option<CacheSlot> {
        let spec = self
            .class()
            .all_memoized_specs()
            .into_iter()
            .find(|s| s.matches(name, identifier))?;
        self.memo.lock().peek(&spec).cloned()
    }

    pub fn memo_stats(&self) -> MemoStats {
        self.memo.lock().stats()
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("id", &self.id)
            .field("class", &self.class().name())
            .field("frozen", &self.is_frozen())
            .finish()
    }
}
