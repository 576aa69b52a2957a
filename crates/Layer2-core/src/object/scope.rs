//! Scopes: classes, modules and singleton classes
//!
//! A scope owns a method table, the memoizations declared on it and the
//! hooks that run before one of its instances freezes. Lookups walk the
//! ancestor chain: the scope itself, its included modules (last included
//! first), then the parent's ancestors.

use memo_foundation::{Error, Result};
use parking_lot::RwLock;
use serde_json::Value;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};
use uuid::Uuid;

use super::instance::Instance;
use super::method::{Invocation, Method};
use super::signature::{Signature, Visibility};
use crate::memo::{collect_specs, memoizer, MemoRegistry, MemoizeOptions, WrappedMethodSpec};

/// Scope identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(Uuid);

impl ScopeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ScopeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Class,
    Module,
    /// Per-object (or per-scope) singleton class
    Singleton,
}

/// Runs right before an instance becomes frozen
#[derive(Clone)]
pub struct FreezeHook {
    name: &'static str,
    run: Arc<dyn Fn(&Instance) -> Result<()> + Send + Sync>,
}

impl FreezeHook {
    pub fn new<F>(name: &'static str, run: F) -> Self
    where
        F: Fn(&Instance) -> Result<()> + Send + Sync + 'static,
    {
        Self {
            name,
            run: Arc::new(run),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn run(&self, instance: &Instance) -> Result<()> {
        (self.run)(instance)
    }
}

impl fmt::Debug for FreezeHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FreezeHook").field("name", &self.name).finish()
    }
}

/// A class, module or singleton class
pub struct Scope {
    id: ScopeId,
    name: String,
    kind: ScopeKind,
    parent: Option<Arc<Scope>>,
    includes: RwLock<Vec<Arc<Scope>>>,
    methods: RwLock<HashMap<String, Arc<Method>>>,
    registry: MemoRegistry,
    freeze_hooks: RwLock<Vec<FreezeHook>>,
    /// The scope acting as its own receiver (class-level methods)
    object: OnceLock<Instance>,
}

impl Scope {
    fn build(name: impl Into<String>, kind: ScopeKind, parent: Option<Arc<Scope>>) -> Arc<Self> {
        Arc::new(Self {
            id: ScopeId::new(),
            name: name.into(),
            kind,
            parent,
            includes: RwLock::new(Vec::new()),
            methods: RwLock::new(HashMap::new()),
            registry: MemoRegistry::new(),
            freeze_hooks: RwLock::new(Vec::new()),
            object: OnceLock::new(),
        })
    }

    /// A root class
    pub fn class(name: impl Into<String>) -> Arc<Self> {
        Self::build(name, ScopeKind::Class, None)
    }

    pub fn subclass(name: impl Into<String>, parent: &Arc<Scope>) -> Arc<Self> {
        Self::build(name, ScopeKind::Class, Some(parent.clone()))
    }

    /// A module: can be included or extended, never instantiated
    pub fn module(name: impl Into<String>) -> Arc<Self> {
        Self::build(name, ScopeKind::Module, None)
    }

    pub(crate) fn singleton(of: &str, parent: Option<Arc<Scope>>) -> Arc<Self> {
        Self::build(format!("#<Class:{}>", of), ScopeKind::Singleton, parent)
    }

    pub fn id(&self) -> ScopeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ScopeKind {
        self.kind
    }

    pub fn parent(&self) -> Option<&Arc<Scope>> {
        self.parent.as_ref()
    }

    pub fn registry(&self) -> &MemoRegistry {
        &self.registry
    }

    // ========================================================================
    // Hierarchy
    // ========================================================================

    /// Mix a module into this scope
    pub fn include(&self, module: &Arc<Scope>) -> Result<&Self> {
        if module.kind != ScopeKind::Module {
            return Err(Error::InvalidScope(format!(
                "{} is not a module and cannot be included",
                module.name
            )));
        }
        let mut includes = self.includes.write();
        if !includes.iter().any(|m| m.id == module.id) {
            includes.push(module.clone());
        }
        Ok(self)
    }

    pub fn includes(&self) -> Vec<Arc<Scope>> {
        self.includes.read().clone()
    }

    /// Method resolution order, most-derived first
    pub fn ancestors(self: &Arc<Self>) -> Vec<Arc<Scope>> {
        let mut out = Vec::new();
        self.collect_ancestors(&mut out);
        out
    }

    fn collect_ancestors(self: &Arc<Self>, out: &mut Vec<Arc<Scope>>) {
        if !out.iter().any(|s| s.id == self.id) {
            out.push(self.clone());
        }
        for module in self.includes().iter().rev() {
            module.collect_ancestors(out);
        }
        if let Some(parent) = &self.parent {
            parent.collect_ancestors(out);
        }
    }

    pub fn is_a(self: &Arc<Self>, other: &Scope) -> bool {
        self.ancestors().iter().any(|s| s.id == other.id)
    }

    // ========================================================================
    // Method table
    // ========================================================================

    /// Define a public method
    pub fn define<F>(&self, name: &str, signature: Signature, body: F) -> &Self
    where
        F: Fn(&Invocation<'_>) -> Result<Value> + Send + Sync + 'static,
    {
        self.define_with(name, signature, Visibility::Public, body)
    }

    pub fn define_with<F>(
        &self,
        name: &str,
        signature: Signature,
        visibility: Visibility,
        body: F,
    ) -> &Self
    where
        F: Fn(&Invocation<'_>) -> Result<Value> + Send + Sync + 'static,
    {
        self.define_method(Method::native(name, signature, visibility, body))
    }

    /// Install a method under its own name, replacing any previous entry
    pub fn define_method(&self, method: impl Into<Arc<Method>>) -> &Self {
        let method = method.into();
        self.methods
            .write()
            .insert(method.name().to_string(), method);
        self
    }

    pub(crate) fn remove_method(&self, name: &str) -> Option<Arc<Method>> {
        self.methods.write().remove(name)
    }

    /// Change the visibility of a method defined on this scope
    pub fn set_visibility(&self, name: &str, visibility: Visibility) -> Result<()> {
        let mut methods = self.methods.write();
        let method = methods.get(name).ok_or_else(|| Error::NoSuchMethod {
            scope: self.name.clone(),
            method: name.to_string(),
        })?;
        let updated = Arc::new(method.with_visibility(visibility));
        methods.insert(name.to_string(), updated);
        Ok(())
    }

    pub fn own_method(&self, name: &str) -> Option<Arc<Method>> {
        self.methods.read().get(name).cloned()
    }

    pub fn own_method_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.methods.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// First definition of `name` along the ancestor chain
    pub fn find_method(self: &Arc<Self>, name: &str) -> Option<(Arc<Scope>, Arc<Method>)> {
        self.ancestors()
            .into_iter()
            .find_map(|scope| scope.own_method(name).map(|m| (scope, m)))
    }

    /// Next definition of `name` after `owner` in this scope's ancestor chain
    pub fn super_method(
        self: &Arc<Self>,
        owner: &Scope,
        name: &str,
    ) -> Option<(Arc<Scope>, Arc<Method>)> {
        let ancestors = self.ancestors();
        let position = ancestors.iter().position(|s| s.id == owner.id)?;
        ancestors
            .into_iter()
            .skip(position + 1)
            .find_map(|scope| scope.own_method(name).map(|m| (scope, m)))
    }

    pub fn method_defined(self: &Arc<Self>, name: &str) -> bool {
        self.find_method(name).is_some()
    }

    // ========================================================================
    // Memoization
    // ========================================================================

    /// Memoize `name` with the process-wide memoizer
    #[track_caller]
    pub fn memoize(self: &Arc<Self>, name: &str) -> Result<String> {
        memoizer().memoize(self, name)
    }

    #[track_caller]
    pub fn memoize_with(self: &Arc<Self>, name: &str, options: MemoizeOptions) -> Result<String> {
        memoizer().memoize_with(self, name, options)
    }

    #[track_caller]
    pub fn memoize_many(
        self: &Arc<Self>,
        names: &[&str],
        options: MemoizeOptions,
    ) -> Result<Vec<String>> {
        memoizer().memoize_many(self, names, options)
    }

    /// Memoizations declared directly on this scope
    pub fn memoized_specs(&self) -> Vec<Arc<WrappedMethodSpec>> {
        self.registry.specs()
    }

    /// Memoizations visible to instances of this scope
    pub fn all_memoized_specs(self: &Arc<Self>) -> Vec<Arc<WrappedMethodSpec>> {
        collect_specs(&self.ancestors())
    }

    // ========================================================================
    // Freeze hooks
    // ========================================================================

    /// Register a hook; a second hook with the same name is ignored
    pub fn add_freeze_hook(&self, hook: FreezeHook) {
        let mut hooks = self.freeze_hooks.write();
        if !hooks.iter().any(|h| h.name == hook.name) {
            hooks.push(hook);
        }
    }

    pub fn has_freeze_hook(&self, name: &str) -> bool {
        self.freeze_hooks.read().iter().any(|h| h.name == name)
    }

    /// Hooks of every ancestor, each name once
    pub fn freeze_hooks(self: &Arc<Self>) -> Vec<FreezeHook> {
        let mut out: Vec<FreezeHook> = Vec::new();
        for scope in self.ancestors() {
            for hook in scope.freeze_hooks.read().iter() {
                if !out.iter().any(|h| h.name == hook.name) {
                    out.push(hook.clone());
                }
            }
        }
        out
    }

    // ========================================================================
    // Instances
    // ========================================================================

    pub fn new_instance<T: Any + Send + Sync>(self: &Arc<Self>, state: T) -> Result<Instance> {
        if self.kind == ScopeKind::Module {
            return Err(Error::InvalidScope(format!(
                "module {} cannot be instantiated",
                self.name
            )));
        }
        Ok(Instance::new(self.clone(), Box::new(state)))
    }

    /// The scope as a receiver of its own (class-level) methods
    ///
    /// Class-level methods are defined on `object().singleton_class()` and
    /// memoized there like any other method; the singleton class inherits
    /// from the parent scope's singleton class.
    pub fn object(&self) -> &Instance {
        self.object.get_or_init(|| {
            let parent = self.parent.as_ref().map(|p| p.object().class());
            Instance::new(Scope::singleton(&self.name, parent), Box::new(()))
        })
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("parent", &self.parent.as_ref().map(|p| p.name.clone()))
            .field("methods", &self.own_method_names())
            .finish()
    }
}
