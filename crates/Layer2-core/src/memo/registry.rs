//! Per-scope memoization registry

use parking_lot::{RwLock, RwLockWriteGuard};
use std::collections::HashSet;
use std::sync::Arc;

use super::spec::WrappedMethodSpec;
use crate::object::{Method, Scope};

/// A declared memoization and the method it replaced
#[derive(Debug, Clone)]
pub struct RegisteredSpec {
    pub spec: Arc<WrappedMethodSpec>,
    /// The method that was found when `memoize` ran
    pub original: Arc<Method>,
    /// Whether `original` came from this scope's own table
    pub original_is_local: bool,
}

/// Memoizations declared directly on one scope, in declaration order
#[derive(Debug, Default)]
pub struct MemoRegistry {
    entries: RwLock<Vec<RegisteredSpec>>,
}

impl MemoRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn specs(&self) -> Vec<Arc<WrappedMethodSpec>> {
        self.entries.read().iter().map(|e| e.spec.clone()).collect()
    }

    pub fn find(&self, method: &str, identifier: Option<&str>) -> Option<RegisteredSpec> {
        self.entries
            .read()
            .iter()
            .find(|e| e.spec.matches(method, identifier))
            .cloned()
    }

    pub fn contains(&self, method: &str, identifier: Option<&str>) -> bool {
        self.entries
            .read()
            .iter()
            .any(|e| e.spec.matches(method, identifier))
    }

    pub fn remove(&self, method: &str, identifier: Option<&str>) -> Option<RegisteredSpec> {
        let mut entries = self.entries.write();
        let position = entries
            .iter()
            .position(|e| e.spec.matches(method, identifier))?;
        Some(entries.remove(position))
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Held across the duplicate check and the insert
    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, Vec<RegisteredSpec>> {
        self.entries.write()
    }
}

/// Specs visible along `ancestors`, most-derived first
///
/// A (method, identifier) pair appears once: a redeclaration further down
/// the hierarchy shadows the ancestor's.
pub fn collect_specs(ancestors: &[Arc<Scope>]) -> Vec<Arc<WrappedMethodSpec>> {
    let mut seen: HashSet<(String, Option<String>)> = HashSet::new();
    let mut out = Vec::new();
    for scope in ancestors {
        for spec in scope.registry().specs() {
            let key = (
                spec.method_name().to_string(),
                spec.identifier().map(String::from),
            );
            if seen.insert(key) {
                out.push(spec);
            }
        }
    }
    out
}
