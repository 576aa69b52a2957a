//! Declaring and removing memoizations

use memo_foundation::{Error, JsonStore, MemoConfig, Result};
use std::panic::Location;
use std::sync::{Arc, OnceLock};
use tracing::debug;

use super::lifecycle;
use super::registry::RegisteredSpec;
use super::spec::WrappedMethodSpec;
use super::wrapper::MemoizedMethod;
use crate::object::{Method, Scope};

/// Options of a single declaration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoizeOptions {
    /// Namespaces an additional, independent cache for the same method name
    pub identifier: Option<String>,
}

impl MemoizeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn identifier(identifier: impl Into<String>) -> Self {
        Self {
            identifier: Some(identifier.into()),
        }
    }
}

/// Installs memoized wrappers on scopes
///
/// ```rust,ignore
/// let memo = Memoizer::with_config(MemoConfig::strict());
/// memo.memoize(&person, "name")?;
/// memo.memoize_with(&student, "name", MemoizeOptions::identifier("student"))?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct Memoizer {
    config: MemoConfig,
}

impl Memoizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: MemoConfig) -> Self {
        Self { config }
    }

    /// Config saved in `store`, defaults when absent
    pub fn from_store(store: &JsonStore) -> Result<Self> {
        Ok(Self::with_config(MemoConfig::load_from(store)?))
    }

    pub fn config(&self) -> &MemoConfig {
        &self.config
    }

    // ========================================================================
    // Declaration
    // ========================================================================

    #[track_caller]
    pub fn memoize(&self, scope: &Arc<Scope>, name: &str) -> Result<String> {
        self.declare(scope, name, &MemoizeOptions::default(), Location::caller())?;
        Ok(name.to_string())
    }

    #[track_caller]
    pub fn memoize_with(
        &self,
        scope: &Arc<Scope>,
        name: &str,
        options: MemoizeOptions,
    ) -> Result<String> {
        self.declare(scope, name, &options, Location::caller())?;
        Ok(name.to_string())
    }

    /// Declare several names; the first failure stops the batch and names
    /// declared before it stay memoized
    #[track_caller]
    pub fn memoize_many(
        &self,
        scope: &Arc<Scope>,
        names: &[&str],
        options: MemoizeOptions,
    ) -> Result<Vec<String>> {
        let site = Location::caller();
        let mut declared = Vec::with_capacity(names.len());
        for name in names {
            self.declare(scope, name, &options, site)?;
            declared.push(name.to_string());
        }
        Ok(declared)
    }

    fn declare(
        &self,
        scope: &Arc<Scope>,
        name: &str,
        options: &MemoizeOptions,
        site: &Location<'_>,
    ) -> Result<Arc<WrappedMethodSpec>> {
        let identifier = options.identifier.as_deref();
        let already = |declared_on: &str| Error::AlreadyMemoized {
            scope: declared_on.to_string(),
            method: name.to_string(),
            identifier: identifier.map(String::from),
        };

        // A second wrapper under an inherited (name, identifier) would share
        // its slot name and hide the inner cache from flush and reload.
        if let Some(inherited) = scope
            .all_memoized_specs()
            .into_iter()
            .find(|s| s.matches(name, identifier))
        {
            return Err(already(inherited.scope_name()));
        }

        let mut entries = scope.registry().write();
        if entries.iter().any(|e| e.spec.matches(name, identifier)) {
            return Err(already(scope.name()));
        }

        let (found_in, original) = scope.find_method(name).ok_or_else(|| Error::NoSuchMethod {
            scope: scope.name().to_string(),
            method: name.to_string(),
        })?;
        let signature = original.signature().clone();
        let visibility = original.visibility();

        let mut spec = WrappedMethodSpec::new(
            scope,
            name,
            identifier.map(String::from),
            signature.arity_kind(),
            visibility,
        );
        if self.config.capture_declaration_site {
            spec = spec.declared_at(format!("{}:{}:{}", site.file(), site.line(), site.column()));
        }
        let spec = Arc::new(spec);

        let wrapper = MemoizedMethod::new(spec.clone(), original.clone(), &found_in)
            .reload_on_true(self.config.reload_on_true)
            .trace_calls(self.config.trace_calls);
        scope.define_method(Method::new(name, signature, visibility, Arc::new(wrapper)));

        entries.push(RegisteredSpec {
            spec: spec.clone(),
            original,
            original_is_local: found_in.id() == scope.id(),
        });
        drop(entries);

        if self.config.prime_on_freeze {
            lifecycle::install_freeze_hook(scope);
        }

        debug!(
            scope = %scope.name(),
            method = %name,
            identifier = ?identifier,
            arity = ?spec.arity_kind(),
            "method memoized"
        );
        Ok(spec)
    }

    // ========================================================================
    // Removal
    // ========================================================================

    /// Remove a memoization and put the original method back
    ///
    /// Only the outermost wrapper of `name` on `scope` can be removed.
    pub fn unmemoize(&self, scope: &Arc<Scope>, name: &str, options: MemoizeOptions) -> Result<()> {
        let identifier = options.identifier.as_deref();
        let entry = scope
            .registry()
            .find(name, identifier)
            .ok_or_else(|| Error::NotMemoized(name.to_string()))?;

        let outermost = scope
            .own_method(name)
            .and_then(|m| m.memoized_spec().cloned())
            .is_some_and(|current| Arc::ptr_eq(&current, &entry.spec));
        if !outermost {
            return Err(Error::InvalidScope(format!(
                "{} is wrapped again on {}; unmemoize the outer declaration first",
                entry.spec,
                scope.name()
            )));
        }

        if entry.original_is_local {
            scope.define_method(entry.original.clone());
        } else {
            scope.remove_method(name);
        }
        scope.registry().remove(name, identifier);

        debug!(scope = %scope.name(), method = %name, identifier = ?identifier, "method unmemoized");
        Ok(())
    }
}

static MEMOIZER: OnceLock<Memoizer> = OnceLock::new();

/// Process-wide memoizer with the default config
pub fn memoizer() -> &'static Memoizer {
    MEMOIZER.get_or_init(Memoizer::new)
}

/// Memoize `name` on `scope` with the process-wide memoizer
#[track_caller]
pub fn memoize(scope: &Arc<Scope>, name: &str) -> Result<String> {
    memoizer().memoize(scope, name)
}
