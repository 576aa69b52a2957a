//! Memoization specs and cache slot identity

use std::fmt;

use crate::object::{ArityKind, Scope, ScopeId, Visibility};

/// Identity of one cache slot inside an instance's store
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SlotKey {
    pub scope: ScopeId,
    pub method: String,
    pub identifier: Option<String>,
}

/// One declared memoization: (declaring scope, method, identifier)
///
/// Created once by the memoizer and shared read-only by the scope's
/// registry, the installed wrapper and subclasses enumerating it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrappedMethodSpec {
    scope_id: ScopeId,
    scope_name: String,
    method_name: String,
    identifier: Option<String>,
    arity_kind: ArityKind,
    visibility: Visibility,
    declared_at: Option<String>,
}

impl WrappedMethodSpec {
    pub fn new(
        scope: &Scope,
        method_name: impl Into<String>,
        identifier: Option<String>,
        arity_kind: ArityKind,
        visibility: Visibility,
    ) -> Self {
        Self {
            scope_id: scope.id(),
            scope_name: scope.name().to_string(),
            method_name: method_name.into(),
            identifier,
            arity_kind,
            visibility,
            declared_at: None,
        }
    }

    /// Source location of the `memoize` call
    pub fn declared_at(mut self, site: impl Into<String>) -> Self {
        self.declared_at = Some(site.into());
        self
    }

    pub fn scope_id(&self) -> ScopeId {
        self.scope_id
    }

    pub fn scope_name(&self) -> &str {
        &self.scope_name
    }

    pub fn method_name(&self) -> &str {
        &self.method_name
    }

    pub fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }

    pub fn arity_kind(&self) -> ArityKind {
        self.arity_kind
    }

    pub fn is_niladic(&self) -> bool {
        self.arity_kind == ArityKind::Niladic
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn declaration_site(&self) -> Option<&str> {
        self.declared_at.as_deref()
    }

    pub fn matches(&self, method_name: &str, identifier: Option<&str>) -> bool {
        self.method_name == method_name && self.identifier.as_deref() == identifier
    }

    pub fn slot_key(&self) -> SlotKey {
        SlotKey {
            scope: self.scope_id,
            method: self.method_name.clone(),
            identifier: self.identifier.clone(),
        }
    }

    /// Conventional slot name: `_memoized[_<identifier>]_<method>`
    ///
    /// A trailing `?` becomes `_query` and a trailing `!` becomes `_bang`.
    pub fn slot_name(&self) -> String {
        let mut name = String::from("_memoized");
        if let Some(identifier) = &self.identifier {
            name.push('_');
            name.push_str(identifier);
        }
        name.push('_');
        name.push_str(&escape_punctuation(&self.method_name));
        name
    }
}

impl fmt::Display for WrappedMethodSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.scope_name, self.method_name)?;
        if let Some(identifier) = &self.identifier {
            write!(f, " [{}]", identifier)?;
        }
        Ok(())
    }
}

fn escape_punctuation(name: &str) -> String {
    if let Some(stem) = name.strip_suffix('?') {
        format!("{}_query", stem)
    } else if let Some(stem) = name.strip_suffix('!') {
        format!("{}_bang", stem)
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(name: &str, identifier: Option<&str>) -> WrappedMethodSpec {
        let scope = Scope::class("Person");
        WrappedMethodSpec::new(
            &scope,
            name,
            identifier.map(String::from),
            ArityKind::Niladic,
            Visibility::Public,
        )
    }

    #[test]
    fn test_slot_name() {
        assert_eq!(spec("name", None).slot_name(), "_memoized_name");
        assert_eq!(
            spec("name", Some("student")).slot_name(),
            "_memoized_student_name"
        );
        assert_eq!(spec("name?", None).slot_name(), "_memoized_name_query");
        assert_eq!(spec("save!", None).slot_name(), "_memoized_save_bang");
    }

    #[test]
    fn test_matches_and_display() {
        let s = spec("name", Some("again"));
        assert!(s.matches("name", Some("again")));
        assert!(!s.matches("name", None));
        assert_eq!(s.to_string(), "Person#name [again]");
    }

    #[test]
    fn test_slot_keys_differ_by_identifier() {
        let scope = Scope::class("Person");
        let a = WrappedMethodSpec::new(&scope, "name", None, ArityKind::Niladic, Visibility::Public);
        let b = WrappedMethodSpec::new(
            &scope,
            "name",
            Some("again".to_string()),
            ArityKind::Niladic,
            Visibility::Public,
        );
        assert_ne!(a.slot_key(), b.slot_key());
    }
}
