//! Cache keys and reload extraction
//!
//! Keys are the canonical text of `[[positional...], [[name, value]...]]`.
//! Keywords come out of a `BTreeMap` already sorted by name and object keys
//! are sorted at every depth, so structurally equal calls share one key.

use memo_foundation::{compute_hash, write_canonical, Error, Result};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

use super::spec::WrappedMethodSpec;
use crate::object::{Arg, Args, ArityKind, Signature};

/// Identity of one argument tuple of a variadic method
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(positional: &[Value], keywords: &BTreeMap<String, Value>) -> Self {
        let mut out = String::from("[[");
        for (i, value) in positional.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            write_canonical(value, &mut out);
        }
        out.push_str("],[");
        for (i, (name, value)) in keywords.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            out.push('[');
            write_canonical(&Value::String(name.clone()), &mut out);
            out.push(',');
            write_canonical(value, &mut out);
            out.push(']');
        }
        out.push_str("]]");
        Self(out)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short hash of the key, for log fields
    pub fn fingerprint(&self) -> u64 {
        compute_hash(&self.0)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A call ready for cache lookup
#[derive(Debug)]
pub struct PreparedCall {
    pub reload: bool,
    /// `None` for niladic methods
    pub key: Option<CacheKey>,
    /// Arguments to hand to the original, reload marker removed
    pub args: Args,
}

/// Splits a memoized call into reload flag, cache key and residual arguments
///
/// Counts come from the signature of the original method, never the wrapper.
pub struct KeyBuilder<'a> {
    spec: &'a WrappedMethodSpec,
    signature: &'a Signature,
    reload_on_true: bool,
}

impl<'a> KeyBuilder<'a> {
    pub fn new(spec: &'a WrappedMethodSpec, signature: &'a Signature) -> Self {
        Self {
            spec,
            signature,
            reload_on_true: true,
        }
    }

    /// Whether a trailing `true` counts as a reload marker
    pub fn reload_on_true(mut self, enabled: bool) -> Self {
        self.reload_on_true = enabled;
        self
    }

    /// Pop a trailing reload marker off `args`, if it is one
    pub fn extract_reload(&self, args: &mut Args) -> Result<bool> {
        match self.spec.arity_kind() {
            ArityKind::Niladic => self.extract_niladic(args),
            ArityKind::Variadic => Ok(self.extract_variadic(args)),
        }
    }

    fn extract_niladic(&self, args: &mut Args) -> Result<bool> {
        if !args.keywords().is_empty() || args.len() > 1 {
            return Err(Error::arity(
                self.spec.method_name(),
                "0..1",
                args.len().to_string(),
            ));
        }
        Ok(args
            .positional_mut()
            .pop()
            .is_some_and(|flag| flag.is_truthy()))
    }

    fn extract_variadic(&self, args: &mut Args) -> bool {
        let count = args.len();
        let Some(last) = args.positional().last() else {
            return false;
        };

        let recognized = match self.signature.max_positional() {
            Some(max) => count == max + 1 && last.is_reload_marker(self.reload_on_true),
            None => matches!(last, Arg::Reload),
        };
        if recognized {
            args.positional_mut().pop();
        }
        recognized
    }

    /// Full preparation: block check, reload extraction, key
    pub fn prepare(&self, mut args: Args) -> Result<PreparedCall> {
        if args.has_block() {
            return Err(Error::BlockNotSupported {
                method: self.spec.method_name().to_string(),
                declared_at: self.spec.declaration_site().map(String::from),
            });
        }

        let reload = self.extract_reload(&mut args)?;
        let key = match self.spec.arity_kind() {
            ArityKind::Niladic => None,
            ArityKind::Variadic => {
                let (values, keywords, _) = args.clone().into_parts()?;
                Some(CacheKey::new(&values, &keywords))
            }
        };

        Ok(PreparedCall { reload, key, args })
    }
}
