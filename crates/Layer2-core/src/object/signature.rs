//! Method signatures and visibility
//!
//! A method's shape is declared once when it is defined, so the memoizer can
//! read it back instead of introspecting a callable at runtime.

use memo_foundation::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Method visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Private,
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Visibility::Public => write!(f, "public"),
            Visibility::Protected => write!(f, "protected"),
            Visibility::Private => write!(f, "private"),
        }
    }
}

/// Whether a method takes parameters at all
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArityKind {
    /// No parameters: cached in a single box
    Niladic,
    /// Any parameter: cached per argument key
    Variadic,
}

/// A keyword parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordParam {
    pub name: String,
    pub required: bool,
}

/// Parameter shape of a method
///
/// ```rust,ignore
/// // def calc(a2, a3 = nil, *rest, key:, opt: nil, **more)
/// let sig = Signature::new()
///     .required(1)
///     .optional(1)
///     .rest()
///     .keyword("key")
///     .optional_keyword("opt")
///     .keyrest();
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    pub required: usize,
    pub optional: usize,
    pub rest: bool,
    pub keywords: Vec<KeywordParam>,
    pub keyrest: bool,
}

impl Signature {
    pub fn new() -> Self {
        Self::default()
    }

    /// No parameters
    pub fn niladic() -> Self {
        Self::default()
    }

    /// `count` required positional parameters
    pub fn positional(count: usize) -> Self {
        Self::new().required(count)
    }

    pub fn required(mut self, count: usize) -> Self {
        self.required = count;
        self
    }

    pub fn optional(mut self, count: usize) -> Self {
        self.optional = count;
        self
    }

    pub fn rest(mut self) -> Self {
        self.rest = true;
        self
    }

    /// Required keyword parameter
    pub fn keyword(mut self, name: impl Into<String>) -> Self {
        self.keywords.push(KeywordParam {
            name: name.into(),
            required: true,
        });
        self
    }

    pub fn optional_keyword(mut self, name: impl Into<String>) -> Self {
        self.keywords.push(KeywordParam {
            name: name.into(),
            required: false,
        });
        self
    }

    pub fn keyrest(mut self) -> Self {
        self.keyrest = true;
        self
    }

    pub fn arity_kind(&self) -> ArityKind {
        if self.required == 0
            && self.optional == 0
            && !self.rest
            && self.keywords.is_empty()
            && !self.keyrest
        {
            ArityKind::Niladic
        } else {
            ArityKind::Variadic
        }
    }

    /// Largest accepted positional count, `None` with a rest parameter
    pub fn max_positional(&self) -> Option<usize> {
        if self.rest {
            None
        } else {
            Some(self.required + self.optional)
        }
    }

    fn expected(&self) -> String {
        match self.max_positional() {
            None => format!("{}+", self.required),
            Some(max) if max == self.required => self.required.to_string(),
            Some(max) => format!("{}..{}", self.required, max),
        }
    }

    /// Check a call against this signature
    pub fn check(
        &self,
        method: &str,
        positional: usize,
        keywords: &BTreeMap<String, Value>,
    ) -> Result<()> {
        let too_many = self.max_positional().is_some_and(|max| positional > max);
        if positional < self.required || too_many {
            return Err(Error::arity(method, self.expected(), positional.to_string()));
        }

        let missing: Vec<&str> = self
            .keywords
            .iter()
            .filter(|k| k.required && !keywords.contains_key(&k.name))
            .map(|k| k.name.as_str())
            .collect();
        if !missing.is_empty() {
            return Err(Error::arity(
                method,
                format!("keywords: {}", missing.join(", ")),
                "missing keywords",
            ));
        }

        if !self.keyrest {
            let unknown: Vec<&str> = keywords
                .keys()
                .filter(|name| !self.keywords.iter().any(|k| &k.name == *name))
                .map(|name| name.as_str())
                .collect();
            if !unknown.is_empty() {
                return Err(Error::arity(
                    method,
                    "declared keywords",
                    format!("unknown keywords: {}", unknown.join(", ")),
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn kw(pairs: &[(&str, Value)]) -> BTreeMap<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_arity_kind() {
        assert_eq!(Signature::niladic().arity_kind(), ArityKind::Niladic);
        assert_eq!(Signature::positional(1).arity_kind(), ArityKind::Variadic);
        assert_eq!(Signature::new().optional(1).arity_kind(), ArityKind::Variadic);
        assert_eq!(
            Signature::new().optional_keyword("a").arity_kind(),
            ArityKind::Variadic
        );
    }

    #[test]
    fn test_positional_bounds() {
        let sig = Signature::new().required(1).optional(1);
        assert_eq!(sig.max_positional(), Some(2));
        assert!(sig.check("f", 1, &BTreeMap::new()).is_ok());
        assert!(sig.check("f", 2, &BTreeMap::new()).is_ok());

        let err = sig.check("f", 3, &BTreeMap::new()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "wrong number of arguments for `f' (given 3, expected 1..2)"
        );
        assert!(sig.check("f", 0, &BTreeMap::new()).is_err());

        let rest = Signature::positional(1).rest();
        assert_eq!(rest.max_positional(), None);
        assert!(rest.check("f", 7, &BTreeMap::new()).is_ok());
    }

    #[test]
    fn test_keywords() {
        let sig = Signature::new().keyword("a2").optional_keyword("a3");
        assert!(sig.check("f", 0, &kw(&[("a2", json!(1))])).is_ok());
        assert!(sig.check("f", 0, &kw(&[("a3", json!(1))])).is_err());
        assert!(sig
            .check("f", 0, &kw(&[("a2", json!(1)), ("zz", json!(2))]))
            .is_err());

        let open = sig.keyrest();
        assert!(open
            .check("f", 0, &kw(&[("a2", json!(1)), ("zz", json!(2))]))
            .is_ok());
    }

    #[test]
    fn test_visibility_display() {
        assert_eq!(Visibility::Private.to_string(), "private");
        assert_eq!(Visibility::default(), Visibility::Public);
    }
}
