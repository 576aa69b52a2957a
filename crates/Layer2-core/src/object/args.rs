//! Call arguments

use memo_foundation::{Error, Result};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// A callback passed alongside the arguments of a call
pub type Block = Arc<dyn Fn(&[Value]) -> Result<Value> + Send + Sync>;

/// One positional argument
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Value(Value),
    /// The reload token: forces a memoized method to recompute
    Reload,
}

impl Arg {
    pub fn value(value: impl Into<Value>) -> Self {
        Arg::Value(value.into())
    }

    /// Whether this argument can stand as a trailing reload marker
    pub fn is_reload_marker(&self, accept_true: bool) -> bool {
        match self {
            Arg::Reload => true,
            Arg::Value(Value::Bool(true)) => accept_true,
            Arg::Value(_) => false,
        }
    }

    /// Truthiness of a niladic reload flag
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Arg::Value(Value::Null) | Arg::Value(Value::Bool(false)))
    }
}

/// Arguments of a single call
///
/// ```rust,ignore
/// person.call("sleep", Args::new().arg(4).reload())?;
/// helper.call("calc", Args::new().keyword("a2", 12).keyword("a3", 13))?;
/// ```
#[derive(Clone, Default)]
pub struct Args {
    positional: Vec<Arg>,
    keywords: BTreeMap<String, Value>,
    block: Option<Block>,
}

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    /// No arguments at all
    pub fn none() -> Self {
        Self::default()
    }

    /// Build from plain positional values
    pub fn from_values(values: impl IntoIterator<Item = Value>) -> Self {
        Self {
            positional: values.into_iter().map(Arg::Value).collect(),
            ..Self::default()
        }
    }

    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(Arg::Value(value.into()));
        self
    }

    /// Append the reload token
    pub fn reload(mut self) -> Self {
        self.positional.push(Arg::Reload);
        self
    }

    pub fn keyword(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.keywords.insert(name.into(), value.into());
        self
    }

    pub fn with_block<F>(mut self, block: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        self.block = Some(Arc::new(block));
        self
    }

    pub fn positional(&self) -> &[Arg] {
        &self.positional
    }

    pub fn positional_mut(&mut self) -> &mut Vec<Arg> {
        &mut self.positional
    }

    pub fn keywords(&self) -> &BTreeMap<String, Value> {
        &self.keywords
    }

    pub fn block(&self) -> Option<&Block> {
        self.block.as_ref()
    }

    pub fn has_block(&self) -> bool {
        self.block.is_some()
    }

    pub fn len(&self) -> usize {
        self.positional.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.keywords.is_empty()
    }

    /// Plain values, rejecting a reload token the callee cannot accept
    pub fn into_parts(self) -> Result<(Vec<Value>, BTreeMap<String, Value>, Option<Block>)> {
        let mut values = Vec::with_capacity(self.positional.len());
        for (index, arg) in self.positional.into_iter().enumerate() {
            match arg {
                Arg::Value(value) => values.push(value),
                Arg::Reload => {
                    return Err(Error::InvalidArgument(format!(
                        "reload token at position {} is not a trailing reload marker",
                        index
                    )))
                }
            }
        }
        Ok((values, self.keywords, self.block))
    }
}

impl fmt::Debug for Args {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Args")
            .field("positional", &self.positional)
            .field("keywords", &self.keywords)
            .field("block", &self.block.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reload_marker() {
        assert!(Arg::Reload.is_reload_marker(false));
        assert!(Arg::value(true).is_reload_marker(true));
        assert!(!Arg::value(true).is_reload_marker(false));
        assert!(!Arg::value("reload").is_reload_marker(true));
    }

    #[test]
    fn test_truthiness() {
        assert!(Arg::Reload.is_truthy());
        assert!(Arg::value(0).is_truthy());
        assert!(!Arg::value(false).is_truthy());
        assert!(!Arg::Value(Value::Null).is_truthy());
    }

    #[test]
    fn test_into_parts_rejects_stray_reload() {
        let args = Args::new().arg(1).reload().arg(2);
        assert!(matches!(args.into_parts(), Err(Error::InvalidArgument(_))));

        let (values, keywords, block) = Args::new()
            .arg(1)
            .keyword("a", "x")
            .into_parts()
            .unwrap();
        assert_eq!(values, vec![json!(1)]);
        assert_eq!(keywords.get("a"), Some(&json!("x")));
        assert!(block.is_none());
    }
}
