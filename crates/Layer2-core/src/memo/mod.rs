//! Memoization engine
//!
//! - `spec`: what was memoized, where, under which identifier
//! - `key`: reload extraction and argument keys
//! - `store`: per-instance slots
//! - `wrapper`: the replacement installed under the original name
//! - `registry`: per-scope declarations and hierarchy enumeration
//! - `memoizer`: declaring and removing memoizations
//! - `lifecycle`: prime, flush and freeze priming

mod key;
mod memoizer;
mod registry;
mod spec;
mod store;
mod wrapper;

pub mod lifecycle;

pub use key::{CacheKey, KeyBuilder, PreparedCall};
pub use memoizer::{memoize, memoizer, MemoizeOptions, Memoizer};
pub use registry::{collect_specs, MemoRegistry, RegisteredSpec};
pub use spec::{SlotKey, WrappedMethodSpec};
pub use store::{CacheSlot, CacheStore, MemoStats};
pub use wrapper::MemoizedMethod;
