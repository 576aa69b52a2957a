//! Cache utilities
//!
//! Key encoding shared by the memoization engine:
//! - `canonical_json`: order-independent text form of a JSON value
//! - `compute_hash`: fingerprints for log fields

mod hash;

pub use hash::{canonical_json, compute_hash, write_canonical};
