//! Config - 설정 관리
//!
//! - `memo.rs` - MemoConfig 메모이제이션 설정

mod memo;

pub use memo::{MemoConfig, MEMO_CONFIG_FILE};
