//! # memo-foundation
//!
//! Foundation layer for memo:
//! - Error: 공통 에러 타입
//! - Config: 메모이제이션 설정 (MemoConfig)
//! - Storage: JsonStore (설정 파일)
//! - Cache: 캐시 키 인코딩/해시 유틸리티

pub mod cache;
pub mod config;
pub mod error;
pub mod storage;

// ============================================================================
// Error
// ============================================================================
pub use error::{Error, Result};

// ============================================================================
// Config (설정)
// ============================================================================
pub use config::{MemoConfig, MEMO_CONFIG_FILE};

// ============================================================================
// Storage (저장소)
// ============================================================================
pub use storage::{JsonStore, APP_DIR};

// ============================================================================
// Cache (키 인코딩)
// ============================================================================
pub use cache::{canonical_json, compute_hash, write_canonical};
