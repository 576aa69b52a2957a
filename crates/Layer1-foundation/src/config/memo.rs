//! Memo Config - 메모이제이션 동작 설정
//!
//! 글로벌(~/.config/memo/memo.json) + 프로젝트(.memo/memo.json) 순서로 로드

use crate::storage::JsonStore;
use crate::Result;
use serde::{Deserialize, Serialize};

/// 설정 파일명
pub const MEMO_CONFIG_FILE: &str = "memo.json";

/// Memoization behavior configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoConfig {
    /// Warm every memoized method of an instance right before it freezes
    #[serde(default = "default_true")]
    pub prime_on_freeze: bool,

    /// Treat a trailing boolean `true` as a reload marker for methods with
    /// parameters. The reload token is always recognized.
    #[serde(default = "default_true")]
    pub reload_on_true: bool,

    /// Record where `memoize` was called, for `BlockNotSupported` messages
    #[serde(default = "default_true")]
    pub capture_declaration_site: bool,

    /// Emit a trace event for every hit, miss and skipped write
    #[serde(default)]
    pub trace_calls: bool,
}

fn default_true() -> bool {
    true
}

impl Default for MemoConfig {
    fn default() -> Self {
        Self {
            prime_on_freeze: true,
            reload_on_true: true,
            capture_declaration_site: true,
            trace_calls: false,
        }
    }
}

impl MemoConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only the reload token forces recomputation
    pub fn strict() -> Self {
        Self {
            reload_on_true: false,
            ..Self::default()
        }
    }

    /// Freezing does not prime caches and nothing is traced
    pub fn quiet() -> Self {
        Self {
            prime_on_freeze: false,
            capture_declaration_site: false,
            trace_calls: false,
            ..Self::default()
        }
    }

    // ========================================================================
    // Load / Save
    // ========================================================================

    /// 글로벌 + 프로젝트 로드 (프로젝트 우선)
    pub fn load() -> Result<Self> {
        let mut config = Self::new();

        // 1. 글로벌 설정
        if let Ok(global) = JsonStore::global() {
            if let Some(global_config) = global.load_optional::<MemoConfig>(MEMO_CONFIG_FILE)? {
                config = global_config;
            }
        }

        // 2. 프로젝트 설정
        if let Ok(project) = JsonStore::current_project() {
            if let Some(project_config) = project.load_optional::<MemoConfig>(MEMO_CONFIG_FILE)? {
                config = project_config;
            }
        }

        Ok(config)
    }

    /// 지정한 저장소에서 로드 (없으면 기본값)
    pub fn load_from(store: &JsonStore) -> Result<Self> {
        Ok(store
            .load_optional::<MemoConfig>(MEMO_CONFIG_FILE)?
            .unwrap_or_default())
    }

    /// 지정한 저장소에 저장
    pub fn save(&self, store: &JsonStore) -> Result<()> {
        store.save(MEMO_CONFIG_FILE, self)
    }
}
