//! memo-core: Core Runtime for memo
//!
//! Layer2 - 객체 모델 + 메서드 메모이제이션 엔진
//!
//! # 주요 모듈
//!
//! - `object`: 스코프(클래스/모듈/싱글톤), 인스턴스, 메서드, 시그니처, 인자
//! - `memo`: 키 빌더, 래퍼, 캐시 저장소, 레지스트리, 라이프사이클
//!
//! # 사용 예시
//!
//! ```ignore
//! use memo_core::{Args, Scope, Signature};
//! use serde_json::json;
//!
//! let person = Scope::class("Person");
//! person.define("age", Signature::niladic(), |_| Ok(json!(expensive_age())));
//! person.memoize("age")?;
//!
//! let josh = person.new_instance(())?;
//! josh.call("age", Args::none())?;           // 계산
//! josh.call("age", Args::none())?;           // 캐시
//! josh.call("age", Args::new().reload())?;   // 재계산 후 덮어쓰기
//!
//! josh.flush_cache(&["age"])?;
//! josh.freeze()?;                            // 동결 전 캐시 채움
//! ```

pub mod memo;
pub mod object;

// ============================================================================
// Re-exports: Object model
// ============================================================================
pub use object::{
    Arg, Args, ArityKind, Block, CallContext, Callable, FreezeHook, Instance, InstanceId,
    Invocation, KeywordParam, Method, MethodBody, Scope, ScopeId, ScopeKind, Signature,
    Visibility,
};

// ============================================================================
// Re-exports: Memoization
// ============================================================================
pub use memo::{
    collect_specs, memoize, memoizer, CacheKey, CacheSlot, CacheStore, KeyBuilder, MemoRegistry,
    MemoStats, MemoizeOptions, MemoizedMethod, Memoizer, PreparedCall, RegisteredSpec, SlotKey,
    WrappedMethodSpec,
};

// Layer1 re-exports
pub use memo_foundation::{Error, JsonStore, MemoConfig, Result};

/// Layer2 버전
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_exports() {
        // 최상위 export로 전체 흐름 확인
        let scope = Scope::class("Exported");
        scope.define("value", Signature::niladic(), |_| Ok(json!(1)));
        scope.memoize("value").unwrap();
        let instance = scope.new_instance(()).unwrap();
        assert_eq!(instance.call("value", Args::none()).unwrap(), json!(1));
        assert_eq!(scope.all_memoized_specs().len(), 1);
    }
}
