//! Error types for memo
//!
//! 모든 에러를 중앙에서 관리

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// memo 에러 타입
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // 선언 관련 (configuration)
    // ========================================================================
    #[error("Already memoized {method} on {scope}{}", identifier_suffix(.identifier))]
    AlreadyMemoized {
        scope: String,
        method: String,
        identifier: Option<String>,
    },

    #[error("Not memoized: {0}")]
    NotMemoized(String),

    #[error("Invalid scope: {0}")]
    InvalidScope(String),

    // ========================================================================
    // 호출 관련 (usage)
    // ========================================================================
    #[error("Blocks are not supported with memoized method {method}{}", declared_suffix(.declared_at))]
    BlockNotSupported {
        method: String,
        declared_at: Option<String>,
    },

    #[error("undefined method `{method}' for {scope}")]
    NoSuchMethod { scope: String, method: String },

    #[error("super: no superclass method `{method}'")]
    NoSuperMethod { method: String },

    #[error("{visibility} method `{method}' called")]
    Visibility { method: String, visibility: String },

    #[error("wrong number of arguments for `{method}' (given {given}, expected {expected})")]
    Arity {
        method: String,
        expected: String,
        given: String,
    },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Instance state is not a {0}")]
    StateType(&'static str),

    // ========================================================================
    // 메서드 본문에서 발생한 에러
    // ========================================================================
    #[error("{0}")]
    Raised(String),

    // ========================================================================
    // 설정/저장소 관련
    // ========================================================================
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn identifier_suffix(identifier: &Option<String>) -> String {
    identifier
        .as_ref()
        .map(|id| format!(" (identifier: {})", id))
        .unwrap_or_default()
}

fn declared_suffix(declared_at: &Option<String>) -> String {
    declared_at
        .as_ref()
        .map(|site| format!(" (memoized at {})", site))
        .unwrap_or_default()
}

impl Error {
    /// 선언 단계의 설정 오류인지 확인
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::AlreadyMemoized { .. } | Error::InvalidScope(_) | Error::Config(_)
        )
    }

    /// 호출 방식이 잘못된 경우인지 확인
    pub fn is_usage(&self) -> bool {
        matches!(
            self,
            Error::BlockNotSupported { .. }
                | Error::Visibility { .. }
                | Error::Arity { .. }
                | Error::InvalidArgument(_)
                | Error::NoSuchMethod { .. }
        )
    }

    /// 메서드 본문 에러 생성 헬퍼
    pub fn raised(message: impl Into<String>) -> Self {
        Error::Raised(message.into())
    }

    /// Arity 에러 생성 헬퍼
    pub fn arity(
        method: impl Into<String>,
        expected: impl Into<String>,
        given: impl Into<String>,
    ) -> Self {
        Error::Arity {
            method: method.into(),
            expected: expected.into(),
            given: given.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_already_memoized_message() {
        let err = Error::AlreadyMemoized {
            scope: "Person".to_string(),
            method: "name".to_string(),
            identifier: None,
        };
        assert_eq!(err.to_string(), "Already memoized name on Person");
        assert!(err.is_configuration());

        let err = Error::AlreadyMemoized {
            scope: "Student".to_string(),
            method: "name".to_string(),
            identifier: Some("student".to_string()),
        };
        assert!(err.to_string().ends_with("(identifier: student)"));
    }

    #[test]
    fn test_block_message_carries_site() {
        let err = Error::BlockNotSupported {
            method: "name".to_string(),
            declared_at: Some("tests/memoize_test.rs:42:5".to_string()),
        };
        assert!(err.to_string().contains("memoize_test.rs:42"));
        assert!(err.is_usage());
    }
}
