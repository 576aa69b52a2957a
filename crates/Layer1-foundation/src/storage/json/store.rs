//! JSON 파일 저장소 - 설정 파일 한 디렉토리 단위

use crate::{Error, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// 글로벌/프로젝트 설정 디렉토리 이름
pub const APP_DIR: &str = "memo";

/// 한 디렉토리 아래의 JSON 파일들
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonStore {
    dir: PathBuf,
}

impl JsonStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// 글로벌 설정 (~/.config/memo/)
    pub fn global() -> Result<Self> {
        dirs::config_dir()
            .map(|dir| Self::new(dir.join(APP_DIR)))
            .ok_or_else(|| Error::Config("no config directory on this platform".to_string()))
    }

    /// 프로젝트 설정 (<root>/.memo/)
    pub fn project(root: impl AsRef<Path>) -> Self {
        Self::new(root.as_ref().join(format!(".{}", APP_DIR)))
    }

    /// 현재 디렉토리 기준 프로젝트 설정
    pub fn current_project() -> Result<Self> {
        Ok(Self::project(std::env::current_dir()?))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_of(&self, filename: &str) -> PathBuf {
        self.dir.join(filename)
    }

    pub fn contains(&self, filename: &str) -> bool {
        self.path_of(filename).is_file()
    }

    /// 파일을 읽어 역직렬화; 파싱 실패는 경로를 담은 Config 에러
    pub fn load<T: DeserializeOwned>(&self, filename: &str) -> Result<T> {
        let path = self.path_of(filename);
        let text = fs::read_to_string(&path)?;
        let value = serde_json::from_str(&text)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        debug!(path = %path.display(), "json loaded");
        Ok(value)
    }

    /// 파일이 없으면 `None`
    pub fn load_optional<T: DeserializeOwned>(&self, filename: &str) -> Result<Option<T>> {
        if !self.contains(filename) {
            return Ok(None);
        }
        self.load(filename).map(Some)
    }

    /// 디렉토리가 없으면 만든 뒤 pretty JSON 으로 저장
    pub fn save<T: Serialize>(&self, filename: &str, data: &T) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_of(filename);
        fs::write(&path, serde_json::to_string_pretty(data)?)?;
        debug!(path = %path.display(), "json saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::tempdir;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Sample {
        name: String,
    }

    #[test]
    fn test_project_dir_name() {
        let store = JsonStore::project("/tmp/work");
        assert!(store.dir().ends_with(".memo"));
    }

    #[test]
    fn test_save_then_load_optional() {
        let temp = tempdir().unwrap();
        let store = JsonStore::new(temp.path().join("nested"));

        assert!(store.load_optional::<Sample>("sample.json").unwrap().is_none());

        let sample = Sample {
            name: "memo".to_string(),
        };
        store.save("sample.json", &sample).unwrap();
        assert!(store.contains("sample.json"));
        assert_eq!(store.load_optional::<Sample>("sample.json").unwrap(), Some(sample));
    }

    #[test]
    fn test_parse_failure_is_config_error() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("bad.json"), "{ not json").unwrap();
        let store = JsonStore::new(temp.path());

        let err = store.load::<Sample>("bad.json").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("bad.json"));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let temp = tempdir().unwrap();
        let store = JsonStore::new(temp.path());
        assert!(matches!(store.load::<Sample>("none.json"), Err(Error::Io(_))));
    }
}
