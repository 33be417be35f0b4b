//! 영속 키-값 저장소.
//!
//! 세션 스토어는 고정된 네임스페이스 키 하나에 직렬화된 스냅샷을 읽고 씁니다.
//! 강제 로그아웃이 HTTP 응답 처리 도중 동기적으로 일어나므로 인터페이스도 동기입니다.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use crate::error::StorageError;

/// 세션 스냅샷 저장소.
pub trait SessionStorage: Send + Sync {
    /// 키에 저장된 값 조회. 없으면 `None`.
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// 키에 값 저장 (기존 값 덮어쓰기).
    fn save(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// 키 삭제. 없는 키는 에러가 아닙니다.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// 파일 기반 저장소.
///
/// 키마다 `{dir}/{key}.json` 파일 하나를 사용합니다. 쓰기는 임시 파일에 기록한 뒤
/// rename 하므로 중간에 중단되어도 이전 스냅샷이 깨지지 않습니다.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// 저장 디렉토리를 만들고 저장소를 생성합니다.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self, StorageError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl SessionStorage for FileStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)?) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(key)?) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// 메모리 기반 저장소 (테스트 및 임시 세션용).
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// 저장된 원본 문자열 (검증 없이).
    pub fn raw(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }
}

impl SessionStorage for MemoryStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.lock().get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.lock().remove(key);
        Ok(())
    }
}
