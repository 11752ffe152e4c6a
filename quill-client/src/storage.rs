//! Долговременное хранилище сессии.
//!
//! Сессия хранится под двумя ключами: токен и сериализованный профиль.
//! Оба ключа пишутся и удаляются одной пачкой (`apply`).

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;
use tracing::warn;

/// Ключ токена.
pub const TOKEN_KEY: &str = "quill_token";
/// Ключ сериализованного профиля.
pub const USER_KEY: &str = "quill_user";

#[derive(Debug, Error)]
/// Ошибки хранилища сессии.
pub enum StorageError {
    /// Ошибка файловой системы.
    #[error("session storage io error: {0}")]
    Io(#[from] io::Error),

    /// Содержимое хранилища не удалось (де)сериализовать.
    #[error("session storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Мьютекс хранилища отравлен паникой в другом потоке.
    #[error("session storage lock poisoned")]
    Poisoned,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Одна операция над хранилищем.
pub enum StorageOp {
    /// Записать значение.
    Set(&'static str, String),
    /// Удалить ключ.
    Remove(&'static str),
}

/// Ключ-значение хранилище, переживающее перезапуск процесса.
pub trait SessionStorage: Send + Sync {
    /// Читает значение по ключу.
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Применяет пачку операций целиком.
    fn apply(&self, ops: &[StorageOp]) -> Result<(), StorageError>;
}

#[derive(Debug, Default)]
/// Хранилище в памяти процесса: для тестов и встраивания.
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Создаёт пустое хранилище.
    pub fn new() -> Self {
        Self::default()
    }

    /// Количество сохранённых ключей.
    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    /// `true`, если ничего не сохранено.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SessionStorage for MemoryStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn apply(&self, ops: &[StorageOp]) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        for op in ops {
            match op {
                StorageOp::Set(key, value) => {
                    entries.insert((*key).to_string(), value.clone());
                }
                StorageOp::Remove(key) => {
                    entries.remove(*key);
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug)]
/// Хранилище в JSON-файле.
///
/// Весь файл перезаписывается через временный файл и `rename`, поэтому
/// пачка операций либо применяется целиком, либо не применяется.
pub struct FileStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStorage {
    /// Хранилище в файле `path`. Файл создаётся при первой записи.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Путь к файлу.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Текущее содержимое для перезаписи: нечитаемый файл считается пустым,
    /// следующая запись его заменит.
    fn entries_for_write(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match self.read_entries() {
            Err(StorageError::Serialization(err)) => {
                warn!(
                    path = %self.path.display(),
                    error = %err,
                    "session file is unreadable, overwriting it"
                );
                Ok(BTreeMap::new())
            }
            other => other,
        }
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(err) => Err(err.into()),
        }
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if entries.is_empty() {
            return match fs::remove_file(&self.path) {
                Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err.into()),
                _ => Ok(()),
            };
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(entries)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl SessionStorage for FileStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(self.read_entries()?.remove(key))
    }

    fn apply(&self, ops: &[StorageOp]) -> Result<(), StorageError> {
        let _guard = self.lock.lock().map_err(|_| StorageError::Poisoned)?;
        let mut entries = self.entries_for_write()?;
        for op in ops {
            match op {
                StorageOp::Set(key, value) => {
                    entries.insert((*key).to_string(), value.clone());
                }
                StorageOp::Remove(key) => {
                    entries.remove(*key);
                }
            }
        }
        self.write_entries(&entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_storage_applies_batches() {
        let storage = MemoryStorage::new();
        storage
            .apply(&[
                StorageOp::Set(TOKEN_KEY, "abc".to_string()),
                StorageOp::Set(USER_KEY, "{}".to_string()),
            ])
            .expect("apply must succeed");
        assert_eq!(storage.len(), 2);

        storage
            .apply(&[StorageOp::Remove(TOKEN_KEY), StorageOp::Remove(USER_KEY)])
            .expect("apply must succeed");
        assert!(storage.is_empty());
    }

    #[test]
    fn file_storage_survives_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("session.json");

        FileStorage::new(&path)
            .apply(&[StorageOp::Set(TOKEN_KEY, "abc.def.ghi".to_string())])
            .expect("apply must succeed");

        let reopened = FileStorage::new(&path);
        let token = reopened.load(TOKEN_KEY).expect("load must succeed");
        assert_eq!(token.as_deref(), Some("abc.def.ghi"));
        assert!(reopened.load(USER_KEY).expect("load must succeed").is_none());
    }

    #[test]
    fn file_storage_removes_file_when_emptied() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("session.json");
        let storage = FileStorage::new(&path);

        storage
            .apply(&[StorageOp::Set(TOKEN_KEY, "t".to_string())])
            .expect("apply must succeed");
        assert!(path.exists());

        storage
            .apply(&[StorageOp::Remove(TOKEN_KEY), StorageOp::Remove(USER_KEY)])
            .expect("apply must succeed");
        assert!(!path.exists());
    }

    #[test]
    fn file_storage_missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = FileStorage::new(dir.path().join("absent.json"));
        assert!(storage.load(TOKEN_KEY).expect("load must succeed").is_none());
    }

    #[test]
    fn file_storage_reports_corruption() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("session.json");
        fs::write(&path, "{not-json}").expect("write fixture");

        let err = FileStorage::new(&path)
            .load(TOKEN_KEY)
            .expect_err("corrupted file must fail");
        assert!(matches!(err, StorageError::Serialization(_)));
    }

    #[test]
    fn file_storage_overwrites_corrupted_file_on_apply() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("session.json");
        fs::write(&path, "{not-json}").expect("write fixture");
        let storage = FileStorage::new(&path);

        storage
            .apply(&[StorageOp::Set(TOKEN_KEY, "fresh".to_string())])
            .expect("apply must succeed");
        assert_eq!(
            storage.load(TOKEN_KEY).expect("load must succeed").as_deref(),
            Some("fresh")
        );

        fs::write(&path, "{not-json}").expect("write fixture");
        storage
            .apply(&[StorageOp::Remove(TOKEN_KEY), StorageOp::Remove(USER_KEY)])
            .expect("clearing a corrupted file must succeed");
        assert!(!path.exists());
    }
}
