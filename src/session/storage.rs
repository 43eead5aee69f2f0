use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Mutex,
};

/// Name of the single record the session is persisted under.
pub const SESSION_KEY: &str = "keysbank_auth";

/// Durable home of the serialized session record.
#[async_trait]
pub trait SessionStorage: Send + Sync {
    /// Returns Ok(None) if no record was saved
    async fn load(&self) -> Result<Option<String>>;
    async fn save(&self, record: &str) -> Result<()>;
    /// Removing a record that doesn't exist is not an error
    async fn remove(&self) -> Result<()>;
}

/// Keeps the record in `<dir>/keysbank_auth.json`.
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            path: dir.join(format!("{SESSION_KEY}.json")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SessionStorage for FileStorage {
    async fn load(&self) -> Result<Option<String>> {
        if !tokio::fs::try_exists(&self.path).await? {
            return Ok(None);
        }
        Ok(Some(tokio::fs::read_to_string(&self.path).await?))
    }

    async fn save(&self, record: &str) -> Result<()> {
        log::info!("Saving session...");

        // Write to a temporary file, then move it into place
        let filename = self
            .path
            .file_name()
            .ok_or_else(|| anyhow!("Path has no filename"))?
            .to_str()
            .ok_or_else(|| anyhow!("Filename isn't valid utf-8"))?;
        if let Some(dir) = self.path.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }
        let tmppath = self.path.with_file_name(format!("{filename}.tmp"));
        tokio::fs::write(&tmppath, record).await?;
        tokio::fs::rename(&tmppath, &self.path).await?;

        log::info!("Saving session...done");
        Ok(())
    }

    async fn remove(&self) -> Result<()> {
        log::info!("Removing session...");
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {}
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => return Err(err.into()),
        }
        log::info!("Removing session...done");
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryStorage {
    record: Mutex<Option<String>>,
}

impl MemoryStorage {
    pub fn with_record(record: impl Into<String>) -> Self {
        Self {
            record: Mutex::new(Some(record.into())),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Option<String>>> {
        self.record
            .lock()
            .map_err(|_| anyhow!("Session storage lock poisoned"))
    }
}

#[async_trait]
impl SessionStorage for MemoryStorage {
    async fn load(&self) -> Result<Option<String>> {
        Ok(self.lock()?.clone())
    }

    async fn save(&self, record: &str) -> Result<()> {
        *self.lock()? = Some(record.to_string());
        Ok(())
    }

    async fn remove(&self) -> Result<()> {
        *self.lock()? = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn load_nonexisting() {
        let tempdir = tempfile::tempdir().unwrap();
        let storage = FileStorage::in_dir(tempdir.path());

        assert_eq!(None, storage.load().await.unwrap());
    }

    #[tokio::test]
    async fn save_and_load() {
        let tempdir = tempfile::tempdir().unwrap();
        let storage = FileStorage::in_dir(tempdir.path());

        storage.save(r#"{"a":1}"#).await.unwrap();
        assert_eq!(Some(r#"{"a":1}"#.to_string()), storage.load().await.unwrap());
        assert_eq!(tempdir.path().join("keysbank_auth.json"), storage.path());
    }

    #[tokio::test]
    async fn save_creates_missing_directory() {
        let tempdir = tempfile::tempdir().unwrap();
        let storage = FileStorage::in_dir(&tempdir.path().join("nested").join("sessions"));

        storage.save("record").await.unwrap();
        assert_eq!(Some("record".to_string()), storage.load().await.unwrap());
    }

    #[tokio::test]
    async fn overwrite_existing_record() {
        let tempdir = tempfile::tempdir().unwrap();
        let storage = FileStorage::in_dir(tempdir.path());

        storage.save("first").await.unwrap();
        storage.save("second").await.unwrap();
        assert_eq!(Some("second".to_string()), storage.load().await.unwrap());

        let leftovers: Vec<_> = std::fs::read_dir(tempdir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(vec![std::ffi::OsString::from("keysbank_auth.json")], leftovers);
    }

    #[tokio::test]
    async fn remove_record() {
        let tempdir = tempfile::tempdir().unwrap();
        let storage = FileStorage::in_dir(tempdir.path());

        storage.save("record").await.unwrap();
        storage.remove().await.unwrap();
        assert_eq!(None, storage.load().await.unwrap());
        assert!(!storage.path().exists());
    }

    #[tokio::test]
    async fn remove_nonexisting_is_ok() {
        let tempdir = tempfile::tempdir().unwrap();
        let storage = FileStorage::in_dir(tempdir.path());

        storage.remove().await.unwrap();
    }

    #[tokio::test]
    async fn memory_storage() {
        let storage = MemoryStorage::default();
        assert_eq!(None, storage.load().await.unwrap());
        storage.save("record").await.unwrap();
        assert_eq!(Some("record".to_string()), storage.load().await.unwrap());
        storage.remove().await.unwrap();
        assert_eq!(None, storage.load().await.unwrap());
    }
}
