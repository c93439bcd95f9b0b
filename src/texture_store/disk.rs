/// Disk-based texture storage backend
use crate::{
    error::{YggError, YggResult},
    texture_store::{TextureBackend, TextureKind},
};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;

/// Disk storage backend
#[derive(Clone)]
pub struct DiskTextureBackend {
    base_path: PathBuf,
}

impl DiskTextureBackend {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    /// Path of a texture file: {base}/{kind}/{key}
    fn texture_path(&self, kind: TextureKind, key: &str) -> YggResult<PathBuf> {
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            return Err(YggError::bad_request(format!("Invalid texture key: {}", key)));
        }
        Ok(self.base_path.join(kind.directory()).join(key))
    }
}

#[async_trait]
impl TextureBackend for DiskTextureBackend {
    async fn put(&self, kind: TextureKind, key: &str, data: Vec<u8>) -> YggResult<()> {
        let path = self.texture_path(kind, key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        fs::write(&path, data).await?;
        Ok(())
    }

    async fn get(&self, kind: TextureKind, key: &str) -> YggResult<Option<Vec<u8>>> {
        let path = self.texture_path(kind, key)?;

        match fs::read(&path).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, kind: TextureKind, key: &str) -> YggResult<()> {
        let path = self.texture_path(kind, key)?;

        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, kind: TextureKind, key: &str) -> YggResult<bool> {
        let path = self.texture_path(kind, key)?;
        Ok(fs::try_exists(&path).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_put_and_get_texture() {
        let dir = tempdir().unwrap();
        let backend = DiskTextureBackend::new(dir.path().to_path_buf());

        let data = b"skin bytes".to_vec();
        backend.put(TextureKind::Skin, "abc", data.clone()).await.unwrap();

        assert_eq!(backend.get(TextureKind::Skin, "abc").await.unwrap(), Some(data));
        assert!(dir.path().join("skins").join("abc").exists());
        assert_eq!(backend.get(TextureKind::Cape, "abc").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete_texture() {
        let dir = tempdir().unwrap();
        let backend = DiskTextureBackend::new(dir.path().to_path_buf());

        backend.put(TextureKind::Cape, "founder", b"cape".to_vec()).await.unwrap();
        assert!(backend.exists(TextureKind::Cape, "founder").await.unwrap());

        backend.delete(TextureKind::Cape, "founder").await.unwrap();
        assert!(!backend.exists(TextureKind::Cape, "founder").await.unwrap());

        // Deleting again is fine
        backend.delete(TextureKind::Cape, "founder").await.unwrap();
    }

    #[tokio::test]
    async fn test_rejects_path_traversal() {
        let dir = tempdir().unwrap();
        let backend = DiskTextureBackend::new(dir.path().to_path_buf());

        assert!(backend.put(TextureKind::Skin, "../escape", vec![1]).await.is_err());
        assert!(backend.get(TextureKind::Skin, "a/b").await.is_err());
        assert!(backend.delete(TextureKind::Skin, "").await.is_err());
    }
}
