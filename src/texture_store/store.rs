/// Texture store
///
/// Validates uploaded and downloaded skins before handing them to the backend.
use crate::{
    config::TextureConfig,
    error::{YggError, YggResult},
    texture_store::{disk::DiskTextureBackend, TextureBackend, TextureKind},
};
use std::path::PathBuf;
use std::sync::Arc;

const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

#[derive(Clone)]
pub struct TextureStore {
    backend: Arc<dyn TextureBackend>,
    http: reqwest::Client,
    max_skin_bytes: usize,
}

impl TextureStore {
    /// Texture store on the local filesystem
    pub fn on_disk(directory: PathBuf, config: &TextureConfig, http: reqwest::Client) -> Self {
        Self::new(Arc::new(DiskTextureBackend::new(directory)), config, http)
    }

    pub fn new(backend: Arc<dyn TextureBackend>, config: &TextureConfig, http: reqwest::Client) -> Self {
        Self {
            backend,
            http,
            max_skin_bytes: config.max_skin_bytes,
        }
    }

    pub fn backend(&self) -> &Arc<dyn TextureBackend> {
        &self.backend
    }

    /// Store an uploaded skin for a profile
    pub async fn store_skin(&self, uuid: &str, data: Vec<u8>) -> YggResult<()> {
        self.check_skin(&data)?;
        self.backend.put(TextureKind::Skin, uuid, data).await?;
        tracing::debug!(profile = %uuid, "stored skin");
        Ok(())
    }

    /// Download a skin from a URL and store it for a profile
    pub async fn download_skin(&self, uuid: &str, url: &str) -> YggResult<()> {
        let parsed = reqwest::Url::parse(url)
            .map_err(|_| YggError::bad_request(format!("Invalid skin URL: {}", url)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(YggError::bad_request("Skin URL must use http or https"));
        }

        let mut response = self.http.get(parsed).send().await?;
        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), url, "skin download failed");
            return Err(YggError::bad_request("Unable to download skin."));
        }

        if response
            .content_length()
            .is_some_and(|len| len > self.max_skin_bytes as u64)
        {
            return Err(YggError::bad_request("Skin file is too large."));
        }

        // Content-Length is optional, so the limit is enforced while reading
        let mut data = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            if data.len() + chunk.len() > self.max_skin_bytes {
                tracing::warn!(url, "skin download exceeded size limit");
                return Err(YggError::bad_request("Skin file is too large."));
            }
            data.extend_from_slice(&chunk);
        }

        self.store_skin(uuid, data).await
    }

    pub async fn remove_skin(&self, uuid: &str) -> YggResult<()> {
        self.backend.delete(TextureKind::Skin, uuid).await
    }

    fn check_skin(&self, data: &[u8]) -> YggResult<()> {
        if data.len() > self.max_skin_bytes {
            return Err(YggError::bad_request("Skin file is too large."));
        }
        if !data.starts_with(PNG_SIGNATURE) {
            return Err(YggError::bad_request("Skin must be a PNG image."));
        }
        Ok(())
    }
}
