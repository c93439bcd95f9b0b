/// Texture Storage
///
/// Skin and cape image files. They are written under the textures directory
/// as `skins/{uuid}` and `capes/{name}`, the same layout the `/textures` route serves.

pub mod disk;
mod store;

pub use store::TextureStore;

use crate::error::YggResult;
use async_trait::async_trait;

/// Kind of texture, which picks the subdirectory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureKind {
    Skin,
    Cape,
}

impl TextureKind {
    pub fn directory(&self) -> &'static str {
        match self {
            TextureKind::Skin => "skins",
            TextureKind::Cape => "capes",
        }
    }
}

/// Texture storage backend trait
#[async_trait]
pub trait TextureBackend: Send + Sync {
    /// Store a texture, replacing any previous one under the same key
    async fn put(&self, kind: TextureKind, key: &str, data: Vec<u8>) -> YggResult<()>;

    async fn get(&self, kind: TextureKind, key: &str) -> YggResult<Option<Vec<u8>>>;

    /// Delete a texture; deleting a missing texture is not an error
    async fn delete(&self, kind: TextureKind, key: &str) -> YggResult<()>;

    async fn exists(&self, kind: TextureKind, key: &str) -> YggResult<bool>;
}
