/// Serialisable profile representations
use crate::account::Property;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

/// Name of the property carrying the encoded texture payload
pub const TEXTURES_PROPERTY: &str = "textures";

/// Profile reduced to identity, as seen in `availableProfiles`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleProfile {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TextureState {
    Active,
    Inactive,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkinView {
    pub id: String,
    pub state: TextureState,
    pub url: String,
    pub variant: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapeView {
    pub id: String,
    pub state: TextureState,
    pub url: String,
    pub alias: String,
}

/// Profile with all texture data, as returned to its owner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FullProfile {
    pub id: String,
    pub name: String,
    pub skins: Vec<SkinView>,
    pub capes: Vec<CapeView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextureUrl {
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextureMap {
    #[serde(rename = "SKIN", default, skip_serializing_if = "Option::is_none")]
    pub skin: Option<TextureUrl>,
    #[serde(rename = "CAPE", default, skip_serializing_if = "Option::is_none")]
    pub cape: Option<TextureUrl>,
}

/// Decoded content of the `textures` property
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TexturesPayload {
    /// Milliseconds since the epoch
    pub timestamp: i64,
    pub profile_id: String,
    pub profile_name: String,
    pub textures: TextureMap,
}

impl TexturesPayload {
    /// Base64 of the JSON encoding
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        Ok(STANDARD.encode(serde_json::to_vec(self)?))
    }

    pub fn decode(value: &str) -> Option<Self> {
        let bytes = STANDARD.decode(value).ok()?;
        serde_json::from_slice(&bytes).ok()
    }
}

/// Profile with an opaque, unsigned `textures` property
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TexturedProfile {
    /// UUID without dashes
    pub id: String,
    pub name: String,
    pub properties: Vec<Property>,
}

impl TexturedProfile {
    /// Decode the `textures` property, if present and well formed
    pub fn textures(&self) -> Option<TexturesPayload> {
        self.properties
            .iter()
            .find(|p| p.name == TEXTURES_PROPERTY)
            .and_then(|p| TexturesPayload::decode(&p.value))
    }
}
