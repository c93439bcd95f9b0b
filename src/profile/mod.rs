/// Profiles and their wire representations
///
/// The resolver maps accounts to their selected profile and owns the skin and
/// cape state of profiles. The view types are what the protocol serialises.

mod resolver;
mod views;

pub use resolver::{ProfilePrivileges, ProfileResolver};
pub use views::{
    CapeView, FullProfile, SimpleProfile, SkinView, TextureMap, TextureState, TextureUrl, TexturedProfile,
    TexturesPayload, TEXTURES_PROPERTY,
};

use crate::error::{YggError, YggResult};
use uuid::Uuid;

/// Parse a profile UUID in either the dashless wire form or hyphenated form
///
/// Returns the hyphenated lowercase form stored in the database.
pub fn normalize_uuid(raw: &str) -> YggResult<String> {
    Uuid::parse_str(raw.trim())
        .map(|uuid| uuid.hyphenated().to_string())
        .map_err(|_| YggError::bad_request(format!("Invalid UUID: {}", raw)))
}
