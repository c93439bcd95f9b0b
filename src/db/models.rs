/// Row types for the accounts, profiles, tokens, sessions and capes tables
use crate::error::{YggError, YggResult};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Account record in the database
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub language: String,
    pub country: String,
    pub selected_profile: Option<i64>,
}

/// Profile record in the database
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Profile {
    pub id: i64,
    /// Hyphenated lowercase UUID
    pub uuid: String,
    pub created: i64,
    pub owner: i64,
    pub name: String,
    pub name_history: String,
    pub skin_variant: String,
    /// Comma-delimited cape ids
    pub capes: Option<String>,
    pub active_cape: Option<i64>,
    /// JSON blob of privileges and profanity filter preferences
    pub attributes: String,
}

impl Profile {
    /// Cape ids this profile owns, in stored order
    pub fn owned_cape_ids(&self) -> Vec<i64> {
        self.capes
            .as_deref()
            .unwrap_or("")
            .split(',')
            .filter_map(|id| id.trim().parse().ok())
            .collect()
    }

    pub fn skin(&self) -> SkinVariant {
        SkinVariant::from_str(&self.skin_variant).unwrap_or(SkinVariant::None)
    }

    /// UUID in the dashless wire format
    pub fn undashed_uuid(&self) -> String {
        self.uuid.replace('-', "")
    }
}

/// Token record in the database
#[derive(Debug, Clone, FromRow)]
pub struct Token {
    pub id: i64,
    pub access: String,
    pub client: String,
    pub account: i64,
    pub issued: i64,
    pub expires: i64,
}

/// Pending join record
#[derive(Debug, Clone, FromRow)]
pub struct Session {
    pub id: i64,
    pub profile: i64,
    pub server_id: String,
    pub ip_addr: String,
    pub created: i64,
}

/// Cape record in the database
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Cape {
    pub id: i64,
    pub name: String,
    pub alias: String,
}

/// Skin model of a profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SkinVariant {
    None,
    Classic,
    Slim,
}

impl SkinVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkinVariant::None => "NONE",
            SkinVariant::Classic => "CLASSIC",
            SkinVariant::Slim => "SLIM",
        }
    }

    pub fn from_str(s: &str) -> YggResult<Self> {
        match s.trim().to_uppercase().as_str() {
            "NONE" => Ok(SkinVariant::None),
            "CLASSIC" => Ok(SkinVariant::Classic),
            "SLIM" => Ok(SkinVariant::Slim),
            _ => Err(YggError::bad_request(format!("Invalid skin variant: {}", s))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile_with_capes(capes: Option<&str>) -> Profile {
        Profile {
            id: 1,
            uuid: "0b3a1c8e-7f2d-4e55-9a61-3d2f8c4b5e10".to_string(),
            created: 0,
            owner: 1,
            name: "Steve".to_string(),
            name_history: "Steve".to_string(),
            skin_variant: "NONE".to_string(),
            capes: capes.map(str::to_string),
            active_cape: None,
            attributes: "{}".to_string(),
        }
    }

    #[test]
    fn test_owned_cape_ids() {
        assert!(profile_with_capes(None).owned_cape_ids().is_empty());
        assert!(profile_with_capes(Some("")).owned_cape_ids().is_empty());
        assert_eq!(profile_with_capes(Some("3")).owned_cape_ids(), vec![3]);
        assert_eq!(profile_with_capes(Some("1,4, 7")).owned_cape_ids(), vec![1, 4, 7]);
    }

    #[test]
    fn test_skin_variant_parsing() {
        assert_eq!(SkinVariant::from_str("classic").unwrap(), SkinVariant::Classic);
        assert_eq!(SkinVariant::from_str("SLIM").unwrap(), SkinVariant::Slim);
        assert_eq!(SkinVariant::from_str("none").unwrap(), SkinVariant::None);
        assert!(SkinVariant::from_str("wide").is_err());
    }

    #[test]
    fn test_undashed_uuid() {
        let profile = profile_with_capes(None);
        assert_eq!(profile.undashed_uuid(), "0b3a1c8e7f2d4e559a613d2f8c4b5e10");
    }
}
