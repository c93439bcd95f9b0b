/// Authentication extractors
use crate::{
    api::middleware::extract_bearer_token,
    context::AppContext,
    db::models::{Account, Profile},
    error::YggError,
};
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

/// Account behind a fresh bearer token
#[derive(Debug, Clone)]
pub struct AuthenticatedAccount {
    pub account: Account,
}

#[async_trait]
impl FromRequestParts<AppContext> for AuthenticatedAccount {
    type Rejection = YggError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppContext,
    ) -> Result<Self, Self::Rejection> {
        // Absent header is 401, a bad token is 403
        let token = extract_bearer_token(&parts.headers)
            .ok_or_else(|| YggError::Unauthorized("Forbidden".to_string()))?;

        let account = state
            .tokens
            .resolve_account(&token)
            .await?
            .ok_or_else(YggError::invalid_token)?;

        Ok(AuthenticatedAccount { account })
    }
}

/// Selected profile of the account behind a bearer token
#[derive(Debug, Clone)]
pub struct SelectedProfile {
    pub account: Account,
    pub profile: Profile,
}

#[async_trait]
impl FromRequestParts<AppContext> for SelectedProfile {
    type Rejection = YggError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppContext,
    ) -> Result<Self, Self::Rejection> {
        let AuthenticatedAccount { account } =
            AuthenticatedAccount::from_request_parts(parts, state).await?;

        let profile = state
            .profiles
            .selected_profile(&account)
            .await?
            .ok_or_else(|| YggError::bad_request("No profile selected."))?;

        Ok(SelectedProfile { account, profile })
    }
}
