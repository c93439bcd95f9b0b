/// Authentication endpoints under `/auth`
use crate::{
    account::UserObject,
    api::ApiJson,
    context::AppContext,
    error::{YggError, YggResult},
    profile::SimpleProfile,
    rate_limit::auth_rate_limit,
    token::generate_token,
};
use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};

/// Build auth routes
pub fn routes(ctx: &AppContext) -> Router<AppContext> {
    Router::new()
        .route("/authenticate", post(authenticate))
        .route("/refresh", post(refresh))
        .route("/validate", post(validate))
        .route("/invalidate", post(invalidate))
        .route("/signout", post(signout))
        .route_layer(middleware::from_fn_with_state(
            ctx.rate_limiter.clone(),
            auth_rate_limit,
        ))
}

#[derive(Debug, Deserialize)]
pub struct Agent {
    pub name: Option<String>,
    pub version: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuthenticateRequest {
    pub agent: Option<Agent>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub client_token: Option<String>,
    pub request_user: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticateResponse {
    pub client_token: String,
    pub access_token: String,
    pub available_profiles: Vec<SimpleProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_profile: Option<SimpleProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserObject>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RefreshRequest {
    pub access_token: Option<String>,
    pub client_token: Option<String>,
    pub request_user: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: String,
    pub client_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_profile: Option<SimpleProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserObject>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TokenPair {
    pub access_token: Option<String>,
    pub client_token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Treat empty strings like absent fields
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn missing_fields() -> YggError {
    YggError::Unauthorized("Forbidden".to_string())
}

/// Password login
async fn authenticate(
    State(ctx): State<AppContext>,
    ApiJson(req): ApiJson<AuthenticateRequest>,
) -> YggResult<Json<AuthenticateResponse>> {
    if let Some(agent) = &req.agent {
        if agent.name.as_deref() != Some("Minecraft") || agent.version != Some(1) {
            return Err(YggError::bad_request("Unsupported game."));
        }
    }

    let (Some(username), Some(password)) = (present(req.username), present(req.password)) else {
        return Err(missing_fields());
    };

    let account = ctx
        .account_manager
        .verify_credentials(&username, &password)
        .await?;

    let client_token = present(req.client_token).unwrap_or_else(generate_token);
    let access_token = ctx.tokens.issue(account.id, &client_token).await?;

    tracing::info!(account_id = account.id, "authenticated");

    Ok(Json(AuthenticateResponse {
        client_token,
        access_token,
        available_profiles: ctx.profiles.list_profiles(account.id).await?,
        selected_profile: ctx.profiles.simple_profile(account.selected_profile).await?,
        user: req.request_user.then(|| UserObject::from(&account)),
    }))
}

/// Swap an access token for a new one
async fn refresh(
    State(ctx): State<AppContext>,
    ApiJson(req): ApiJson<RefreshRequest>,
) -> YggResult<Json<RefreshResponse>> {
    let (Some(access_token), Some(client_token)) =
        (present(req.access_token), present(req.client_token))
    else {
        return Err(missing_fields());
    };

    let token = ctx
        .tokens
        .refresh(&access_token, &client_token)
        .await?
        .ok_or_else(YggError::invalid_token)?;

    let account = ctx
        .account_manager
        .get_account(token.account)
        .await?
        .ok_or_else(YggError::invalid_token)?;

    Ok(Json(RefreshResponse {
        access_token: token.access,
        client_token: token.client,
        selected_profile: ctx.profiles.simple_profile(account.selected_profile).await?,
        user: req.request_user.then(|| UserObject::from(&account)),
    }))
}

/// Check that an access token is fresh
async fn validate(
    State(ctx): State<AppContext>,
    ApiJson(req): ApiJson<TokenPair>,
) -> YggResult<StatusCode> {
    let access_token = present(req.access_token).ok_or_else(missing_fields)?;
    let client_token = present(req.client_token);

    if ctx
        .tokens
        .validate(&access_token, client_token.as_deref(), false)
        .await?
    {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(YggError::invalid_token())
    }
}

/// Revoke one access token
///
/// Succeeds whether or not the token existed.
async fn invalidate(
    State(ctx): State<AppContext>,
    ApiJson(req): ApiJson<TokenPair>,
) -> YggResult<StatusCode> {
    if let (Some(access_token), Some(client_token)) =
        (present(req.access_token), present(req.client_token))
    {
        let removed = ctx.tokens.invalidate(&access_token, &client_token).await?;
        tracing::debug!(removed, "invalidate");
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Revoke every access token of an account
async fn signout(
    State(ctx): State<AppContext>,
    ApiJson(req): ApiJson<Credentials>,
) -> YggResult<StatusCode> {
    let (Some(username), Some(password)) = (present(req.username), present(req.password)) else {
        return Err(missing_fields());
    };

    let account = ctx
        .account_manager
        .verify_credentials(&username, &password)
        .await?;
    ctx.tokens.revoke_all(account.id).await?;

    Ok(StatusCode::NO_CONTENT)
}
