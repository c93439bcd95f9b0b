/// Session server endpoints under `/session`
use crate::{
    api::ApiJson,
    context::AppContext,
    error::{YggError, YggResult},
    profile::{normalize_uuid, TexturedProfile},
};
use axum::{
    extract::{ConnectInfo, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::net::SocketAddr;

/// Build session routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/session/minecraft/join", post(join))
        .route("/session/minecraft/hasJoined", get(has_joined))
        .route("/session/minecraft/profile/:uuid", get(profile))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JoinRequest {
    pub access_token: Option<String>,
    pub selected_profile: Option<String>,
    pub server_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HasJoinedQuery {
    pub username: Option<String>,
    pub server_id: Option<String>,
    pub ip: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProfileQuery {
    pub unsigned: Option<String>,
}

fn missing_fields() -> YggError {
    YggError::bad_request("One or more required fields was missing.")
}

/// Client announces the server it is joining
async fn join(
    State(ctx): State<AppContext>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    ApiJson(req): ApiJson<JoinRequest>,
) -> YggResult<StatusCode> {
    let (Some(access_token), Some(profile), Some(server_id)) = (
        req.access_token.filter(|v| !v.is_empty()),
        req.selected_profile.filter(|v| !v.is_empty()),
        req.server_id.filter(|v| !v.is_empty()),
    ) else {
        return Err(missing_fields());
    };

    let client_ip = connect_info.map(|ConnectInfo(addr)| addr.ip().to_string());
    ctx.sessions
        .join(&access_token, &profile, &server_id, client_ip.as_deref())
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Game server confirms a client's join
async fn has_joined(
    State(ctx): State<AppContext>,
    Query(query): Query<HasJoinedQuery>,
) -> YggResult<Json<TexturedProfile>> {
    let (Some(username), Some(server_id)) = (
        query.username.filter(|v| !v.is_empty()),
        query.server_id.filter(|v| !v.is_empty()),
    ) else {
        return Err(missing_fields());
    };

    let ip = query.ip.filter(|v| !v.is_empty());
    let profile = ctx
        .sessions
        .has_joined(&username, &server_id, ip.as_deref())
        .await?;

    Ok(Json(profile))
}

/// Public textured profile by UUID
///
/// Texture data is never signed, so an explicit request for signed data fails.
async fn profile(
    State(ctx): State<AppContext>,
    Path(uuid): Path<String>,
    Query(query): Query<ProfileQuery>,
) -> YggResult<Json<TexturedProfile>> {
    if query.unsigned.as_deref() == Some("false") {
        return Err(YggError::IllegalArgument("Unable to sign data.".to_string()));
    }

    let uuid = normalize_uuid(&uuid)?;
    let profile = ctx
        .profiles
        .profile_by_uuid(&uuid)
        .await?
        .ok_or_else(|| YggError::bad_request("Profile does not exist."))?;

    Ok(Json(ctx.profiles.textured_profile(&profile).await?))
}
