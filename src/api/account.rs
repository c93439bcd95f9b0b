/// Account endpoints under `/account`
use crate::{
    api::ApiJson,
    auth::SelectedProfile,
    context::AppContext,
    error::{YggError, YggResult},
    profile::{normalize_uuid, SimpleProfile},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, post},
    Json, Router,
};

/// Most names accepted by one batch lookup
pub const MAX_LOOKUP_NAMES: usize = 10;

/// Build account routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/profiles/minecraft", post(lookup_profiles))
        .route("/user/profile/:uuid/skin", delete(delete_skin))
}

/// Batch name to UUID lookup
async fn lookup_profiles(
    State(ctx): State<AppContext>,
    body: Option<ApiJson<Vec<String>>>,
) -> YggResult<Json<Vec<SimpleProfile>>> {
    let names = match body {
        Some(ApiJson(names)) if !names.is_empty() => names,
        _ => return Err(YggError::bad_request("No body supplied")),
    };
    if names.len() > MAX_LOOKUP_NAMES {
        return Err(YggError::bad_request(format!(
            "Not more than {} profile names per call are allowed.",
            MAX_LOOKUP_NAMES
        )));
    }

    Ok(Json(ctx.profiles.lookup_names(&names).await?))
}

/// Remove the skin of the caller's selected profile
async fn delete_skin(
    State(ctx): State<AppContext>,
    SelectedProfile { profile, .. }: SelectedProfile,
    Path(uuid): Path<String>,
) -> YggResult<StatusCode> {
    let matches = normalize_uuid(&uuid).is_ok_and(|uuid| uuid == profile.uuid);
    if !matches {
        return Err(YggError::Forbidden("Forbidden".to_string()));
    }

    ctx.textures.remove_skin(&profile.uuid).await?;
    ctx.profiles.clear_skin(profile.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
