/// Profile services under `/services`
use crate::{
    api::ApiJson,
    auth::SelectedProfile,
    context::AppContext,
    db::models::SkinVariant,
    error::{YggError, YggResult},
    profile::FullProfile,
};
use axum::{
    extract::{FromRequest, Multipart, Request, State},
    http::{header, StatusCode},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

/// Build services routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/minecraft/profile", get(get_profile))
        .route("/minecraft/profile/skins", post(upload_skin))
        .route("/minecraft/profile/skins/active", delete(delete_skin))
        .route(
            "/minecraft/profile/capes/active",
            put(activate_cape).delete(hide_cape),
        )
        .route("/player/attributes", get(attributes))
        .route("/rollout/v1/msamigration", get(msa_migration))
}

#[derive(Debug, Deserialize)]
pub struct SkinUrlRequest {
    pub variant: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CapeRequest {
    pub cape_id: Option<String>,
}

enum SkinSource {
    File(Vec<u8>),
    Url(String),
}

/// Full profile of the caller's selected profile
async fn get_profile(
    State(ctx): State<AppContext>,
    SelectedProfile { profile, .. }: SelectedProfile,
) -> YggResult<Json<FullProfile>> {
    Ok(Json(ctx.profiles.full_profile(&profile).await?))
}

/// Upload a skin file or point at a skin URL
///
/// Accepts `multipart/form-data` with `variant` and `file` fields, or JSON
/// with `variant` and `url`.
async fn upload_skin(
    State(ctx): State<AppContext>,
    SelectedProfile { profile, .. }: SelectedProfile,
    request: Request,
) -> YggResult<StatusCode> {
    let is_multipart = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("multipart/form-data"));

    let (variant, source) = if is_multipart {
        let multipart = Multipart::from_request(request, &ctx)
            .await
            .map_err(|e| YggError::bad_request(e.body_text()))?;
        read_skin_form(multipart).await?
    } else {
        let ApiJson(body) = ApiJson::<SkinUrlRequest>::from_request(request, &ctx).await?;
        (body.variant, body.url.filter(|u| !u.is_empty()).map(SkinSource::Url))
    };

    let Some(source) = source else {
        return Err(YggError::bad_request("Please send a file or URL."));
    };

    let variant = match variant {
        Some(v) => SkinVariant::from_str(&v)?,
        None => SkinVariant::Classic,
    };
    if variant == SkinVariant::None {
        return Err(YggError::bad_request("Invalid skin variant: NONE"));
    }

    match source {
        SkinSource::File(data) => ctx.textures.store_skin(&profile.uuid, data).await?,
        SkinSource::Url(url) => ctx.textures.download_skin(&profile.uuid, &url).await?,
    }
    ctx.profiles.set_skin_variant(profile.id, variant).await?;

    tracing::info!(profile = %profile.uuid, variant = variant.as_str(), "skin updated");
    Ok(StatusCode::NO_CONTENT)
}

async fn read_skin_form(mut multipart: Multipart) -> YggResult<(Option<String>, Option<SkinSource>)> {
    let mut variant = None;
    let mut file = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| YggError::bad_request(e.body_text()))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("variant") => {
                variant = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| YggError::bad_request(e.body_text()))?,
                );
            }
            Some("file") => {
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| YggError::bad_request(e.body_text()))?;
                file = Some(SkinSource::File(data.to_vec()));
            }
            _ => {}
        }
    }

    Ok((variant, file))
}

/// Remove the active skin
async fn delete_skin(
    State(ctx): State<AppContext>,
    SelectedProfile { profile, .. }: SelectedProfile,
) -> YggResult<StatusCode> {
    ctx.textures.remove_skin(&profile.uuid).await?;
    ctx.profiles.clear_skin(profile.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Show one of the profile's capes
async fn activate_cape(
    State(ctx): State<AppContext>,
    SelectedProfile { profile, .. }: SelectedProfile,
    body: Option<ApiJson<CapeRequest>>,
) -> YggResult<StatusCode> {
    let cape_id = body
        .and_then(|ApiJson(req)| req.cape_id)
        .filter(|id| !id.is_empty());

    ctx.profiles
        .set_active_cape(&profile, cape_id.as_deref())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Hide the active cape
async fn hide_cape(
    State(ctx): State<AppContext>,
    SelectedProfile { profile, .. }: SelectedProfile,
) -> YggResult<StatusCode> {
    ctx.profiles.clear_active_cape(profile.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn attributes(
    State(ctx): State<AppContext>,
    SelectedProfile { profile, .. }: SelectedProfile,
) -> YggResult<Json<Value>> {
    Ok(Json(ctx.profiles.attributes(&profile)?))
}

/// Accounts here never migrate
async fn msa_migration() -> Json<Value> {
    Json(json!({
        "feature": "msamigration",
        "rollout": false
    }))
}
