/// API routes and handlers
pub mod account;
pub mod auth;
pub mod health;
pub mod middleware;
pub mod services;
pub mod session;

use crate::{context::AppContext, error::YggError};
use axum::{extract::FromRequest, Router};

/// JSON body extractor whose rejections use the Yggdrasil error body
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(YggError))]
pub struct ApiJson<T>(pub T);

/// Build API routes
pub fn routes(ctx: &AppContext) -> Router<AppContext> {
    Router::new()
        .nest("/auth", auth::routes(ctx))
        .nest("/session", session::routes())
        .nest("/services", services::routes())
        .nest("/account", account::routes())
        .merge(health::routes())
}
