use super::ApiError;
use crate::models::context::ContextPointer;
use rocket::serde::json::Json;
use rocket::{get, State};
use serde_json::Value;

type ApiResult = Result<Json<Value>, ApiError>;

#[get("/anime/top")]
pub async fn top_airing(ctx: &State<ContextPointer>) -> ApiResult {
    let payload = ctx.anime_client().top_airing().await?;
    Ok(Json(payload.as_ref().clone()))
}

#[get("/anime/season")]
pub async fn season_now(ctx: &State<ContextPointer>) -> ApiResult {
    let payload = ctx.anime_client().season_now().await?;
    Ok(Json(payload.as_ref().clone()))
}

#[get("/anime/search?<q>")]
pub async fn search(q: Option<&str>, ctx: &State<ContextPointer>) -> ApiResult {
    let payload = ctx.anime_client().search(q.unwrap_or_default()).await?;
    Ok(Json(payload.as_ref().clone()))
}

#[get("/anime/<id>")]
pub async fn anime(id: u64, ctx: &State<ContextPointer>) -> ApiResult {
    let payload = ctx.anime_client().anime(id).await?;
    Ok(Json(payload.as_ref().clone()))
}
