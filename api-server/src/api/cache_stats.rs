use crate::models::context::ContextPointer;
use anime_info::CacheStats;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{delete, get, State};
use serde::Serialize;

#[derive(Serialize)]
pub struct CacheStatsResponse {
    pub cache_stats: CacheStats,
    pub queued_requests: usize,
    pub ttl_secs: i64,
    pub spacing_ms: u128,
    pub upstream: String,
}

/// Get current cache statistics
#[get("/cache/stats")]
pub fn cache_stats(ctx: &State<ContextPointer>) -> Json<CacheStatsResponse> {
    let proxy = ctx.anime_client().proxy();
    Json(CacheStatsResponse {
        cache_stats: proxy.cache_stats(),
        queued_requests: proxy.queued(),
        ttl_secs: proxy.cache_ttl().num_seconds(),
        spacing_ms: proxy.spacing().as_millis(),
        upstream: ctx.config().upstream.base_url.clone(),
    })
}

/// Clear the cache (useful for debugging/admin)
#[delete("/cache")]
pub fn clear_cache(ctx: &State<ContextPointer>) -> Status {
    ctx.anime_client().proxy().clear_cache();
    Status::NoContent
}
