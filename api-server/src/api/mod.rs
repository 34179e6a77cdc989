mod anime;
mod cache_stats;
mod error;

use rocket::{routes, Route};

pub use error::ApiError;

pub fn routes() -> Vec<Route> {
    routes![
        anime::top_airing,
        anime::season_now,
        anime::search,
        anime::anime,
        cache_stats::cache_stats,
        cache_stats::clear_cache,
    ]
}
