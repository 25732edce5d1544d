mod assemble;
mod page;

use axum::{routing::get, Router};

use crate::AppState;

pub use assemble::{load_feed, FeedPost, FEED_LIMIT};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/feed", get(page::feed))
}
