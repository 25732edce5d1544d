mod dialog;
mod new;

use axum::{routing::{get, post}, Router};

use crate::AppState;

pub use dialog::{CreatePostDialog, Draft, Submission};
pub use new::create_post;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(new::submit))
        .route("/new", get(new::open))
        .route("/close", post(new::close))
        .route("/clear-image", post(new::clear_image))
        .route("/preview-failed", post(new::preview_failed))
}
