use axum::{debug_handler, extract::State, http::StatusCode, response::{IntoResponse, Redirect, Response}, Form};
use serde::Deserialize;
use tower_sessions::Session;

use crate::{
    backend::{Backend, SharedBackend},
    models::{NewPost, NewPostImage, Post},
    session, AppResult,
};

use super::dialog::Submission;

#[derive(Debug, Deserialize)]
pub(crate) struct DraftForm {
    #[serde(default)]
    caption: String,
    #[serde(default)]
    image_url: String,
}

/// Inserts the post, then its image when one was given. The two writes are
/// not transactional: if the image insert fails the post stays without it.
pub async fn create_post(backend: &dyn Backend, Submission { viewer, draft }: &Submission) -> anyhow::Result<Post> {
    let post = backend.insert_post(viewer, NewPost {
        caption: draft.caption.clone(),
        user_id: viewer.user_id,
    }).await?;

    if let Some(image_url) = &draft.image_url {
        if let Err(e) = backend.insert_post_image(viewer, NewPostImage {
            post_id: post.id,
            image_url: image_url.clone(),
            display_order: 0,
        }).await {
            tracing::warn!(post_id = %post.id, "post saved without its image");
            return Err(e);
        }
    }

    Ok(post)
}

fn back_to_feed() -> Response {
    Redirect::to("/feed").into_response()
}

#[debug_handler]
pub(crate) async fn open(session: Session) -> AppResult<Response> {
    let mut dialog = session::dialog(&session).await?;
    dialog.open();
    session::save_dialog(&session, &dialog).await?;
    Ok(back_to_feed())
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn submit(
    State(backend): State<SharedBackend>,
    session: Session,
    Form(DraftForm { caption, image_url }): Form<DraftForm>,
) -> AppResult<Response> {
    let Some(identity) = session::identity(&session).await? else {
        return Ok(Redirect::to("/auth?return_url=/feed").into_response());
    };

    let mut dialog = session::dialog(&session).await?;
    dialog.set_draft(caption, image_url);

    let submission = match dialog.begin_submit(Some(&identity)) {
        Ok(submission) => submission,
        Err(toast) => {
            session::save_dialog(&session, &dialog).await?;
            session::push_toast(&session, toast).await?;
            return Ok(back_to_feed());
        }
    };
    session::persist_dialog(&session, &dialog).await?;

    let result = create_post(backend.as_ref(), &submission).await;
    match &result {
        Ok(post) => tracing::info!(post_id = %post.id, user_id = %identity.user_id, "post created"),
        Err(e) => tracing::error!(user_id = %identity.user_id, "error creating post: {e:#}"),
    }

    let toast = dialog.finish(&result);
    session::save_dialog(&session, &dialog).await?;
    session::push_toast(&session, toast).await?;

    Ok(back_to_feed())
}

#[debug_handler]
pub(crate) async fn close(
    session: Session,
) -> AppResult<Response> {
    let mut dialog = session::dialog(&session).await?;
    if dialog.close() {
        session::save_dialog(&session, &dialog).await?;
    }
    Ok(back_to_feed())
}

#[debug_handler]
pub(crate) async fn clear_image(
    session: Session,
    Form(DraftForm { caption, image_url }): Form<DraftForm>,
) -> AppResult<Response> {
    let mut dialog = session::dialog(&session).await?;
    dialog.set_draft(caption, image_url);
    dialog.clear_image();
    session::save_dialog(&session, &dialog).await?;
    Ok(back_to_feed())
}

#[debug_handler]
pub(crate) async fn preview_failed(session: Session) -> AppResult<StatusCode> {
    let mut dialog = session::dialog(&session).await?;
    dialog.preview_failed();
    session::save_dialog(&session, &dialog).await?;
    Ok(StatusCode::NO_CONTENT)
}
