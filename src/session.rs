use time::OffsetDateTime;
use tower_sessions::Session;

use crate::{components::Toast, models::Identity, posts::CreatePostDialog, AppResult};

pub const IDENTITY: &str = "identity";
pub const CSRF_STATE: &str = "csrf_state";
pub const PKCE_VERIFIER: &str = "pkce_verifier";
pub const RETURN_URL: &str = "return_url";
pub const TOAST: &str = "toast";
pub const CREATE_POST_DIALOG: &str = "create_post_dialog";

pub async fn identity(session: &Session) -> AppResult<Option<Identity>> {
    Ok(session.get::<Identity>(IDENTITY).await?)
}

pub async fn push_toast(session: &Session, toast: Toast) -> AppResult<()> {
    session.insert(TOAST, toast).await?;
    Ok(())
}

/// Toasts are shown once.
pub async fn take_toast(session: &Session) -> AppResult<Option<Toast>> {
    Ok(session.remove::<Toast>(TOAST).await?)
}

pub async fn dialog(session: &Session) -> AppResult<CreatePostDialog> {
    let mut dialog = session.get::<CreatePostDialog>(CREATE_POST_DIALOG).await?.unwrap_or_default();
    dialog.recover_stale(OffsetDateTime::now_utc());
    Ok(dialog)
}

pub async fn save_dialog(session: &Session, dialog: &CreatePostDialog) -> AppResult<()> {
    session.insert(CREATE_POST_DIALOG, dialog).await?;
    Ok(())
}

/// Like `save_dialog`, but writes through to the store right away instead of
/// after the response, so concurrent requests on the same session see it.
pub async fn persist_dialog(session: &Session, dialog: &CreatePostDialog) -> AppResult<()> {
    save_dialog(session, dialog).await?;
    session.save().await?;
    Ok(())
}
