use axum::{debug_handler, extract::{Query, State}, response::Redirect};
use serde::Deserialize;
use tower_sessions::Session;

use crate::{session, AppResult};

use super::Clients;

#[derive(Deserialize)]
pub(crate) struct LogoutQuery {
    pub(crate) return_url: Option<String>,
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn logout(
    Query(LogoutQuery { return_url }): Query<LogoutQuery>,
    State(clients): State<Clients>,
    session: Session,
) -> AppResult<Redirect> {
    if let Some(identity) = session::identity(&session).await? {
        if let Err(e) = clients.sign_out(&identity).await {
            tracing::warn!(user_id = %identity.user_id, "remote sign-out failed: {:#}", e.0);
        }
        tracing::info!(user_id = %identity.user_id, "signed out");
    }

    session.flush().await?;

    let return_url = match return_url {
        Some(url) => super::safe_return_url(Some(url)),
        None => "/".to_owned(),
    };
    Ok(Redirect::to(&return_url))
}
