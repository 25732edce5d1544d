use axum::{debug_handler, extract::{Query, State}, response::{IntoResponse, Redirect}};
use serde::Deserialize;
use tower_sessions::Session;

use crate::{session::{CSRF_STATE, IDENTITY, PKCE_VERIFIER, RETURN_URL}, AppResult};

use super::{safe_return_url, Clients};

#[derive(Deserialize)]
pub struct LockinQuery {
    pub state: Option<String>,
    pub code: Option<String>,
}

/// The auth service sends the browser back here after sign-in.
#[debug_handler(state = crate::AppState)]
pub(crate) async fn lockin(
    Query(LockinQuery { state, code }): Query<LockinQuery>,
    State(clients): State<Clients>,
    session: Session,
) -> AppResult<impl IntoResponse> {
    let state = state.ok_or("auth callback without state")?;
    let code = code.ok_or("auth callback without code")?;

    let Some(stored_state) = session.remove::<String>(CSRF_STATE).await? else {
        return Err("no csrf_state".into());
    };

    if state != stored_state {
        return Err("csrf tokens don't match".into());
    }

    let Some(pkce_verifier) = session.remove::<String>(PKCE_VERIFIER).await? else {
        return Err("no pkce_verifier".into());
    };

    let identity = clients.exchange_code(&code, &pkce_verifier).await?;
    // new session id on sign-in
    session.cycle_id().await?;
    session.insert(IDENTITY, &identity).await?;

    tracing::info!(user_id = %identity.user_id, "signed in");

    let return_url = session.remove::<String>(RETURN_URL).await?;
    Ok(Redirect::to(&safe_return_url(return_url)))
}
