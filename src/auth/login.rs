use axum::{debug_handler, extract::{Path, Query, State}, response::{Html, IntoResponse, Redirect, Response}};
use oauth2::{CsrfToken, PkceCodeChallenge};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{
    components, include_res,
    res::{escape_html, fill},
    session::{self, CSRF_STATE, PKCE_VERIFIER, RETURN_URL},
    AppResult,
};

use super::{clients::Provider, safe_return_url, Clients};

#[derive(Deserialize)]
pub(crate) struct LoginQuery {
    pub(crate) return_url: Option<String>,
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn login_page(
    Query(LoginQuery { return_url }): Query<LoginQuery>,
    State(clients): State<Clients>,
    State(db_pool): State<Option<SqlitePool>>,
    session: Session,
) -> AppResult<Response> {
    if session::identity(&session).await?.is_some() {
        return Ok(Redirect::to(&safe_return_url(return_url)).into_response());
    }

    let return_url = escape_html(&safe_return_url(return_url));
    let providers: String = clients.providers().iter()
        .map(|provider| format!(
            r#"<a class="button outline wide" href="/auth/{}?return_url={return_url}">Continue with {}</a>"#,
            provider.id(),
            provider.label(),
        ))
        .collect();

    let local_form = if db_pool.is_some() {
        fill(include_res!(str, "/components/local_sign_in.html"), &[("return_url", &return_url)])
    } else {
        String::new()
    };

    let toast = session::take_toast(&session).await?;

    Ok(Html(fill(
        include_res!(str, "/pages/auth.html"),
        &[
            ("logo", components::logo()),
            ("toast", &components::toast(toast.as_ref())),
            ("providers", &providers),
            ("local_form", &local_form),
        ],
    )).into_response())
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn login(
    Path(provider): Path<Provider>,
    Query(LoginQuery { return_url }): Query<LoginQuery>,
    State(clients): State<Clients>,
    session: Session,
) -> AppResult<Response> {
    let (pkce_code_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();
    let csrf_state = CsrfToken::new_random();

    let authorize_url = clients.authorize_url(provider, &pkce_code_challenge, &csrf_state)?;

    session.insert(CSRF_STATE, csrf_state.secret()).await?;
    session.insert(PKCE_VERIFIER, pkce_verifier.secret()).await?;
    session.insert(RETURN_URL, safe_return_url(return_url)).await?;

    tracing::debug!(%provider, "redirecting to auth service");
    Ok(Redirect::to(authorize_url.as_str()).into_response())
}
