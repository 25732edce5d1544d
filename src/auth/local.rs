use axum::{debug_handler, extract::State, response::{IntoResponse, Redirect, Response}, Form};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{components::Toast, models::Identity, res, session::{self, IDENTITY}, AppResult};

use super::{find_or_create_profile, safe_return_url};

#[derive(Debug, Deserialize)]
pub(crate) struct LocalSignInForm {
    username: String,
    #[serde(default)]
    pet_name: String,
    return_url: Option<String>,
}

fn valid_username(username: &str) -> bool {
    (1..=30).contains(&username.len())
        && username.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Development sign-in against the local database. No password: whoever
/// types a username becomes that user.
#[debug_handler(state = crate::AppState)]
pub(crate) async fn local_sign_in(
    State(db_pool): State<Option<SqlitePool>>,
    session: Session,
    Form(LocalSignInForm { username, pet_name, return_url }): Form<LocalSignInForm>,
) -> AppResult<Response> {
    let Some(db_pool) = db_pool else {
        return res::sorry("page");
    };

    let username = username.trim().trim_start_matches('@');
    if !valid_username(username) {
        session::push_toast(&session, Toast::error("Usernames are 1-30 letters, digits or underscores")).await?;
        return Ok(Redirect::to("/auth").into_response());
    }

    let pet_name = pet_name.trim();
    let pet_name = (!pet_name.is_empty()).then_some(pet_name);
    let user_id = find_or_create_profile(&db_pool, username, pet_name).await?;

    session.cycle_id().await?;
    session.insert(IDENTITY, Identity::local(user_id)).await?;
    tracing::info!(%user_id, username, "signed in locally");

    Ok(Redirect::to(&safe_return_url(return_url)).into_response())
}
