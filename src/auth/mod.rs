use axum::{routing::{get, post}, Router};
use rand::seq::IndexedRandom;
use sqlx::SqlitePool;

use uuid::Uuid;

use crate::AppState;

mod clients;
mod local;
mod login;
mod lockin;
mod logout;

pub use clients::{Clients, Provider};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth", get(login::login_page))
        .route("/auth/callback", get(lockin::lockin))
        .route("/auth/local", post(local::local_sign_in))
        .route("/auth/{provider}", get(login::login))
        .route("/logout", get(logout::logout))
}

/// Only same-site paths are followed after sign-in or sign-out.
pub(crate) fn safe_return_url(return_url: Option<String>) -> String {
    match return_url {
        Some(url) if url.starts_with('/') && !url.starts_with("//") && !url.contains('\\') => url,
        _ => "/feed".to_owned(),
    }
}

fn random_display_name() -> String {
    let adjectives = [
        "Quick", "Lazy", "Mysterious", "Jolly", "Brave", "Silent", "Witty", "Fierce",
        "Clever", "Gentle", "Wild", "Calm", "Bold", "Shy", "Proud", "Happy", "Sleepy",
        "Eager", "Fancy", "Fluffy", "Golden", "Silver", "Bright", "Cozy", "Lucky",
    ];

    let nouns = [
        "Fox", "Bear", "Eagle", "Wolf", "Otter", "Tiger", "Lion", "Owl", "Rabbit",
        "Falcon", "Hawk", "Hamster", "Panda", "Kitten", "Puppy", "Parrot", "Ferret",
        "Pony", "Turtle", "Dolphin", "Corgi", "Beagle", "Tabby", "Gecko",
    ];

    let mut rng = rand::rng();
    match (adjectives.choose(&mut rng), nouns.choose(&mut rng)) {
        (Some(adjective), Some(noun)) => format!("{adjective} {noun}"),
        _ => "Pet Lover".to_owned(),
    }
}

/// Finds the profile with this username, creating it on first sign-in.
pub(crate) async fn find_or_create_profile(db_pool: &SqlitePool, username: &str, pet_name: Option<&str>) -> Result<Uuid, sqlx::Error> {
    if let Some((user_id,)) = sqlx::query_as::<_, (String,)>("SELECT user_id FROM profiles WHERE username=?")
        .bind(username)
        .fetch_optional(db_pool)
        .await? {
        return Uuid::parse_str(&user_id).map_err(|e| sqlx::Error::Decode(Box::new(e)));
    }

    let user_id = Uuid::now_v7();
    let display_name = random_display_name();

    tracing::info!(%user_id, username, %display_name, "adding profile");
    sqlx::query("INSERT INTO profiles (user_id,username,display_name,pet_name) VALUES (?,?,?,?)")
        .bind(user_id.to_string())
        .bind(username)
        .bind(&display_name)
        .bind(pet_name)
        .execute(db_pool)
        .await?;

    Ok(user_id)
}

#[cfg(test)]
mod tests {
    use crate::backend::SqliteBackend;

    use super::*;

    #[test]
    fn return_url_must_stay_on_site() {
        assert_eq!(safe_return_url(Some("/feed".to_owned())), "/feed");
        assert_eq!(safe_return_url(Some("/".to_owned())), "/");
        assert_eq!(safe_return_url(Some("//evil.example.com".to_owned())), "/feed");
        assert_eq!(safe_return_url(Some("https://evil.example.com".to_owned())), "/feed");
        assert_eq!(safe_return_url(Some("/\\evil.example.com".to_owned())), "/feed");
        assert_eq!(safe_return_url(None), "/feed");
    }

    #[tokio::test]
    async fn profile_is_created_once() {
        let db_pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        SqliteBackend::new(db_pool.clone()).migrate().await.unwrap();

        let first = find_or_create_profile(&db_pool, "sam", Some("Rex")).await.unwrap();
        let again = find_or_create_profile(&db_pool, "sam", None).await.unwrap();
        assert_eq!(first, again);

        let (display_name, pet_name): (String, Option<String>) =
            sqlx::query_as("SELECT display_name,pet_name FROM profiles WHERE username='sam'")
                .fetch_one(&db_pool)
                .await
                .unwrap();
        assert!(display_name.contains(' '));
        assert_eq!(pet_name.as_deref(), Some("Rex"));
    }
}
