use axum::{debug_handler, extract::State, response::{Html, IntoResponse, Redirect, Response}};
use tower_sessions::Session;

use crate::{
    backend::SharedBackend,
    components::{self, Toast},
    include_res,
    posts::CreatePostDialog,
    res::fill,
    session, AppResult,
};

use super::{load_feed, FeedPost};

#[debug_handler(state = crate::AppState)]
pub(crate) async fn feed(
    State(backend): State<SharedBackend>,
    session: Session,
) -> AppResult<Response> {
    let Some(identity) = session::identity(&session).await? else {
        return Ok(Redirect::to("/auth?return_url=/feed").into_response());
    };

    let posts = load_feed(backend.as_ref(), &identity).await;
    let dialog = session::dialog(&session).await?;
    let toast = session::take_toast(&session).await?;

    Ok(Html(render(&posts, &dialog, toast.as_ref())).into_response())
}

pub(crate) fn render(posts: &[FeedPost], dialog: &CreatePostDialog, toast: Option<&Toast>) -> String {
    let posts_html = if posts.is_empty() {
        include_res!(str, "/pages/feed_empty.html").to_owned()
    } else {
        let cards: String = posts.iter()
            .map(|post| components::pet_photo_card(&post.card()))
            .collect();
        format!(r#"<div class="feed-list">{cards}</div>"#)
    };

    fill(
        include_res!(str, "/pages/feed.html"),
        &[
            ("logo", components::logo()),
            ("toast", &components::toast(toast)),
            ("posts", &posts_html),
            ("dialog", &dialog.render()),
        ],
    )
}

#[cfg(test)]
mod tests {
    use time::OffsetDateTime;
    use uuid::Uuid;

    use crate::models::{Post, Profile};

    use super::*;

    fn feed_post(caption: &str, username: Option<&str>) -> FeedPost {
        let user_id = Uuid::now_v7();
        FeedPost {
            post: Post {
                id: Uuid::now_v7(),
                caption: Some(caption.to_owned()),
                likes_count: 0,
                comments_count: 0,
                created_at: OffsetDateTime::UNIX_EPOCH,
                user_id,
                post_images: vec![],
            },
            profile: username.map(|username| Profile {
                user_id,
                username: Some(username.to_owned()),
                display_name: None,
                pet_name: Some("Rex".to_owned()),
            }),
        }
    }

    #[test]
    fn empty_feed_shows_the_welcome_tips() {
        let html = render(&[], &CreatePostDialog::default(), None);
        assert!(html.contains("Welcome to your PawConnect Feed!"));
        assert!(html.contains("Share Your Pet's First Post"));
        assert!(!html.contains("feed-list"));
    }

    #[test]
    fn cards_render_in_given_order() {
        let html = render(
            &[feed_post("first caption", Some("sam")), feed_post("second caption", None)],
            &CreatePostDialog::default(),
            None,
        );
        let first = html.find("first caption").unwrap();
        let second = html.find("second caption").unwrap();
        assert!(first < second);
        assert!(html.contains("by @sam"));
        assert!(html.contains("by @Unknown User"));
        assert!(!html.contains("Welcome to your PawConnect Feed!"));
    }

    #[test]
    fn toast_is_rendered_when_present() {
        let html = render(&[], &CreatePostDialog::default(), Some(&Toast::error("Please add a caption or image")));
        assert!(html.contains("Please add a caption or image"));
    }
}
