use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use crate::{
    backend::Backend,
    components::PetPhotoCard,
    models::{Identity, Post, Profile},
};

pub const FEED_LIMIT: usize = 50;

pub(crate) const UNKNOWN_PET: &str = "Unknown Pet";
pub(crate) const UNKNOWN_USER: &str = "Unknown User";
pub(crate) const PLACEHOLDER_IMAGE: &str = "/placeholder.svg";

/// A post joined with its author's profile, if the author has one.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedPost {
    pub post: Post,
    pub profile: Option<Profile>,
}

impl FeedPost {
    pub fn card(&self) -> PetPhotoCard {
        let profile = self.profile.as_ref();
        PetPhotoCard {
            image: self.post.primary_image()
                .map(|image| image.image_url.clone())
                .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_owned()),
            pet_name: profile
                .and_then(|p| p.pet_name.clone())
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| UNKNOWN_PET.to_owned()),
            owner_name: profile
                .and_then(|p| p.username.clone())
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| UNKNOWN_USER.to_owned()),
            likes: self.post.likes_count,
            comments: self.post.comments_count,
            caption: self.post.caption.clone().unwrap_or_default(),
        }
    }
}

/// Distinct owners, in the order they first appear.
fn owner_ids(posts: &[Post]) -> Vec<Uuid> {
    let mut seen = HashSet::new();
    posts.iter()
        .map(|post| post.user_id)
        .filter(|user_id| seen.insert(*user_id))
        .collect()
}

/// Fetches the newest posts, then their authors' profiles, and joins the two
/// by user id. Keeps the backend's order. A failed posts fetch gives an empty
/// feed; a failed profiles fetch only loses the author details.
pub async fn load_feed(backend: &dyn Backend, viewer: &Identity) -> Vec<FeedPost> {
    let posts = match backend.recent_posts(viewer, FEED_LIMIT).await {
        Ok(posts) => posts,
        Err(e) => {
            tracing::error!(user_id = %viewer.user_id, "error fetching posts: {e:#}");
            return vec![];
        }
    };

    let user_ids = owner_ids(&posts);
    let profiles = match backend.profiles(viewer, &user_ids).await {
        Ok(profiles) => profiles,
        Err(e) => {
            tracing::warn!(authors = user_ids.len(), "error fetching profiles: {e:#}");
            vec![]
        }
    };

    let profile_map: HashMap<Uuid, Profile> = profiles
        .into_iter()
        .map(|profile| (profile.user_id, profile))
        .collect();

    tracing::debug!(posts = posts.len(), profiles = profile_map.len(), "feed assembled");

    posts.into_iter()
        .map(|post| FeedPost {
            profile: profile_map.get(&post.user_id).cloned(),
            post,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use time::{macros::datetime, OffsetDateTime};

    use crate::{
        backend::fake::{Call, FakeBackend},
        models::PostImage,
    };

    use super::*;

    fn user(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    fn post(n: u128, owner: Uuid, caption: Option<&str>, created_at: OffsetDateTime) -> Post {
        Post {
            id: Uuid::from_u128(1000 + n),
            caption: caption.map(str::to_owned),
            likes_count: n as i64,
            comments_count: 0,
            created_at,
            user_id: owner,
            post_images: vec![],
        }
    }

    fn profile(owner: Uuid, username: &str, pet_name: &str) -> Profile {
        Profile {
            user_id: owner,
            username: Some(username.to_owned()),
            display_name: None,
            pet_name: Some(pet_name.to_owned()),
        }
    }

    fn viewer() -> Identity {
        Identity::local(user(99))
    }

    #[tokio::test]
    async fn walk_with_rex() {
        let mut walk = post(1, user(1), Some("Walk"), datetime!(2024-05-01 12:00 UTC));
        walk.post_images = vec![PostImage { image_url: "a.jpg".to_owned(), display_order: 0 }];
        let backend = FakeBackend {
            posts: vec![walk],
            profiles: vec![profile(user(1), "sam", "Rex")],
            ..Default::default()
        };

        let feed = load_feed(&backend, &viewer()).await;
        assert_eq!(feed.len(), 1);

        let card = feed[0].card();
        assert_eq!(card.pet_name, "Rex");
        assert_eq!(card.owner_name, "sam");
        assert_eq!(card.image, "a.jpg");
        assert_eq!(card.caption, "Walk");
    }

    #[tokio::test]
    async fn keeps_backend_order() {
        // deliberately not sorted by created_at: the feed must not re-sort
        let backend = FakeBackend {
            posts: vec![
                post(1, user(1), None, datetime!(2024-05-01 12:00 UTC)),
                post(2, user(2), None, datetime!(2024-05-03 12:00 UTC)),
                post(3, user(1), None, datetime!(2024-05-02 12:00 UTC)),
            ],
            ..Default::default()
        };

        let ids: Vec<_> = load_feed(&backend, &viewer()).await.iter().map(|f| f.post.id).collect();
        assert_eq!(ids, vec![Uuid::from_u128(1001), Uuid::from_u128(1002), Uuid::from_u128(1003)]);
    }

    #[tokio::test]
    async fn profiles_requested_once_per_distinct_owner_after_posts() {
        let at = datetime!(2024-05-01 12:00 UTC);
        let backend = FakeBackend {
            posts: vec![post(1, user(2), None, at), post(2, user(1), None, at), post(3, user(2), None, at)],
            ..Default::default()
        };

        load_feed(&backend, &viewer()).await;
        assert_eq!(backend.calls(), vec![
            Call::RecentPosts(FEED_LIMIT),
            Call::Profiles(vec![user(2), user(1)]),
        ]);
    }

    #[tokio::test]
    async fn missing_profile_gets_placeholders() {
        let at = datetime!(2024-05-01 12:00 UTC);
        let backend = FakeBackend {
            posts: vec![post(1, user(1), None, at), post(2, user(2), Some("hi"), at)],
            profiles: vec![profile(user(2), "kim", "Mochi")],
            ..Default::default()
        };

        let feed = load_feed(&backend, &viewer()).await;
        let orphan = feed[0].card();
        assert_eq!(orphan.owner_name, UNKNOWN_USER);
        assert_eq!(orphan.pet_name, UNKNOWN_PET);
        assert_eq!(orphan.image, PLACEHOLDER_IMAGE);
        assert_eq!(orphan.caption, "");
        assert_eq!(feed[1].card().owner_name, "kim");
    }

    #[tokio::test]
    async fn posts_failure_gives_empty_feed() {
        let backend = FakeBackend {
            posts: vec![post(1, user(1), None, datetime!(2024-05-01 12:00 UTC))],
            fail_posts: true,
            ..Default::default()
        };

        assert!(load_feed(&backend, &viewer()).await.is_empty());
        assert_eq!(backend.calls(), vec![Call::RecentPosts(FEED_LIMIT)]);
    }

    #[tokio::test]
    async fn profiles_failure_degrades_to_placeholders() {
        let backend = FakeBackend {
            posts: vec![post(1, user(1), Some("Walk"), datetime!(2024-05-01 12:00 UTC))],
            profiles: vec![profile(user(1), "sam", "Rex")],
            fail_profiles: true,
            ..Default::default()
        };

        let feed = load_feed(&backend, &viewer()).await;
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].profile, None);
        assert_eq!(feed[0].card().owner_name, UNKNOWN_USER);
    }

    #[tokio::test]
    async fn card_picks_lowest_display_order() {
        let mut p = post(1, user(1), None, datetime!(2024-05-01 12:00 UTC));
        p.post_images = vec![
            PostImage { image_url: "second.jpg".to_owned(), display_order: 1 },
            PostImage { image_url: "first.jpg".to_owned(), display_order: 0 },
        ];
        let backend = FakeBackend { posts: vec![p], ..Default::default() };

        assert_eq!(load_feed(&backend, &viewer()).await[0].card().image, "first.jpg");
    }

    #[tokio::test]
    async fn feed_is_capped() {
        let at = datetime!(2024-05-01 12:00 UTC);
        let backend = FakeBackend {
            posts: (0..60).map(|n| post(n, user(1), None, at)).collect(),
            ..Default::default()
        };

        assert_eq!(load_feed(&backend, &viewer()).await.len(), FEED_LIMIT);
    }

    #[tokio::test]
    async fn missing_username_only_affects_its_own_post() {
        let at = datetime!(2024-05-01 12:00 UTC);
        let mut nameless = profile(user(2), "", "Mochi");
        nameless.username = None;
        let backend = FakeBackend {
            posts: vec![post(1, user(1), None, at), post(2, user(2), None, at)],
            profiles: vec![profile(user(1), "sam", "Rex"), nameless],
            ..Default::default()
        };

        let feed = load_feed(&backend, &viewer()).await;
        assert_eq!(feed[0].card().owner_name, "sam");
        let card = feed[1].card();
        assert_eq!(card.owner_name, UNKNOWN_USER);
        assert_eq!(card.pet_name, "Mochi");
    }
}
