use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// The signed-in user as seen by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: Uuid,
    /// Bearer token issued by the remote auth service. Local sign-in has none.
    pub access_token: Option<String>,
}

impl Identity {
    pub fn local(user_id: Uuid) -> Self {
        Identity { user_id, access_token: None }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub caption: Option<String>,
    #[serde(default)]
    pub likes_count: i64,
    #[serde(default)]
    pub comments_count: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub user_id: Uuid,
    #[serde(default)]
    pub post_images: Vec<PostImage>,
}

impl Post {
    /// The image with the lowest display order. Equal orders keep the order
    /// the backend returned them in.
    pub fn primary_image(&self) -> Option<&PostImage> {
        self.post_images
            .iter()
            .enumerate()
            .min_by_key(|(position, image)| (image.display_order, *position))
            .map(|(_, image)| image)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostImage {
    pub image_url: String,
    #[serde(default)]
    pub display_order: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: Uuid,
    pub username: Option<String>,
    pub display_name: Option<String>,
    pub pet_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewPost {
    pub caption: Option<String>,
    pub user_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewPostImage {
    pub post_id: Uuid,
    pub image_url: String,
    pub display_order: i32,
}
