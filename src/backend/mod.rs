mod rest;
mod sqlite;

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{Identity, NewPost, NewPostImage, Post, Profile};

pub use rest::RestBackend;
pub use sqlite::SqliteBackend;

pub type SharedBackend = Arc<dyn Backend>;

/// The remote data service the app reads posts from and writes posts to.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Newest first, nested images included.
    async fn recent_posts(&self, viewer: &Identity, limit: usize) -> anyhow::Result<Vec<Post>>;

    async fn profiles(&self, viewer: &Identity, user_ids: &[Uuid]) -> anyhow::Result<Vec<Profile>>;

    async fn insert_post(&self, viewer: &Identity, post: NewPost) -> anyhow::Result<Post>;

    async fn insert_post_image(&self, viewer: &Identity, image: NewPostImage) -> anyhow::Result<()>;
}
