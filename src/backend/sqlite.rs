use std::collections::HashMap;

use anyhow::Context;
use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::models::{Identity, NewPost, NewPostImage, Post, PostImage, Profile};

use super::Backend;

const SCHEMA: [&str; 3] = [
    "CREATE TABLE IF NOT EXISTS profiles (
        user_id TEXT PRIMARY KEY NOT NULL,
        username TEXT NOT NULL UNIQUE,
        display_name TEXT,
        pet_name TEXT
    )",
    "CREATE TABLE IF NOT EXISTS posts (
        id TEXT PRIMARY KEY NOT NULL,
        caption TEXT,
        likes_count INTEGER NOT NULL DEFAULT 0,
        comments_count INTEGER NOT NULL DEFAULT 0,
        created_at INTEGER NOT NULL,
        user_id TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS post_images (
        post_id TEXT NOT NULL REFERENCES posts(id),
        image_url TEXT NOT NULL,
        display_order INTEGER NOT NULL DEFAULT 0
    )",
];

/// Local stand-in for the hosted backend, for development without network.
#[derive(Clone)]
pub struct SqliteBackend {
    db_pool: SqlitePool,
}

impl SqliteBackend {
    pub fn new(db_pool: SqlitePool) -> Self {
        SqliteBackend { db_pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.db_pool
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.db_pool)
                .await
                .context("creating tables")?;
        }
        Ok(())
    }
}

// created_at is kept as unix nanoseconds so ORDER BY is numeric
fn from_nanos(nanos: i64) -> anyhow::Result<OffsetDateTime> {
    Ok(OffsetDateTime::from_unix_timestamp_nanos(nanos.into())?)
}

fn to_nanos(at: OffsetDateTime) -> anyhow::Result<i64> {
    Ok(i64::try_from(at.unix_timestamp_nanos())?)
}

#[async_trait]
impl Backend for SqliteBackend {
    async fn recent_posts(&self, _viewer: &Identity, limit: usize) -> anyhow::Result<Vec<Post>> {
        let rows: Vec<(String, Option<String>, i64, i64, i64, String)> = sqlx::query_as(
            "SELECT id,caption,likes_count,comments_count,created_at,user_id FROM posts
             ORDER BY created_at DESC, rowid DESC LIMIT ?"
        )
            .bind(i64::try_from(limit)?)
            .fetch_all(&self.db_pool)
            .await
            .context("fetching posts")?;

        let mut posts = Vec::with_capacity(rows.len());
        for (id, caption, likes_count, comments_count, created_at, user_id) in rows {
            posts.push(Post {
                id: Uuid::parse_str(&id)?,
                caption,
                likes_count,
                comments_count,
                created_at: from_nanos(created_at)?,
                user_id: Uuid::parse_str(&user_id)?,
                post_images: vec![],
            });
        }

        if posts.is_empty() {
            return Ok(posts);
        }

        let mut query = QueryBuilder::<Sqlite>::new(
            "SELECT post_id,image_url,display_order FROM post_images WHERE post_id IN ("
        );
        let mut ids = query.separated(",");
        for post in &posts {
            ids.push_bind(post.id.to_string());
        }
        ids.push_unseparated(") ORDER BY rowid");

        let images: Vec<(String, String, i32)> = query
            .build_query_as()
            .fetch_all(&self.db_pool)
            .await
            .context("fetching post images")?;

        let mut by_post: HashMap<Uuid, Vec<PostImage>> = HashMap::new();
        for (post_id, image_url, display_order) in images {
            by_post
                .entry(Uuid::parse_str(&post_id)?)
                .or_default()
                .push(PostImage { image_url, display_order });
        }
        for post in &mut posts {
            post.post_images = by_post.remove(&post.id).unwrap_or_default();
        }

        Ok(posts)
    }

    async fn profiles(&self, _viewer: &Identity, user_ids: &[Uuid]) -> anyhow::Result<Vec<Profile>> {
        if user_ids.is_empty() {
            return Ok(vec![]);
        }

        let mut query = QueryBuilder::<Sqlite>::new(
            "SELECT user_id,username,display_name,pet_name FROM profiles WHERE user_id IN ("
        );
        let mut ids = query.separated(",");
        for user_id in user_ids {
            ids.push_bind(user_id.to_string());
        }
        ids.push_unseparated(")");

        let rows: Vec<(String, Option<String>, Option<String>, Option<String>)> = query
            .build_query_as()
            .fetch_all(&self.db_pool)
            .await
            .context("fetching profiles")?;

        rows.into_iter()
            .map(|(user_id, username, display_name, pet_name)| -> anyhow::Result<Profile> {
                Ok(Profile {
                    user_id: Uuid::parse_str(&user_id)?,
                    username,
                    display_name,
                    pet_name,
                })
            })
            .collect()
    }

    async fn insert_post(&self, _viewer: &Identity, NewPost { caption, user_id }: NewPost) -> anyhow::Result<Post> {
        let id = Uuid::now_v7();
        let created_at = OffsetDateTime::now_utc();

        sqlx::query("INSERT INTO posts (id,caption,created_at,user_id) VALUES (?,?,?,?)")
            .bind(id.to_string())
            .bind(&caption)
            .bind(to_nanos(created_at)?)
            .bind(user_id.to_string())
            .execute(&self.db_pool)
            .await
            .context("inserting post")?;

        Ok(Post {
            id,
            caption,
            likes_count: 0,
            comments_count: 0,
            created_at,
            user_id,
            post_images: vec![],
        })
    }

    async fn insert_post_image(&self, _viewer: &Identity, image: NewPostImage) -> anyhow::Result<()> {
        sqlx::query("INSERT INTO post_images (post_id,image_url,display_order) VALUES (?,?,?)")
            .bind(image.post_id.to_string())
            .bind(&image.image_url)
            .bind(image.display_order)
            .execute(&self.db_pool)
            .await
            .context("inserting post image")?;
        Ok(())
    }
}
