use anyhow::{bail, Context};
use async_trait::async_trait;
use reqwest::{header, Method, RequestBuilder, Response};
use uuid::Uuid;

use crate::models::{Identity, NewPost, NewPostImage, Post, Profile};

use super::Backend;

const POSTS_SELECT: &str = "id,caption,likes_count,comments_count,created_at,user_id,post_images(image_url,display_order)";
const PROFILES_SELECT: &str = "user_id,username,display_name,pet_name";

/// Client for a PostgREST-style data API (`{url}/rest/v1/{table}`).
#[derive(Clone)]
pub struct RestBackend {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
}

impl RestBackend {
    pub fn new(http: reqwest::Client, base_url: &str, anon_key: &str) -> Self {
        RestBackend {
            http,
            base_url: base_url.trim_end_matches('/').to_owned(),
            anon_key: anon_key.to_owned(),
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.base_url)
    }

    fn request(&self, method: Method, table: &str, viewer: &Identity) -> RequestBuilder {
        let token = viewer.access_token.as_deref().unwrap_or(&self.anon_key);
        self.http
            .request(method, self.table_url(table))
            .header("apikey", &self.anon_key)
            .bearer_auth(token)
    }
}

fn in_filter(ids: &[Uuid]) -> String {
    let ids: Vec<String> = ids.iter().map(Uuid::to_string).collect();
    format!("in.({})", ids.join(","))
}

async fn ok_or_bail(response: Response, what: &str) -> anyhow::Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    bail!("{what}: backend answered {status}: {body}")
}

#[async_trait]
impl Backend for RestBackend {
    async fn recent_posts(&self, viewer: &Identity, limit: usize) -> anyhow::Result<Vec<Post>> {
        let response = self.request(Method::GET, "posts", viewer)
            .query(&[
                ("select", POSTS_SELECT.to_owned()),
                ("order", "created_at.desc".to_owned()),
                ("limit", limit.to_string()),
            ])
            .send()
            .await
            .context("fetching posts")?;

        ok_or_bail(response, "fetching posts").await?
            .json()
            .await
            .context("decoding posts")
    }

    async fn profiles(&self, viewer: &Identity, user_ids: &[Uuid]) -> anyhow::Result<Vec<Profile>> {
        if user_ids.is_empty() {
            return Ok(vec![]);
        }

        let response = self.request(Method::GET, "profiles", viewer)
            .query(&[
                ("select", PROFILES_SELECT.to_owned()),
                ("user_id", in_filter(user_ids)),
            ])
            .send()
            .await
            .context("fetching profiles")?;

        ok_or_bail(response, "fetching profiles").await?
            .json()
            .await
            .context("decoding profiles")
    }

    async fn insert_post(&self, viewer: &Identity, post: NewPost) -> anyhow::Result<Post> {
        let response = self.request(Method::POST, "posts", viewer)
            .header("Prefer", "return=representation")
            .header(header::ACCEPT, "application/vnd.pgrst.object+json")
            .json(&post)
            .send()
            .await
            .context("inserting post")?;

        ok_or_bail(response, "inserting post").await?
            .json()
            .await
            .context("decoding inserted post")
    }

    async fn insert_post_image(&self, viewer: &Identity, image: NewPostImage) -> anyhow::Result<()> {
        let response = self.request(Method::POST, "post_images", viewer)
            .header("Prefer", "return=minimal")
            .json(&image)
            .send()
            .await
            .context("inserting post image")?;

        ok_or_bail(response, "inserting post image").await?;
        Ok(())
    }
}
