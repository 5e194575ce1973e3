//! User activity read from a Supabase (PostgREST) database.
//!
//! Tables: `posts`, `likes` and `comments`, each keyed by `user_id`.
//! A failed primary read (posts, likes, comments) fails the whole fetch;
//! a failed follow-up read of the referenced posts only leaves them empty.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use smartdine_model::{Comment, Post, UserActivity};
use std::collections::HashSet;

use crate::{check_status, http_client, ActivityStore, BackendError};

/// Rows read per table.
pub const ROW_LIMIT: usize = 100;

#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    pub url: String,
    pub anon_key: String,
    pub timeout_secs: u64,
}

impl SupabaseConfig {
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            anon_key: anon_key.into(),
            timeout_secs: 10,
        }
    }
}

pub struct SupabaseActivityStore {
    config: SupabaseConfig,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct LikeRow {
    post_id: serde_json::Value,
}

fn id_text(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// PostgREST `in` filter value: `in.(a,b,c)`.
pub fn in_filter<S: AsRef<str>>(ids: &[S]) -> String {
    let joined: Vec<&str> = ids.iter().map(AsRef::as_ref).collect();
    format!("in.({})", joined.join(","))
}

/// Unique ids in first-seen order.
fn unique_ids(ids: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(id.clone())).collect()
}

/// Query for the user's own rows, newest first.
fn user_rows_query(user_id: &str, select: &str) -> Vec<(&'static str, String)> {
    vec![
        ("select", select.to_string()),
        ("user_id", format!("eq.{}", user_id)),
        ("order", "created_at.desc".to_string()),
        ("limit", ROW_LIMIT.to_string()),
    ]
}

impl SupabaseActivityStore {
    pub fn new(config: SupabaseConfig) -> Result<Self, BackendError> {
        let client = http_client(config.timeout_secs)?;
        Ok(Self { config, client })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.config.url.trim_end_matches('/'), table)
    }

    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>, BackendError> {
        let response = self
            .client
            .get(self.table_url(table))
            .header("apikey", &self.config.anon_key)
            .bearer_auth(&self.config.anon_key)
            .query(query)
            .send()
            .await
            .map_err(|e| BackendError::Connection(e.to_string()))?;

        check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| BackendError::Parse(format!("{}: {}", table, e)))
    }

    /// Posts by id. Errors are logged and read as no posts.
    async fn posts_by_id(&self, ids: &[String]) -> Vec<Post> {
        if ids.is_empty() {
            return Vec::new();
        }
        let query = [("select", "*".to_string()), ("id", in_filter(ids))];
        match self.select::<Post>("posts", &query).await {
            Ok(posts) => posts,
            Err(e) => {
                tracing::warn!(error = %e, count = ids.len(), "Failed to fetch referenced posts");
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl ActivityStore for SupabaseActivityStore {
    async fn fetch_activity(&self, user_id: &str) -> Result<UserActivity, BackendError> {
        let posts: Vec<Post> = self.select("posts", &user_rows_query(user_id, "*")).await?;
        let likes: Vec<LikeRow> = self
            .select("likes", &user_rows_query(user_id, "post_id,created_at"))
            .await?;
        let comments: Vec<Comment> = self.select("comments", &user_rows_query(user_id, "*")).await?;

        let liked_ids: Vec<String> = likes.iter().filter_map(|l| id_text(&l.post_id)).collect();
        let liked_posts = self.posts_by_id(&liked_ids).await;

        let commented_ids = unique_ids(comments.iter().filter_map(|c| c.post_id.clone()));
        let commented_posts = self.posts_by_id(&commented_ids).await;

        tracing::info!(
            user_id,
            posts = posts.len(),
            likes = likes.len(),
            liked_posts = liked_posts.len(),
            comments = comments.len(),
            commented_posts = commented_posts.len(),
            "Fetched user activity"
        );

        Ok(UserActivity {
            posts,
            liked_posts,
            comments,
            commented_posts,
        })
    }

    fn name(&self) -> &'static str {
        "supabase"
    }
}
