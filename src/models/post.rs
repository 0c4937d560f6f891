use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::tag::Tag;

pub const POST_TITLE_MAX_LENGTH: usize = 150;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub slug: String, // Generated once at creation, stable across edits
    pub body: String,
    pub tags: Vec<Tag>, // Sorted by tag title
    pub author_username: String, // Denormalized from the session
    pub date_pub: DateTime<Utc>,
}

impl Post {
    pub fn absolute_url(&self) -> String {
        format!("/post/{}/", self.slug)
    }

    pub fn update_url(&self) -> String {
        format!("/post/{}/update/", self.slug)
    }

    pub fn delete_url(&self) -> String {
        format!("/post/{}/delete/", self.slug)
    }

    pub fn tag_ids(&self) -> Vec<Uuid> {
        self.tags.iter().map(|tag| tag.id).collect()
    }
}

#[derive(Debug, Serialize)]
pub struct PostResponse {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub body: String,
    pub tags: Vec<String>,
    pub author_username: String,
    pub date_pub: DateTime<Utc>,
    pub url: String,
}

impl From<Post> for PostResponse {
    fn from(post: Post) -> Self {
        let url = post.absolute_url();
        Self {
            id: post.id,
            title: post.title,
            slug: post.slug,
            body: post.body,
            tags: post.tags.into_iter().map(|tag| tag.slug).collect(),
            author_username: post.author_username,
            date_pub: post.date_pub,
            url,
        }
    }
}
