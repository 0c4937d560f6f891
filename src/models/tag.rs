use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const TAG_TITLE_MAX_LENGTH: usize = 50;
pub const TAG_SLUG_MAX_LENGTH: usize = 50;

/// Slugs that would collide with fixed routes under `/tag/`.
pub const RESERVED_TAG_SLUGS: &[&str] = &["create"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
}

impl Tag {
    pub fn absolute_url(&self) -> String {
        format!("/tag/{}/", self.slug)
    }

    pub fn update_url(&self) -> String {
        format!("/tag/{}/update/", self.slug)
    }

    pub fn delete_url(&self) -> String {
        format!("/tag/{}/delete/", self.slug)
    }
}

#[derive(Debug, Serialize)]
pub struct TagResponse {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub url: String,
}

impl From<Tag> for TagResponse {
    fn from(tag: Tag) -> Self {
        let url = tag.absolute_url();
        Self {
            id: tag.id,
            title: tag.title,
            slug: tag.slug,
            url,
        }
    }
}
