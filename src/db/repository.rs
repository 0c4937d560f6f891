// Repository trait abstractions for database operations
use crate::models::{Post, Tag, User};
use crate::{AppError, Result};
use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Inserts the post together with its tag links (`post.tags`).
    async fn create_post(&self, post: &Post) -> Result<Post>;
    /// Case-insensitive slug lookup.
    async fn get_post_by_slug(&self, slug: &str) -> Result<Option<Post>>;
    /// `search` matches title or body as a case-insensitive substring.
    async fn count_posts(&self, search: Option<&str>) -> Result<u64>;
    async fn get_posts_paginated(&self, search: Option<&str>, limit: u32, offset: u32) -> Result<Vec<Post>>;
    async fn get_posts_by_tag(&self, tag_id: Uuid) -> Result<Vec<Post>>;
    /// Replaces title, body and the full tag set. The slug is never rewritten.
    async fn update_post(&self, post: &Post) -> Result<Post>;
    async fn delete_post(&self, id: Uuid) -> Result<()>;
}

#[async_trait]
pub trait TagRepository: Send + Sync {
    async fn create_tag(&self, tag: &Tag) -> Result<Tag>;
    async fn get_tag_by_slug(&self, slug: &str) -> Result<Option<Tag>>;
    async fn get_tags_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Tag>>;
    async fn list_tags(&self) -> Result<Vec<Tag>>;
    /// True when another tag (not `exclude`) already owns `slug`.
    async fn slug_in_use(&self, slug: &str, exclude: Option<Uuid>) -> Result<bool>;
    async fn update_tag(&self, tag: &Tag) -> Result<Tag>;
    /// Removes the tag and every post link pointing at it.
    async fn delete_tag(&self, id: Uuid) -> Result<()>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create_user(&self, user: &User) -> Result<User>;
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;
}

// In-memory store, used when no DATABASE_URL is configured and by the tests
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone)]
struct StoredPost {
    id: Uuid,
    title: String,
    slug: String,
    body: String,
    tag_ids: Vec<Uuid>,
    author_username: String,
    date_pub: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct MemoryState {
    posts: Vec<StoredPost>, // insertion order
    tags: HashMap<Uuid, Tag>,
    users: HashMap<String, User>, // username -> User
}

impl MemoryState {
    fn hydrate(&self, stored: &StoredPost) -> Post {
        let mut tags: Vec<Tag> = stored
            .tag_ids
            .iter()
            .filter_map(|id| self.tags.get(id).cloned())
            .collect();
        tags.sort_by(|a, b| a.title.cmp(&b.title));

        Post {
            id: stored.id,
            title: stored.title.clone(),
            slug: stored.slug.clone(),
            body: stored.body.clone(),
            tags,
            author_username: stored.author_username.clone(),
            date_pub: stored.date_pub,
        }
    }

    /// Newest first; later inserts win ties.
    fn matching_posts(&self, search: Option<&str>) -> Vec<&StoredPost> {
        let needle = search.filter(|s| !s.is_empty()).map(str::to_lowercase);
        let mut posts: Vec<&StoredPost> = self
            .posts
            .iter()
            .rev()
            .filter(|post| match &needle {
                Some(needle) => {
                    post.title.to_lowercase().contains(needle) || post.body.to_lowercase().contains(needle)
                }
                None => true,
            })
            .collect();
        posts.sort_by(|a, b| b.date_pub.cmp(&a.date_pub));
        posts
    }
}

#[derive(Clone, Default)]
pub struct InMemoryRepository {
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> Result<MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|_| AppError::InternalError("In-memory store lock poisoned".to_string()))
    }
}

fn stored_from(post: &Post) -> StoredPost {
    StoredPost {
        id: post.id,
        title: post.title.clone(),
        slug: post.slug.clone(),
        body: post.body.clone(),
        tag_ids: post.tag_ids(),
        author_username: post.author_username.clone(),
        date_pub: post.date_pub,
    }
}

#[async_trait]
impl PostRepository for InMemoryRepository {
    async fn create_post(&self, post: &Post) -> Result<Post> {
        let mut state = self.state()?;
        if state.posts.iter().any(|p| p.slug.eq_ignore_ascii_case(&post.slug)) {
            return Err(AppError::DatabaseError(format!("Duplicate post slug: {}", post.slug)));
        }

        let stored = stored_from(post);
        let created = state.hydrate(&stored);
        state.posts.push(stored);
        Ok(created)
    }

    async fn get_post_by_slug(&self, slug: &str) -> Result<Option<Post>> {
        let state = self.state()?;
        Ok(state
            .posts
            .iter()
            .find(|p| p.slug.to_lowercase() == slug.to_lowercase())
            .map(|p| state.hydrate(p)))
    }

    async fn count_posts(&self, search: Option<&str>) -> Result<u64> {
        let state = self.state()?;
        Ok(state.matching_posts(search).len() as u64)
    }

    async fn get_posts_paginated(&self, search: Option<&str>, limit: u32, offset: u32) -> Result<Vec<Post>> {
        let state = self.state()?;
        Ok(state
            .matching_posts(search)
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .map(|p| state.hydrate(p))
            .collect())
    }

    async fn get_posts_by_tag(&self, tag_id: Uuid) -> Result<Vec<Post>> {
        let state = self.state()?;
        Ok(state
            .matching_posts(None)
            .into_iter()
            .filter(|p| p.tag_ids.contains(&tag_id))
            .map(|p| state.hydrate(p))
            .collect())
    }

    async fn update_post(&self, post: &Post) -> Result<Post> {
        let mut state = self.state()?;
        let stored = state
            .posts
            .iter_mut()
            .find(|p| p.id == post.id)
            .ok_or_else(|| AppError::NotFound("No post found matching the query".to_string()))?;

        stored.title = post.title.clone();
        stored.body = post.body.clone();
        stored.tag_ids = post.tag_ids();
        let stored = stored.clone();

        Ok(state.hydrate(&stored))
    }

    async fn delete_post(&self, id: Uuid) -> Result<()> {
        let mut state = self.state()?;
        state.posts.retain(|p| p.id != id);
        Ok(())
    }
}

#[async_trait]
impl TagRepository for InMemoryRepository {
    async fn create_tag(&self, tag: &Tag) -> Result<Tag> {
        let mut state = self.state()?;
        if state.tags.values().any(|t| t.slug.eq_ignore_ascii_case(&tag.slug)) {
            return Err(AppError::DatabaseError(format!("Duplicate tag slug: {}", tag.slug)));
        }
        state.tags.insert(tag.id, tag.clone());
        Ok(tag.clone())
    }

    async fn get_tag_by_slug(&self, slug: &str) -> Result<Option<Tag>> {
        let state = self.state()?;
        let slug = slug.to_lowercase();
        Ok(state.tags.values().find(|t| t.slug.to_lowercase() == slug).cloned())
    }

    async fn get_tags_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Tag>> {
        let state = self.state()?;
        let mut tags: Vec<Tag> = ids.iter().filter_map(|id| state.tags.get(id).cloned()).collect();
        tags.sort_by(|a, b| a.title.cmp(&b.title));
        tags.dedup_by(|a, b| a.id == b.id);
        Ok(tags)
    }

    async fn list_tags(&self) -> Result<Vec<Tag>> {
        let state = self.state()?;
        let mut tags: Vec<Tag> = state.tags.values().cloned().collect();
        tags.sort_by(|a, b| a.title.cmp(&b.title).then_with(|| a.slug.cmp(&b.slug)));
        Ok(tags)
    }

    async fn slug_in_use(&self, slug: &str, exclude: Option<Uuid>) -> Result<bool> {
        let state = self.state()?;
        Ok(state
            .tags
            .values()
            .any(|t| t.slug.eq_ignore_ascii_case(slug) && Some(t.id) != exclude))
    }

    async fn update_tag(&self, tag: &Tag) -> Result<Tag> {
        let mut state = self.state()?;
        let stored = state
            .tags
            .get_mut(&tag.id)
            .ok_or_else(|| AppError::NotFound("No tag found matching the query".to_string()))?;
        *stored = tag.clone();
        Ok(tag.clone())
    }

    async fn delete_tag(&self, id: Uuid) -> Result<()> {
        let mut state = self.state()?;
        state.tags.remove(&id);
        for post in state.posts.iter_mut() {
            post.tag_ids.retain(|tag_id| *tag_id != id);
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryRepository {
    async fn create_user(&self, user: &User) -> Result<User> {
        let mut state = self.state()?;
        if state.users.contains_key(&user.username) {
            return Err(AppError::DatabaseError(format!("Duplicate username: {}", user.username)));
        }
        state.users.insert(user.username.clone(), user.clone());
        Ok(user.clone())
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let state = self.state()?;
        Ok(state.users.get(username).cloned())
    }
}
