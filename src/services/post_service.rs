use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;
use crate::db::repository::{PostRepository, TagRepository};
use crate::forms::{invalid_choice, FormErrors, PostForm, Submission};
use crate::models::{Post, Tag};
use crate::utils::pagination::{page_query, Page, Paginator};
use crate::utils::slug::gen_post_slug;
use crate::{AppError, Result};

/// One page of the post listing plus the links around it.
#[derive(Debug, Serialize)]
pub struct PostListing {
    pub page_object: Page<Post>,
    pub has_other_pages: bool,
    pub prev_url: String,
    pub next_url: String,
    pub search_query: String,
}

pub struct PostService {
    post_repo: Arc<dyn PostRepository>,
    tag_repo: Arc<dyn TagRepository>,
    posts_per_page: u32,
}

impl PostService {
    pub fn new(post_repo: Arc<dyn PostRepository>, tag_repo: Arc<dyn TagRepository>, posts_per_page: u32) -> Self {
        Self {
            post_repo,
            tag_repo,
            posts_per_page: posts_per_page.max(1),
        }
    }

    /// Filters by `search` (title or body, case-insensitive, taken verbatim)
    /// when it is non-empty and returns the requested page, falling back to a valid one.
    pub async fn list_posts(&self, search: Option<&str>, page: Option<&str>) -> Result<PostListing> {
        let search = search.filter(|s| !s.is_empty());

        let count = self.post_repo.count_posts(search).await?;
        let paginator = Paginator::new(count, self.posts_per_page);
        let number = paginator.resolve_page(page);
        let (offset, limit) = paginator.bounds(number);
        let posts = self.post_repo.get_posts_paginated(search, limit, offset).await?;
        let page = paginator.page(number, posts);

        let prev_url = page.previous_page_number.map(|n| page_query(n, search)).unwrap_or_default();
        let next_url = page.next_page_number.map(|n| page_query(n, search)).unwrap_or_default();

        Ok(PostListing {
            has_other_pages: page.has_other_pages,
            page_object: page,
            prev_url,
            next_url,
            search_query: search.unwrap_or_default().to_string(),
        })
    }

    pub async fn get_post(&self, slug: &str) -> Result<Post> {
        self.post_repo
            .get_post_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::NotFound("No post found matching the query".to_string()))
    }

    pub async fn get_posts_for_tag(&self, tag: &Tag) -> Result<Vec<Post>> {
        self.post_repo.get_posts_by_tag(tag.id).await
    }

    pub async fn create_post(&self, form: &PostForm, author_username: &str) -> Result<Submission<Post>> {
        let (errors, tags) = self.clean(form).await?;
        if !errors.is_empty() {
            return Ok(Submission::Invalid(errors));
        }

        let now = Utc::now();
        let post = Post {
            id: Uuid::new_v4(),
            title: form.title.clone(),
            slug: self.unique_slug(&gen_post_slug(&form.title, now)).await?,
            body: form.body.clone(),
            tags,
            author_username: author_username.to_string(),
            date_pub: now,
        };

        let created = self.post_repo.create_post(&post).await?;
        tracing::info!("📝 POSTS: {} created post {}", author_username, created.slug);
        Ok(Submission::Saved(created))
    }

    pub async fn update_post(&self, existing: &Post, form: &PostForm) -> Result<Submission<Post>> {
        let (errors, tags) = self.clean(form).await?;
        if !errors.is_empty() {
            return Ok(Submission::Invalid(errors));
        }

        let post = Post {
            title: form.title.clone(),
            body: form.body.clone(),
            tags,
            ..existing.clone()
        };

        let updated = self.post_repo.update_post(&post).await?;
        tracing::info!("📝 POSTS: Updated post {}", updated.slug);
        Ok(Submission::Saved(updated))
    }

    pub async fn delete_post(&self, post: &Post) -> Result<()> {
        self.post_repo.delete_post(post.id).await?;
        tracing::info!("🗑️ POSTS: Deleted post {}", post.slug);
        Ok(())
    }

    /// Runs the form checks and resolves the selected tag ids against storage.
    async fn clean(&self, form: &PostForm) -> Result<(FormErrors, Vec<Tag>)> {
        let (mut errors, ids) = form.validate();
        let tags = self.tag_repo.get_tags_by_ids(&ids).await?;

        for id in &ids {
            if !tags.iter().any(|tag| tag.id == *id) {
                errors.add("tags", invalid_choice(&id.to_string()));
            }
        }

        Ok((errors, tags))
    }

    /// Two posts with the same title in the same second would share a slug.
    async fn unique_slug(&self, base: &str) -> Result<String> {
        let mut candidate = base.to_string();
        let mut suffix = 2;
        while self.post_repo.get_post_by_slug(&candidate).await?.is_some() {
            candidate = format!("{}-{}", base, suffix);
            suffix += 1;
        }
        Ok(candidate)
    }
}
