use std::sync::Arc;
use uuid::Uuid;
use crate::db::repository::TagRepository;
use crate::forms::{duplicate_slug, Submission, TagForm};
use crate::models::Tag;
use crate::{AppError, Result};

pub struct TagService {
    tag_repo: Arc<dyn TagRepository>,
}

impl TagService {
    pub fn new(tag_repo: Arc<dyn TagRepository>) -> Self {
        Self { tag_repo }
    }

    pub async fn list_tags(&self) -> Result<Vec<Tag>> {
        self.tag_repo.list_tags().await
    }

    pub async fn get_tag(&self, slug: &str) -> Result<Tag> {
        self.tag_repo
            .get_tag_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::NotFound("No tag found matching the query".to_string()))
    }

    pub async fn create_tag(&self, form: &TagForm) -> Result<Submission<Tag>> {
        let errors = self.clean(form, None).await?;
        if !errors.is_empty() {
            return Ok(Submission::Invalid(errors));
        }

        let tag = Tag {
            id: Uuid::new_v4(),
            title: form.title.clone(),
            slug: form.slug.clone(),
        };
        let created = self.tag_repo.create_tag(&tag).await?;
        tracing::info!("🏷️ TAGS: Created tag {}", created.slug);
        Ok(Submission::Saved(created))
    }

    pub async fn update_tag(&self, existing: &Tag, form: &TagForm) -> Result<Submission<Tag>> {
        let errors = self.clean(form, Some(existing.id)).await?;
        if !errors.is_empty() {
            return Ok(Submission::Invalid(errors));
        }

        let tag = Tag {
            id: existing.id,
            title: form.title.clone(),
            slug: form.slug.clone(),
        };
        let updated = self.tag_repo.update_tag(&tag).await?;
        tracing::info!("🏷️ TAGS: Updated tag {} -> {}", existing.slug, updated.slug);
        Ok(Submission::Saved(updated))
    }

    pub async fn delete_tag(&self, tag: &Tag) -> Result<()> {
        self.tag_repo.delete_tag(tag.id).await?;
        tracing::info!("🗑️ TAGS: Deleted tag {}", tag.slug);
        Ok(())
    }

    async fn clean(&self, form: &TagForm, editing: Option<Uuid>) -> Result<crate::forms::FormErrors> {
        let mut errors = form.validate();
        if !errors.has("slug") && self.tag_repo.slug_in_use(&form.slug, editing).await? {
            errors.add("slug", duplicate_slug(&form.slug));
        }
        Ok(errors)
    }
}
