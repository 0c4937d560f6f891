//! Form-encoded input for posts and tags.
//!
//! Forms only check what they can see on their own (required fields, lengths,
//! slug syntax). Checks that need storage, such as tag existence or slug
//! uniqueness, happen in the services, which add to the same [`FormErrors`].

use serde::Serialize;
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::models::post::POST_TITLE_MAX_LENGTH;
use crate::models::tag::{RESERVED_TAG_SLUGS, TAG_SLUG_MAX_LENGTH, TAG_TITLE_MAX_LENGTH};
use crate::models::{Post, Tag};
use crate::utils::slug::is_valid_slug;

pub const REQUIRED: &str = "This field is required.";

/// Field name -> messages, rendered next to each input.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }
}

/// Result of a create or update submission.
#[derive(Debug)]
pub enum Submission<T> {
    Saved(T),
    Invalid(FormErrors),
}

fn check_text(errors: &mut FormErrors, field: &str, value: &str, max_chars: Option<usize>) {
    if value.is_empty() {
        errors.add(field, REQUIRED);
        return;
    }
    if let Some(max) = max_chars {
        let length = value.chars().count();
        if length > max {
            errors.add(
                field,
                format!("Ensure this value has at most {} characters (it has {}).", max, length),
            );
        }
    }
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct PostForm {
    pub title: String,
    pub body: String,
    /// Raw submitted tag ids, kept as text so a bad value can be shown back.
    pub tags: Vec<String>,
}

impl PostForm {
    /// Builds the form from decoded `application/x-www-form-urlencoded` pairs.
    /// `tags` may repeat.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut form = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "title" => form.title = value.trim().to_string(),
                "body" => form.body = value.trim().to_string(),
                "tags" if !value.trim().is_empty() => form.tags.push(value.trim().to_string()),
                _ => {}
            }
        }
        form
    }

    pub fn from_post(post: &Post) -> Self {
        Self {
            title: post.title.clone(),
            body: post.body.clone(),
            tags: post.tags.iter().map(|tag| tag.id.to_string()).collect(),
        }
    }

    /// Field checks plus the tag ids that parsed. Unparseable ids are reported
    /// as invalid choices.
    pub fn validate(&self) -> (FormErrors, Vec<Uuid>) {
        let mut errors = FormErrors::default();
        check_text(&mut errors, "title", &self.title, Some(POST_TITLE_MAX_LENGTH));
        check_text(&mut errors, "body", &self.body, None);

        let mut tag_ids = Vec::with_capacity(self.tags.len());
        for raw in &self.tags {
            match Uuid::parse_str(raw) {
                Ok(id) if !tag_ids.contains(&id) => tag_ids.push(id),
                Ok(_) => {}
                Err(_) => errors.add("tags", invalid_choice(raw)),
            }
        }

        (errors, tag_ids)
    }
}

pub fn invalid_choice(value: &str) -> String {
    format!("Select a valid choice. {} is not one of the available choices.", value)
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct TagForm {
    pub title: String,
    pub slug: String,
}

impl TagForm {
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut form = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "title" => form.title = value.trim().to_string(),
                "slug" => form.slug = value.trim().to_lowercase(),
                _ => {}
            }
        }
        form
    }

    pub fn from_tag(tag: &Tag) -> Self {
        Self {
            title: tag.title.clone(),
            slug: tag.slug.clone(),
        }
    }

    pub fn validate(&self) -> FormErrors {
        let mut errors = FormErrors::default();
        check_text(&mut errors, "title", &self.title, Some(TAG_TITLE_MAX_LENGTH));
        check_text(&mut errors, "slug", &self.slug, Some(TAG_SLUG_MAX_LENGTH));

        if !self.slug.is_empty() {
            if RESERVED_TAG_SLUGS.contains(&self.slug.as_str()) {
                errors.add("slug", format!("Slug may not be \"{}\"", self.slug));
            } else if !is_valid_slug(&self.slug) {
                errors.add(
                    "slug",
                    "Enter a valid slug consisting of letters, numbers, underscores or hyphens.",
                );
            }
        }

        errors
    }
}

pub fn duplicate_slug(slug: &str) -> String {
    format!("Slug must be unique. We have \"{}\" slug already", slug)
}
