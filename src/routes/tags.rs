use async_trait::async_trait;
use axum::{extract::State, response::Html};
use tera::Context;
use crate::auth::middleware::CurrentUser;
use crate::auth::Claims;
use crate::forms::{Submission, TagForm};
use crate::models::Tag;
use crate::routes::crud::CrudResource;
use crate::templates::{base_context, render};
use crate::{AppState, Result};

pub async fn tags_list(
    State(app_state): State<AppState>,
    current_user: CurrentUser,
) -> Result<Html<String>> {
    let tags = app_state.tag_service.list_tags().await?;

    let mut context = base_context(current_user.0.as_ref());
    context.insert("tags", &tags);
    render(&app_state.templates, "blog_app/tags_list.html", &context)
}

pub struct TagResource;

#[async_trait]
impl CrudResource for TagResource {
    type Object = Tag;
    type Form = TagForm;

    const NAME: &'static str = "tag";
    const DETAIL_TEMPLATE: &'static str = "blog_app/tag_detail.html";
    const CREATE_TEMPLATE: &'static str = "blog_app/tag_create.html";
    const UPDATE_TEMPLATE: &'static str = "blog_app/tag_update_form.html";
    const DELETE_TEMPLATE: &'static str = "blog_app/tag_delete_form.html";
    const LIST_URL: &'static str = "/tags/";

    async fn fetch(state: &AppState, slug: &str) -> Result<Tag> {
        state.tag_service.get_tag(slug).await
    }

    async fn create(state: &AppState, form: &TagForm, _user: &Claims) -> Result<Submission<Tag>> {
        state.tag_service.create_tag(form).await
    }

    async fn update(state: &AppState, object: &Tag, form: &TagForm) -> Result<Submission<Tag>> {
        state.tag_service.update_tag(object, form).await
    }

    async fn delete(state: &AppState, object: &Tag) -> Result<()> {
        state.tag_service.delete_tag(object).await
    }

    fn form_from_pairs(pairs: Vec<(String, String)>) -> TagForm {
        TagForm::from_pairs(pairs)
    }

    fn form_from_object(object: &Tag) -> TagForm {
        TagForm::from_tag(object)
    }

    fn absolute_url(object: &Tag) -> String {
        object.absolute_url()
    }

    fn update_url(object: &Tag) -> String {
        object.update_url()
    }

    fn delete_url(object: &Tag) -> String {
        object.delete_url()
    }

    async fn extend_detail_context(state: &AppState, object: &Tag, context: &mut Context) -> Result<()> {
        context.insert("posts", &state.post_service.get_posts_for_tag(object).await?);
        Ok(())
    }
}
