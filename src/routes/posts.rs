use async_trait::async_trait;
use axum::{
    extract::{Query, State},
    response::Html,
};
use tera::Context;
use crate::auth::middleware::CurrentUser;
use crate::auth::Claims;
use crate::forms::{PostForm, Submission};
use crate::models::Post;
use crate::routes::crud::CrudResource;
use crate::templates::{base_context, render};
use crate::{AppState, Result};

/// `?search=` and `?page=` for the listing. Read from raw pairs so repeated
/// or junk values never reject the request; the last value of a key wins.
#[derive(Debug, Default)]
pub struct ListParams {
    pub search: Option<String>,
    pub page: Option<String>,
}

impl ListParams {
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut params = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "search" => params.search = Some(value),
                "page" => params.page = Some(value),
                _ => {}
            }
        }
        params
    }
}

pub async fn posts_list(
    State(app_state): State<AppState>,
    current_user: CurrentUser,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Html<String>> {
    let params = ListParams::from_pairs(pairs);
    let listing = app_state
        .post_service
        .list_posts(params.search.as_deref(), params.page.as_deref())
        .await?;

    let mut context = base_context(current_user.0.as_ref());
    context.insert("page_object", &listing.page_object);
    context.insert("has_other_pages", &listing.has_other_pages);
    context.insert("prev_url", &listing.prev_url);
    context.insert("next_url", &listing.next_url);
    context.insert("search_query", &listing.search_query);

    render(&app_state.templates, "blog_app/index.html", &context)
}

pub struct PostResource;

#[async_trait]
impl CrudResource for PostResource {
    type Object = Post;
    type Form = PostForm;

    const NAME: &'static str = "post";
    const DETAIL_TEMPLATE: &'static str = "blog_app/post_detail.html";
    const CREATE_TEMPLATE: &'static str = "blog_app/post_create_form.html";
    const UPDATE_TEMPLATE: &'static str = "blog_app/post_update_form.html";
    const DELETE_TEMPLATE: &'static str = "blog_app/post_delete_form.html";
    const LIST_URL: &'static str = "/";

    async fn fetch(state: &AppState, slug: &str) -> Result<Post> {
        state.post_service.get_post(slug).await
    }

    async fn create(state: &AppState, form: &PostForm, user: &Claims) -> Result<Submission<Post>> {
        state.post_service.create_post(form, &user.username).await
    }

    async fn update(state: &AppState, object: &Post, form: &PostForm) -> Result<Submission<Post>> {
        state.post_service.update_post(object, form).await
    }

    async fn delete(state: &AppState, object: &Post) -> Result<()> {
        state.post_service.delete_post(object).await
    }

    fn form_from_pairs(pairs: Vec<(String, String)>) -> PostForm {
        PostForm::from_pairs(pairs)
    }

    fn form_from_object(object: &Post) -> PostForm {
        PostForm::from_post(object)
    }

    fn absolute_url(object: &Post) -> String {
        object.absolute_url()
    }

    fn update_url(object: &Post) -> String {
        object.update_url()
    }

    fn delete_url(object: &Post) -> String {
        object.delete_url()
    }

    // The tag picker lists every tag
    async fn extend_form_context(state: &AppState, context: &mut Context) -> Result<()> {
        context.insert("tags", &state.tag_service.list_tags().await?);
        Ok(())
    }
}
