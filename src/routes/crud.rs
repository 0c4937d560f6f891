//! Detail, create, update and delete pages shared by posts and tags.
//!
//! Each record kind implements [`CrudResource`]; the handlers below are
//! instantiated per kind in the router, e.g. `crud::detail::<PostResource>`.

use async_trait::async_trait;
use axum::{
    extract::{Form, Path, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Serialize;
use tera::Context;

use crate::auth::middleware::{CurrentUser, LoggedInUser};
use crate::auth::Claims;
use crate::forms::{FormErrors, Submission};
use crate::templates::{base_context, render};
use crate::{AppState, Result};

#[async_trait]
pub trait CrudResource: Send + Sync + 'static {
    type Object: Serialize + Send + Sync;
    type Form: Serialize + Default + Send + Sync;

    /// Context key the object is rendered under.
    const NAME: &'static str;
    const DETAIL_TEMPLATE: &'static str;
    const CREATE_TEMPLATE: &'static str;
    const UPDATE_TEMPLATE: &'static str;
    const DELETE_TEMPLATE: &'static str;
    /// Where a successful delete lands.
    const LIST_URL: &'static str;

    async fn fetch(state: &AppState, slug: &str) -> Result<Self::Object>;
    async fn create(state: &AppState, form: &Self::Form, user: &Claims) -> Result<Submission<Self::Object>>;
    async fn update(state: &AppState, object: &Self::Object, form: &Self::Form) -> Result<Submission<Self::Object>>;
    async fn delete(state: &AppState, object: &Self::Object) -> Result<()>;

    fn form_from_pairs(pairs: Vec<(String, String)>) -> Self::Form;
    fn form_from_object(object: &Self::Object) -> Self::Form;

    fn absolute_url(object: &Self::Object) -> String;
    fn update_url(object: &Self::Object) -> String;
    fn delete_url(object: &Self::Object) -> String;

    async fn extend_detail_context(_state: &AppState, _object: &Self::Object, _context: &mut Context) -> Result<()> {
        Ok(())
    }

    async fn extend_form_context(_state: &AppState, _context: &mut Context) -> Result<()> {
        Ok(())
    }
}

async fn render_form<R: CrudResource>(
    state: &AppState,
    user: &Claims,
    template: &str,
    form: &R::Form,
    errors: &FormErrors,
    object: Option<&R::Object>,
) -> Result<Html<String>> {
    let mut context = base_context(Some(user));
    context.insert("form", form);
    context.insert("errors", errors);
    if let Some(object) = object {
        context.insert(R::NAME, object);
    }
    R::extend_form_context(state, &mut context).await?;
    render(&state.templates, template, &context)
}

pub async fn detail<R: CrudResource>(
    State(app_state): State<AppState>,
    current_user: CurrentUser,
    Path(slug): Path<String>,
) -> Result<Html<String>> {
    let object = R::fetch(&app_state, &slug).await?;

    let mut context = base_context(current_user.0.as_ref());
    context.insert(R::NAME, &object);
    context.insert("admin_object", &object);
    context.insert("detail", &true);
    context.insert("update_url", &R::update_url(&object));
    context.insert("delete_url", &R::delete_url(&object));
    R::extend_detail_context(&app_state, &object, &mut context).await?;

    render(&app_state.templates, R::DETAIL_TEMPLATE, &context)
}

pub async fn create_form<R: CrudResource>(
    State(app_state): State<AppState>,
    LoggedInUser(user): LoggedInUser,
) -> Result<Html<String>> {
    render_form::<R>(&app_state, &user, R::CREATE_TEMPLATE, &R::Form::default(), &FormErrors::default(), None).await
}

pub async fn create<R: CrudResource>(
    State(app_state): State<AppState>,
    LoggedInUser(user): LoggedInUser,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Response> {
    let form = R::form_from_pairs(pairs);
    match R::create(&app_state, &form, &user).await? {
        Submission::Saved(object) => Ok(Redirect::to(&R::absolute_url(&object)).into_response()),
        Submission::Invalid(errors) => {
            let page = render_form::<R>(&app_state, &user, R::CREATE_TEMPLATE, &form, &errors, None).await?;
            Ok(page.into_response())
        }
    }
}

pub async fn update_form<R: CrudResource>(
    State(app_state): State<AppState>,
    LoggedInUser(user): LoggedInUser,
    Path(slug): Path<String>,
) -> Result<Html<String>> {
    let object = R::fetch(&app_state, &slug).await?;
    let form = R::form_from_object(&object);
    render_form::<R>(&app_state, &user, R::UPDATE_TEMPLATE, &form, &FormErrors::default(), Some(&object)).await
}

pub async fn update<R: CrudResource>(
    State(app_state): State<AppState>,
    LoggedInUser(user): LoggedInUser,
    Path(slug): Path<String>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Response> {
    let object = R::fetch(&app_state, &slug).await?;
    let form = R::form_from_pairs(pairs);
    match R::update(&app_state, &object, &form).await? {
        Submission::Saved(updated) => Ok(Redirect::to(&R::absolute_url(&updated)).into_response()),
        Submission::Invalid(errors) => {
            let page = render_form::<R>(&app_state, &user, R::UPDATE_TEMPLATE, &form, &errors, Some(&object)).await?;
            Ok(page.into_response())
        }
    }
}

pub async fn delete_form<R: CrudResource>(
    State(app_state): State<AppState>,
    LoggedInUser(user): LoggedInUser,
    Path(slug): Path<String>,
) -> Result<Html<String>> {
    let object = R::fetch(&app_state, &slug).await?;
    let mut context = base_context(Some(&user));
    context.insert(R::NAME, &object);
    render(&app_state.templates, R::DELETE_TEMPLATE, &context)
}

pub async fn delete<R: CrudResource>(
    State(app_state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Redirect> {
    let object = R::fetch(&app_state, &slug).await?;
    R::delete(&app_state, &object).await?;
    Ok(Redirect::to(R::LIST_URL))
}
