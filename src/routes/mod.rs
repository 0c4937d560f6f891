pub mod api;
pub mod auth;
pub mod crud;
pub mod posts;
pub mod tags;
pub mod web;

use axum::{middleware, routing::get, Router};
use tower_http::trace::TraceLayer;
use crate::auth::middleware::require_login;
use crate::AppState;
use crud::{create, create_form, delete, delete_form, detail, update, update_form};
use posts::PostResource;
use tags::TagResource;

pub fn create_routes(app_state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/", get(posts::posts_list))
        .route("/post/:slug/", get(detail::<PostResource>))
        .route("/tags/", get(tags::tags_list))
        .route("/tag/:slug/", get(detail::<TagResource>))
        .route("/login/", get(auth::login_form).post(auth::login))
        .route("/logout/", get(auth::logout).post(auth::logout));

    // Login required: anonymous requests get a 403, never a login redirect
    let protected_routes = Router::new()
        .route("/post/create/", get(create_form::<PostResource>).post(create::<PostResource>))
        .route("/post/:slug/update/", get(update_form::<PostResource>).post(update::<PostResource>))
        .route("/post/:slug/delete/", get(delete_form::<PostResource>).post(delete::<PostResource>))
        .route("/tag/create/", get(create_form::<TagResource>).post(create::<TagResource>))
        .route("/tag/:slug/update/", get(update_form::<TagResource>).post(update::<TagResource>))
        .route("/tag/:slug/delete/", get(delete_form::<TagResource>).post(delete::<TagResource>))
        .route_layer(middleware::from_fn_with_state(app_state.clone(), require_login));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .merge(web::routes())
        .nest("/api/v1", api::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
