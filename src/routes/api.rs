use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use crate::error::ApiError;
use crate::models::post::PostResponse;
use crate::models::tag::TagResponse;
use crate::routes::posts::ListParams;
use crate::AppState;

type ApiResult = std::result::Result<Json<Value>, ApiError>;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(api_health))
        .route("/posts", get(list_posts))
        .route("/posts/:slug", get(get_post))
        .route("/tags", get(list_tags))
        .route("/tags/:slug", get(get_tag))
}

async fn api_health(State(app_state): State<AppState>) -> ApiResult {
    app_state.db.health_check().await?;
    Ok(Json(json!({
        "status": "healthy",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "storage": app_state.db.backend_name()
    })))
}

async fn list_posts(
    State(app_state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> ApiResult {
    let params = ListParams::from_pairs(pairs);
    let listing = app_state
        .post_service
        .list_posts(params.search.as_deref(), params.page.as_deref())
        .await?;
    let page = listing.page_object.map(PostResponse::from);

    Ok(Json(json!({
        "posts": page.object_list,
        "page": page.number,
        "num_pages": page.num_pages,
        "count": page.count,
        "has_previous": page.has_previous,
        "has_next": page.has_next,
        "prev_url": listing.prev_url,
        "next_url": listing.next_url,
        "search": listing.search_query
    })))
}

async fn get_post(
    State(app_state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult {
    let post = app_state.post_service.get_post(&slug).await?;
    Ok(Json(json!({ "post": PostResponse::from(post) })))
}

async fn list_tags(State(app_state): State<AppState>) -> ApiResult {
    let tags: Vec<TagResponse> = app_state
        .tag_service
        .list_tags()
        .await?
        .into_iter()
        .map(TagResponse::from)
        .collect();
    Ok(Json(json!({ "tags": tags })))
}

async fn get_tag(
    State(app_state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult {
    let tag = app_state.tag_service.get_tag(&slug).await?;
    let posts: Vec<PostResponse> = app_state
        .post_service
        .get_posts_for_tag(&tag)
        .await?
        .into_iter()
        .map(PostResponse::from)
        .collect();

    Ok(Json(json!({
        "tag": TagResponse::from(tag),
        "posts": posts
    })))
}
