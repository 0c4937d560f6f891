use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use blog_app::db::DatabaseClient;
use blog_app::forms::{PostForm, Submission, TagForm};
use blog_app::models::{Post, Tag};
use blog_app::routes::create_routes;
use blog_app::{AppConfig, AppState};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

const PASSWORD: &str = "correct horse";

async fn test_app(posts_per_page: u32) -> (Router, AppState) {
    let config = AppConfig {
        posts_per_page,
        jwt_secret: "test-secret".to_string(),
        ..AppConfig::default()
    };
    let state = AppState::with_database(config, DatabaseClient::in_memory()).unwrap();
    state
        .user_service
        .ensure_user("admin", PASSWORD, &state.auth_service)
        .await
        .unwrap();
    (create_routes(state.clone()), state)
}

fn session_cookie(state: &AppState) -> String {
    let token = state.auth_service.generate_token(Uuid::new_v4(), "admin").unwrap();
    format!("session={}", token)
}

async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn post_form(uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn location(response: &Response) -> &str {
    response.headers().get(header::LOCATION).unwrap().to_str().unwrap()
}

async fn create_post(state: &AppState, title: &str, body: &str, tags: &[&Tag]) -> Post {
    let form = PostForm {
        title: title.to_string(),
        body: body.to_string(),
        tags: tags.iter().map(|tag| tag.id.to_string()).collect(),
    };
    match state.post_service.create_post(&form, "admin").await.unwrap() {
        Submission::Saved(post) => post,
        Submission::Invalid(errors) => panic!("unexpected form errors: {:?}", errors),
    }
}

async fn create_tag(state: &AppState, title: &str, slug: &str) -> Tag {
    let form = TagForm { title: title.to_string(), slug: slug.to_string() };
    match state.tag_service.create_tag(&form).await.unwrap() {
        Submission::Saved(tag) => tag,
        Submission::Invalid(errors) => panic!("unexpected form errors: {:?}", errors),
    }
}

#[tokio::test]
async fn anonymous_requests_to_gated_pages_are_forbidden() {
    let (app, state) = test_app(1).await;
    let post = create_post(&state, "Existing", "body", &[]).await;
    create_tag(&state, "Rust", "rust").await;

    let gated = [
        "/post/create/".to_string(),
        format!("/post/{}/update/", post.slug),
        format!("/post/{}/delete/", post.slug),
        "/tag/create/".to_string(),
        "/tag/rust/update/".to_string(),
        "/tag/rust/delete/".to_string(),
    ];

    for uri in &gated {
        let response = send(&app, get(uri, None)).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "GET {}", uri);

        let response = send(&app, post_form(uri, "title=x&body=y&slug=x", None)).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "POST {}", uri);

        let response = send(&app, get(uri, Some("session=not-a-token"))).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "GET {} with bad session", uri);
    }

    // Nothing was changed by the rejected requests
    assert_eq!(state.post_service.list_posts(None, None).await.unwrap().page_object.count, 1);
    assert!(state.tag_service.get_tag("rust").await.is_ok());
}

#[tokio::test]
async fn search_is_a_case_insensitive_title_or_body_filter() {
    let (app, state) = test_app(10).await;
    create_post(&state, "Learning Rust", "ownership and borrowing", &[]).await;
    create_post(&state, "Gardening", "keeping roses free of rust", &[]).await;
    create_post(&state, "Cooking", "fresh pasta", &[]).await;

    let response = send(&app, get("/?search=RUST", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Learning Rust"));
    assert!(html.contains("Gardening"));
    assert!(!html.contains("Cooking"));

    let html = body_text(send(&app, get("/", None)).await).await;
    assert!(html.contains("Cooking"));

    let html = body_text(send(&app, get("/?search=nothing-like-this", None)).await).await;
    assert!(html.contains("No posts found."));
}

#[tokio::test]
async fn listing_shows_one_post_per_page_with_boundary_links() {
    let (app, state) = test_app(1).await;
    create_post(&state, "Post One", "a", &[]).await;
    create_post(&state, "Post Two", "b", &[]).await;
    create_post(&state, "Post Three", "c", &[]).await;

    let first = body_text(send(&app, get("/", None)).await).await;
    assert!(first.contains("Post Three"));
    assert!(!first.contains("Post Two"));
    assert!(first.contains(r#"<span class="disabled">Previous</span>"#));
    assert!(first.contains(r#"href="?page=2""#));

    let middle = body_text(send(&app, get("/?page=2", None)).await).await;
    assert!(middle.contains("Post Two"));
    assert!(middle.contains(r#"href="?page=1""#));
    assert!(middle.contains(r#"href="?page=3""#));

    let last = body_text(send(&app, get("/?page=3", None)).await).await;
    assert!(last.contains("Post One"));
    assert!(last.contains(r#"<span class="disabled">Next</span>"#));

    // Bad input falls back instead of failing
    let junk = body_text(send(&app, get("/?page=abc", None)).await).await;
    assert!(junk.contains("Post Three"));
    let beyond = body_text(send(&app, get("/?page=99", None)).await).await;
    assert!(beyond.contains("Post One"));
}

#[tokio::test]
async fn page_links_carry_the_search_term() {
    let (app, state) = test_app(1).await;
    create_post(&state, "Rust one", "a", &[]).await;
    create_post(&state, "Rust two", "b", &[]).await;

    let html = body_text(send(&app, get("/?search=rust", None)).await).await;
    assert!(html.contains(r#"href="?page=2&search=rust""#));
}

#[tokio::test]
async fn logged_in_user_creates_a_post() {
    let (app, state) = test_app(1).await;
    let cookie = session_cookie(&state);
    let tag = create_tag(&state, "Rust", "rust").await;

    let response = send(&app, get("/post/create/", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains(&tag.id.to_string()));

    let body = format!("title=Hello+World&body=First+post&tags={}", tag.id);
    let response = send(&app, post_form("/post/create/", &body, Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let detail_url = location(&response).to_string();
    assert!(detail_url.starts_with("/post/hello-world-"));

    let html = body_text(send(&app, get(&detail_url, None)).await).await;
    assert!(html.contains("Hello World"));
    assert!(html.contains("First post"));
    assert!(html.contains(r#"href="/tag/rust/""#));

    let tag_page = body_text(send(&app, get("/tag/rust/", None)).await).await;
    assert!(tag_page.contains("Hello World"));
}

#[tokio::test]
async fn invalid_post_form_is_rendered_again_with_errors() {
    let (app, state) = test_app(1).await;
    let cookie = session_cookie(&state);

    let response = send(&app, post_form("/post/create/", "title=&body=kept+text", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("This field is required."));
    assert!(html.contains("kept text"));

    assert_eq!(state.post_service.list_posts(None, None).await.unwrap().page_object.count, 0);
}

#[tokio::test]
async fn updating_a_post_keeps_its_url() {
    let (app, state) = test_app(1).await;
    let cookie = session_cookie(&state);
    let post = create_post(&state, "Draft", "old body", &[]).await;

    let form_page = body_text(send(&app, get(&post.update_url(), Some(&cookie))).await).await;
    assert!(form_page.contains("old body"));

    let response = send(&app, post_form(&post.update_url(), "title=Final&body=new+body", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), post.absolute_url());

    let updated = state.post_service.get_post(&post.slug).await.unwrap();
    assert_eq!(updated.title, "Final");
    assert_eq!(updated.body, "new body");
}

#[tokio::test]
async fn deleting_redirects_to_the_listing() {
    let (app, state) = test_app(1).await;
    let cookie = session_cookie(&state);
    let post = create_post(&state, "Doomed", "body", &[]).await;
    create_tag(&state, "Old", "old").await;

    let confirm = send(&app, get(&post.delete_url(), Some(&cookie))).await;
    assert_eq!(confirm.status(), StatusCode::OK);
    assert!(body_text(confirm).await.contains("Doomed"));

    let response = send(&app, post_form(&post.delete_url(), "", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
    assert_eq!(send(&app, get(&post.absolute_url(), None)).await.status(), StatusCode::NOT_FOUND);

    let response = send(&app, post_form("/tag/old/delete/", "", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/tags/");
    assert_eq!(send(&app, get("/tag/old/", None)).await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn tag_forms_enforce_unique_lowercase_slugs() {
    let (app, state) = test_app(1).await;
    let cookie = session_cookie(&state);

    let response = send(&app, post_form("/tag/create/", "title=Rust&slug=RUST", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/tag/rust/");

    let response = send(&app, post_form("/tag/create/", "title=Again&slug=rust", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Slug must be unique."));

    let response = send(&app, post_form("/tag/create/", "title=Route&slug=create", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Slug may not be"));

    let response = send(&app, post_form("/tag/rust/update/", "title=Rust+Lang&slug=rust-lang", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/tag/rust-lang/");

    let list = body_text(send(&app, get("/tags/", None)).await).await;
    assert!(list.contains("Rust Lang"));
}

#[tokio::test]
async fn detail_lookup_ignores_slug_case_and_404s_when_missing() {
    let (app, state) = test_app(1).await;
    let post = create_post(&state, "Casing", "body", &[]).await;
    create_tag(&state, "Rust", "rust").await;

    let upper = format!("/post/{}/", post.slug.to_uppercase());
    assert_eq!(send(&app, get(&upper, None)).await.status(), StatusCode::OK);
    assert_eq!(send(&app, get("/tag/RUST/", None)).await.status(), StatusCode::OK);
    assert_eq!(send(&app, get("/post/missing/", None)).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(send(&app, get("/tag/missing/", None)).await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn login_sets_a_session_that_unlocks_gated_pages() {
    let (app, _state) = test_app(1).await;

    let response = send(&app, post_form("/login/", "username=admin&password=wrong", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
    assert!(body_text(response).await.contains("Please enter a correct username and password"));

    let response = send(
        &app,
        post_form("/login/", "username=admin&password=correct+horse&next=%2Ftag%2Fcreate%2F", None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/tag/create/");

    let set_cookie = response.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap();
    assert!(set_cookie.contains("HttpOnly"));
    let cookie = set_cookie.split(';').next().unwrap().to_string();
    assert!(cookie.starts_with("session="));

    assert_eq!(send(&app, get("/tag/create/", Some(&cookie))).await.status(), StatusCode::OK);

    let response = send(&app, get("/logout/", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(response.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap().contains("Max-Age=0"));
}

#[tokio::test]
async fn bearer_token_works_for_gated_pages() {
    let (app, state) = test_app(1).await;
    let token = state.auth_service.generate_token(Uuid::new_v4(), "admin").unwrap();

    let request = Request::builder()
        .uri("/post/create/")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    assert_eq!(send(&app, request).await.status(), StatusCode::OK);
}

#[tokio::test]
async fn json_api_mirrors_the_listing() {
    let (app, state) = test_app(1).await;
    let tag = create_tag(&state, "Rust", "rust").await;
    create_post(&state, "Older", "a", &[]).await;
    create_post(&state, "Newer", "b", &[&tag]).await;

    let response = send(&app, get("/api/v1/posts?page=1", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json["count"], 2);
    assert_eq!(json["num_pages"], 2);
    assert_eq!(json["posts"][0]["title"], "Newer");
    assert_eq!(json["posts"][0]["tags"][0], "rust");
    assert_eq!(json["next_url"], "?page=2");

    let response = send(&app, get("/api/v1/tags/rust", None)).await;
    let json: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json["posts"].as_array().unwrap().len(), 1);

    let response = send(&app, get("/api/v1/posts/missing", None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json["status"], 404);

    let response = send(&app, get("/api/v1/health", None)).await;
    let json: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json["storage"], "memory");
}

#[tokio::test]
async fn login_ignores_next_values_that_could_leave_the_site() {
    let (app, _state) = test_app(1).await;

    for next in ["%2F%09%2Fevil.example", "%2Fa%0Ab", "%2F%2Fevil.example", "https%3A%2F%2Fevil.example"] {
        let body = format!("username=admin&password=correct+horse&next={}", next);
        let response = send(&app, post_form("/login/", &body, None)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "next={}", next);
        assert_eq!(location(&response), "/", "next={}", next);
        assert!(response.headers().get(header::SET_COOKIE).is_some());
    }
}

#[tokio::test]
async fn search_term_is_not_trimmed() {
    let (app, state) = test_app(10).await;
    create_post(&state, "trust fund", "savings", &[]).await;
    create_post(&state, "learning rust", "ownership", &[]).await;

    let html = body_text(send(&app, get("/?search=%20rust", None)).await).await;
    assert!(html.contains("learning rust"));
    assert!(!html.contains("trust fund"));

    let html = body_text(send(&app, get("/?search=", None)).await).await;
    assert!(html.contains("learning rust"));
    assert!(html.contains("trust fund"));
}

#[tokio::test]
async fn repeated_query_keys_use_the_last_value() {
    let (app, state) = test_app(1).await;
    create_post(&state, "Post One", "a", &[]).await;
    create_post(&state, "Post Two", "b", &[]).await;

    let response = send(&app, get("/?page=1&page=2", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Post One"));
    assert!(!html.contains("Post Two"));

    let response = send(&app, get("/?search=Two&search=One", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Post One"));
    assert!(!html.contains("Post Two"));

    let response = send(&app, get("/api/v1/posts?page=1&page=2", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json["page"], 2);
}

#[tokio::test]
async fn invalid_post_update_is_rendered_again_with_errors() {
    let (app, state) = test_app(1).await;
    let cookie = session_cookie(&state);
    let post = create_post(&state, "Stable", "original body", &[]).await;

    let response = send(&app, post_form(&post.update_url(), "title=&body=edited+body", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("This field is required."));
    assert!(html.contains("edited body"));

    let unchanged = state.post_service.get_post(&post.slug).await.unwrap();
    assert_eq!(unchanged.title, "Stable");
    assert_eq!(unchanged.body, "original body");
}
