//! Tera engine with the page templates compiled into the binary.

use axum::response::Html;
use tera::{Context, Tera};

use crate::auth::Claims;
use crate::Result;

const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../templates/base.html")),
    ("login.html", include_str!("../templates/login.html")),
    ("blog_app/index.html", include_str!("../templates/blog_app/index.html")),
    ("blog_app/post_detail.html", include_str!("../templates/blog_app/post_detail.html")),
    ("blog_app/post_create_form.html", include_str!("../templates/blog_app/post_create_form.html")),
    ("blog_app/post_update_form.html", include_str!("../templates/blog_app/post_update_form.html")),
    ("blog_app/post_delete_form.html", include_str!("../templates/blog_app/post_delete_form.html")),
    ("blog_app/tags_list.html", include_str!("../templates/blog_app/tags_list.html")),
    ("blog_app/tag_detail.html", include_str!("../templates/blog_app/tag_detail.html")),
    ("blog_app/tag_create.html", include_str!("../templates/blog_app/tag_create.html")),
    ("blog_app/tag_update_form.html", include_str!("../templates/blog_app/tag_update_form.html")),
    ("blog_app/tag_delete_form.html", include_str!("../templates/blog_app/tag_delete_form.html")),
];

pub fn build_engine() -> Result<Tera> {
    let mut tera = Tera::default();
    tera.add_raw_templates(TEMPLATES.iter().copied())?;
    Ok(tera)
}

/// Context every page starts from; the layout needs the session user.
pub fn base_context(user: Option<&Claims>) -> Context {
    let mut context = Context::new();
    context.insert("current_user", &user.map(|claims| claims.username.as_str()));
    context
}

pub fn render(tera: &Tera, template: &str, context: &Context) -> Result<Html<String>> {
    Ok(Html(tera.render(template, context)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_templates_parse() {
        let tera = build_engine().unwrap();
        assert_eq!(tera.get_template_names().count(), TEMPLATES.len());
    }

    #[test]
    fn escapes_user_content() {
        let tera = build_engine().unwrap();
        let mut context = base_context(None);
        context.insert("tags", &vec![serde_json::json!({
            "id": "1", "title": "<script>", "slug": "x"
        })]);

        let html = render(&tera, "blog_app/tags_list.html", &context).unwrap().0;
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("Log in"));
    }
}
