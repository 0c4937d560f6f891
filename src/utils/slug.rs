use chrono::{DateTime, Utc};

/// Post slugs are the slugified title suffixed with the creation time in unix
/// seconds, so two posts with the same title still get distinct URLs.
pub fn gen_post_slug(title: &str, now: DateTime<Utc>) -> String {
    let base = ::slug::slugify(title);
    if base.is_empty() {
        format!("post-{}", now.timestamp())
    } else {
        format!("{}-{}", base, now.timestamp())
    }
}

/// Tag slugs are typed by hand; accept only lowercase ASCII, digits, `-` and `_`.
pub fn is_valid_slug(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn post_slug_appends_timestamp() {
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        assert_eq!(gen_post_slug("Hello, World!", now), "hello-world-1700000000");
        assert_eq!(gen_post_slug("!!!", now), "post-1700000000");
    }

    #[test]
    fn validates_tag_slugs() {
        assert!(is_valid_slug("rust-lang_2"));
        assert!(!is_valid_slug(""));
        assert!(!is_valid_slug("Rust"));
        assert!(!is_valid_slug("two words"));
    }
}
