//! Markup stripping for payloads crossing the API boundary
//!
//! Every string that leaves or enters the client passes through
//! [`sanitize_value`], which removes all markup. The result contains no
//! `<...>` sequence, so sanitizing twice yields the same value.

use regex::{Captures, Regex};
use serde_json::Value;
use std::sync::LazyLock;

static SCRIPT_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>").expect("valid script regex")
});

static STYLE_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<style\b[^>]*>.*?</style\s*>").expect("valid style regex")
});

static COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("valid comment regex"));

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));

static TAG_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^<\s*(/?)\s*([A-Za-z][A-Za-z0-9]*)").expect("valid tag name regex")
});

/// Tags preserved by [`sanitize_html`]
pub const ALLOWED_RICH_TAGS: &[&str] = &["b", "i", "u", "strong", "em", "br", "p"];

fn strip_blocks(input: &str) -> String {
    let without_scripts = SCRIPT_BLOCK.replace_all(input, "");
    let without_styles = STYLE_BLOCK.replace_all(&without_scripts, "");
    COMMENT.replace_all(&without_styles, "").into_owned()
}

/// Remove all markup from `input`, leaving only text content
pub fn sanitize_text(input: &str) -> String {
    if !input.contains('<') {
        return input.to_string();
    }
    let stripped = strip_blocks(input);
    TAG.replace_all(&stripped, "").into_owned()
}

/// Remove all markup except a small set of formatting tags.
/// Attributes are dropped from the tags that survive.
pub fn sanitize_html(input: &str) -> String {
    if !input.contains('<') {
        return input.to_string();
    }
    let stripped = strip_blocks(input);
    TAG.replace_all(&stripped, |caps: &Captures<'_>| {
        let Some(name) = TAG_NAME.captures(&caps[0]) else {
            return String::new();
        };
        let closing = &name[1];
        let tag = name[2].to_ascii_lowercase();
        if ALLOWED_RICH_TAGS.contains(&tag.as_str()) {
            format!("<{closing}{tag}>")
        } else {
            String::new()
        }
    })
    .into_owned()
}

/// Recursively strip markup from every string in a JSON value.
/// Object keys are left untouched.
pub fn sanitize_value(value: Value) -> Value {
    match value {
        Value::String(s) => Value::String(sanitize_text(&s)),
        Value::Array(items) => Value::Array(items.into_iter().map(sanitize_value).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (key, sanitize_value(value)))
                .collect(),
        ),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_text_untouched() {
        assert_eq!(sanitize_text("合同纠纷 a < b"), "合同纠纷 a < b");
        assert_eq!(sanitize_text("Tom & Jerry"), "Tom & Jerry");
    }

    #[test]
    fn test_strips_tags_and_script_bodies() {
        assert_eq!(sanitize_text("<b>bold</b> text"), "bold text");
        assert_eq!(
            sanitize_text("hi<script>alert('x')</script> there"),
            "hi there"
        );
        assert_eq!(sanitize_text("<img src=x onerror=alert(1)>"), "");
        assert_eq!(sanitize_text("a<!-- <b> -->b"), "ab");
        assert_eq!(sanitize_text("<style>p{}</style>ok"), "ok");
    }

    #[test]
    fn test_nested_angle_brackets() {
        assert_eq!(sanitize_text("<<b>script>x"), "script>x");
        assert_eq!(sanitize_text("<scr<x>ipt>"), "ipt>");
    }

    #[test]
    fn test_sanitize_html_keeps_formatting() {
        assert_eq!(
            sanitize_html(r#"<p class="x">Hi <b onclick="y">there</b><a href="z">link</a></p>"#),
            "<p>Hi <b>there</b>link</p>"
        );
        assert_eq!(sanitize_html("line<BR/>break"), "line<br>break");
    }

    #[test]
    fn test_sanitize_value_recurses() {
        let value = json!({
            "name": "<i>Zhang</i>",
            "tags": ["<b>a</b>", 1, null, {"deep": "<u>x</u>"}],
            "<key>": true,
        });
        assert_eq!(
            sanitize_value(value),
            json!({
                "name": "Zhang",
                "tags": ["a", 1, null, {"deep": "x"}],
                "<key>": true,
            })
        );
    }

    #[test]
    fn test_sanitization_is_idempotent() {
        let inputs = [
            "<<b>script>alert(1)<</b>/script>",
            "<scr<script>ipt>x</script>",
            "a <!-- c --> <p>b</p> <",
            "< notatag",
            "<<<>>>",
            "plain",
        ];
        for input in inputs {
            let once = sanitize_text(input);
            assert_eq!(sanitize_text(&once), once, "text: {input}");

            let rich = sanitize_html(input);
            assert_eq!(sanitize_html(&rich), rich, "html: {input}");
        }

        let value = json!({"a": ["<x>y</x>", {"b": "<<i>i>"}]});
        let once = sanitize_value(value);
        assert_eq!(sanitize_value(once.clone()), once);
    }
}
