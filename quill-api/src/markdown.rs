//! Markdown rendering for catalog article bodies.
//!
//! Bodies are GitHub-flavored Markdown. Headings get slug anchors so a table
//! of contents can link to them, and code blocks carry `language-*` classes
//! for client-side highlighters.

use std::collections::HashMap;

use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag, TagEnd};

const CODE_CLASS: &str = "<code class=\"";
const LANGUAGE_PREFIX: &str = "language-";

fn options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_HEADING_ATTRIBUTES
}

/// Renders a Markdown body to HTML.
///
/// Raw HTML in the source passes through untouched; catalog bodies are
/// trusted.
pub fn render_markdown(source: &str) -> String {
    let events = with_heading_ids(Parser::new_ext(source, options()).collect());

    let mut out = String::with_capacity(source.len() * 3 / 2);
    html::push_html(&mut out, events.into_iter());
    language_classes(&out)
}

/// Lowercase anchor for a heading: alphanumeric runs joined by `-`.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    if slug.is_empty() {
        slug.push_str("section");
    }
    slug
}

/// Gives every heading without an explicit `{#id}` a unique slug id.
fn with_heading_ids(mut events: Vec<Event<'_>>) -> Vec<Event<'_>> {
    let mut anchors = Vec::new();
    let mut open: Option<(usize, String)> = None;

    for (i, event) in events.iter().enumerate() {
        match event {
            Event::Start(Tag::Heading { id: None, .. }) => open = Some((i, String::new())),
            Event::Text(text) | Event::Code(text) => {
                if let Some((_, buf)) = open.as_mut() {
                    buf.push_str(text);
                }
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some((start, text)) = open.take() {
                    anchors.push((start, slugify(&text)));
                }
            }
            _ => {}
        }
    }

    let mut seen: HashMap<String, usize> = HashMap::new();
    for (start, slug) in anchors {
        let n = seen.entry(slug.clone()).or_insert(0);
        let unique = if *n == 0 { slug } else { format!("{}-{}", slug, n) };
        *n += 1;

        if let Event::Start(Tag::Heading { id, .. }) = &mut events[start] {
            *id = Some(CowStr::from(unique));
        }
    }
    events
}

/// Rewrites `<code class="ruby">` to `<code class="language-ruby">`.
///
/// Only a single word class is rewritten; classes that already carry a
/// prefix or hold several names are left alone.
pub fn language_classes(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(pos) = rest.find(CODE_CLASS) {
        let after = pos + CODE_CLASS.len();
        out.push_str(&rest[..after]);
        rest = &rest[after..];

        let word = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(rest.len());
        if word > 0 && rest[word..].starts_with('"') {
            out.push_str(LANGUAGE_PREFIX);
        }
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_class_rewrite() {
        assert_eq!(
            language_classes("<pre><code class=\"ruby\">puts 1</code></pre>"),
            "<pre><code class=\"language-ruby\">puts 1</code></pre>"
        );
        assert_eq!(
            language_classes("<code class=\"c_sharp\">x</code> <code class=\"go\">y</code>"),
            "<code class=\"language-c_sharp\">x</code> <code class=\"language-go\">y</code>"
        );
    }

    #[test]
    fn test_code_class_rewrite_leaves_other_classes() {
        for html in [
            "<code class=\"language-ruby\">x</code>",
            "<code class=\"ruby sql\">x</code>",
            "<code class=\"\">x</code>",
            "<code>x</code>",
            "<code class=\"ruby",
        ] {
            assert_eq!(language_classes(html), html);
        }
    }

    #[test]
    fn test_raw_html_code_gets_language_class() {
        let html = render_markdown("<pre><code class=\"ruby\">puts 1</code></pre>\n");
        assert!(html.contains("<code class=\"language-ruby\">"));
    }

    #[test]
    fn test_fenced_code_is_not_double_prefixed() {
        let html = render_markdown("```ruby\nputs 1\n```\n");
        assert!(html.contains("<code class=\"language-ruby\">"));
        assert!(!html.contains("language-language-"));
    }

    #[test]
    fn test_heading_anchors() {
        let html = render_markdown("## Request IDs\n\n## Request IDs\n\n# `log` & Trace\n");
        assert!(html.contains("<h2 id=\"request-ids\">Request IDs</h2>"));
        assert!(html.contains("<h2 id=\"request-ids-1\">Request IDs</h2>"));
        assert!(html.contains("<h1 id=\"log-trace\">"));
    }

    #[test]
    fn test_explicit_heading_id_is_kept() {
        let html = render_markdown("## Setup {#install}\n");
        assert!(html.contains("id=\"install\""));
    }

    #[test]
    fn test_gfm_extensions() {
        let html = render_markdown("| a | b |\n|---|---|\n| 1 | 2 |\n\n~~gone~~\n\n- [x] done\n");
        assert!(html.contains("<table>"));
        assert!(html.contains("<del>gone</del>"));
        assert!(html.contains("type=\"checkbox\""));
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Healthy Anti-patterns"), "healthy-anti-patterns");
        assert_eq!(slugify("  SOA & Service Stubs!  "), "soa-service-stubs");
        assert_eq!(slugify("!!!"), "section");
    }
}
