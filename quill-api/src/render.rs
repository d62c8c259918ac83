//! HTML and Atom rendering.
//!
//! Pages come in two shapes: a full document with the site layout, or the
//! bare fragment PJAX clients swap into an existing page.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};

use quill_core::constants::ARTICLES_PAGE_TITLE;
use quill_core::types::Article;

use crate::markdown::render_markdown;
use crate::state::ApiConfig;

/// Escapes text for HTML and XML content and attribute values.
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Link target for an article.
///
/// Catalog articles link to their route. Remote articles link under
/// `remote_link_base` when one is configured, else to `/<slug>`.
pub fn article_href(article: &Article, config: &ApiConfig) -> String {
    if let Some(route) = &article.route {
        return route.clone();
    }
    match &config.remote_link_base {
        Some(base) => format!("{}/{}", base.trim_end_matches('/'), article.slug),
        None => format!("/{}", article.slug),
    }
}

/// Stable Atom entry id: `tag:<site>,<publication date>:<path>`.
fn entry_id(article: &Article, config: &ApiConfig) -> String {
    let path = match &article.route {
        Some(route) => route.clone(),
        None => format!("/{}", article.slug),
    };
    format!(
        "tag:{},{}:{}",
        config.site_title,
        article.published_at.format("%Y-%m-%d"),
        path
    )
}

fn display_date(at: DateTime<Utc>) -> String {
    at.format("%B %-d, %Y").to_string()
}

fn layout(title: &str, content: &str, config: &ApiConfig) -> String {
    format!(
        "<!DOCTYPE html>\n\
         <html>\n\
         <head>\n\
         <meta charset=\"utf-8\">\n\
         <title>{title} | {site}</title>\n\
         <link rel=\"alternate\" type=\"application/atom+xml\" href=\"/articles.atom\">\n\
         </head>\n\
         <body>\n\
         <div id=\"container\">\n{content}</div>\n\
         </body>\n\
         </html>\n",
        title = escape(title),
        site = escape(&config.site_title),
        content = content,
    )
}

fn wrap(title: &str, fragment: String, pjax: bool, config: &ApiConfig) -> String {
    if pjax {
        fragment
    } else {
        layout(title, &fragment, config)
    }
}

/// Renders the article listing.
pub fn articles_page(articles: &[Article], pjax: bool, config: &ApiConfig) -> String {
    let mut fragment = format!("<h1>{}</h1>\n<ul class=\"articles\">\n", ARTICLES_PAGE_TITLE);

    for article in articles {
        let _ = write!(
            fragment,
            "<li><a href=\"{}\">{}</a> <span class=\"date\">{}</span>",
            escape(&article_href(article, config)),
            escape(&article.title),
            display_date(article.published_at),
        );
        if let Some(label) = article.source.label() {
            let _ = write!(fragment, " <span class=\"source\">{}</span>", label);
        }
        fragment.push_str("</li>\n");
    }
    fragment.push_str("</ul>\n");

    wrap(ARTICLES_PAGE_TITLE, fragment, pjax, config)
}

/// Renders a single catalog article.
///
/// Articles flagged with `signature` use the signed template, which closes
/// with the location line.
pub fn article_page(article: &Article, pjax: bool, config: &ApiConfig) -> String {
    let mut fragment = format!(
        "<article>\n<h1>{}</h1>\n<p class=\"meta\">{}</p>\n",
        escape(&article.title),
        display_date(article.published_at),
    );

    if let Some(hook) = &article.hook {
        let _ = writeln!(fragment, "<p class=\"hook\">{}</p>", escape(hook));
    }
    if let Some(body) = &article.body {
        fragment.push_str(&render_markdown(body));
    }
    if article.signature {
        fragment.push_str("<div class=\"signature\">\n");
        if let Some(location) = &article.location {
            let _ = writeln!(fragment, "<p class=\"location\">{}</p>", escape(location));
        }
        fragment.push_str("</div>\n");
    } else if let Some(location) = &article.location {
        let _ = writeln!(fragment, "<p class=\"location\">{}</p>", escape(location));
    }
    fragment.push_str("</article>\n");

    wrap(&article.title, fragment, pjax, config)
}

/// Renders the Atom feed over the same sequence as the listing.
pub fn atom_feed(articles: &[Article], now: DateTime<Utc>, config: &ApiConfig) -> String {
    let updated = articles.first().map(|a| a.published_at).unwrap_or(now);

    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
    xml.push_str("<feed xmlns=\"http://www.w3.org/2005/Atom\">\n");
    let _ = writeln!(
        xml,
        "<title>{} | {}</title>",
        ARTICLES_PAGE_TITLE,
        escape(&config.site_title)
    );
    let _ = writeln!(xml, "<id>tag:{},2013:/articles</id>", escape(&config.site_title));
    let _ = writeln!(xml, "<updated>{}</updated>", updated.to_rfc3339());
    xml.push_str("<link rel=\"self\" href=\"/articles.atom\"/>\n");

    for article in articles {
        let href = escape(&article_href(article, config));
        xml.push_str("<entry>\n");
        let _ = writeln!(xml, "<title>{}</title>", escape(&article.title));
        let _ = writeln!(xml, "<id>{}</id>", escape(&entry_id(article, config)));
        let _ = writeln!(xml, "<link href=\"{}\"/>", href);
        let _ = writeln!(xml, "<published>{}</published>", article.published_at.to_rfc3339());
        let _ = writeln!(xml, "<updated>{}</updated>", article.published_at.to_rfc3339());
        if let Some(hook) = &article.hook {
            let _ = writeln!(xml, "<summary>{}</summary>", escape(hook));
        }
        xml.push_str("</entry>\n");
    }

    xml.push_str("</feed>\n");
    xml
}
