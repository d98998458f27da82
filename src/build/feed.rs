//! Syndication feeds.
//!
//! Builds RSS 2.0, Atom and JSON Feed documents from the metadata
//! collected during the build. Feeds contain articles only, newest first,
//! and item URLs use the same `.md` suffix-rewrite rule as the rendered
//! pages, so feed links always resolve to real output files.

use std::collections::HashSet;
use std::fmt::Write;

use chrono::{NaiveDate, NaiveTime};
use serde_json::json;

use super::document::DocumentRecord;
use super::format::OutputFormat;
use super::paths::rewrite_md_suffix;

/// Cache lifetime advertised to feed readers, in seconds (one month).
const FEED_TTL: u32 = 2_628_000;

#[derive(thiserror::Error, Debug)]
pub enum FeedError {
    #[error("missing /index.md, required for feed channel metadata")]
    MissingIndex,

    #[error("duplicate metadata id {id} ({first} and {second})")]
    DuplicateId {
        id: uuid::Uuid,
        first: String,
        second: String,
    },

    #[error("unable to serialize JSON feed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Where and for whom the feeds are generated.
pub struct FeedContext<'a> {
    pub format: OutputFormat,
    /// Domain without scheme, e.g. `example.org`
    pub domain: &'a str,
    /// Site-relative directory the feed files are written under
    pub feed_path: &'a str,
    pub author: &'a str,
}

/// The three feed documents for one output format.
#[derive(Debug)]
pub struct Feeds {
    pub rss: String,
    pub atom: String,
    pub json: String,
}

/// Generate all feeds for one format.
pub fn generate_feeds(records: &[DocumentRecord], ctx: &FeedContext) -> Result<Feeds, FeedError> {
    let mut seen = HashSet::new();
    for record in records {
        if !seen.insert(record.metadata.id) {
            let first = records
                .iter()
                .find(|r| r.metadata.id == record.metadata.id)
                .map(|r| r.path.clone())
                .unwrap_or_default();
            return Err(FeedError::DuplicateId {
                id: record.metadata.id,
                first,
                second: record.path.clone(),
            });
        }
    }

    let index = records
        .iter()
        .find(|record| record.path == "/index.md")
        .ok_or(FeedError::MissingIndex)?;

    let mut articles: Vec<&DocumentRecord> = records
        .iter()
        .filter(|record| record.metadata.is_article())
        .collect();
    articles.sort_by(|a, b| b.metadata.created_at.cmp(&a.metadata.created_at));

    let updated = articles
        .iter()
        .map(|record| record.metadata.updated_at)
        .max()
        .unwrap_or(index.metadata.updated_at);

    let base_url = ctx.format.base_url(ctx.domain);

    Ok(Feeds {
        rss: render_rss(index, &articles, updated, &base_url, ctx),
        atom: render_atom(index, &articles, updated, &base_url, ctx),
        json: render_json(index, &articles, &base_url, ctx)?,
    })
}

/// Absolute URL of a document in this format.
fn item_url(base_url: &str, path: &str, format: OutputFormat) -> String {
    format!(
        "{base_url}{}",
        rewrite_md_suffix(path.trim_start_matches('/'), format.extension())
    )
}

fn feed_url(base_url: &str, feed_path: &str, file: &str) -> String {
    let dir = feed_path.trim_matches('/');
    if dir.is_empty() {
        format!("{base_url}{file}")
    } else {
        format!("{base_url}{dir}/{file}")
    }
}

fn rfc2822(date: NaiveDate) -> String {
    date.and_time(NaiveTime::MIN).and_utc().to_rfc2822()
}

fn rfc3339(date: NaiveDate) -> String {
    date.and_time(NaiveTime::MIN).and_utc().to_rfc3339()
}

fn escape_xml(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn render_rss(
    index: &DocumentRecord,
    articles: &[&DocumentRecord],
    updated: NaiveDate,
    base_url: &str,
    ctx: &FeedContext,
) -> String {
    let mut feed = String::new();
    feed.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    feed.push_str("<rss version=\"2.0\" xmlns:atom=\"http://www.w3.org/2005/Atom\">\n");
    feed.push_str("<channel>\n");
    let _ = writeln!(feed, "  <title>{}</title>", escape_xml(&index.metadata.title));
    let _ = writeln!(feed, "  <link>{}</link>", escape_xml(base_url));
    let _ = writeln!(
        feed,
        "  <description>{}</description>",
        escape_xml(index.metadata.description.as_deref().unwrap_or_default())
    );
    let _ = writeln!(
        feed,
        "  <atom:link href=\"{}\" rel=\"self\" type=\"application/rss+xml\"/>",
        escape_xml(&feed_url(base_url, ctx.feed_path, "rss.xml"))
    );
    feed.push_str("  <language>en</language>\n");
    let _ = writeln!(feed, "  <ttl>{FEED_TTL}</ttl>");
    let _ = writeln!(feed, "  <lastBuildDate>{}</lastBuildDate>", rfc2822(updated));

    for record in articles {
        let url = item_url(base_url, &record.path, ctx.format);
        feed.push_str("  <item>\n");
        let _ = writeln!(feed, "    <title>{}</title>", escape_xml(&record.metadata.title));
        let _ = writeln!(feed, "    <link>{}</link>", escape_xml(&url));
        let _ = writeln!(
            feed,
            "    <guid isPermaLink=\"false\">{}</guid>",
            record.metadata.id
        );
        let _ = writeln!(
            feed,
            "    <description>{}</description>",
            escape_xml(record.metadata.description.as_deref().unwrap_or_default())
        );
        let _ = writeln!(
            feed,
            "    <pubDate>{}</pubDate>",
            rfc2822(record.metadata.created_at)
        );
        let author = record.metadata.author.as_deref().unwrap_or(ctx.author);
        let _ = writeln!(feed, "    <author>{}</author>", escape_xml(author));
        feed.push_str("  </item>\n");
    }

    feed.push_str("</channel>\n</rss>\n");
    feed
}

fn render_atom(
    index: &DocumentRecord,
    articles: &[&DocumentRecord],
    updated: NaiveDate,
    base_url: &str,
    ctx: &FeedContext,
) -> String {
    let mut feed = String::new();
    feed.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    feed.push_str("<feed xmlns=\"http://www.w3.org/2005/Atom\">\n");
    let _ = writeln!(feed, "  <id>{}</id>", escape_xml(base_url));
    let _ = writeln!(feed, "  <title>{}</title>", escape_xml(&index.metadata.title));
    if let Some(description) = &index.metadata.description {
        let _ = writeln!(feed, "  <subtitle>{}</subtitle>", escape_xml(description));
    }
    let _ = writeln!(feed, "  <updated>{}</updated>", rfc3339(updated));
    let _ = writeln!(
        feed,
        "  <link href=\"{}\" rel=\"alternate\"/>",
        escape_xml(base_url)
    );
    let _ = writeln!(
        feed,
        "  <link href=\"{}\" rel=\"self\" type=\"application/atom+xml\"/>",
        escape_xml(&feed_url(base_url, ctx.feed_path, "atom.xml"))
    );

    for record in articles {
        let url = item_url(base_url, &record.path, ctx.format);
        feed.push_str("  <entry>\n");
        let _ = writeln!(feed, "    <id>urn:uuid:{}</id>", record.metadata.id);
        let _ = writeln!(feed, "    <title>{}</title>", escape_xml(&record.metadata.title));
        let _ = writeln!(
            feed,
            "    <updated>{}</updated>",
            rfc3339(record.metadata.updated_at)
        );
        let _ = writeln!(
            feed,
            "    <published>{}</published>",
            rfc3339(record.metadata.created_at)
        );
        let _ = writeln!(feed, "    <link href=\"{}\" rel=\"alternate\"/>", escape_xml(&url));
        if let Some(description) = &record.metadata.description {
            let _ = writeln!(feed, "    <summary>{}</summary>", escape_xml(description));
        }
        let author = record.metadata.author.as_deref().unwrap_or(ctx.author);
        let _ = writeln!(
            feed,
            "    <author><name>{}</name></author>",
            escape_xml(author)
        );
        feed.push_str("  </entry>\n");
    }

    feed.push_str("</feed>\n");
    feed
}

fn render_json(
    index: &DocumentRecord,
    articles: &[&DocumentRecord],
    base_url: &str,
    ctx: &FeedContext,
) -> Result<String, serde_json::Error> {
    let items: Vec<serde_json::Value> = articles
        .iter()
        .map(|record| {
            let url = item_url(base_url, &record.path, ctx.format);
            json!({
                "id": format!("urn:uuid:{}", record.metadata.id),
                "url": url,
                "title": record.metadata.title,
                "summary": record.metadata.description,
                "date_published": rfc3339(record.metadata.created_at),
                "date_modified": rfc3339(record.metadata.updated_at),
                "language": record.metadata.lang,
                "tags": record.metadata.tags,
                "authors": [
                    { "name": record.metadata.author.as_deref().unwrap_or(ctx.author) }
                ],
            })
        })
        .collect();

    let feed = json!({
        "version": "https://jsonfeed.org/version/1.1",
        "title": index.metadata.title,
        "description": index.metadata.description,
        "home_page_url": base_url,
        "feed_url": feed_url(base_url, ctx.feed_path, "feed.json"),
        "language": "en",
        "items": items,
    });

    let mut out = serde_json::to_string_pretty(&feed)?;
    out.push('\n');
    Ok(out)
}
