use std::collections::HashMap;
use std::path::PathBuf;

use log::info;
use uuid::Uuid;

use super::document::{parse_document, DocumentError, DocumentRecord};
use super::feed::{generate_feeds, FeedContext, FeedError};
use super::format::OutputFormat;
use super::paths::{document_output_path, output_path, site_path};
use super::render::{RenderError, TemplateRenderer};
use super::markdown::render_markdown;
use super::source::{discover_content, ContentItem, SourceError};

#[derive(thiserror::Error, Debug)]
pub enum BuildError {
    #[error("source error: {0}")]
    Source(#[from] SourceError),

    #[error("document error: {0}")]
    Document(#[from] DocumentError),

    #[error("render error: {0}")]
    Render(#[from] RenderError),

    #[error("feed error: {0}")]
    Feed(#[from] FeedError),

    #[error("duplicate metadata id {id} ({first} and {second})")]
    DuplicateId {
        id: Uuid,
        first: String,
        second: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// How the site is written to disk, resolved from the command line.
pub struct BuildOptions {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub formats: Vec<OutputFormat>,
    /// Author used for pages without one of their own
    pub author: Option<String>,
    pub feed: Option<FeedOptions>,
}

pub struct FeedOptions {
    /// Site-relative directory the feed files are written under
    pub path: PathBuf,
    pub domain: String,
    pub author: String,
}

#[derive(Debug)]
pub struct BuildResult {
    pub output_dir: PathBuf,
    pub documents: usize,
    pub static_files: usize,
}

pub struct Builder {
    options: BuildOptions,
}

impl Builder {
    pub fn new(options: BuildOptions) -> Self {
        Self { options }
    }

    pub async fn build(&self) -> Result<BuildResult, BuildError> {
        // Build pipeline:
        // 1. Discover content -> ContentItem[]
        // 2. Load page templates
        // 3. Render and write each document, once per format
        // 4. Copy static files into each format tree
        // 5. Generate feeds from the collected metadata

        let items = discover_content(&self.options.source)?;

        let partials_dir = self
            .options
            .source
            .parent()
            .map(|parent| parent.join("partials"))
            .unwrap_or_else(|| PathBuf::from("partials"));
        let templates = TemplateRenderer::new(&partials_dir, &self.options.formats)?;

        let mut records: Vec<DocumentRecord> = Vec::new();
        let mut documents = 0;
        let mut static_files = 0;

        for item in &items {
            match item {
                ContentItem::Document(relative) => {
                    let raw =
                        tokio::fs::read_to_string(self.options.source.join(relative)).await?;
                    let parsed =
                        parse_document(&raw, relative, self.options.author.as_deref())?;

                    for format in &self.options.formats {
                        info!("Processing(format: {}, file: {})", format, relative.display());
                        let body = render_markdown(&parsed.markdown, format.renderer());
                        let relative_str = relative.to_string_lossy();
                        let page =
                            templates.render_page(&body, *format, &relative_str, &parsed.metadata)?;

                        let target =
                            document_output_path(&self.options.destination, *format, relative);
                        if let Some(parent) = target.parent() {
                            tokio::fs::create_dir_all(parent).await?;
                        }
                        tokio::fs::write(&target, page).await?;
                    }

                    records.push(DocumentRecord {
                        path: site_path(relative),
                        metadata: parsed.metadata,
                    });
                    documents += 1;
                }
                ContentItem::Static(relative) => {
                    for format in &self.options.formats {
                        info!("Copying(format: {}, file: {})", format, relative.display());
                        let target = output_path(&self.options.destination, *format, relative);
                        if let Some(parent) = target.parent() {
                            tokio::fs::create_dir_all(parent).await?;
                        }
                        tokio::fs::copy(self.options.source.join(relative), &target).await?;
                    }
                    static_files += 1;
                }
            }
        }

        check_unique_ids(&records)?;

        if let Some(feed) = &self.options.feed {
            self.write_feeds(&records, feed).await?;
        }

        Ok(BuildResult {
            output_dir: self.options.destination.clone(),
            documents,
            static_files,
        })
    }

    async fn write_feeds(
        &self,
        records: &[DocumentRecord],
        feed: &FeedOptions,
    ) -> Result<(), BuildError> {
        let feed_path = feed.path.to_string_lossy();
        for format in &self.options.formats {
            let ctx = FeedContext {
                format: *format,
                domain: &feed.domain,
                feed_path: &feed_path,
                author: &feed.author,
            };
            let feeds = generate_feeds(records, &ctx)?;

            let dir = output_path(&self.options.destination, *format, &feed.path);
            tokio::fs::create_dir_all(&dir).await?;
            for (file, body) in [
                ("rss.xml", &feeds.rss),
                ("atom.xml", &feeds.atom),
                ("feed.json", &feeds.json),
            ] {
                info!("Writing(format: {}, file: {})", format, file);
                tokio::fs::write(dir.join(file), body).await?;
            }
        }
        Ok(())
    }
}

/// Metadata ids double as feed guids, so a collision is a build error
/// even when no feed was requested.
fn check_unique_ids(records: &[DocumentRecord]) -> Result<(), BuildError> {
    let mut seen: HashMap<Uuid, &str> = HashMap::new();
    for record in records {
        if let Some(first) = seen.insert(record.metadata.id, &record.path) {
            return Err(BuildError::DuplicateId {
                id: record.metadata.id,
                first: first.to_string(),
                second: record.path.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use indoc::indoc;

    use super::*;

    fn write_file(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }

    fn page(id: u32, kind: &str, title: &str, body: &str) -> String {
        format!(
            indoc! {"
                ---
                id: 1f0f7a52-4a2f-4a2f-9e61-{:012}
                type: {}
                page: {}
                title: {}
                description: {}
                created_at: 2023-01-01
                updated_at: 2023-06-01
                ---

                {}
            "},
            id,
            kind,
            title.to_lowercase().replace(' ', "-"),
            title,
            title,
            body
        )
    }

    fn scaffold(root: &Path) {
        write_file(
            &root.join("partials/template.html"),
            "<html><body>{{ content }}</body></html>\n",
        );
        write_file(&root.join("partials/template.gmi"), "{{ content }}\n");
        write_file(
            &root.join("content/index.md"),
            &page(1, "website", "Home", "# Home"),
        );
        write_file(
            &root.join("content/posts/first.md"),
            &page(2, "article", "First Post", "Hello **world**"),
        );
        write_file(&root.join("content/style.css"), "body { margin: 0 }\n");
    }

    fn options(root: &Path, feed: Option<FeedOptions>) -> BuildOptions {
        BuildOptions {
            source: root.join("content"),
            destination: root.join("out"),
            formats: OutputFormat::ALL.to_vec(),
            author: Some("Kelgors".to_string()),
            feed,
        }
    }

    #[tokio::test]
    async fn test_build_writes_both_format_trees() {
        let dir = tempfile::tempdir().unwrap();
        scaffold(dir.path());

        let result = Builder::new(options(dir.path(), None)).build().await.unwrap();
        assert_eq!(result.documents, 2);
        assert_eq!(result.static_files, 1);

        let html =
            std::fs::read_to_string(dir.path().join("out/html/posts/first.html")).unwrap();
        assert!(html.contains("<p>Hello <strong>world</strong></p>"));
        assert!(html.starts_with("<html>"));

        let gmi =
            std::fs::read_to_string(dir.path().join("out/gemini/posts/first.gmi")).unwrap();
        assert!(gmi.contains("Hello world"));

        assert!(dir.path().join("out/html/style.css").is_file());
        assert!(dir.path().join("out/gemini/style.css").is_file());
    }

    #[tokio::test]
    async fn test_build_writes_feeds() {
        let dir = tempfile::tempdir().unwrap();
        scaffold(dir.path());

        let feed = FeedOptions {
            path: PathBuf::from("posts"),
            domain: "example.org".to_string(),
            author: "Kelgors".to_string(),
        };
        Builder::new(options(dir.path(), Some(feed))).build().await.unwrap();

        let rss = std::fs::read_to_string(dir.path().join("out/html/posts/rss.xml")).unwrap();
        assert!(rss.contains("https://example.org/posts/first.html"));
        assert!(dir.path().join("out/html/posts/atom.xml").is_file());
        assert!(dir.path().join("out/html/posts/feed.json").is_file());

        let gmi_rss =
            std::fs::read_to_string(dir.path().join("out/gemini/posts/rss.xml")).unwrap();
        assert!(gmi_rss.contains("gemini://example.org/posts/first.gmi"));
    }

    #[tokio::test]
    async fn test_build_rejects_duplicate_ids() {
        let dir = tempfile::tempdir().unwrap();
        scaffold(dir.path());
        write_file(
            &dir.path().join("content/posts/copy.md"),
            &page(2, "article", "Copy", "dup"),
        );

        let err = Builder::new(options(dir.path(), None)).build().await.unwrap_err();
        assert!(matches!(err, BuildError::DuplicateId { .. }));
    }

    #[tokio::test]
    async fn test_build_fails_without_front_matter() {
        let dir = tempfile::tempdir().unwrap();
        scaffold(dir.path());
        write_file(&dir.path().join("content/broken.md"), "# No metadata\n");

        let err = Builder::new(options(dir.path(), None)).build().await.unwrap_err();
        assert!(matches!(err, BuildError::Document(_)));
    }
}
