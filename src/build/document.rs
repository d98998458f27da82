use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(thiserror::Error, Debug)]
pub enum DocumentError {
    #[error("missing front matter in {path}")]
    MissingFrontMatter { path: PathBuf },

    #[error("unable to parse metadata of {path}: {source}")]
    InvalidFrontMatter {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Whether a page is a plain website page or a dated article.
///
/// Only articles appear in feeds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageKind {
    #[default]
    Website,
    Article,
}

/// Validated front-matter metadata of one page.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PageMetadata {
    /// Stable page identity, must be unique across the site
    pub id: Uuid,
    #[serde(rename = "type", default)]
    pub kind: PageKind,
    pub page: String,
    pub title: String,
    pub description: Option<String>,
    pub author: Option<String>,
    pub created_at: NaiveDate,
    pub updated_at: NaiveDate,
    #[serde(default = "default_lang")]
    pub lang: String,
    pub tags: Option<Vec<String>>,
}

fn default_lang() -> String {
    "en".to_string()
}

impl PageMetadata {
    pub fn is_article(&self) -> bool {
        self.kind == PageKind::Article
    }
}

/// A rendered document's identity, kept for the feed stage.
#[derive(Clone, Debug)]
pub struct DocumentRecord {
    /// Site-relative source path, leading slash, `.md` suffix kept
    pub path: String,
    pub metadata: PageMetadata,
}

/// Result of splitting a markdown file into metadata and content.
#[derive(Debug)]
pub struct ParsedDocument {
    pub metadata: PageMetadata,
    /// The markdown content without the front matter block
    pub markdown: String,
}

/// Parse a markdown file with YAML front matter.
///
/// Front matter is a YAML block delimited by `---` at the start of the
/// file. Unlike pure presentation metadata, the schema here is strict: a
/// document without valid front matter fails the build, and the error
/// carries the offending path. When the page has no author of its own,
/// `fallback_author` fills the field.
///
/// ```markdown
/// ---
/// id: 1f0f7a52-4a2f-4a2f-9e61-000000000001
/// page: index
/// title: My Page
/// created_at: 2023-01-01
/// updated_at: 2023-06-01
/// ---
///
/// # Content starts here
/// ```
pub fn parse_document(
    raw: &str,
    path: &Path,
    fallback_author: Option<&str>,
) -> Result<ParsedDocument, DocumentError> {
    let content = raw.trim_start();

    if !content.starts_with("---") {
        return Err(DocumentError::MissingFrontMatter {
            path: path.to_path_buf(),
        });
    }

    let after_opening = &content[3..];
    let Some(closing_pos) = after_opening.find("\n---") else {
        return Err(DocumentError::MissingFrontMatter {
            path: path.to_path_buf(),
        });
    };

    let yaml_content = after_opening[..closing_pos].trim_start_matches('\n');

    // Skip the closing delimiter and its newline
    let markdown_start = 3 + closing_pos + 4;
    let markdown = if markdown_start < content.len() {
        content[markdown_start..]
            .trim_start_matches('\n')
            .to_string()
    } else {
        String::new()
    };

    let mut metadata: PageMetadata =
        serde_yaml::from_str(yaml_content).map_err(|source| DocumentError::InvalidFrontMatter {
            path: path.to_path_buf(),
            source,
        })?;

    if metadata.author.is_none() {
        metadata.author = fallback_author.map(str::to_string);
    }

    Ok(ParsedDocument { metadata, markdown })
}
