//! Output formats.
//!
//! One site build produces one full output tree per requested format.
//! The format tag selects the construct strategy, the file extension, the
//! output subdirectory and the URL scheme used in feeds.

use std::fmt;

use super::renderer::{FormatRenderer, GemtextRenderer, HtmlRenderer};

/// An output format the site can be rendered to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Html,
    Gemini,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 2] = [OutputFormat::Html, OutputFormat::Gemini];

    /// The format tag, also used as the output subdirectory name.
    pub fn tag(self) -> &'static str {
        match self {
            OutputFormat::Html => "html",
            OutputFormat::Gemini => "gemini",
        }
    }

    /// The file extension documents are written with, dot included.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Html => ".html",
            OutputFormat::Gemini => ".gmi",
        }
    }

    /// Base URL for absolute page links in feeds.
    pub fn base_url(self, domain: &str) -> String {
        match self {
            OutputFormat::Html => format!("https://{domain}/"),
            OutputFormat::Gemini => format!("gemini://{domain}/"),
        }
    }

    /// The construct strategy for this format.
    pub fn renderer(self) -> &'static dyn FormatRenderer {
        match self {
            OutputFormat::Html => &HtmlRenderer,
            OutputFormat::Gemini => &GemtextRenderer,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_and_extensions() {
        assert_eq!(OutputFormat::Html.tag(), "html");
        assert_eq!(OutputFormat::Html.extension(), ".html");
        assert_eq!(OutputFormat::Gemini.tag(), "gemini");
        assert_eq!(OutputFormat::Gemini.extension(), ".gmi");
    }

    #[test]
    fn test_base_urls() {
        assert_eq!(
            OutputFormat::Html.base_url("example.org"),
            "https://example.org/"
        );
        assert_eq!(
            OutputFormat::Gemini.base_url("example.org"),
            "gemini://example.org/"
        );
    }
}
