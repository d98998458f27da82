//! Format strategies for serializing parsed markdown constructs.
//!
//! Each output format implements [`FormatRenderer`], one transform per
//! construct kind recognized by the parser. The event driver in
//! `build::markdown` walks the document, renders child content first and
//! hands the already-rendered fragments to the composite transforms, so
//! every transform is a pure function of its arguments.

mod gemtext;
mod html;

pub use gemtext::GemtextRenderer;
pub use html::HtmlRenderer;

use htmlentity::entity::{self, ICodedDataTrait};

/// Horizontal alignment of a table column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellAlignment {
    None,
    Left,
    Center,
    Right,
}

/// A table row travelling between the row and table transforms.
///
/// Rows are structured values rather than pre-serialized text so the table
/// transform can lay out the full cell matrix (the Gemtext grid needs the
/// column widths of every row before it can render the first one).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TableRow(pub Vec<String>);

/// One output format, as a closed set of construct transforms.
///
/// Every method is total: it returns a fragment for well-formed input and
/// never performs I/O. Implementations are stateless; the same value can
/// render any number of documents, on any number of threads.
pub trait FormatRenderer {
    /// A heading with its already-rendered inner text, level 1-6.
    fn heading(&self, text: &str, level: u8) -> String;

    fn paragraph(&self, text: &str) -> String;

    /// A blockquote with its already-rendered inner blocks.
    fn blockquote(&self, quote: &str) -> String;

    /// A fenced or indented code block. `code` is verbatim source text
    /// without the trailing fence newline.
    fn code(&self, code: &str, lang: Option<&str>) -> String;

    /// A raw HTML block or inline HTML fragment.
    fn html(&self, raw: &str) -> String;

    fn hr(&self) -> String;

    /// A list whose item bodies are already rendered and concatenated.
    fn list(&self, body: &str, ordered: bool, start: Option<u64>) -> String;

    /// A list item. `task`/`checked` come from a GFM task-list marker.
    fn listitem(&self, text: &str, task: bool, checked: bool) -> String;

    /// The checkbox glyph used inside task-list items. Never emitted on
    /// its own in final output.
    fn checkbox(&self, checked: bool) -> String;

    /// A complete table: the header row plus zero or more body rows,
    /// every cell already transformed by [`FormatRenderer::tablecell`].
    fn table(&self, header: &TableRow, body: &[TableRow]) -> String;

    /// Collects a row's already-transformed cells into one row value.
    fn tablerow(&self, cells: Vec<String>) -> TableRow {
        TableRow(cells)
    }

    /// A single cell with its already-rendered inner text.
    fn tablecell(&self, text: &str, align: CellAlignment, header: bool) -> String;

    fn strong(&self, text: &str) -> String;

    fn em(&self, text: &str) -> String;

    fn codespan(&self, text: &str) -> String;

    fn del(&self, text: &str) -> String;

    fn br(&self) -> String;

    /// A hyperlink. `text` is the already-rendered link body; `title` is
    /// the optional markdown title attribute.
    fn link(&self, href: &str, title: Option<&str>, text: &str) -> String;

    /// An image. `text` is the collected alt text.
    fn image(&self, href: &str, title: Option<&str>, text: &str) -> String;

    /// A leaf text node.
    fn text(&self, text: &str) -> String;
}

/// Convert heading text to a slug suitable for an anchor name.
///
/// Deterministic: the same text always yields the same slug. Two equal
/// headings in one document therefore share an anchor.
pub(crate) fn slugify(s: &str) -> String {
    s.to_lowercase()
        .replace(' ', "-")
        .replace(|c: char| !c.is_alphanumeric() && c != '-', "")
}

/// Decode HTML entities into their literal characters.
///
/// Applied exactly once per leaf text node, at the textual-composition
/// boundary of the Gemtext transforms. Invalid input passes through.
pub(crate) fn decode_entities(text: &str) -> String {
    entity::decode(text.as_bytes())
        .to_string()
        .unwrap_or_else(|_| text.to_string())
}

/// Escape text for embedding in HTML element content or attributes.
pub(crate) fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
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
