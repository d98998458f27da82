//! Gemtext (Gemini) strategy.
//!
//! Gemtext is line-oriented plain text: every construct degrades to plain
//! lines with no embedded markup. Entities are decoded to literal
//! characters at each textual-composition boundary, except inside fenced
//! code blocks which stay byte-for-byte verbatim.

use super::{CellAlignment, FormatRenderer, TableRow, decode_entities};
use crate::build::paths::rewrite_md_suffix;

const GEMINI_EXT: &str = ".gmi";

/// Gemtext strategy.
///
/// Tables have no native Gemtext syntax; the cell matrix collected through
/// the row channel is laid out as a fixed-width ASCII grid instead.
pub struct GemtextRenderer;

impl FormatRenderer for GemtextRenderer {
    fn heading(&self, text: &str, level: u8) -> String {
        format!("{} {}\n\n", "#".repeat(level as usize), decode_entities(text))
    }

    fn paragraph(&self, text: &str) -> String {
        format!("{}\n\n", decode_entities(text).trim())
    }

    fn blockquote(&self, quote: &str) -> String {
        let mut out = quote
            .lines()
            .map(|line| format!("> {}", decode_entities(line)))
            .collect::<Vec<_>>()
            .join("\n");
        out.push('\n');
        out
    }

    fn code(&self, code: &str, _lang: Option<&str>) -> String {
        // Content stays verbatim, entities included
        format!("```\n{code}\n```\n\n")
    }

    fn html(&self, raw: &str) -> String {
        // No HTML support beyond comments and line breaks; anything else
        // passes through and is accepted as lossy.
        strip_html_comments(raw).trim().replace("<br>", "\n")
    }

    fn hr(&self) -> String {
        "---".to_string()
    }

    fn list(&self, body: &str, _ordered: bool, _start: Option<u64>) -> String {
        format!("{body}\n")
    }

    fn listitem(&self, text: &str, task: bool, checked: bool) -> String {
        let text = decode_entities(text);
        let text = text.trim();
        let mut tokens = vec!["*".to_string()];
        if task {
            tokens.push(format!("[{}]", self.checkbox(checked)));
        }
        tokens.push(text.to_string());
        tokens.push("\n".to_string());
        // Navigational links occupy their own line and are not bulleted
        if text.starts_with("=> ") {
            tokens.remove(0);
        }
        tokens.join(" ")
    }

    fn checkbox(&self, checked: bool) -> String {
        if checked { "x" } else { " " }.to_string()
    }

    fn table(&self, header: &TableRow, body: &[TableRow]) -> String {
        let mut matrix: Vec<&[String]> = Vec::with_capacity(body.len() + 1);
        if !header.0.is_empty() {
            matrix.push(&header.0);
        }
        for row in body {
            matrix.push(&row.0);
        }
        format!("{}\n", ascii_grid(&matrix))
    }

    fn tablecell(&self, text: &str, _align: CellAlignment, _header: bool) -> String {
        decode_entities(text)
    }

    fn strong(&self, text: &str) -> String {
        format!("**{}**", decode_entities(text))
    }

    fn em(&self, text: &str) -> String {
        format!("*{}*", decode_entities(text))
    }

    fn codespan(&self, text: &str) -> String {
        format!("`{}`", decode_entities(text))
    }

    fn del(&self, text: &str) -> String {
        format!("~~{}~~", decode_entities(text))
    }

    fn br(&self) -> String {
        "\n".to_string()
    }

    fn link(&self, href: &str, _title: Option<&str>, text: &str) -> String {
        let href = rewrite_md_suffix(href, GEMINI_EXT);
        if text.is_empty() {
            format!("=> {href} {href}")
        } else {
            format!("=> {href} {}", decode_entities(text))
        }
    }

    fn image(&self, href: &str, _title: Option<&str>, text: &str) -> String {
        // No inline images in Gemtext; represent as a navigational line
        format!("=> {href} {}", decode_entities(text))
    }

    fn text(&self, text: &str) -> String {
        decode_entities(text)
    }
}

/// Remove `<!-- ... -->` comments. An unterminated comment is left as-is.
fn strip_html_comments(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(start) = rest.find("<!--") {
        out.push_str(&rest[..start]);
        match rest[start + 4..].find("-->") {
            Some(end) => rest = &rest[start + 4 + end + 3..],
            None => {
                out.push_str(&rest[start..]);
                return out;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Lay out a cell matrix as a monospaced grid with `+-|` borders.
///
/// The first row is treated as the header and separated from the body by
/// an extra border line. A matrix with a single row (or none) still
/// produces a well-formed grid.
fn ascii_grid(rows: &[&[String]]) -> String {
    let columns = rows.iter().map(|row| row.len()).max().unwrap_or(0);
    if columns == 0 {
        return String::new();
    }

    let cell = |row: &[String], column: usize| -> String {
        row.get(column)
            .map(|text| text.replace('\n', " "))
            .unwrap_or_default()
    };

    let mut widths = vec![0usize; columns];
    for row in rows {
        for (i, width) in widths.iter_mut().enumerate() {
            *width = (*width).max(cell(row, i).chars().count());
        }
    }

    let mut border = String::from("+");
    for width in &widths {
        border.push_str(&"-".repeat(width + 2));
        border.push('+');
    }
    border.push('\n');

    let mut out = border.clone();
    for (index, row) in rows.iter().enumerate() {
        out.push('|');
        for (i, width) in widths.iter().enumerate() {
            let text = cell(row, i);
            out.push(' ');
            out.push_str(&text);
            out.push_str(&" ".repeat(width - text.chars().count() + 1));
            out.push('|');
        }
        out.push('\n');
        if index == 0 && rows.len() > 1 {
            out.push_str(&border);
        }
    }
    out.push_str(&border);
    out
}
