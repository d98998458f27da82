//! HTML fragment strategy.
//!
//! Mostly standard HTML serialization; the format-specific behavior is in
//! `heading` (anchored slugs), `listitem` (nav-style class) and `link`
//! (`.md` rewriting plus new-tab external links).

use std::fmt::Write;

use super::{CellAlignment, FormatRenderer, TableRow, escape_html, slugify};
use crate::build::paths::rewrite_md_suffix;

const HTML_EXT: &str = ".html";

/// HTML strategy.
///
/// Produces an HTML fragment meant to be wrapped in a page template.
pub struct HtmlRenderer;

/// True when rendered list-item text opens with an `<a>` or `<p>` tag.
/// Such items get a `linkitem` class so navigation lists can be styled.
fn starts_with_link_or_paragraph(text: &str) -> bool {
    let rest = match text.strip_prefix("<a").or_else(|| text.strip_prefix("<p")) {
        Some(rest) => rest,
        None => return false,
    };
    rest.starts_with(' ') || rest.starts_with('>')
}

impl FormatRenderer for HtmlRenderer {
    fn heading(&self, text: &str, level: u8) -> String {
        let slug = slugify(text);
        format!(
            "<h{level}><a name=\"{slug}\" class=\"anchor\" href=\"#{slug}\">{text}</a></h{level}>\n"
        )
    }

    fn paragraph(&self, text: &str) -> String {
        format!("<p>{text}</p>\n")
    }

    fn blockquote(&self, quote: &str) -> String {
        format!("<blockquote>\n{quote}</blockquote>\n")
    }

    fn code(&self, code: &str, lang: Option<&str>) -> String {
        match lang {
            Some(lang) => format!(
                "<pre><code class=\"language-{}\">{}</code></pre>\n",
                escape_html(lang),
                escape_html(code)
            ),
            None => format!("<pre><code>{}</code></pre>\n", escape_html(code)),
        }
    }

    fn html(&self, raw: &str) -> String {
        raw.to_string()
    }

    fn hr(&self) -> String {
        "<hr>\n".to_string()
    }

    fn list(&self, body: &str, ordered: bool, start: Option<u64>) -> String {
        if ordered {
            match start {
                Some(n) if n != 1 => format!("<ol start=\"{n}\">\n{body}</ol>\n"),
                _ => format!("<ol>\n{body}</ol>\n"),
            }
        } else {
            format!("<ul>\n{body}</ul>\n")
        }
    }

    fn listitem(&self, text: &str, task: bool, checked: bool) -> String {
        let class = if starts_with_link_or_paragraph(text) {
            " class=\"linkitem\""
        } else {
            ""
        };
        if task {
            format!("<li{class}>{} {text}</li>\n", self.checkbox(checked))
        } else {
            format!("<li{class}>{text}</li>\n")
        }
    }

    fn checkbox(&self, checked: bool) -> String {
        if checked {
            "<input checked=\"\" disabled=\"\" type=\"checkbox\">".to_string()
        } else {
            "<input disabled=\"\" type=\"checkbox\">".to_string()
        }
    }

    fn table(&self, header: &TableRow, body: &[TableRow]) -> String {
        let mut out = String::from("<table>\n<thead>\n<tr>\n");
        for cell in &header.0 {
            out.push_str(cell);
        }
        out.push_str("</tr>\n</thead>\n<tbody>\n");
        for row in body {
            out.push_str("<tr>\n");
            for cell in &row.0 {
                out.push_str(cell);
            }
            out.push_str("</tr>\n");
        }
        out.push_str("</tbody></table>\n");
        out
    }

    fn tablecell(&self, text: &str, align: CellAlignment, header: bool) -> String {
        let tag = if header { "th" } else { "td" };
        let align = match align {
            CellAlignment::None => "",
            CellAlignment::Left => " align=\"left\"",
            CellAlignment::Center => " align=\"center\"",
            CellAlignment::Right => " align=\"right\"",
        };
        format!("<{tag}{align}>{text}</{tag}>\n")
    }

    fn strong(&self, text: &str) -> String {
        format!("<strong>{text}</strong>")
    }

    fn em(&self, text: &str) -> String {
        format!("<em>{text}</em>")
    }

    fn codespan(&self, text: &str) -> String {
        format!("<code>{}</code>", escape_html(text))
    }

    fn del(&self, text: &str) -> String {
        format!("<del>{text}</del>")
    }

    fn br(&self) -> String {
        "<br>".to_string()
    }

    fn link(&self, href: &str, title: Option<&str>, text: &str) -> String {
        let href = rewrite_md_suffix(href, HTML_EXT);
        // External links open in a new browsing context
        let target = if href.starts_with("http://") || href.starts_with("https://") {
            " target=\"_blank\""
        } else {
            ""
        };
        let title = match title {
            Some(title) if !title.is_empty() => title,
            _ => text,
        };
        let body = if text.is_empty() { href.as_str() } else { text };
        format!("<a href=\"{href}\" title=\"{title}\"{target}>{body}</a>")
    }

    fn image(&self, href: &str, title: Option<&str>, text: &str) -> String {
        let mut out = format!("<img src=\"{}\" alt=\"{text}\"", escape_html(href));
        if let Some(title) = title {
            let _ = write!(out, " title=\"{}\"", escape_html(title));
        }
        out.push('>');
        out
    }

    fn text(&self, text: &str) -> String {
        escape_html(text)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn heading_wraps_anchored_slug() {
        let html = HtmlRenderer.heading("Hello World", 2);
        assert_eq!(
            html,
            "<h2><a name=\"hello-world\" class=\"anchor\" href=\"#hello-world\">Hello World</a></h2>\n"
        );
    }

    #[test]
    fn heading_slug_is_deterministic() {
        assert_eq!(
            HtmlRenderer.heading("Changelog", 3),
            HtmlRenderer.heading("Changelog", 3)
        );
    }

    #[test]
    fn link_rewrites_markdown_extension() {
        let html = HtmlRenderer.link("index.md", None, "Home");
        assert_eq!(html, "<a href=\"index.html\" title=\"Home\">Home</a>");
    }

    #[test]
    fn link_rewrite_is_idempotent_for_other_extensions() {
        let html = HtmlRenderer.link("about.html", None, "About");
        assert_eq!(html, "<a href=\"about.html\" title=\"About\">About</a>");
    }

    #[test]
    fn link_absolute_urls_open_in_new_tab() {
        let html = HtmlRenderer.link("https://example.com/", None, "Example");
        assert_eq!(
            html,
            "<a href=\"https://example.com/\" title=\"Example\" target=\"_blank\">Example</a>"
        );
    }

    #[test]
    fn link_title_falls_back_to_text_then_empty() {
        assert_eq!(
            HtmlRenderer.link("a.md", Some("A title"), "Label"),
            "<a href=\"a.html\" title=\"A title\">Label</a>"
        );
        assert_eq!(
            HtmlRenderer.link("a.md", None, ""),
            "<a href=\"a.html\" title=\"\">a.html</a>"
        );
    }

    #[test]
    fn listitem_marks_nav_items() {
        let html = HtmlRenderer.listitem("<a href=\"x.html\" title=\"x\">x</a>", false, false);
        assert!(html.starts_with("<li class=\"linkitem\">"));

        let plain = HtmlRenderer.listitem("just text", false, false);
        assert_eq!(plain, "<li>just text</li>\n");
    }

    #[test]
    fn listitem_task_checkbox() {
        let checked = HtmlRenderer.listitem("done", true, true);
        assert!(checked.contains("<input checked=\"\" disabled=\"\" type=\"checkbox\">"));

        let unchecked = HtmlRenderer.listitem("todo", true, false);
        assert!(unchecked.contains("<input disabled=\"\" type=\"checkbox\">"));
        assert!(!unchecked.contains("checked"));

        let plain = HtmlRenderer.listitem("not a task", false, true);
        assert!(!plain.contains("checkbox"));
    }

    #[test]
    fn code_block_escapes_content() {
        let html = HtmlRenderer.code("let x = a < b;", Some("rust"));
        assert_eq!(
            html,
            "<pre><code class=\"language-rust\">let x = a &lt; b;</code></pre>\n"
        );
    }

    #[test]
    fn table_assembles_head_and_body() {
        let header = HtmlRenderer.tablerow(vec![
            HtmlRenderer.tablecell("A", CellAlignment::None, true),
            HtmlRenderer.tablecell("B", CellAlignment::Right, true),
        ]);
        let row = HtmlRenderer.tablerow(vec![
            HtmlRenderer.tablecell("1", CellAlignment::None, false),
            HtmlRenderer.tablecell("2", CellAlignment::Right, false),
        ]);
        let html = HtmlRenderer.table(&header, &[row]);
        assert!(html.contains("<thead>\n<tr>\n<th>A</th>\n<th align=\"right\">B</th>\n</tr>"));
        assert!(html.contains("<tbody>\n<tr>\n<td>1</td>\n<td align=\"right\">2</td>\n</tr>"));
    }
}
