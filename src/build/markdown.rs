//! Markdown rendering through a format strategy.
//!
//! Walks pulldown-cmark events with a frame stack: every `Start` tag opens
//! a frame, leaf events append strategy-transformed text to the open
//! frame, and every `End` tag pops its frame, applies the construct
//! transform to the collected child content and appends the fragment to
//! the parent. Transforms therefore always receive already-rendered child
//! content and never see parser state.

use pulldown_cmark::{Alignment, CodeBlockKind, Event, Options, Parser, Tag, TagEnd};

use super::renderer::{CellAlignment, FormatRenderer, TableRow};

/// Render a markdown document to a single fragment in the given format.
pub fn render_markdown(markdown: &str, renderer: &dyn FormatRenderer) -> String {
    let options =
        Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;

    let mut driver = Driver::new(renderer);
    for event in Parser::new_ext(markdown, options) {
        driver.process_event(event);
    }
    driver.finish()
}

/// What the open frame will become once its children are rendered.
enum FrameKind {
    Root,
    Paragraph,
    Heading(u8),
    Blockquote,
    CodeBlock(Option<String>),
    List { ordered: bool, start: Option<u64> },
    Item { task: bool, checked: bool },
    TableCell,
    Emphasis,
    Strong,
    Strikethrough,
    Link { href: String, title: Option<String> },
    Image { href: String, title: Option<String> },
    HtmlBlock,
    /// Constructs outside the supported set; children pass through as-is.
    Transparent,
}

struct Frame {
    kind: FrameKind,
    buf: String,
}

/// Structured state for the table currently being collected.
///
/// Rows travel to the table transform as cell-value lists instead of being
/// serialized into the text stream and parsed back.
struct TableState {
    alignments: Vec<CellAlignment>,
    header: Option<TableRow>,
    body: Vec<TableRow>,
    in_head: bool,
    cells: Vec<String>,
    column: usize,
}

struct Driver<'r> {
    renderer: &'r dyn FormatRenderer,
    stack: Vec<Frame>,
    table: Option<TableState>,
}

impl<'r> Driver<'r> {
    fn new(renderer: &'r dyn FormatRenderer) -> Self {
        Self {
            renderer,
            stack: vec![Frame {
                kind: FrameKind::Root,
                buf: String::new(),
            }],
            table: None,
        }
    }

    fn finish(mut self) -> String {
        // The root frame is all that remains once events are balanced
        self.stack.pop().map(|frame| frame.buf).unwrap_or_default()
    }

    fn push(&mut self, kind: FrameKind) {
        self.stack.push(Frame {
            kind,
            buf: String::new(),
        });
    }

    fn emit(&mut self, fragment: &str) {
        if let Some(frame) = self.stack.last_mut() {
            frame.buf.push_str(fragment);
        }
    }

    fn in_code_block(&self) -> bool {
        matches!(
            self.stack.last().map(|frame| &frame.kind),
            Some(FrameKind::CodeBlock(_))
        )
    }

    fn in_html_block(&self) -> bool {
        matches!(
            self.stack.last().map(|frame| &frame.kind),
            Some(FrameKind::HtmlBlock)
        )
    }

    fn process_event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => {
                if self.in_code_block() {
                    // Verbatim, byte for byte
                    self.emit(&text.to_string());
                } else {
                    let fragment = self.renderer.text(&text);
                    self.emit(&fragment);
                }
            }
            Event::Code(code) => {
                let fragment = self.renderer.codespan(&code);
                self.emit(&fragment);
            }
            Event::Html(html) | Event::InlineHtml(html) => {
                if self.in_html_block() {
                    self.emit(&html.to_string());
                } else {
                    let fragment = self.renderer.html(&html);
                    self.emit(&fragment);
                }
            }
            // The source grammar treats single newlines as hard breaks
            Event::SoftBreak | Event::HardBreak => {
                let fragment = self.renderer.br();
                self.emit(&fragment);
            }
            Event::Rule => {
                let fragment = self.renderer.hr();
                self.emit(&fragment);
            }
            Event::TaskListMarker(is_checked) => {
                for frame in self.stack.iter_mut().rev() {
                    if let FrameKind::Item { task, checked } = &mut frame.kind {
                        *task = true;
                        *checked = is_checked;
                        break;
                    }
                }
            }
            Event::FootnoteReference(_) | Event::InlineMath(_) | Event::DisplayMath(_) => {
                // Extensions not enabled
            }
        }
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => self.push(FrameKind::Paragraph),
            Tag::Heading { level, .. } => self.push(FrameKind::Heading(level as u8)),
            Tag::BlockQuote(_) => self.push(FrameKind::Blockquote),
            Tag::CodeBlock(kind) => {
                let lang = match kind {
                    CodeBlockKind::Fenced(info) if !info.is_empty() => {
                        Some(info.split_whitespace().next().unwrap_or("").to_string())
                    }
                    _ => None,
                };
                self.push(FrameKind::CodeBlock(lang));
            }
            Tag::List(start) => self.push(FrameKind::List {
                ordered: start.is_some(),
                start,
            }),
            Tag::Item => self.push(FrameKind::Item {
                task: false,
                checked: false,
            }),
            Tag::Table(alignments) => {
                self.table = Some(TableState {
                    alignments: alignments.iter().map(|a| cell_alignment(*a)).collect(),
                    header: None,
                    body: Vec::new(),
                    in_head: false,
                    cells: Vec::new(),
                    column: 0,
                });
            }
            Tag::TableHead => {
                if let Some(table) = &mut self.table {
                    table.in_head = true;
                    table.cells.clear();
                    table.column = 0;
                }
            }
            Tag::TableRow => {
                if let Some(table) = &mut self.table {
                    table.cells.clear();
                    table.column = 0;
                }
            }
            Tag::TableCell => self.push(FrameKind::TableCell),
            Tag::Emphasis => self.push(FrameKind::Emphasis),
            Tag::Strong => self.push(FrameKind::Strong),
            Tag::Strikethrough => self.push(FrameKind::Strikethrough),
            Tag::Link {
                dest_url, title, ..
            } => self.push(FrameKind::Link {
                href: dest_url.to_string(),
                title: (!title.is_empty()).then(|| title.to_string()),
            }),
            Tag::Image {
                dest_url, title, ..
            } => self.push(FrameKind::Image {
                href: dest_url.to_string(),
                title: (!title.is_empty()).then(|| title.to_string()),
            }),
            Tag::HtmlBlock => self.push(FrameKind::HtmlBlock),
            Tag::FootnoteDefinition(_)
            | Tag::DefinitionList
            | Tag::DefinitionListTitle
            | Tag::DefinitionListDefinition
            | Tag::MetadataBlock(_)
            | Tag::Superscript
            | Tag::Subscript => self.push(FrameKind::Transparent),
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::TableHead => {
                if let Some(table) = &mut self.table {
                    let cells = std::mem::take(&mut table.cells);
                    table.header = Some(self.renderer.tablerow(cells));
                    table.in_head = false;
                }
            }
            TagEnd::TableRow => {
                if let Some(table) = &mut self.table {
                    let cells = std::mem::take(&mut table.cells);
                    let row = self.renderer.tablerow(cells);
                    table.body.push(row);
                }
            }
            TagEnd::Table => {
                if let Some(table) = self.table.take() {
                    let header = table.header.unwrap_or_default();
                    let fragment = self.renderer.table(&header, &table.body);
                    self.emit(&fragment);
                }
            }
            _ => {
                let Some(frame) = self.stack.pop() else {
                    return;
                };
                let fragment = self.transform(frame);
                self.emit(&fragment);
            }
        }
    }

    /// Apply the construct transform a closed frame stands for.
    fn transform(&mut self, frame: Frame) -> String {
        let buf = frame.buf;
        match frame.kind {
            FrameKind::Root | FrameKind::Transparent => buf,
            FrameKind::Paragraph => self.renderer.paragraph(&buf),
            FrameKind::Heading(level) => self.renderer.heading(&buf, level),
            FrameKind::Blockquote => self.renderer.blockquote(&buf),
            FrameKind::CodeBlock(lang) => {
                let code = buf.strip_suffix('\n').unwrap_or(&buf);
                self.renderer.code(code, lang.as_deref())
            }
            FrameKind::List { ordered, start } => self.renderer.list(&buf, ordered, start),
            FrameKind::Item { task, checked } => self.renderer.listitem(&buf, task, checked),
            FrameKind::TableCell => {
                let (align, in_head) = match &self.table {
                    Some(table) => (
                        table
                            .alignments
                            .get(table.column)
                            .copied()
                            .unwrap_or(CellAlignment::None),
                        table.in_head,
                    ),
                    None => return buf,
                };
                let cell = self.renderer.tablecell(&buf, align, in_head);
                if let Some(table) = &mut self.table {
                    table.cells.push(cell);
                    table.column += 1;
                }
                String::new()
            }
            FrameKind::Emphasis => self.renderer.em(&buf),
            FrameKind::Strong => self.renderer.strong(&buf),
            FrameKind::Strikethrough => self.renderer.del(&buf),
            FrameKind::Link { href, title } => self.renderer.link(&href, title.as_deref(), &buf),
            FrameKind::Image { href, title } => self.renderer.image(&href, title.as_deref(), &buf),
            FrameKind::HtmlBlock => self.renderer.html(&buf),
        }
    }
}

fn cell_alignment(alignment: Alignment) -> CellAlignment {
    match alignment {
        Alignment::None => CellAlignment::None,
        Alignment::Left => CellAlignment::Left,
        Alignment::Center => CellAlignment::Center,
        Alignment::Right => CellAlignment::Right,
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::build::renderer::{GemtextRenderer, HtmlRenderer};

    #[test]
    fn heading_renders_anchored_html() {
        let html = render_markdown("## Hello World", &HtmlRenderer);
        assert_eq!(
            html,
            "<h2><a name=\"hello-world\" class=\"anchor\" href=\"#hello-world\">Hello World</a></h2>\n"
        );
    }

    #[test]
    fn heading_renders_gemtext() {
        let gmi = render_markdown("## Hello World", &GemtextRenderer);
        assert_eq!(gmi, "## Hello World\n\n");
    }

    #[test]
    fn link_paragraph_in_both_formats() {
        let markdown = "[Home](index.md)";
        let html = render_markdown(markdown, &HtmlRenderer);
        assert_eq!(
            html,
            "<p><a href=\"index.html\" title=\"Home\">Home</a></p>\n"
        );

        let gmi = render_markdown(markdown, &GemtextRenderer);
        assert_eq!(gmi, "=> index.gmi Home\n\n");
    }

    #[test]
    fn entities_decode_exactly_once() {
        let gmi = render_markdown("Hello &amp; welcome", &GemtextRenderer);
        assert_eq!(gmi, "Hello & welcome\n\n");

        let html = render_markdown("Hello &amp; welcome", &HtmlRenderer);
        assert_eq!(html, "<p>Hello &amp; welcome</p>\n");
    }

    #[test]
    fn task_list_round_trip() {
        let markdown = indoc! {"
            - [x] done
            - [ ] todo
            - plain
        "};

        let gmi = render_markdown(markdown, &GemtextRenderer);
        assert!(gmi.contains("* [x] done"));
        assert!(gmi.contains("* [ ] todo"));
        assert!(gmi.contains("* plain"));

        let html = render_markdown(markdown, &HtmlRenderer);
        assert!(html.contains("<input checked=\"\" disabled=\"\" type=\"checkbox\"> done"));
        assert!(html.contains("<input disabled=\"\" type=\"checkbox\"> todo"));
    }

    #[test]
    fn nav_list_items() {
        let markdown = indoc! {"
            - [Home](index.md)
            - [About](about.md)
        "};

        let gmi = render_markdown(markdown, &GemtextRenderer);
        assert!(gmi.contains("=> index.gmi Home"));
        assert!(!gmi.contains("* =>"));

        let html = render_markdown(markdown, &HtmlRenderer);
        assert!(html.contains("<li class=\"linkitem\"><a href=\"index.html\""));
    }

    #[test]
    fn table_grid_dimensions() {
        let markdown = indoc! {"
            | Name | Count |
            | ---- | ----- |
            | alpha | 1 |
            | beta | 22 |
        "};

        let gmi = render_markdown(markdown, &GemtextRenderer);
        let content_rows: Vec<&str> = gmi.lines().filter(|l| l.starts_with('|')).collect();
        assert_eq!(content_rows.len(), 3);
        for line in content_rows {
            assert_eq!(line.matches('|').count(), 3);
        }

        let html = render_markdown(markdown, &HtmlRenderer);
        assert!(html.contains("<th>Name</th>"));
        assert!(html.contains("<td>alpha</td>"));
    }

    #[test]
    fn table_cells_with_quoting() {
        let markdown = indoc! {r#"
            | Quote |
            | ----- |
            | say "hi", then leave |
        "#};

        let gmi = render_markdown(markdown, &GemtextRenderer);
        assert!(gmi.contains(r#"| say "hi", then leave |"#));
    }

    #[test]
    fn code_block_stays_verbatim_in_gemtext() {
        let markdown = indoc! {"
            ```
            a &amp; b
            x < y
            ```
        "};
        let gmi = render_markdown(markdown, &GemtextRenderer);
        assert_eq!(gmi, "```\na &amp; b\nx < y\n```\n\n");
    }

    #[test]
    fn code_block_escapes_in_html() {
        let html = render_markdown("```rust\nlet x = a < b;\n```", &HtmlRenderer);
        assert_eq!(
            html,
            "<pre><code class=\"language-rust\">let x = a &lt; b;</code></pre>\n"
        );
    }

    #[test]
    fn blockquote_prefixes_lines_in_gemtext() {
        let markdown = indoc! {"
            > first
            > second
        "};
        let gmi = render_markdown(markdown, &GemtextRenderer);
        assert!(gmi.starts_with("> first\n> second"));
    }

    #[test]
    fn soft_breaks_are_hard_breaks() {
        let html = render_markdown("one\ntwo", &HtmlRenderer);
        assert_eq!(html, "<p>one<br>two</p>\n");
    }

    #[test]
    fn image_becomes_nav_line_in_gemtext() {
        let gmi = render_markdown("![A cat](cat.png)", &GemtextRenderer);
        assert_eq!(gmi, "=> cat.png A cat\n\n");
    }

    // Known fidelity gap, preserved: Gemtext links must occupy a whole
    // line, but a link inside running paragraph text stays embedded
    // mid-line.
    #[test]
    fn gemtext_inline_link_stays_mid_paragraph() {
        let gmi = render_markdown("See the [docs](docs.md) for more.", &GemtextRenderer);
        assert_eq!(gmi, "See the => docs.gmi docs for more.\n\n");
    }

    #[test]
    fn strikethrough_and_emphasis() {
        let gmi = render_markdown("*one* **two** ~~three~~", &GemtextRenderer);
        assert_eq!(gmi, "*one* **two** ~~three~~\n\n");

        let html = render_markdown("*one* **two** ~~three~~", &HtmlRenderer);
        assert_eq!(
            html,
            "<p><em>one</em> <strong>two</strong> <del>three</del></p>\n"
        );
    }

    #[test]
    fn html_comment_stripped_in_gemtext() {
        let gmi = render_markdown("<!-- hidden -->\n\ntext", &GemtextRenderer);
        assert!(!gmi.contains("hidden"));
        assert!(gmi.contains("text"));
    }

    #[test]
    fn empty_list_items_keep_their_bullets() {
        let gmi = render_markdown("- one\n-\n- three", &GemtextRenderer);
        let bullets = gmi.lines().filter(|l| l.starts_with("* ")).count();
        assert_eq!(bullets, 3);
    }
}
