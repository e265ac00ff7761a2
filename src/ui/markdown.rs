//! Markdown rendering of replies for a plain terminal.
//!
//! Output is a list of lines. Block structure (paragraph spacing, list
//! markers and indentation, quotes, code blocks, tables) is always laid out;
//! inline emphasis turns into ANSI attributes only when `styled` is set.

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};

const RESET: &str = "\x1b[0m";
const QUOTE_PREFIX: &str = "│ ";
const CODE_INDENT: &str = "    ";
const RULE_WIDTH: usize = 40;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MarkdownRenderConfig {
    /// Emit ANSI bold/italic/strikethrough sequences.
    pub styled: bool,
}

impl MarkdownRenderConfig {
    pub fn plain() -> Self {
        Self { styled: false }
    }

    pub fn styled(styled: bool) -> Self {
        Self { styled }
    }
}

pub fn render_markdown(content: &str, config: MarkdownRenderConfig) -> Vec<String> {
    MarkdownRenderer::new(config).render(content)
}

#[derive(Clone, Copy, Debug)]
enum ListKind {
    Unordered,
    Ordered(u64),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TextStyle {
    Bold,
    Italic,
    Strike,
}

impl TextStyle {
    fn ansi(self) -> &'static str {
        match self {
            TextStyle::Bold => "\x1b[1m",
            TextStyle::Italic => "\x1b[3m",
            TextStyle::Strike => "\x1b[9m",
        }
    }
}

#[derive(Debug, Default)]
struct TableState {
    rows: Vec<Vec<String>>,
    header_rows: usize,
    row: Vec<String>,
    cell: String,
}

struct MarkdownRenderer {
    config: MarkdownRenderConfig,
    lines: Vec<String>,
    current: String,
    style_stack: Vec<TextStyle>,
    list_stack: Vec<ListKind>,
    list_indent: Vec<usize>,
    pending_marker: Option<String>,
    quote_depth: usize,
    in_code_block: bool,
    link_targets: Vec<String>,
    table: Option<TableState>,
    blank_pending: bool,
}

impl MarkdownRenderer {
    fn new(config: MarkdownRenderConfig) -> Self {
        Self {
            config,
            lines: Vec::new(),
            current: String::new(),
            style_stack: Vec::new(),
            list_stack: Vec::new(),
            list_indent: Vec::new(),
            pending_marker: None,
            quote_depth: 0,
            in_code_block: false,
            link_targets: Vec::new(),
            table: None,
            blank_pending: false,
        }
    }

    fn render(mut self, content: &str) -> Vec<String> {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_TASKLISTS);
        options.insert(Options::ENABLE_FOOTNOTES);

        for event in Parser::new_ext(content, options) {
            match event {
                Event::Start(tag) => self.start(tag),
                Event::End(tag_end) => self.end(tag_end),
                Event::Text(text) => self.text(&text),
                Event::Code(code) => self.push_inline(&format!("`{code}`")),
                Event::InlineMath(math) | Event::DisplayMath(math) => self.push_inline(&math),
                Event::SoftBreak => self.push_inline(" "),
                Event::HardBreak => self.flush_line(false),
                Event::Rule => {
                    self.start_block();
                    self.current.push_str(&"─".repeat(RULE_WIDTH));
                    self.flush_line(false);
                    self.end_block();
                }
                Event::TaskListMarker(checked) => {
                    self.push_inline(if checked { "[x] " } else { "[ ] " })
                }
                Event::Html(html) => {
                    for line in html.lines() {
                        self.current.push_str(line);
                        self.flush_line(false);
                    }
                }
                Event::InlineHtml(html) => self.push_inline(&html),
                Event::FootnoteReference(label) => self.push_inline(&format!("[^{label}]")),
            }
        }

        self.flush_line(false);
        self.lines
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => self.start_block(),
            Tag::Heading { level, .. } => {
                self.start_block();
                if self.config.styled {
                    self.push_style(TextStyle::Bold);
                } else {
                    self.current.push_str(&"#".repeat(level as usize));
                    self.current.push(' ');
                }
            }
            Tag::BlockQuote(_) => {
                self.start_block();
                self.quote_depth += 1;
            }
            Tag::CodeBlock(kind) => {
                self.start_block();
                if let CodeBlockKind::Fenced(lang) = kind {
                    if !lang.is_empty() {
                        self.current.push_str(CODE_INDENT);
                        self.current.push_str(&format!("[{lang}]"));
                        self.flush_line(false);
                    }
                }
                self.in_code_block = true;
            }
            Tag::List(start) => {
                if self.list_stack.is_empty() {
                    self.start_block();
                } else {
                    self.flush_line(false);
                }
                self.list_stack.push(match start {
                    Some(n) => ListKind::Ordered(n),
                    None => ListKind::Unordered,
                });
                self.list_indent.push(0);
            }
            Tag::Item => {
                self.flush_line(false);
                let marker = match self.list_stack.last_mut() {
                    Some(ListKind::Ordered(n)) => {
                        let current = *n;
                        *n += 1;
                        format!("{current}. ")
                    }
                    _ => "• ".to_string(),
                };
                if let Some(indent) = self.list_indent.last_mut() {
                    *indent = marker.chars().count();
                }
                self.pending_marker = Some(marker);
            }
            Tag::Emphasis => self.push_style(TextStyle::Italic),
            Tag::Strong => self.push_style(TextStyle::Bold),
            Tag::Strikethrough => self.push_style(TextStyle::Strike),
            Tag::Link { dest_url, .. } | Tag::Image { dest_url, .. } => {
                self.link_targets.push(dest_url.to_string())
            }
            Tag::Table(_) => {
                self.start_block();
                self.table = Some(TableState::default());
            }
            Tag::TableHead | Tag::TableRow => {
                if let Some(table) = self.table.as_mut() {
                    table.row.clear();
                }
            }
            Tag::TableCell => {
                if let Some(table) = self.table.as_mut() {
                    table.cell.clear();
                }
            }
            _ => {}
        }
    }

    fn end(&mut self, tag_end: TagEnd) {
        match tag_end {
            TagEnd::Paragraph => {
                self.flush_line(false);
                self.end_block();
            }
            TagEnd::Heading(_) => {
                if self.config.styled {
                    self.pop_style();
                }
                self.flush_line(false);
                self.end_block();
            }
            TagEnd::BlockQuote(_) => {
                self.flush_line(false);
                self.quote_depth = self.quote_depth.saturating_sub(1);
                self.end_block();
            }
            TagEnd::CodeBlock => {
                self.in_code_block = false;
                self.end_block();
            }
            TagEnd::List(_) => {
                self.flush_line(false);
                self.list_stack.pop();
                self.list_indent.pop();
                self.end_block();
            }
            TagEnd::Item => self.flush_line(true),
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough => self.pop_style(),
            TagEnd::Link | TagEnd::Image => {
                if let Some(url) = self.link_targets.pop() {
                    let text = match self.table.as_ref() {
                        Some(table) => &table.cell,
                        None => &self.current,
                    };
                    if !url.is_empty() && !text.ends_with(url.as_str()) {
                        self.push_inline(&format!(" <{url}>"));
                    }
                }
            }
            TagEnd::TableCell => {
                if let Some(table) = self.table.as_mut() {
                    let cell = std::mem::take(&mut table.cell);
                    table.row.push(cell.trim().to_string());
                }
            }
            TagEnd::TableHead => {
                if let Some(table) = self.table.as_mut() {
                    let row = std::mem::take(&mut table.row);
                    table.rows.push(row);
                    table.header_rows = table.rows.len();
                }
            }
            TagEnd::TableRow => {
                if let Some(table) = self.table.as_mut() {
                    let row = std::mem::take(&mut table.row);
                    table.rows.push(row);
                }
            }
            TagEnd::Table => {
                if let Some(table) = self.table.take() {
                    self.emit_table(table);
                }
                self.end_block();
            }
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        if self.in_code_block {
            for line in text.lines() {
                self.current.push_str(CODE_INDENT);
                self.current.push_str(line);
                self.flush_line(true);
            }
            return;
        }
        self.push_inline(text);
    }

    fn push_inline(&mut self, text: &str) {
        match self.table.as_mut() {
            Some(table) => table.cell.push_str(text),
            None => self.current.push_str(text),
        }
    }

    fn push_style(&mut self, style: TextStyle) {
        self.style_stack.push(style);
        if self.config.styled && self.table.is_none() {
            self.current.push_str(style.ansi());
        }
    }

    fn pop_style(&mut self) {
        self.style_stack.pop();
        if self.config.styled && self.table.is_none() {
            self.current.push_str(RESET);
            for style in &self.style_stack {
                self.current.push_str(style.ansi());
            }
        }
    }

    /// Separates a new top-level block from the previous one.
    fn start_block(&mut self) {
        self.flush_line(false);
        if self.blank_pending && !self.lines.is_empty() {
            let blank = QUOTE_PREFIX.repeat(self.quote_depth);
            self.lines.push(blank.trim_end().to_string());
        }
        self.blank_pending = false;
    }

    fn end_block(&mut self) {
        if self.list_stack.is_empty() {
            self.blank_pending = true;
        }
    }

    /// Moves the current line into the output. An empty line is only kept
    /// when `force` is set, so block boundaries do not pile up blank lines.
    fn flush_line(&mut self, force: bool) {
        if self.current.is_empty() && !force {
            return;
        }
        let marker = self.pending_marker.take();
        if self.current.is_empty() && marker.is_none() && !self.in_code_block {
            return;
        }

        let mut line = QUOTE_PREFIX.repeat(self.quote_depth);
        let indent: usize = self.list_indent.iter().sum();
        match marker {
            Some(marker) => {
                let outer = indent.saturating_sub(marker.chars().count());
                line.push_str(&" ".repeat(outer));
                line.push_str(&marker);
            }
            None => line.push_str(&" ".repeat(indent)),
        }
        line.push_str(&std::mem::take(&mut self.current));

        let reopen = self.config.styled && !self.style_stack.is_empty();
        if reopen {
            line.push_str(RESET);
            for style in &self.style_stack {
                self.current.push_str(style.ansi());
            }
        }
        self.lines.push(line.trim_end().to_string());
    }

    fn emit_table(&mut self, table: TableState) {
        let columns = table.rows.iter().map(Vec::len).max().unwrap_or(0);
        let mut widths = vec![0; columns];
        for row in &table.rows {
            for (index, cell) in row.iter().enumerate() {
                widths[index] = widths[index].max(cell.chars().count());
            }
        }

        for (row_index, row) in table.rows.iter().enumerate() {
            let cells: Vec<String> = (0..columns)
                .map(|index| {
                    let cell = row.get(index).map(String::as_str).unwrap_or("");
                    let padding = widths[index] - cell.chars().count();
                    format!("{cell}{}", " ".repeat(padding))
                })
                .collect();
            self.current.push_str(&cells.join(" │ "));
            self.flush_line(false);

            if row_index + 1 == table.header_rows {
                let rule: Vec<String> = widths.iter().map(|width| "─".repeat(*width)).collect();
                self.current.push_str(&rule.join("─┼─"));
                self.flush_line(false);
            }
        }
    }
}
