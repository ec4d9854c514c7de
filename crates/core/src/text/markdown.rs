//! Minimal markdown → HTML for stored narrative blocks.
//!
//! Covers what the model is prompted to produce: headings, flat lists,
//! quotes, rules, paragraphs and a few inline spans. Lists render compact
//! (`<ul><li>a</li><li>b</li></ul>`) so fragments embed cleanly in exports.

use regex::{Captures, Regex};
use std::sync::OnceLock;

/// Rendered in place of blank input.
pub const EMPTY_STATE_HTML: &str = "<p class=\"empty\">No content yet.</p>";

static ORDERED_ITEM: OnceLock<Regex> = OnceLock::new();
static LINK: OnceLock<Regex> = OnceLock::new();
static BOLD: OnceLock<Regex> = OnceLock::new();
static ITALIC_STAR: OnceLock<Regex> = OnceLock::new();
static ITALIC_UNDERSCORE: OnceLock<Regex> = OnceLock::new();

fn regex(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("static markdown pattern"))
}

#[derive(Debug)]
enum Block {
    Heading(usize, String),
    List { ordered: bool, items: Vec<String> },
    Quote(Vec<String>),
    Rule,
    Paragraph(Vec<String>),
}

#[derive(Default)]
struct BlockBuilder {
    blocks: Vec<Block>,
    paragraph: Vec<String>,
    quote: Vec<String>,
    list: Option<(bool, Vec<String>)>,
}

impl BlockBuilder {
    fn flush_paragraph(&mut self) {
        if !self.paragraph.is_empty() {
            self.blocks
                .push(Block::Paragraph(std::mem::take(&mut self.paragraph)));
        }
    }

    fn flush_quote(&mut self) {
        if !self.quote.is_empty() {
            self.blocks.push(Block::Quote(std::mem::take(&mut self.quote)));
        }
    }

    fn flush_list(&mut self) {
        if let Some((ordered, items)) = self.list.take() {
            self.blocks.push(Block::List { ordered, items });
        }
    }

    fn flush(&mut self) {
        self.flush_paragraph();
        self.flush_quote();
        self.flush_list();
    }

    fn push_item(&mut self, ordered: bool, item: &str) {
        self.flush_paragraph();
        self.flush_quote();
        if matches!(self.list, Some((kind, _)) if kind != ordered) {
            self.flush_list();
        }
        self.list
            .get_or_insert_with(|| (ordered, Vec::new()))
            .1
            .push(item.trim().to_string());
    }

    fn finish(mut self) -> Vec<Block> {
        self.flush();
        self.blocks
    }
}

pub fn markdown_to_html(markdown: &str) -> String {
    if markdown.trim().is_empty() {
        return EMPTY_STATE_HTML.to_string();
    }

    let ordered_item = regex(&ORDERED_ITEM, r"^\d{1,3}[.)]\s+(.*)$");
    let mut builder = BlockBuilder::default();

    for line in markdown.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            builder.flush();
            continue;
        }

        if let Some((level, text)) = heading(trimmed) {
            builder.flush();
            builder.blocks.push(Block::Heading(level, text.to_string()));
        } else if is_rule(trimmed) {
            builder.flush();
            builder.blocks.push(Block::Rule);
        } else if let Some(item) = bullet(trimmed) {
            builder.push_item(false, item);
        } else if let Some(caps) = ordered_item.captures(trimmed) {
            builder.push_item(true, caps.get(1).map_or("", |m| m.as_str()));
        } else if let Some(quoted) = trimmed.strip_prefix('>') {
            builder.flush_paragraph();
            builder.flush_list();
            builder.quote.push(quoted.trim().to_string());
        } else if builder.list.is_some() && line.starts_with(&[' ', '\t'][..]) {
            if let Some(last) = builder.list.as_mut().and_then(|(_, items)| items.last_mut()) {
                last.push(' ');
                last.push_str(trimmed);
            }
        } else {
            builder.flush_quote();
            builder.flush_list();
            builder.paragraph.push(trimmed.to_string());
        }
    }

    builder
        .finish()
        .iter()
        .map(render_block)
        .collect::<Vec<_>>()
        .join("\n")
}

fn heading(line: &str) -> Option<(usize, &str)> {
    let level = line.chars().take_while(|c| *c == '#').count();
    if !(1..=6).contains(&level) {
        return None;
    }
    let rest = &line[level..];
    if rest.is_empty() {
        return Some((level, ""));
    }
    rest.starts_with(' ')
        .then(|| (level, rest.trim().trim_end_matches('#').trim_end()))
}

fn is_rule(line: &str) -> bool {
    let compact: String = line.chars().filter(|c| !c.is_whitespace()).collect();
    compact.len() >= 3
        && ['-', '*', '_']
            .iter()
            .any(|marker| compact.chars().all(|c| c == *marker))
}

fn bullet(line: &str) -> Option<&str> {
    ["- ", "* ", "+ ", "• "]
        .iter()
        .find_map(|marker| line.strip_prefix(marker))
}

fn render_block(block: &Block) -> String {
    match block {
        Block::Heading(level, text) => format!("<h{level}>{}</h{level}>", render_inline(text)),
        Block::List { ordered, items } => {
            let tag = if *ordered { "ol" } else { "ul" };
            let body: String = items
                .iter()
                .map(|item| format!("<li>{}</li>", render_inline(item)))
                .collect();
            format!("<{tag}>{body}</{tag}>")
        }
        Block::Quote(lines) => format!(
            "<blockquote><p>{}</p></blockquote>",
            render_inline(&lines.join(" "))
        ),
        Block::Rule => "<hr />".to_string(),
        Block::Paragraph(lines) => format!("<p>{}</p>", render_inline(&lines.join(" "))),
    }
}

/// Inline spans. Code spans are split out first so nothing inside them is
/// formatted; an unmatched trailing backtick stays literal.
fn render_inline(text: &str) -> String {
    let parts: Vec<&str> = text.split('`').collect();
    let balanced = parts.len() % 2 == 1;
    let mut out = String::with_capacity(text.len());

    for (i, part) in parts.iter().enumerate() {
        if i % 2 == 0 {
            out.push_str(&format_span(part));
        } else if balanced || i + 1 < parts.len() {
            out.push_str("<code>");
            out.push_str(&escape_html(part));
            out.push_str("</code>");
        } else {
            out.push('`');
            out.push_str(&format_span(part));
        }
    }

    out
}

fn format_span(text: &str) -> String {
    let escaped = escape_html(text);

    let linked = regex(&LINK, r"\[([^\]]+)\]\(([^)\s]+)\)").replace_all(&escaped, |caps: &Captures| {
        let label = &caps[1];
        let href = &caps[2];
        if is_safe_href(href) {
            format!("<a href=\"{href}\">{label}</a>")
        } else {
            label.to_string()
        }
    });
    let bold = regex(&BOLD, r"\*\*([^*]+)\*\*").replace_all(&linked, "<strong>$1</strong>");
    let italic = regex(&ITALIC_STAR, r"\*([^*\s][^*]*)\*").replace_all(&bold, "<em>$1</em>");
    regex(&ITALIC_UNDERSCORE, r"\b_([^_]+)_\b")
        .replace_all(&italic, "<em>$1</em>")
        .into_owned()
}

fn is_safe_href(href: &str) -> bool {
    let lower = href.to_ascii_lowercase();
    lower.starts_with("http://")
        || lower.starts_with("https://")
        || lower.starts_with("mailto:")
        || lower.starts_with('/')
        || lower.starts_with('#')
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
