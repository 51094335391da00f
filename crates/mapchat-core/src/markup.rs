//! Lightweight markup used in chat text.
//!
//! The assistant marks emphasis with `**text**` and line breaks with the
//! literal two-character token `/n` (not a newline character). Runs of two or
//! more spaces are kept visible when rendered to HTML. Stored entry text is
//! never modified; these functions only produce display output.

use once_cell::sync::Lazy;
use regex::Regex;

static BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.*?)\*\*").expect("valid regex"));
static SPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r" {2,}").expect("valid regex"));

/// Literal line-break token of the backend text contract.
pub const LINE_BREAK_TOKEN: &str = "/n";

/// One piece of parsed message text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupSpan {
    Text(String),
    /// Emphasized content; holds only `Text` and `LineBreak` spans.
    Strong(Vec<MarkupSpan>),
    LineBreak,
}

/// Splits message text into spans.
///
/// Bold markers may enclose line-break tokens; an unmatched `**` is kept as
/// text.
pub fn parse(text: &str) -> Vec<MarkupSpan> {
    let mut spans = Vec::new();
    let mut last = 0;
    for caps in BOLD.captures_iter(text) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        push_lines(&mut spans, &text[last..whole.start()]);
        let mut strong = Vec::new();
        push_lines(&mut strong, inner.as_str());
        spans.push(MarkupSpan::Strong(strong));
        last = whole.end();
    }
    push_lines(&mut spans, &text[last..]);
    spans
}

fn push_lines(spans: &mut Vec<MarkupSpan>, segment: &str) {
    for (i, line) in segment.split(LINE_BREAK_TOKEN).enumerate() {
        if i > 0 {
            spans.push(MarkupSpan::LineBreak);
        }
        if !line.is_empty() {
            spans.push(MarkupSpan::Text(line.to_string()));
        }
    }
}

/// Renders message text to an HTML fragment.
///
/// Text is escaped before markup is applied, so the result is safe to inject
/// into a page.
pub fn render_html(text: &str) -> String {
    let mut html = String::with_capacity(text.len());
    write_html(&parse(text), &mut html);
    html
}

fn write_html(spans: &[MarkupSpan], html: &mut String) {
    for span in spans {
        match span {
            MarkupSpan::Text(t) => html.push_str(&preserve_spaces(&escape_html(t))),
            MarkupSpan::Strong(inner) => {
                html.push_str("<strong>");
                write_html(inner, html);
                html.push_str("</strong>");
            }
            MarkupSpan::LineBreak => html.push_str("<br/>"),
        }
    }
}

/// Popup content for a marker label.
pub fn popup_html(name: &str) -> String {
    format!("<b>{}</b>", escape_html(name))
}

/// Replaces each run of `n >= 2` spaces with one space and `n - 1` `&nbsp;`.
fn preserve_spaces(text: &str) -> String {
    SPACE_RUN
        .replace_all(text, |caps: &regex::Captures<'_>| {
            format!(" {}", "&nbsp;".repeat(caps[0].len() - 1))
        })
        .into_owned()
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
