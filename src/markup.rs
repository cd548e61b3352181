//! Markup helpers
//!
//! The server sends bot replies as small HTML fragments (`<strong>`, `<ul>`,
//! `<li>`, `<br>`). Renderers insert them verbatim; everything that needs the
//! *text* of a message (conversation history, the "yes" marker lookup, the
//! terminal client) goes through [`text_content`].

use scraper::{ElementRef, Html, Node};

/// Elements that sit on their own lines
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "li", "ul", "ol", "h1", "h2", "h3", "h4", "h5", "h6", "blockquote", "pre",
];

/// Plain text of an HTML fragment, the way a browser's `innerText` reads it:
/// line breaks and block boundaries become newlines, tags disappear, entities
/// are decoded and surrounding whitespace is trimmed.
pub fn text_content(html: &str) -> String {
    render_text(html, "")
}

/// Like [`text_content`], but list items are bulleted for terminal output.
pub fn to_terminal(html: &str) -> String {
    render_text(html, "• ")
}

fn render_text(html: &str, bullet: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let mut out = String::with_capacity(html.len());
    write_element(fragment.root_element(), bullet, &mut out);
    collapse_blank_lines(&out).trim().to_string()
}

fn write_element(element: ElementRef<'_>, bullet: &str, out: &mut String) {
    for child in element.children() {
        if let Some(child_element) = ElementRef::wrap(child) {
            let name = child_element.value().name();
            if name == "br" {
                out.push('\n');
                continue;
            }
            let block = BLOCK_TAGS.contains(&name);
            if block && !out.is_empty() && !out.ends_with('\n') {
                out.push('\n');
            }
            if name == "li" {
                out.push_str(bullet);
            }
            write_element(child_element, bullet, out);
            if block {
                out.push('\n');
            }
        } else if let Node::Text(text) = child.value() {
            out.push_str(text);
        }
    }
}

/// Runs of three or more newlines become a single blank line
fn collapse_blank_lines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut newlines = 0;
    for ch in text.chars() {
        if ch == '\n' {
            newlines += 1;
            if newlines > 2 {
                continue;
            }
        } else {
            newlines = 0;
        }
        out.push(ch);
    }
    out
}

/// Escape plain text so it can be inserted into a rich-content bubble
/// without being interpreted as markup.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
