//! Structured rich text as delivered by the content API
//!
//! A rich text field is a list of blocks (paragraphs, headings, list items,
//! images, embeds). Inline formatting is carried as spans that point into the
//! block's text by character offset.

use serde::{Deserialize, Serialize};

use crate::helpers::html_escape;

/// A rich text field
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RichText(pub Vec<TextBlock>);

/// One block of a rich text field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    #[serde(rename = "type")]
    pub kind: BlockKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub spans: Vec<Span>,
    /// Image source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Image alt text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oembed: Option<Oembed>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockKind {
    Paragraph,
    Preformatted,
    Heading1,
    Heading2,
    Heading3,
    Heading4,
    Heading5,
    Heading6,
    ListItem,
    OListItem,
    Image,
    Embed,
    #[serde(other)]
    Unknown,
}

/// Inline formatting over `[start, end)` of the block text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    #[serde(rename = "type")]
    pub kind: SpanKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<SpanData>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpanKind {
    Strong,
    Em,
    Hyperlink,
    Label,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpanData {
    pub url: Option<String>,
    pub target: Option<String>,
    pub label: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Oembed {
    pub html: Option<String>,
    pub embed_url: Option<String>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Unordered,
    Ordered,
}

impl ListKind {
    fn open(self) -> &'static str {
        match self {
            ListKind::Unordered => "<ul>",
            ListKind::Ordered => "<ol>",
        }
    }

    fn close(self) -> &'static str {
        match self {
            ListKind::Unordered => "</ul>",
            ListKind::Ordered => "</ol>",
        }
    }
}

impl RichText {
    pub fn blocks(&self) -> &[TextBlock] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Plain text of every block, joined by `separator`
    pub fn as_text_with(&self, separator: &str) -> String {
        self.0
            .iter()
            .filter_map(|block| block.text.as_deref())
            .collect::<Vec<_>>()
            .join(separator)
    }

    /// Plain text of every block, joined by a space
    pub fn as_text(&self) -> String {
        self.as_text_with(" ")
    }

    /// Render to HTML. Consecutive list items are grouped into one list.
    pub fn as_html(&self) -> String {
        let mut html = String::new();
        let mut list: Option<ListKind> = None;

        for block in &self.0 {
            let item_list = match block.kind {
                BlockKind::ListItem => Some(ListKind::Unordered),
                BlockKind::OListItem => Some(ListKind::Ordered),
                _ => None,
            };

            if list != item_list {
                if let Some(open) = list.take() {
                    html.push_str(open.close());
                }
                if let Some(kind) = item_list {
                    html.push_str(kind.open());
                    list = Some(kind);
                }
            }

            html.push_str(&block.as_html());
        }

        if let Some(open) = list {
            html.push_str(open.close());
        }

        html
    }
}

impl TextBlock {
    /// A paragraph without spans
    pub fn paragraph(text: &str) -> Self {
        Self {
            kind: BlockKind::Paragraph,
            text: Some(text.to_string()),
            spans: Vec::new(),
            url: None,
            alt: None,
            oembed: None,
        }
    }

    fn inner_html(&self) -> String {
        render_spans(self.text.as_deref().unwrap_or_default(), &self.spans)
    }

    /// Render this block alone; list items are not wrapped in a list
    pub fn as_html(&self) -> String {
        match self.kind {
            BlockKind::Paragraph => format!("<p>{}</p>", self.inner_html()),
            BlockKind::Preformatted => format!("<pre>{}</pre>", self.inner_html()),
            BlockKind::Heading1 => format!("<h1>{}</h1>", self.inner_html()),
            BlockKind::Heading2 => format!("<h2>{}</h2>", self.inner_html()),
            BlockKind::Heading3 => format!("<h3>{}</h3>", self.inner_html()),
            BlockKind::Heading4 => format!("<h4>{}</h4>", self.inner_html()),
            BlockKind::Heading5 => format!("<h5>{}</h5>", self.inner_html()),
            BlockKind::Heading6 => format!("<h6>{}</h6>", self.inner_html()),
            BlockKind::ListItem | BlockKind::OListItem => {
                format!("<li>{}</li>", self.inner_html())
            }
            BlockKind::Image => match &self.url {
                Some(url) => format!(
                    r#"<p class="block-img"><img src="{}" alt="{}"></p>"#,
                    html_escape(url),
                    html_escape(self.alt.as_deref().unwrap_or_default())
                ),
                None => String::new(),
            },
            BlockKind::Embed => {
                let oembed = self.oembed.clone().unwrap_or_default();
                format!(
                    r#"<div data-oembed="{}">{}</div>"#,
                    html_escape(oembed.embed_url.as_deref().unwrap_or_default()),
                    oembed.html.unwrap_or_default()
                )
            }
            BlockKind::Unknown => {
                tracing::debug!("Skipping rich text block of unknown type");
                String::new()
            }
        }
    }
}

fn opening_tag(span: &Span) -> String {
    let data = span.data.clone().unwrap_or_default();
    match span.kind {
        SpanKind::Strong => "<strong>".to_string(),
        SpanKind::Em => "<em>".to_string(),
        SpanKind::Hyperlink => {
            let href = html_escape(data.url.as_deref().unwrap_or("#"));
            match data.target {
                Some(target) => format!(
                    r#"<a href="{}" target="{}" rel="noopener">"#,
                    href,
                    html_escape(&target)
                ),
                None => format!(r#"<a href="{}">"#, href),
            }
        }
        SpanKind::Label => format!(
            r#"<span class="{}">"#,
            html_escape(data.label.as_deref().unwrap_or_default())
        ),
        SpanKind::Unknown => String::new(),
    }
}

fn closing_tag(span: &Span) -> &'static str {
    match span.kind {
        SpanKind::Strong => "</strong>",
        SpanKind::Em => "</em>",
        SpanKind::Hyperlink => "</a>",
        SpanKind::Label => "</span>",
        SpanKind::Unknown => "",
    }
}

/// Escape `text` and wrap span ranges in their tags.
///
/// Overlapping spans are closed and reopened at the boundary so the output
/// stays well nested.
fn render_spans(text: &str, spans: &[Span]) -> String {
    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();

    let mut ordered: Vec<&Span> = spans
        .iter()
        .filter(|s| s.start < s.end && s.start < len)
        .collect();
    ordered.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

    let mut out = String::with_capacity(text.len());
    let mut open: Vec<&Span> = Vec::new();
    let mut pending = ordered.into_iter().peekable();

    for i in 0..=len {
        if let Some(depth) = open.iter().position(|s| s.end.min(len) <= i) {
            let closed = open.split_off(depth);
            for span in closed.iter().rev() {
                out.push_str(closing_tag(span));
            }
            for span in closed {
                if span.end.min(len) > i {
                    out.push_str(&opening_tag(span));
                    open.push(span);
                }
            }
        }

        while let Some(span) = pending.next_if(|s| s.start == i) {
            out.push_str(&opening_tag(span));
            open.push(span);
        }

        if let Some(c) = chars.get(i) {
            let mut buf = [0u8; 4];
            out.push_str(&html_escape(c.encode_utf8(&mut buf)));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> RichText {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_as_text_joins_blocks() {
        let text = parse(
            r#"[
                {"type": "paragraph", "text": "Hello world", "spans": []},
                {"type": "image", "url": "https://img/x.png", "alt": null},
                {"type": "paragraph", "text": "Second line", "spans": []}
            ]"#,
        );
        assert_eq!(text.as_text(), "Hello world Second line");
        assert_eq!(text.as_text_with("\n"), "Hello world\nSecond line");
    }

    #[test]
    fn test_unknown_block_type_is_tolerated() {
        let text = parse(r#"[{"type": "table", "text": "cells"}]"#);
        assert_eq!(text.blocks()[0].kind, BlockKind::Unknown);
        assert_eq!(text.as_html(), "");
        assert_eq!(text.as_text(), "cells");
    }

    #[test]
    fn test_paragraph_with_spans() {
        let text = parse(
            r#"[{"type": "paragraph", "text": "bold and link", "spans": [
                {"start": 0, "end": 4, "type": "strong"},
                {"start": 9, "end": 13, "type": "hyperlink", "data": {"url": "https://x.dev"}}
            ]}]"#,
        );
        assert_eq!(
            text.as_html(),
            r#"<p><strong>bold</strong> and <a href="https://x.dev">link</a></p>"#
        );
    }

    #[test]
    fn test_nested_and_overlapping_spans() {
        let nested = parse(
            r#"[{"type": "paragraph", "text": "abcd", "spans": [
                {"start": 0, "end": 4, "type": "strong"},
                {"start": 1, "end": 3, "type": "em"}
            ]}]"#,
        );
        assert_eq!(
            nested.as_html(),
            "<p><strong>a<em>bc</em>d</strong></p>"
        );

        let overlapping = parse(
            r#"[{"type": "paragraph", "text": "abcd", "spans": [
                {"start": 0, "end": 2, "type": "strong"},
                {"start": 1, "end": 4, "type": "em"}
            ]}]"#,
        );
        assert_eq!(
            overlapping.as_html(),
            "<p><strong>a<em>b</em></strong><em>cd</em></p>"
        );
    }

    #[test]
    fn test_span_offsets_are_characters() {
        let text = parse(
            r#"[{"type": "paragraph", "text": "ação rápida", "spans": [
                {"start": 5, "end": 11, "type": "em"}
            ]}]"#,
        );
        assert_eq!(text.as_html(), "<p>ação <em>rápida</em></p>");
    }

    #[test]
    fn test_text_is_escaped() {
        let text = RichText(vec![TextBlock::paragraph("a < b & c")]);
        assert_eq!(text.as_html(), "<p>a &lt; b &amp; c</p>");
    }

    #[test]
    fn test_list_items_are_grouped() {
        let text = parse(
            r#"[
                {"type": "list-item", "text": "one"},
                {"type": "list-item", "text": "two"},
                {"type": "o-list-item", "text": "first"},
                {"type": "paragraph", "text": "after"}
            ]"#,
        );
        assert_eq!(
            text.as_html(),
            "<ul><li>one</li><li>two</li></ul><ol><li>first</li></ol><p>after</p>"
        );
    }

    #[test]
    fn test_headings_images_and_embeds() {
        let text = parse(
            r#"[
                {"type": "heading2", "text": "Title"},
                {"type": "image", "url": "https://img/x.png", "alt": "a \"cat\""},
                {"type": "embed", "oembed": {"embed_url": "https://youtu.be/x", "html": "<iframe></iframe>"}}
            ]"#,
        );
        assert_eq!(
            text.as_html(),
            concat!(
                "<h2>Title</h2>",
                r#"<p class="block-img"><img src="https://img/x.png" alt="a &quot;cat&quot;"></p>"#,
                r#"<div data-oembed="https://youtu.be/x"><iframe></iframe></div>"#
            )
        );
    }
}
