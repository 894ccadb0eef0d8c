//! HTML-like persistence for documents
//!
//! Each block is one element:
//!
//! ```text
//! <p>text</p>
//! <h2>text</h2>
//! <li data-list="0" data-indent="1" data-marker="bullet">text</li>
//! <div data-type="page-break" data-kind="automatic" class="page-break"></div>
//! ```
//!
//! Page breaks are ordinary nodes, so persisting the document persists the
//! pagination decisions with it.

use crate::document::{BlockKind, BreakKind, Document, ListId, ListMarker, NodeType, Schema};
use quick_xml::escape::{escape, unescape};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use thiserror::Error;

/// Type discriminator carried by page break elements
pub const PAGE_BREAK_TYPE: &str = "page-break";

/// Errors raised while loading persisted markup
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HtmlError {
    #[error("malformed markup at byte {position}: {message}")]
    Malformed { position: u64, message: String },

    #[error("<{0}> is never closed")]
    UnclosedBlock(String),
}

impl Document {
    /// Serialize the document to its persisted markup
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for block in self.blocks() {
            let text = escape(block.text.as_str());
            let element = match &block.kind {
                BlockKind::Paragraph => format!("<p>{}</p>", text),
                BlockKind::Heading { level } => format!("<h{0}>{1}</h{0}>", level, text),
                BlockKind::ListItem {
                    list_id,
                    indent_level,
                    marker,
                } => {
                    let marker = match marker {
                        ListMarker::Bullet => "bullet".to_string(),
                        ListMarker::Numbered { ordinal } => ordinal.to_string(),
                    };
                    format!(
                        "<li data-list=\"{}\" data-indent=\"{}\" data-marker=\"{}\">{}</li>",
                        list_id.0, indent_level, marker, text
                    )
                }
                BlockKind::PageBreak { kind } => format!(
                    "<div data-type=\"{}\" data-kind=\"{}\" class=\"page-break\"></div>",
                    PAGE_BREAK_TYPE, kind
                ),
            };
            out.push_str(&element);
            out.push('\n');
        }
        out
    }

    /// Load a document from persisted markup using the default schema
    pub fn from_html(html: &str) -> Result<Self, HtmlError> {
        Self::from_html_with_schema(html, Schema::default())
    }

    /// Load a document from persisted markup.
    ///
    /// Elements whose node type is not registered in `schema` are dropped with
    /// a warning. Unknown container elements (`div`, `ul`, `body`, ...) are
    /// transparent.
    pub fn from_html_with_schema(html: &str, schema: Schema) -> Result<Self, HtmlError> {
        let mut reader = Reader::from_str(html);
        reader.config_mut().trim_text(false);
        // `<br>` never closes; end tags are paired below instead
        reader.config_mut().check_end_names = false;

        let mut doc = Document::empty(schema);
        let mut open: Option<OpenBlock> = None;
        let mut loose_text = String::new();

        loop {
            let event = reader.read_event().map_err(|err| HtmlError::Malformed {
                position: reader.buffer_position() as u64,
                message: err.to_string(),
            })?;

            match event {
                Event::Start(e) => {
                    if let Some(block) = open.as_mut() {
                        let name = e.name();
                        if name.as_ref().eq_ignore_ascii_case(b"br") {
                            block.text.push('\n');
                        } else if !is_void(name.as_ref()) {
                            block.inline.push(String::from_utf8_lossy(name.as_ref()).into_owned());
                        }
                        continue;
                    }
                    flush_loose_text(&mut doc, &mut loose_text);
                    match classify(&reader, &e) {
                        Element::Text { tag, kind } => {
                            if doc.schema().contains(kind.node_type()) {
                                open = Some(OpenBlock::new(tag, kind));
                            } else {
                                tracing::warn!(node = %kind.node_type(), "node type not in schema, dropping element");
                                skip_element(&mut reader, &e)?;
                            }
                        }
                        Element::PageBreak(kind) => {
                            push_page_break(&mut doc, kind);
                            skip_element(&mut reader, &e)?;
                        }
                        Element::Container => {}
                    }
                }
                Event::Empty(e) => {
                    if let Some(block) = open.as_mut() {
                        if e.name().as_ref().eq_ignore_ascii_case(b"br") {
                            block.text.push('\n');
                        }
                        continue;
                    }
                    flush_loose_text(&mut doc, &mut loose_text);
                    match classify(&reader, &e) {
                        Element::PageBreak(kind) => push_page_break(&mut doc, kind),
                        Element::Text { kind, .. } => {
                            if doc.schema().contains(kind.node_type()) {
                                doc.push_loaded(kind, String::new());
                            }
                        }
                        Element::Container => {}
                    }
                }
                Event::End(e) => {
                    if let Some(block) = open.as_mut() {
                        let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                        if is_void(name.as_bytes()) {
                            continue;
                        }
                        let expected = block.inline.last().unwrap_or(&block.tag);
                        if !name.eq_ignore_ascii_case(expected) {
                            return Err(HtmlError::Malformed {
                                position: reader.buffer_position() as u64,
                                message: format!("expected </{expected}>, found </{name}>"),
                            });
                        }
                        if block.inline.pop().is_some() {
                            continue;
                        }
                    }
                    match open.take() {
                        Some(block) => doc.push_loaded(block.kind, block.text),
                        None => flush_loose_text(&mut doc, &mut loose_text),
                    }
                }
                Event::Text(e) => {
                    let text = e.decode().map_err(|err| HtmlError::Malformed {
                        position: reader.buffer_position() as u64,
                        message: err.to_string(),
                    })?;
                    text_sink(&mut open, &mut loose_text).push_str(&text);
                }
                Event::CData(e) => {
                    let text = reader.decoder().decode(&e).map_err(|err| HtmlError::Malformed {
                        position: reader.buffer_position() as u64,
                        message: err.to_string(),
                    })?;
                    text_sink(&mut open, &mut loose_text).push_str(&text);
                }
                Event::GeneralRef(e) => {
                    let name = e.decode().map_err(|err| HtmlError::Malformed {
                        position: reader.buffer_position() as u64,
                        message: err.to_string(),
                    })?;
                    let resolved = resolve_entity(&name);
                    text_sink(&mut open, &mut loose_text).push_str(&resolved);
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(block) = open {
            return Err(HtmlError::UnclosedBlock(block.tag));
        }
        flush_loose_text(&mut doc, &mut loose_text);
        doc.ensure_block();
        Ok(doc)
    }
}

/// HTML elements that never take an end tag
fn is_void(name: &[u8]) -> bool {
    const VOID: [&[u8]; 6] = [b"br", b"hr", b"img", b"wbr", b"input", b"meta"];
    VOID.iter().any(|v| name.eq_ignore_ascii_case(v))
}

/// Text block currently being collected
struct OpenBlock {
    tag: String,
    kind: BlockKind,
    text: String,
    /// Inline elements open inside the block, innermost last
    inline: Vec<String>,
}

impl OpenBlock {
    fn new(tag: String, kind: BlockKind) -> Self {
        Self {
            tag,
            kind,
            text: String::new(),
            inline: Vec::new(),
        }
    }
}

enum Element {
    Text { tag: String, kind: BlockKind },
    PageBreak(BreakKind),
    Container,
}

fn classify(reader: &Reader<&[u8]>, e: &BytesStart<'_>) -> Element {
    let tag = String::from_utf8_lossy(e.name().as_ref()).to_ascii_lowercase();
    let attr = |name: &[u8]| -> Option<String> {
        e.attributes()
            .flatten()
            .find(|a| a.key.as_ref().eq_ignore_ascii_case(name))
            .and_then(|a| reader.decoder().decode(&a.value).ok().map(|v| v.into_owned()))
    };

    if attr(b"data-type").as_deref() == Some(PAGE_BREAK_TYPE) {
        let kind = match attr(b"data-kind") {
            Some(value) => value.parse().unwrap_or_else(|_| {
                tracing::warn!(value = %value, "unknown page break kind, loading as manual");
                BreakKind::Manual
            }),
            None => BreakKind::Manual,
        };
        return Element::PageBreak(kind);
    }

    let kind = match tag.as_str() {
        "p" => BlockKind::Paragraph,
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => BlockKind::heading(tag.as_bytes()[1] - b'0'),
        "li" => {
            let marker = match attr(b"data-marker").as_deref() {
                Some("bullet") | None => ListMarker::Bullet,
                Some(n) => n
                    .parse()
                    .map(|ordinal| ListMarker::Numbered { ordinal })
                    .unwrap_or(ListMarker::Bullet),
            };
            BlockKind::ListItem {
                list_id: ListId(attr(b"data-list").and_then(|v| v.parse().ok()).unwrap_or(0)),
                indent_level: attr(b"data-indent").and_then(|v| v.parse().ok()).unwrap_or(0),
                marker,
            }
        }
        _ => return Element::Container,
    };
    Element::Text { tag, kind }
}

fn push_page_break(doc: &mut Document, kind: BreakKind) {
    if doc.schema().contains(NodeType::PageBreak) {
        doc.push_loaded(BlockKind::page_break(kind), String::new());
    } else {
        tracing::warn!(%kind, "page break node not in schema, dropping marker");
    }
}

fn skip_element(reader: &mut Reader<&[u8]>, e: &BytesStart<'_>) -> Result<(), HtmlError> {
    reader
        .read_to_end(e.name())
        .map(|_| ())
        .map_err(|err| HtmlError::Malformed {
            position: reader.buffer_position() as u64,
            message: err.to_string(),
        })
}

fn text_sink<'a>(open: &'a mut Option<OpenBlock>, loose: &'a mut String) -> &'a mut String {
    match open {
        Some(block) => &mut block.text,
        None => loose,
    }
}

/// Text found between blocks becomes its own paragraph
fn flush_loose_text(doc: &mut Document, loose: &mut String) {
    let text = loose.trim();
    if !text.is_empty() {
        doc.push_loaded(BlockKind::Paragraph, text.to_string());
    }
    loose.clear();
}

fn resolve_entity(name: &str) -> String {
    if name == "nbsp" {
        return '\u{a0}'.to_string();
    }
    let reference = format!("&{};", name);
    match unescape(&reference) {
        Ok(resolved) => resolved.into_owned(),
        Err(_) => {
            tracing::warn!(entity = name, "unknown entity kept verbatim");
            reference
        }
    }
}
