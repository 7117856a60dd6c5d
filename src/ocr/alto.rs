//! ALTO text extraction.
//!
//! ALTO (Analyzed Layout and Text Object) files describe OCR results per
//! page: `Page > PrintSpace > TextBlock > TextLine > String`. Recognized
//! words are carried in the `CONTENT` attribute of `String` elements.
//!
//! Text is rebuilt as follows:
//! - words of a line are joined with a single space
//! - a hyphen (`HYP`) is appended to the preceding word
//! - lines (across all text blocks of a page) are joined with `\n`
//! - pages are joined with `\n`, with no trailing newline
//!
//! Namespace prefixes and ALTO schema versions are ignored; elements are
//! matched by local name. Files that are not UTF-8 are decoded according to
//! their byte order mark or the `encoding` of their XML declaration.

use crate::error::{Error, Result};
use crate::storage::Storage;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::borrow::Cow;
use std::path::Path;

/// A block of text lines on an ALTO page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AltoTextBlock {
    /// Block identifier (`ID` attribute)
    pub id: Option<String>,
    /// Lines in document order
    pub lines: Vec<String>,
}

/// One page of an ALTO document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AltoPage {
    /// Page identifier (`ID` attribute)
    pub id: Option<String>,
    /// Text blocks in document order
    pub blocks: Vec<AltoTextBlock>,
}

impl AltoPage {
    /// Text content of the page: all lines joined with `\n`.
    pub fn content(&self) -> String {
        self.blocks
            .iter()
            .flat_map(|b| b.lines.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn current_block(&mut self) -> &mut AltoTextBlock {
        if self.blocks.is_empty() {
            self.blocks.push(AltoTextBlock::default());
        }
        let last = self.blocks.len() - 1;
        &mut self.blocks[last]
    }
}

/// Parsed ALTO document: an ordered sequence of pages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AltoDocument {
    pages: Vec<AltoPage>,
}

impl AltoDocument {
    /// Parse an ALTO file from disk.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| Error::AltoParse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_bytes(&bytes, path)
    }

    /// Parse ALTO bytes; `source` is only used for error reporting.
    pub fn from_bytes(bytes: &[u8], source: &Path) -> Result<Self> {
        let parse_error = |reason: String| Error::AltoParse {
            path: source.to_path_buf(),
            reason,
        };

        let xml = decode_document(bytes).map_err(parse_error)?;
        let xml = xml.strip_prefix('\u{feff}').unwrap_or(xml.as_ref());
        let pages = read_pages(xml).map_err(parse_error)?;

        Ok(Self { pages })
    }

    /// Parse an ALTO document held in memory.
    pub fn parse_str(xml: &str) -> Result<Self> {
        Self::from_bytes(xml.as_bytes(), Path::new("<memory>"))
    }

    /// All pages in document order.
    pub fn pages(&self) -> &[AltoPage] {
        &self.pages
    }

    /// Text of the whole document: page contents joined with `\n`.
    pub fn text(&self) -> String {
        let mut text = String::new();
        for page in &self.pages {
            text.push_str(&page.content());
            text.push('\n');
        }
        // drop the separator appended after the final page
        text.pop();
        text
    }
}

/// Extracts the text of ALTO files read through a [`Storage`].
pub struct AltoExtractor;

impl AltoExtractor {
    /// Extract the text of one ALTO file.
    ///
    /// Either the whole file yields text or the call fails with
    /// [`Error::AltoParse`] carrying the path.
    pub fn extract(storage: &dyn Storage, path: &Path) -> Result<String> {
        let bytes = storage.read_all(path).map_err(|e| Error::AltoParse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let document = AltoDocument::from_bytes(&bytes, path)?;
        log::debug!("{}: {} page(s)", path.display(), document.pages().len());
        Ok(document.text())
    }
}

/// Builder state while walking the event stream.
#[derive(Default)]
struct PageCollector {
    pages: Vec<AltoPage>,
    page: Option<AltoPage>,
    line: Option<String>,
}

impl PageCollector {
    fn start_page(&mut self, id: Option<String>) {
        self.finish_page();
        self.page = Some(AltoPage {
            id,
            blocks: Vec::new(),
        });
    }

    fn finish_page(&mut self) {
        self.finish_line();
        if let Some(page) = self.page.take() {
            self.pages.push(page);
        }
    }

    fn start_block(&mut self, id: Option<String>) {
        self.finish_line();
        if let Some(page) = self.page.as_mut() {
            page.blocks.push(AltoTextBlock {
                id,
                lines: Vec::new(),
            });
        }
    }

    fn start_line(&mut self) {
        self.finish_line();
        self.line = Some(String::new());
    }

    fn finish_line(&mut self) {
        if let (Some(line), Some(page)) = (self.line.take(), self.page.as_mut()) {
            page.current_block().lines.push(line);
        }
    }

    fn push_word(&mut self, word: &str) {
        if let Some(line) = self.line.as_mut() {
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(word);
        }
    }

    fn push_hyphen(&mut self, hyphen: &str) {
        if let Some(line) = self.line.as_mut() {
            line.push_str(hyphen);
        }
    }
}

/// Decode raw file content into text, leaving any byte order mark in place.
fn decode_document(bytes: &[u8]) -> std::result::Result<Cow<'_, str>, String> {
    if let Ok(xml) = std::str::from_utf8(bytes) {
        return Ok(Cow::Borrowed(xml));
    }

    // the first event settles the encoding from a BOM or the XML declaration
    let mut reader = Reader::from_reader(bytes);
    let _ = reader.read_event();
    let decoder = reader.decoder();
    log::debug!("Decoding ALTO document as {}", decoder.encoding().name());

    decoder
        .decode(bytes)
        .map_err(|e| format!("cannot decode document as {}: {}", decoder.encoding().name(), e))
}

fn read_pages(xml: &str) -> std::result::Result<Vec<AltoPage>, String> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut collector = PageCollector::default();
    let mut depth = 0usize;
    let mut seen_root = false;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| format!("malformed XML at byte {}: {}", reader.buffer_position(), e))?;

        match event {
            Event::Start(e) => {
                check_root(&e, &mut seen_root)?;
                depth += 1;
                handle_element(&e, &reader, &mut collector, false)?;
            },
            Event::Empty(e) => {
                check_root(&e, &mut seen_root)?;
                handle_element(&e, &reader, &mut collector, true)?;
            },
            Event::End(e) => {
                depth = depth.saturating_sub(1);
                match e.local_name().as_ref() {
                    b"Page" => collector.finish_page(),
                    b"TextLine" => collector.finish_line(),
                    _ => {},
                }
            },
            Event::Eof => break,
            _ => {},
        }
    }

    if !seen_root {
        return Err("document has no root element".to_string());
    }
    if depth != 0 {
        return Err("unexpected end of document".to_string());
    }

    collector.finish_page();
    Ok(collector.pages)
}

fn check_root(e: &BytesStart, seen_root: &mut bool) -> std::result::Result<(), String> {
    if *seen_root {
        return Ok(());
    }
    *seen_root = true;
    let name = e.local_name();
    if name.as_ref() != b"alto" {
        return Err(format!(
            "root element is <{}>, expected <alto>",
            String::from_utf8_lossy(name.as_ref())
        ));
    }
    Ok(())
}

fn handle_element(
    e: &BytesStart,
    reader: &Reader<&[u8]>,
    collector: &mut PageCollector,
    empty: bool,
) -> std::result::Result<(), String> {
    match e.local_name().as_ref() {
        b"Page" => {
            collector.start_page(attribute(e, reader, b"ID")?);
            if empty {
                collector.finish_page();
            }
        },
        b"TextBlock" => collector.start_block(attribute(e, reader, b"ID")?),
        b"TextLine" => {
            collector.start_line();
            if empty {
                collector.finish_line();
            }
        },
        b"String" => {
            if let Some(content) = attribute(e, reader, b"CONTENT")? {
                collector.push_word(&content);
            }
        },
        b"HYP" => {
            if let Some(content) = attribute(e, reader, b"CONTENT")? {
                collector.push_hyphen(&content);
            }
        },
        _ => {},
    }
    Ok(())
}

fn attribute(
    e: &BytesStart,
    reader: &Reader<&[u8]>,
    name: &[u8],
) -> std::result::Result<Option<String>, String> {
    for attr in e.attributes() {
        let attr = attr.map_err(|err| err.to_string())?;
        if attr.key.local_name().as_ref() == name {
            let value = attr.decode_and_unescape_value(reader).map_err(|err| err.to_string())?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}
