//! `.resx` markup helpers: value extraction and entity escaping.

use quick_xml::escape::{escape, unescape, EscapeError};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::borrow::Cow;
use thiserror::Error;

/// File extension of resource files (compared case-insensitively).
pub const RESX_EXTENSION: &str = "resx";

#[derive(Debug, Error)]
pub enum ResxError {
    #[error("malformed resource markup: {0}")]
    Markup(#[from] quick_xml::Error),
}

/// Escape the five markup-reserved characters (`&`, `<`, `>`, `"`, `'`).
pub fn escape_value(value: &str) -> Cow<'_, str> {
    escape(value)
}

/// Decode entity and character references back to text.
pub fn unescape_value(value: &str) -> Result<Cow<'_, str>, EscapeError> {
    unescape(value)
}

/// Whether a path has the resource file extension.
pub fn is_resx_file(path: &std::path::Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(RESX_EXTENSION))
        .unwrap_or(false)
}

/// Extract the text of every `<data>` element's first `<value>` child,
/// in document order. Empty values are dropped; whitespace is kept as is.
pub fn extract_values(xml: &str) -> Result<Vec<String>, ResxError> {
    let mut reader = Reader::from_str(xml.trim_start_matches('\u{feff}'));

    let mut out = Vec::new();
    let mut depth = 0usize;
    // Depth of the enclosing <data> element and whether its value was seen
    let mut data_depth: Option<usize> = None;
    let mut value_seen = false;
    let mut captured: Option<String> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                depth += 1;
                match e.local_name().as_ref() {
                    b"data" if captured.is_none() => {
                        data_depth = Some(depth);
                        value_seen = false;
                    }
                    b"value" if data_depth.map(|d| d + 1) == Some(depth) && !value_seen => {
                        value_seen = true;
                        captured = Some(String::new());
                    }
                    _ => {}
                }
            }
            Event::Empty(e) => {
                if e.local_name().as_ref() == b"value" && data_depth == Some(depth) {
                    value_seen = true;
                }
            }
            Event::Text(e) => {
                if let Some(text) = captured.as_mut() {
                    text.push_str(&e.unescape()?);
                }
            }
            Event::CData(e) => {
                if let Some(text) = captured.as_mut() {
                    text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Event::End(e) => {
                let name = e.local_name();
                if name.as_ref() == b"value" && data_depth.map(|d| d + 1) == Some(depth) {
                    if let Some(text) = captured.take() {
                        if !text.is_empty() {
                            out.push(text);
                        }
                    }
                } else if name.as_ref() == b"data" && data_depth == Some(depth) {
                    data_depth = None;
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(out)
}
