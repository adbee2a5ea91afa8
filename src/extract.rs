//! Text extraction for uploaded files.
//!
//! Only a closed set of declared MIME types is eligible (JSON, XML and
//! `+xml`-suffixed types, DOCX), and only below a hard size ceiling. DOCX
//! files are ZIP archives; the document text lives in `w:t` runs inside
//! `word/document.xml`.

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;

/// Files larger than this are never extracted.
pub const MAX_EXTRACT_BYTES: usize = 10 * 1024 * 1024;

/// The OpenXML word-processing document type.
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("file is not valid UTF-8")]
    NotUtf8,
    #[error("failed to open DOCX archive: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("missing word/document.xml in DOCX archive")]
    MissingDocumentXml,
    #[error("failed to read document.xml: {0}")]
    Io(#[from] std::io::Error),
    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),
}

/// Recognized content-extraction variants, decided from the declared MIME
/// type. Everything else is `Unsupported` and skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractKind {
    Json,
    Xml,
    Docx,
    Unsupported,
}

impl ExtractKind {
    /// Classify a declared MIME type, ignoring any parameters.
    pub fn from_mime(mime: &str) -> Self {
        let essence = mime.split(';').next().unwrap_or("").trim();
        match essence {
            "application/json" => Self::Json,
            "application/xml" | "text/xml" => Self::Xml,
            m if m == DOCX_MIME => Self::Docx,
            m if m.ends_with("+xml") => Self::Xml,
            _ => Self::Unsupported,
        }
    }
}

/// Attempt extraction for an upload.
///
/// Returns `None` when the type is unsupported or the file exceeds the size
/// ceiling — no extraction attempted, not a failure. `Some(Err(_))` means
/// extraction was attempted and failed; callers log it and store the file
/// without extracted content.
pub fn try_extract(mime: &str, bytes: &[u8]) -> Option<Result<String, ExtractError>> {
    if bytes.len() > MAX_EXTRACT_BYTES {
        return None;
    }
    match ExtractKind::from_mime(mime) {
        ExtractKind::Json | ExtractKind::Xml => Some(extract_utf8(bytes)),
        ExtractKind::Docx => Some(extract_docx(bytes)),
        ExtractKind::Unsupported => None,
    }
}

/// JSON and XML content is stored as the raw bytes decoded as UTF-8.
fn extract_utf8(bytes: &[u8]) -> Result<String, ExtractError> {
    String::from_utf8(bytes.to_vec()).map_err(|_| ExtractError::NotUtf8)
}

fn extract_docx(bytes: &[u8]) -> Result<String, ExtractError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|_| ExtractError::MissingDocumentXml)?
        .read_to_string(&mut xml)?;

    parse_document_xml(&xml)
}

/// Walk document.xml collecting `w:t` text runs; paragraph ends become
/// newlines.
fn parse_document_xml(xml: &str) -> Result<String, ExtractError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut text = String::new();
    let mut in_text_run = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) if e.name().as_ref() == b"w:t" => in_text_run = true,
            Event::End(e) => match e.name().as_ref() {
                b"w:t" => in_text_run = false,
                b"w:p" => {
                    if !text.is_empty() && !text.ends_with('\n') {
                        text.push('\n');
                    }
                }
                _ => {}
            },
            Event::Text(t) if in_text_run => text.push_str(&t.unescape()?),
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(text.trim_end().to_string())
}
