//! Raw text extraction from Word-processing (`.docx`) documents.

use std::io::{Cursor, Read};

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::import::ImportError;

const DOCUMENT_PART: &str = "word/document.xml";

/// Extracts the body text of a `.docx` archive, one line per paragraph.
///
/// Explicit line breaks become `\n` and tabs become `\t`, so the line grammar
/// sees the same structure a reader sees.
pub fn extract_text(bytes: &[u8]) -> Result<String, ImportError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|err| ImportError::Extraction(format!("not a docx archive: {err}")))?;
    let mut part = archive
        .by_name(DOCUMENT_PART)
        .map_err(|err| ImportError::Extraction(format!("missing {DOCUMENT_PART}: {err}")))?;
    let mut xml = String::new();
    part.read_to_string(&mut xml)
        .map_err(|err| ImportError::Extraction(format!("unreadable {DOCUMENT_PART}: {err}")))?;
    document_text(&xml)
}

/// Walks WordprocessingML and collects the text runs.
pub fn document_text(xml: &str) -> Result<String, ImportError> {
    let mut reader = Reader::from_str(xml);
    let mut out = String::new();
    let mut in_text = false;

    loop {
        let event = reader
            .read_event()
            .map_err(|err| ImportError::Extraction(format!("malformed document xml: {err}")))?;
        match event {
            Event::Start(element) => {
                if element.name().as_ref() == b"w:t" {
                    in_text = true;
                }
            }
            Event::End(element) => match element.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:p" => out.push('\n'),
                _ => {}
            },
            Event::Empty(element) => match element.name().as_ref() {
                b"w:br" | b"w:cr" => out.push('\n'),
                b"w:tab" => out.push('\t'),
                b"w:p" => out.push('\n'),
                _ => {}
            },
            Event::Text(text) if in_text => {
                let unescaped = text
                    .unescape()
                    .map_err(|err| ImportError::Extraction(format!("bad text run: {err}")))?;
                out.push_str(&unescaped);
            }
            Event::CData(data) if in_text => {
                out.push_str(&String::from_utf8_lossy(&data));
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(out)
}
