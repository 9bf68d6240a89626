use std::collections::BTreeMap;
use std::io::{Read, Seek, SeekFrom};

use encoding_rs::UTF_16BE;
use lopdf::content::Content;
use lopdf::{Document, Object, ObjectId};
use tracing::debug;

use crate::error::NormalizeError;
use crate::model::{PageText, RawTableFragment};
use crate::source::{PageTextSource, TableSource, layout_tables};
use crate::table_parse::split_line_into_cells;

fn split_text_into_pages(raw_text: &str) -> Vec<String> {
    let mut pages = raw_text
        .split('\u{000C}')
        .map(str::to_string)
        .collect::<Vec<_>>();
    if pages.last().is_some_and(String::is_empty) {
        pages.pop();
    }
    pages
}

fn looks_decoding_broken(text: &str) -> bool {
    if text.contains("?Identity-H Unimplemented?") {
        return true;
    }

    let total = text.chars().count();
    if total == 0 {
        return false;
    }

    let replacement = text.matches('\u{FFFD}').count();
    let control = text
        .chars()
        .filter(|ch| ch.is_control() && !matches!(ch, '\n' | '\r' | '\t'))
        .count();

    replacement * 8 > total || control * 5 > total
}

fn decode_pdf_bytes(encoding: Option<&str>, bytes: &[u8]) -> String {
    let decoded = Document::decode_text(encoding, bytes);
    if !looks_decoding_broken(&decoded) {
        return decoded;
    }

    let has_bom = bytes.starts_with(&[0xFE, 0xFF]);
    let wide_font = encoding.is_some_and(|name| {
        let lower = name.to_ascii_lowercase();
        lower.contains("utf16") || lower.contains("ucs2") || lower.contains("identity-h")
    });
    if has_bom || wide_font {
        let payload = if has_bom { &bytes[2..] } else { bytes };
        let (utf16, had_errors) = UTF_16BE.decode_without_bom_handling(payload);
        if !had_errors && !utf16.is_empty() {
            return utf16.into_owned();
        }
    }

    String::from_utf8_lossy(bytes).to_string()
}

/// Favors candidates whose lines carry header labels or several cells.
fn extraction_quality_score(text: &str) -> i64 {
    if text.trim().is_empty() {
        return i64::MIN / 4;
    }

    let mut score = 0_i64;
    for line in text.lines().map(str::trim).filter(|line| !line.is_empty()) {
        score += 1;
        if split_line_into_cells(line).len() >= 2 {
            score += 50;
        }
        if line.contains(':') {
            score += 15;
        }
    }

    if looks_decoding_broken(text) {
        score -= 800;
    }
    score
}

fn extract_text_from_page_content(document: &Document, page_id: ObjectId) -> Option<String> {
    fn collect_text(text: &mut String, encoding: Option<&str>, operands: &[Object]) {
        for operand in operands {
            match operand {
                Object::String(bytes, _) => text.push_str(&decode_pdf_bytes(encoding, bytes)),
                Object::Array(items) => collect_text(text, encoding, items),
                Object::Integer(value) if *value < -100 => text.push(' '),
                _ => {}
            }
        }
    }

    let content = Content::decode(&document.get_page_content(page_id).ok()?).ok()?;
    let encodings = document
        .get_page_fonts(page_id)
        .into_iter()
        .map(|(name, font)| (name, font.get_font_encoding()))
        .collect::<BTreeMap<Vec<u8>, &str>>();

    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_encoding = None;
    for operation in content.operations {
        match operation.operator.as_str() {
            "Tf" => {
                current_encoding = operation
                    .operands
                    .first()
                    .and_then(|operand| operand.as_name().ok())
                    .and_then(|font_name| encodings.get(font_name).copied());
            }
            "Tj" | "TJ" | "'" | "\"" => {
                collect_text(&mut current, current_encoding, &operation.operands);
            }
            "T*" | "Td" | "TD" | "ET" if !current.trim().is_empty() => {
                lines.push(std::mem::take(&mut current));
            }
            _ => {}
        }
    }
    if !current.trim().is_empty() {
        lines.push(current);
    }

    (!lines.is_empty()).then(|| lines.join("\n"))
}

/// Text of every page, choosing the best of several extraction candidates.
pub(crate) fn read_pdf_pages_from_bytes(
    input_pdf: &[u8],
) -> Result<Vec<PageText>, NormalizeError> {
    let document = Document::load_mem(input_pdf)?;
    let pages_map = document.get_pages();

    let whole_text_pages = pdf_extract::extract_text_from_mem(input_pdf)
        .ok()
        .map(|text| split_text_into_pages(&text))
        .filter(|pages| pages.len() == pages_map.len());

    let mut pages = Vec::with_capacity(pages_map.len());
    for (index, (page_no, page_id)) in pages_map.iter().enumerate() {
        let mut candidates = Vec::new();
        if let Some(text) = whole_text_pages
            .as_ref()
            .and_then(|all| all.get(index).cloned())
        {
            candidates.push(text);
        }
        candidates.extend(extract_text_from_page_content(&document, *page_id));
        candidates.extend(document.extract_text(&[*page_no]).ok());

        let text = candidates
            .into_iter()
            .max_by_key(|text| extraction_quality_score(text))
            .unwrap_or_default();
        debug!(page = page_no, chars = text.len(), "page text extracted");

        pages.push(PageText {
            page_number: *page_no,
            text,
        });
    }

    if pages.is_empty() {
        return Err(NormalizeError::EmptyDocument);
    }

    Ok(pages)
}

/// A PDF read from a caller-owned stream.
///
/// Each pass rewinds the stream to its start and reads it again; the stream
/// itself is never closed here.
#[derive(Debug)]
pub struct PdfDocument<'r, R> {
    reader: &'r mut R,
}

impl<'r, R: Read + Seek> PdfDocument<'r, R> {
    pub fn new(reader: &'r mut R) -> Self {
        Self { reader }
    }

    fn read_from_start(&mut self) -> Result<Vec<u8>, NormalizeError> {
        self.reader.seek(SeekFrom::Start(0))?;
        let mut bytes = Vec::new();
        self.reader.read_to_end(&mut bytes)?;
        Ok(bytes)
    }
}

impl<R: Read + Seek> PageTextSource for PdfDocument<'_, R> {
    fn page_texts(&mut self) -> Result<Vec<PageText>, NormalizeError> {
        let bytes = self.read_from_start()?;
        read_pdf_pages_from_bytes(&bytes)
    }
}

impl<R: Read + Seek> TableSource for PdfDocument<'_, R> {
    fn tables(&mut self, pages: &[u32]) -> Result<Vec<RawTableFragment>, NormalizeError> {
        let bytes = self.read_from_start()?;
        let page_texts = read_pdf_pages_from_bytes(&bytes)?;
        Ok(layout_tables(&page_texts, pages))
    }
}
