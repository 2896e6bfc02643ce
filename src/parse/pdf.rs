//! PDF parsing via pdf-extract
//!
//! Extracts text page by page, tracks heading-like lines as a breadcrumb,
//! and packs paragraphs into size-bounded fragments. Heading nesting is
//! inferred from numeric prefixes ("2.1 Results" sits below "2 Methods");
//! unnumbered headings reset the breadcrumb to a single level.

use super::{DocumentParser, FragmentItem, ParsedFragment};
use crate::config::ParserConfig;
use crate::error::{Error, Result};
use tracing::debug;

/// PDF document parser
pub struct PdfParser {
    max_fragment_chars: usize,
}

impl PdfParser {
    pub fn new(config: &ParserConfig) -> Self {
        Self {
            max_fragment_chars: config.max_fragment_chars,
        }
    }
}

impl DocumentParser for PdfParser {
    fn parse(&self, filename: &str, raw_bytes: &[u8]) -> Result<Vec<ParsedFragment>> {
        if raw_bytes.is_empty() {
            return Err(Error::Validation(
                "Uploaded file is empty or invalid".to_string(),
            ));
        }

        let pages = pdf_extract::extract_text_by_pages_from_mem(raw_bytes)
            .map_err(|e| Error::Parse(format!("Failed to extract text from PDF: {}", e)))?;

        debug!("Extracted {} pages from '{}'", pages.len(), filename);

        Ok(fragments_from_pages(
            &pages,
            filename,
            self.max_fragment_chars,
        ))
    }
}

/// Pack per-page text into fragments bounded by max_chars
fn fragments_from_pages(
    pages: &[String],
    filename: &str,
    max_chars: usize,
) -> Vec<ParsedFragment> {
    let mut builder = FragmentBuilder::new(filename, max_chars);

    for (index, page_text) in pages.iter().enumerate() {
        let page_no = (index + 1) as i64;
        for paragraph in paragraphs(page_text) {
            if let Some(level) = heading_level(&paragraph) {
                builder.enter_heading(paragraph, level);
            } else {
                builder.push_paragraph(paragraph, page_no);
            }
        }
    }

    builder.finish()
}

struct FragmentBuilder {
    filename: String,
    max_chars: usize,
    breadcrumb: Vec<String>,
    items: Vec<FragmentItem>,
    current_chars: usize,
    fragments: Vec<ParsedFragment>,
}

impl FragmentBuilder {
    fn new(filename: &str, max_chars: usize) -> Self {
        Self {
            filename: filename.to_string(),
            max_chars,
            breadcrumb: Vec::new(),
            items: Vec::new(),
            current_chars: 0,
            fragments: Vec::new(),
        }
    }

    fn enter_heading(&mut self, heading: String, level: usize) {
        self.flush();
        self.breadcrumb.truncate(level.saturating_sub(1));
        self.breadcrumb.push(heading);
    }

    fn push_paragraph(&mut self, paragraph: String, page_no: i64) {
        if self.current_chars > 0 && self.current_chars + paragraph.len() > self.max_chars {
            self.flush();
        }

        self.current_chars += paragraph.len();
        self.items.push(FragmentItem {
            text: paragraph,
            pages: vec![page_no],
        });
    }

    fn flush(&mut self) {
        if self.items.is_empty() {
            return;
        }

        self.fragments.push(ParsedFragment {
            items: std::mem::take(&mut self.items),
            section_headers: self.breadcrumb.clone(),
            origin_filename: Some(self.filename.clone()),
            origin_uri: None,
        });
        self.current_chars = 0;
    }

    fn finish(mut self) -> Vec<ParsedFragment> {
        self.flush();
        self.fragments
    }
}

/// Split page text into non-empty paragraphs on blank lines
fn paragraphs(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                out.push(current.join(" "));
                current.clear();
            }
        } else {
            current.push(line.trim());
        }
    }
    if !current.is_empty() {
        out.push(current.join(" "));
    }

    out
}

/// Detect heading-like paragraphs and their nesting level
///
/// A numeric prefix determines depth ("3.2.1" is level 3); any other
/// heading-looking line is level 1.
fn heading_level(paragraph: &str) -> Option<usize> {
    let trimmed = paragraph.trim();
    if trimmed.is_empty() || trimmed.len() > 80 {
        return None;
    }
    if trimmed.ends_with(['.', ':', ';', ',']) {
        return None;
    }
    if trimmed.split_whitespace().count() > 8 {
        return None;
    }

    if let Some(prefix) = trimmed.split_whitespace().next() {
        let numbering = prefix.trim_end_matches('.');
        if !numbering.is_empty()
            && numbering
                .split('.')
                .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()))
        {
            // Require a title after the numbering ("3.2" alone is a page number)
            if trimmed.split_whitespace().count() > 1 {
                return Some(numbering.split('.').count());
            }
            return None;
        }
    }

    // Unnumbered: treat as a heading only if it starts uppercase
    let first_alpha = trimmed.chars().find(|c| c.is_alphabetic())?;
    if first_alpha.is_uppercase() {
        Some(1)
    } else {
        None
    }
}
