//! Document parsing into embeddable fragments
//!
//! A fragment is the parser's output unit: one or more text items, each
//! carrying the page numbers it came from, under an ordered heading
//! breadcrumb. Flattening a fragment into its serialized text and page
//! set is a pure transformation, independent of storage or network.

mod pdf;

pub use pdf::*;

use crate::error::Result;

/// One text item inside a fragment, with its page provenance
#[derive(Debug, Clone)]
pub struct FragmentItem {
    pub text: String,
    pub pages: Vec<i64>,
}

/// A parsed fragment of a document
#[derive(Debug, Clone)]
pub struct ParsedFragment {
    pub items: Vec<FragmentItem>,
    pub section_headers: Vec<String>,
    pub origin_filename: Option<String>,
    pub origin_uri: Option<String>,
}

impl ParsedFragment {
    /// The exact text that gets embedded and shown to the generator
    pub fn serialized_text(&self) -> String {
        self.items
            .iter()
            .map(|item| item.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Union of all item page numbers, deduplicated, ascending
    pub fn page_set(&self) -> Vec<i64> {
        let mut pages: Vec<i64> = self
            .items
            .iter()
            .flat_map(|item| item.pages.iter().copied())
            .collect();
        pages.sort_unstable();
        pages.dedup();
        pages
    }
}

/// Trait for document parsers
pub trait DocumentParser: Send + Sync {
    /// Parse raw document bytes into ordered fragments
    fn parse(&self, filename: &str, raw_bytes: &[u8]) -> Result<Vec<ParsedFragment>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fragment(items: Vec<FragmentItem>) -> ParsedFragment {
        ParsedFragment {
            items,
            section_headers: vec![],
            origin_filename: None,
            origin_uri: None,
        }
    }

    #[test]
    fn test_page_set_dedupes_and_sorts() {
        let f = fragment(vec![
            FragmentItem {
                text: "a".to_string(),
                pages: vec![4, 2],
            },
            FragmentItem {
                text: "b".to_string(),
                pages: vec![2, 1, 4],
            },
        ]);
        assert_eq!(f.page_set(), vec![1, 2, 4]);
    }

    #[test]
    fn test_page_set_empty_items() {
        let f = fragment(vec![]);
        assert!(f.page_set().is_empty());
    }

    #[test]
    fn test_serialized_text_joins_items_in_order() {
        let f = fragment(vec![
            FragmentItem {
                text: "first paragraph".to_string(),
                pages: vec![1],
            },
            FragmentItem {
                text: "second paragraph".to_string(),
                pages: vec![2],
            },
        ]);
        assert_eq!(f.serialized_text(), "first paragraph\n\nsecond paragraph");
    }
}
