//! Citation marker extraction.
//!
//! Assistant replies embed citation markers in the literal form
//! `[Page N]`, where N is one or more decimal digits. Extraction is a
//! pure function over generated text: it is called once to render
//! clickable references and again whenever a citation drives the page
//! viewer, so it must be cheap, restartable, and never fail on malformed
//! input.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::ops::Range;

static MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[Page ([0-9]+)\]").expect("citation marker pattern is valid"));

/// A citation marker found in generated text.
///
/// Derived on demand, never stored: citations are recomputed from message
/// text whenever they are needed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    /// 1-indexed page number the marker points at.
    pub page: u32,
    /// The exact matched substring, e.g. `[Page 3]`.
    pub raw_marker: String,
    /// Byte offsets of the marker within the source text.
    pub span: Range<usize>,
}

/// Returns the citations found in `text`, lazily, in order of appearance.
///
/// Matching is left-to-right and non-overlapping; duplicate markers for
/// the same page each yield a separate entry. Markers whose page number
/// does not fit a `u32`, or is zero, are skipped rather than failing the
/// whole extraction.
pub fn extract(text: &str) -> impl Iterator<Item = Citation> + '_ {
    MARKER.captures_iter(text).filter_map(|caps| {
        let marker = caps.get(0)?;
        let page = caps.get(1)?.as_str().parse::<u32>().ok().filter(|p| *p > 0)?;
        Some(Citation {
            page,
            raw_marker: marker.as_str().to_string(),
            span: marker.range(),
        })
    })
}

/// Collects all citations in `text` into a vector.
pub fn extract_all(text: &str) -> Vec<Citation> {
    extract(text).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_markers_in_order() {
        let citations = extract_all("See [Page 3] and [Page 12] for details.");
        assert_eq!(citations.len(), 2);
        assert_eq!(citations[0].page, 3);
        assert_eq!(citations[0].raw_marker, "[Page 3]");
        assert_eq!(citations[1].page, 12);
        assert_eq!(citations[1].raw_marker, "[Page 12]");
    }

    #[test]
    fn test_no_markers_yields_empty() {
        assert!(extract_all("no markers here").is_empty());
        assert!(extract_all("").is_empty());
    }

    #[test]
    fn test_spans_index_back_into_source() {
        let text = "intro [Page 7] middle [Page 7] end";
        let citations = extract_all(text);
        assert_eq!(citations.len(), 2);
        for citation in &citations {
            assert_eq!(&text[citation.span.clone()], citation.raw_marker);
        }
        assert!(citations[0].span.start < citations[1].span.start);
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let text = "See [Page 3] and [Page 12].";
        assert_eq!(extract_all(text), extract_all(text));
    }

    #[test]
    fn test_no_boundary_constraints() {
        let citations = extract_all("foo[Page 3]bar");
        assert_eq!(citations.len(), 1);
        assert_eq!(citations[0].page, 3);
    }

    #[test]
    fn test_malformed_markers_do_not_match() {
        assert!(extract_all("xPage 3]").is_empty());
        assert!(extract_all("[page 3]").is_empty());
        assert!(extract_all("[Page ]").is_empty());
        assert!(extract_all("[Page three]").is_empty());
    }

    #[test]
    fn test_leading_zeros_parse_numerically() {
        let citations = extract_all("[Page 03]");
        assert_eq!(citations.len(), 1);
        assert_eq!(citations[0].page, 3);
        assert_eq!(citations[0].raw_marker, "[Page 03]");
    }

    #[test]
    fn test_overflowing_page_is_skipped() {
        let citations = extract_all("[Page 99999999999999999999] but [Page 2] stays");
        assert_eq!(citations.len(), 1);
        assert_eq!(citations[0].page, 2);
    }

    #[test]
    fn test_page_zero_is_skipped() {
        assert!(extract_all("[Page 0]").is_empty());
    }

    #[test]
    fn test_lazy_iterator_restarts() {
        let text = "[Page 1][Page 2]";
        let mut iter = extract(text);
        assert_eq!(iter.next().map(|c| c.page), Some(1));
        drop(iter);
        // A fresh call starts over from the beginning.
        assert_eq!(extract(text).next().map(|c| c.page), Some(1));
    }
}
