//! Terminal rendering for session messages.
//!
//! Presentation only: everything here consumes the core's already
//! complete messages and never mutates session state beyond the page
//! viewer.

use colored::Colorize;
use folio_core::citation::Citation;
use folio_core::pagination::Paginator;
use folio_core::session::{Message, Role};

/// Renders one message, highlighting citation markers and growing the
/// viewer's page count to cover cited pages.
pub fn render_message(message: &Message, pager: &mut Paginator) {
    let speaker = match message.role {
        Role::User => "you".bold(),
        Role::Model => "folio".green().bold(),
    };
    let citations = message.citations();
    for citation in &citations {
        pager.ensure_count_at_least(citation.page);
    }

    println!("{speaker}: {}", highlight_markers(&message.text, &citations));

    if !citations.is_empty() {
        let refs: Vec<String> = citations
            .iter()
            .enumerate()
            .map(|(i, c)| format!("[{}] page {}", i + 1, c.page))
            .collect();
        println!(
            "  {} {}  {}",
            "citations:".dimmed(),
            refs.join("  "),
            "(:cite N to jump)".dimmed()
        );
    }
}

/// Replaces each citation marker with a highlighted version, leaving the
/// surrounding text untouched. Falls back to the plain text when the
/// message has no markers.
pub fn highlight_markers(text: &str, citations: &[Citation]) -> String {
    if citations.is_empty() {
        return text.to_string();
    }

    let mut body = String::with_capacity(text.len());
    let mut cursor = 0;
    for citation in citations {
        body.push_str(&text[cursor..citation.span.start]);
        body.push_str(&citation.raw_marker.cyan().underline().to_string());
        cursor = citation.span.end;
    }
    body.push_str(&text[cursor..]);
    body
}

/// Prints the current viewer position.
pub fn render_viewer(pager: &Paginator) {
    let count = if pager.page_count() == 0 {
        "?".to_string()
    } else {
        pager.page_count().to_string()
    };
    println!("  {} page {} of {}", "viewer:".dimmed(), pager.current_page(), count);
}

/// Prints a non-fatal warning line.
pub fn warn(message: &str) {
    println!("{} {}", "!".yellow().bold(), message);
}
