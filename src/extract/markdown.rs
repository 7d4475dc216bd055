// src/extract/markdown.rs
// =============================================================================
// This module finds link and image destinations in Markdown text.
//
// We use `pulldown-cmark`'s offset iterator, which pairs every parse event
// with the byte range it came from. That range is what lets a redirect
// finding carry a precise text replacement.
//
// Unlike a plain "grab the http links" pass, every destination is kept:
// relative paths, fragments and mailto: links all go to the orchestrator,
// which decides what to check and what to skip.
// =============================================================================

use crate::orchestrator::{CheckItem, Span};
use pulldown_cmark::{Event, LinkType, Parser, Tag};
use std::ops::Range;

// Extracts every link/image destination, in document order
//
// Example input:
//   "See [Rust](https://www.rust-lang.org)!"
//
// Example output:
//   one CheckItem { uri: "https://www.rust-lang.org", span: 11..36 on line 1 }
pub fn extract_markdown_links(markdown: &str) -> Vec<CheckItem> {
    let lines = LineIndex::new(markdown);
    let mut items = Vec::new();

    for (event, range) in Parser::new(markdown).into_offset_iter() {
        let (link_type, dest) = match event {
            Event::Start(Tag::Link(link_type, dest, _title)) => (link_type, dest),
            Event::Start(Tag::Image(link_type, dest, _title)) => (link_type, dest),
            _ => continue,
        };

        // <someone@example.com> comes through without its scheme
        let uri = match link_type {
            LinkType::Email => format!("mailto:{dest}"),
            _ => dest.to_string(),
        };

        let range = locate(markdown, range, link_type, &dest);
        items.push(CheckItem {
            span: lines.span(range),
            uri,
            index: items.len(),
        });
    }

    items
}

// Narrows the whole-link range down to the destination text.
//
// Inline links are searched only after the link text closes, so a URL that
// also appears in the text or the title can't be picked up instead. Other
// link kinds (reference, shortcut) don't carry the destination at the link
// site, so they keep the whole range.
fn locate(markdown: &str, range: Range<usize>, link_type: LinkType, dest: &str) -> Range<usize> {
    if dest.is_empty() {
        return range;
    }

    let text = &markdown[range.clone()];
    let from = match link_type {
        LinkType::Inline => match closing_bracket(text) {
            Some(index) => index + 1,
            None => return range,
        },
        LinkType::Autolink | LinkType::Email => 0,
        _ => return range,
    };

    match text[from..].find(dest) {
        Some(offset) => {
            let start = range.start + from + offset;
            start..start + dest.len()
        }
        None => range,
    }
}

// Index of the `]` that closes the link text, skipping nested brackets
// (an image inside a link) and backslash escapes.
fn closing_bracket(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut escaped = false;

    for (index, c) in text.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '[' => depth += 1,
            ']' if depth <= 1 => return Some(index),
            ']' => depth -= 1,
            _ => {}
        }
    }
    None
}

// Byte offset → 1-based line/column
struct LineIndex<'a> {
    text: &'a str,
    line_starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    fn new(text: &'a str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(text.match_indices('\n').map(|(i, _)| i + 1));
        Self { text, line_starts }
    }

    fn span(&self, range: Range<usize>) -> Span {
        let line = self.line_starts.partition_point(|&start| start <= range.start);
        let line_start = self.line_starts[line - 1];
        let column = self.text[line_start..range.start].chars().count() + 1;

        Span {
            line,
            column,
            start: range.start,
            end: range.end,
        }
    }
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why into_offset_iter()?
//    - Parser::new() alone yields events without positions
//    - into_offset_iter() yields (event, byte_range) pairs
//    - The range of a Start(Link) event covers the whole `[text](url)`
//
// 2. Why partition_point?
//    - line_starts is sorted, so a binary search finds the line
//    - partition_point returns how many line starts are <= the offset,
//      which is exactly the 1-based line number
//
// 3. Why count chars for the column?
//    - Offsets are bytes; editors count characters
// -----------------------------------------------------------------------------
