//! Marker-delimited region synchronization
//!
//! A landing page owns exactly one autogenerated region, the span from the
//! first `AUTOGEN_START` marker in the body to the first `AUTOGEN_END` after
//! it. Synchronizing replaces only that span; every other byte of the page,
//! front matter included, is kept. When the page has no region yet the block
//! is inserted before the table-of-contents directive or appended at the end.
//!
//! Only the first marker pair is ever touched. Marker text appearing in prose
//! outside that pair is left exactly as found.

use crate::constants::{AUTOGEN_END, AUTOGEN_START, TOC_DIRECTIVE};
use crate::document::{default_front_matter, split_front_matter};

/// What synchronization did to a page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    /// The page did not exist; the skeleton was produced
    Created,
    /// An existing region was replaced with different content
    Replaced,
    /// The region already held the canonical block
    Unchanged,
    /// No region yet; the block went in before the TOC directive
    InsertedBeforeDirective,
    /// No region yet; the block was appended
    Appended,
    /// A start marker without a matching end marker; the page was left alone
    PartialMarkers,
}

impl SyncAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncAction::Created => "created",
            SyncAction::Replaced => "updated region",
            SyncAction::Unchanged => "up to date",
            SyncAction::InsertedBeforeDirective => "inserted region before table of contents",
            SyncAction::Appended => "appended region",
            SyncAction::PartialMarkers => "skipped: start marker without end marker",
        }
    }

    /// Whether the resulting text needs to be written
    pub fn writes(&self) -> bool {
        !matches!(self, SyncAction::Unchanged | SyncAction::PartialMarkers)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncResult {
    pub text: String,
    pub action: SyncAction,
}

/// Where the autogenerated region sits in a body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    /// Byte span covering both markers
    Span { start: usize, end: usize },
    Absent,
    Unterminated,
}

/// Locate the first start marker and the first end marker following it
pub fn locate_region(body: &str) -> Region {
    let Some(start) = body.find(AUTOGEN_START) else {
        return Region::Absent;
    };
    let search_from = start + AUTOGEN_START.len();
    match body[search_from..].find(AUTOGEN_END) {
        Some(rel) => Region::Span { start, end: search_from + rel + AUTOGEN_END.len() },
        None => Region::Unterminated,
    }
}

/// Merge `block` into a page.
///
/// `existing` is the current page text, or `None` when the page does not exist,
/// in which case `skeleton` becomes the new page. `block` is inserted verbatim.
pub fn synchronize(existing: Option<&str>, block: &str, skeleton: &str) -> SyncResult {
    debug_assert!(block.starts_with(AUTOGEN_START) && block.ends_with(AUTOGEN_END));

    match existing {
        None => SyncResult { text: skeleton.to_string(), action: SyncAction::Created },
        Some(text) => merge_block(text, block),
    }
}

/// Merge `block` into existing page text
pub fn merge_block(text: &str, block: &str) -> SyncResult {
    let (front_matter, body) = split_front_matter(text);

    match locate_region(body) {
        Region::Span { start, end } => {
            let mut out = String::with_capacity(text.len() + block.len());
            out.push_str(front_matter);
            out.push_str(&body[..start]);
            out.push_str(block);
            out.push_str(&body[end..]);

            let action = if out == text { SyncAction::Unchanged } else { SyncAction::Replaced };
            SyncResult { text: out, action }
        }
        Region::Unterminated => {
            SyncResult { text: text.to_string(), action: SyncAction::PartialMarkers }
        }
        Region::Absent => match find_directive(body) {
            Some(pos) => {
                let mut out = String::with_capacity(text.len() + block.len() + 2);
                out.push_str(front_matter);
                out.push_str(&body[..pos]);
                out.push_str(block);
                out.push_str("\n\n");
                out.push_str(&body[pos..]);
                SyncResult { text: out, action: SyncAction::InsertedBeforeDirective }
            }
            None => SyncResult {
                text: append_block(front_matter, body, block),
                action: SyncAction::Appended,
            },
        },
    }
}

/// First table-of-contents directive that starts a line
fn find_directive(body: &str) -> Option<usize> {
    body.match_indices(TOC_DIRECTIVE)
        .map(|(pos, _)| pos)
        .find(|&pos| pos == 0 || body[..pos].ends_with('\n'))
}

fn append_block(front_matter: &str, body: &str, block: &str) -> String {
    let head = body.trim_end();

    if head.is_empty() {
        if front_matter.is_empty() {
            return format!("{}\n", block);
        }
        return format!("{}\n\n{}\n", front_matter.trim_end_matches(['\r', '\n']), block);
    }

    format!("{}{}\n\n{}\n", front_matter, head, block)
}

/// Prepend default front matter titled `title` unless the text already has some
pub fn ensure_front_matter(text: &str, title: &str) -> String {
    let (front_matter, _) = split_front_matter(text);
    if front_matter.is_empty() {
        format!("{}{}", default_front_matter(title), text)
    } else {
        text.to_string()
    }
}
