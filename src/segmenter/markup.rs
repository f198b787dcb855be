//! Minimal view of a markup tree used by the segmenter.
//!
//! Segmentation only needs four things from a node: its tag, its classes, its
//! visible text and whether it sits inside another node. [`MarkupNode`] captures
//! exactly that; [`scraper::ElementRef`] implements it for parsed HTML.

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

/// Capability interface over a parsed element
pub trait MarkupNode {
    /// Lower-case tag name
    fn tag_name(&self) -> &str;

    /// Values of the `class` attribute
    fn classes(&self) -> Vec<&str>;

    /// Visible text, whitespace-collapsed and trimmed
    fn visible_text(&self) -> String;

    /// True when `self` lies strictly inside `ancestor`
    fn is_descendant_of(&self, ancestor: &Self) -> bool;
}

impl MarkupNode for ElementRef<'_> {
    fn tag_name(&self) -> &str {
        self.value().name()
    }

    fn classes(&self) -> Vec<&str> {
        self.value().classes().collect()
    }

    fn visible_text(&self) -> String {
        collapse_whitespace(self.text())
    }

    fn is_descendant_of(&self, ancestor: &Self) -> bool {
        let target = ancestor.id();
        self.ancestors().any(|node| node.id() == target)
    }
}

/// Join text pieces with single spaces, dropping runs of whitespace.
pub fn collapse_whitespace<'a, I>(pieces: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut out = String::new();
    for piece in pieces {
        for word in piece.split_whitespace() {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(word);
        }
    }
    out
}

/// Parse CSS selectors, skipping (and logging) the ones that do not parse.
pub fn parse_selectors(sources: &[String]) -> Vec<Selector> {
    sources
        .iter()
        .filter_map(|source| match Selector::parse(source) {
            Ok(selector) => Some(selector),
            Err(e) => {
                warn!("Failed to parse selector '{}': {}", source, e);
                None
            }
        })
        .collect()
}

/// Detach every element matching one of `selectors` from the document tree.
pub fn strip_regions(document: &mut Html, selectors: &[Selector]) {
    let ids: Vec<_> = selectors
        .iter()
        .flat_map(|selector| document.select(selector).map(|element| element.id()))
        .collect();

    debug!("Stripping {} boilerplate elements", ids.len());
    for id in ids {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }
}

/// The element further processing is restricted to: the first match of the
/// first content selector that matches anything, else the document root.
pub fn content_root<'a>(document: &'a Html, content_selectors: &[Selector]) -> ElementRef<'a> {
    content_selectors
        .iter()
        .find_map(|selector| document.select(selector).next())
        .unwrap_or_else(|| document.root_element())
}
