//! # Block Segmenter
//!
//! Turns one page of raw HTML into an ordered list of [`ContentBlock`]s, each a
//! title with the content that follows it.
//!
//! ## Pipeline
//!
//! 1. Boilerplate regions (navigation, header, footer, sidebars, breadcrumbs,
//!    pagination, ads, scripts) are detached from the tree. When a main content
//!    container exists, only its subtree is considered.
//! 2. Headings, paragraphs, list items, `div`s and `span`s with visible text are
//!    collected in document order.
//! 3. The candidates are scanned from the end of the page towards the start.
//!    Every title found gathers the content elements that follow it, up to the
//!    next heading or `max_content_pieces` elements.
//! 4. Empty and exactly repeated blocks are skipped, and a block whose title
//!    element contains another block's title element is dropped.
//! 5. The survivors are put back in document order and run through the
//!    long/wrapper pass and the near-duplicate pass (see [`dedup`]).
//!
//! Pages without any title-like element yield no blocks.

mod dedup;
pub mod markup;

pub use dedup::{content_hash, similarity_ratio};
pub use markup::MarkupNode;

use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use dedup::{
    DraftBlock, SeenHashes, drop_containing_blocks, drop_long_and_wrapper_blocks,
    drop_near_duplicates,
};
use markup::{content_root, parse_selectors, strip_regions};

const CANDIDATE_TAGS: &str = "h1, h2, h3, h4, h5, h6, p, li, div, span";

/// A title with the content that belongs to it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentBlock {
    /// Heading or title-like text
    pub title: String,

    /// Space-joined text of the elements following the title
    pub content: String,
}

/// Tuning knobs for segmentation and deduplication
#[derive(Debug, Clone)]
pub struct SegmenterConfig {
    /// CSS selectors for regions removed before extraction
    pub exclude_selectors: Vec<String>,

    /// CSS selectors for the main content container, in priority order
    pub content_selectors: Vec<String>,

    /// Class keywords marking a non-heading element as a title
    pub title_keywords: Vec<String>,

    /// Longest text, in words, a class-marked element may have to count as a title
    pub max_title_words: usize,

    /// Content elements gathered per title
    pub max_content_pieces: usize,

    /// Blocks with longer content (in characters) are dropped
    pub max_block_chars: usize,

    /// How much longer a block must be than another to count as its wrapper
    pub wrapper_length_ratio: f32,

    /// Similarity above which a longer block counts as a wrapper
    pub wrapper_similarity: f32,

    /// Similarity above which a block duplicates an earlier one
    pub near_duplicate_similarity: f32,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        let strings = |list: &[&str]| list.iter().map(|s| s.to_string()).collect();
        Self {
            exclude_selectors: strings(&[
                "nav",
                "header",
                "footer",
                "aside",
                "script",
                "style",
                "noscript",
                ".navigation",
                ".navbar",
                ".menu",
                ".sidebar",
                "#sidebar",
                ".breadcrumb",
                ".breadcrumbs",
                ".pagination",
                ".pager",
                ".ads",
                ".advertisement",
                ".ad-banner",
            ]),
            content_selectors: strings(&[
                "main",
                "article",
                ".main-content",
                "#main-content",
                ".post-content",
                ".entry-content",
                ".article-content",
                ".content",
                "#content",
            ]),
            title_keywords: strings(&["title", "heading", "header", "caption", "subtitle"]),
            max_title_words: 10,
            max_content_pieces: 5,
            max_block_chars: 3000,
            wrapper_length_ratio: 1.2,
            wrapper_similarity: 0.95,
            near_duplicate_similarity: 0.9,
        }
    }
}

/// One element of the flat candidate sequence
#[derive(Debug, Clone)]
struct Candidate<N> {
    node: N,
    text: String,
    is_heading: bool,
    is_title: bool,
}

fn is_heading_tag(tag: &str) -> bool {
    matches!(tag, "h1" | "h2" | "h3" | "h4" | "h5" | "h6")
}

fn classify<N: MarkupNode>(node: N, config: &SegmenterConfig) -> Option<Candidate<N>> {
    let text = node.visible_text();
    if text.is_empty() {
        return None;
    }

    let is_heading = is_heading_tag(node.tag_name());
    let is_title = is_heading || {
        let marked = node.classes().iter().any(|class| {
            let class = class.to_ascii_lowercase();
            config
                .title_keywords
                .iter()
                .any(|keyword| class.contains(keyword.as_str()))
        });
        marked && text.split_whitespace().count() <= config.max_title_words
    };

    Some(Candidate {
        node,
        text,
        is_heading,
        is_title,
    })
}

/// Segment an already-collected candidate sequence (document order).
///
/// This is the parser-independent part of the pipeline.
pub fn segment_nodes<N, I>(nodes: I, config: &SegmenterConfig) -> Vec<ContentBlock>
where
    N: MarkupNode + Clone,
    I: IntoIterator<Item = N>,
{
    let candidates: Vec<Candidate<N>> = nodes
        .into_iter()
        .filter_map(|node| classify(node, config))
        .collect();

    let mut seen = SeenHashes::default();
    let mut drafts: Vec<DraftBlock<N>> = Vec::new();

    for (index, candidate) in candidates.iter().enumerate().rev() {
        if !candidate.is_title {
            continue;
        }

        let mut pieces: Vec<&str> = Vec::new();
        for following in &candidates[index + 1..] {
            if following.is_heading {
                break;
            }
            if following.is_title {
                continue;
            }
            pieces.push(&following.text);
            if pieces.len() >= config.max_content_pieces {
                break;
            }
        }

        let content = pieces.join(" ");
        if content.trim().is_empty() {
            continue;
        }
        if !seen.insert(&candidate.text, &content) {
            debug!("Skipping repeated block '{}'", candidate.text);
            continue;
        }

        drafts.push(DraftBlock {
            title: candidate.text.clone(),
            content,
            origin: candidate.node.clone(),
        });
    }

    let mut blocks: Vec<ContentBlock> = drop_containing_blocks(drafts)
        .into_iter()
        .map(ContentBlock::from)
        .collect();
    blocks.reverse();

    let blocks = drop_long_and_wrapper_blocks(blocks, config);
    drop_near_duplicates(blocks, config)
}

/// Extract the deduplicated content blocks of an HTML page
#[instrument(skip_all, fields(html_len = html.len()))]
pub fn extract_content_blocks(html: &str, config: &SegmenterConfig) -> Vec<ContentBlock> {
    let mut document = Html::parse_document(html);

    strip_regions(&mut document, &parse_selectors(&config.exclude_selectors));
    let content_selectors = parse_selectors(&config.content_selectors);
    let root = content_root(&document, &content_selectors);

    let Ok(candidate_selector) = Selector::parse(CANDIDATE_TAGS) else {
        return Vec::new();
    };
    let nodes: Vec<ElementRef<'_>> = root.select(&candidate_selector).collect();

    let blocks = segment_nodes(nodes, config);
    debug!("Extracted {} blocks", blocks.len());
    blocks
}
