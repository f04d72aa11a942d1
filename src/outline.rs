//! Table-of-contents extraction.
//!
//! Headings are found by running the markdown body through `pulldown-cmark`
//! rather than matching `#` prefixes line by line, so headings inside fenced
//! code blocks are ignored and setext (`===` / `---` underlined) headings are
//! recognized. Heading text is the rendered text: emphasis markers, link
//! targets and inline-code backticks are dropped.
//!
//! Every heading from level 1 to `max_level` (default 4) becomes an
//! [`OutlineNode`] in document order. Level-1 headings are kept here;
//! [`DocumentView::navigation`](crate::types::DocumentView::navigation) is
//! where they are left out.
//!
//! ## Anchor Slugs
//!
//! [`slugify`] lowercases, drops everything that is not a word character,
//! whitespace or `-`, turns whitespace runs into a single `-` and collapses
//! repeated dashes. Two headings with the same text get the same slug unless
//! [`OutlineOptions::dedupe_slugs`] is on, in which case later occurrences
//! are suffixed `-1`, `-2`, ...

use crate::config::OutlineConfig;
use crate::types::OutlineNode;
use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use std::collections::HashMap;
use tracing::debug;

/// Knobs for [`build_outline`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutlineOptions {
    pub max_level: u8,
    pub dedupe_slugs: bool,
}

impl Default for OutlineOptions {
    fn default() -> Self {
        Self {
            max_level: 4,
            dedupe_slugs: false,
        }
    }
}

impl From<&OutlineConfig> for OutlineOptions {
    fn from(config: &OutlineConfig) -> Self {
        Self {
            max_level: config.max_level,
            dedupe_slugs: config.dedupe_slugs,
        }
    }
}

struct OpenHeading {
    level: u8,
    id: Option<String>,
    text: String,
}

/// Extract the heading outline of a markdown body.
pub fn build_outline(body: &str, options: &OutlineOptions) -> Vec<OutlineNode> {
    let mut options_md = Options::empty();
    options_md.insert(Options::ENABLE_TABLES);
    options_md.insert(Options::ENABLE_STRIKETHROUGH);
    options_md.insert(Options::ENABLE_FOOTNOTES);
    options_md.insert(Options::ENABLE_HEADING_ATTRIBUTES);

    let mut nodes = Vec::new();
    let mut current: Option<OpenHeading> = None;

    for event in Parser::new_ext(body, options_md) {
        match event {
            Event::Start(Tag::Heading { level, id, .. }) => {
                current = Some(OpenHeading {
                    level: heading_depth(level),
                    id: id.map(|id| id.to_string()),
                    text: String::new(),
                });
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some(heading) = current.take() {
                    let text = collapse_whitespace(&heading.text);
                    if heading.level <= options.max_level && !text.is_empty() {
                        // An explicit `{#id}` is the anchor the renderer will emit
                        let slug = heading.id.unwrap_or_else(|| slugify(&text));
                        nodes.push(OutlineNode {
                            level: heading.level,
                            text,
                            slug,
                        });
                    }
                }
            }
            Event::Text(t) | Event::Code(t) => {
                if let Some(heading) = current.as_mut() {
                    heading.text.push_str(&t);
                }
            }
            Event::SoftBreak | Event::HardBreak => {
                if let Some(heading) = current.as_mut() {
                    heading.text.push(' ');
                }
            }
            _ => {}
        }
    }

    report_collisions(&nodes);
    if options.dedupe_slugs {
        dedupe(&mut nodes);
    }
    nodes
}

fn heading_depth(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Turn heading text into an anchor slug.
///
/// ```
/// use folio::outline::slugify;
/// assert_eq!(slugify("Hello, World!"), "hello-world");
/// assert_eq!(slugify("  multiple   spaces "), "multiple-spaces");
/// ```
pub fn slugify(text: &str) -> String {
    let lowered = text.trim().to_lowercase();

    let mut slug = String::with_capacity(lowered.len());
    let mut pending_dash = false;
    for c in lowered.chars() {
        if c.is_whitespace() || c == '-' {
            pending_dash = true;
        } else if c.is_alphanumeric() || c == '_' {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        }
        // anything else is dropped without breaking the current word
    }
    slug
}

fn report_collisions(nodes: &[OutlineNode]) {
    for (slug, count) in colliding_slugs(nodes) {
        debug!(slug, count, "outline headings share an anchor slug");
    }
}

/// Slugs used more than once, with their counts, in order of first use.
fn colliding_slugs(nodes: &[OutlineNode]) -> Vec<(&str, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for node in nodes {
        *counts.entry(node.slug.as_str()).or_default() += 1;
    }
    let mut reported = Vec::new();
    for node in nodes {
        let slug = node.slug.as_str();
        if let Some(count) = counts.remove(slug).filter(|n| *n > 1) {
            reported.push((slug, count));
        }
    }
    reported
}

/// Suffix the second and later occurrences of a slug with `-1`, `-2`, ...
///
/// A suffixed slug that itself collides with a heading's natural slug keeps
/// counting up until it is unique.
fn dedupe(nodes: &mut [OutlineNode]) {
    let mut taken: HashMap<String, usize> = HashMap::new();
    for node in nodes.iter_mut() {
        let base = node.slug.clone();
        match taken.get(&base).copied() {
            None => {
                taken.insert(base, 0);
            }
            Some(mut n) => {
                let unique = loop {
                    n += 1;
                    let candidate = format!("{base}-{n}");
                    if !taken.contains_key(&candidate) {
                        break candidate;
                    }
                };
                taken.insert(base, n);
                taken.insert(unique.clone(), 0);
                node.slug = unique;
            }
        }
    }
}
