//! Find-in-tree using nucleo-matcher.

use nucleo_matcher::pattern::{AtomKind, CaseMatching, Normalization, Pattern};
use nucleo_matcher::{Config, Matcher, Utf32Str};

use crate::item::TreeItem;

/// A node whose label matched a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeMatch {
    /// Matched node id.
    pub id: String,
    /// Match score (higher is better).
    pub score: u32,
}

/// Fuzzy-match labels across the whole tree, collapsed subtrees included.
///
/// Returns matches sorted by score (highest first), ties in tree order.
/// An empty query matches nothing.
pub fn find_nodes<T: TreeItem>(roots: &[T], query: &str) -> Vec<NodeMatch> {
    if query.trim().is_empty() {
        return Vec::new();
    }

    let mut matcher = Matcher::new(Config::DEFAULT);
    let pattern = Pattern::new(
        query,
        CaseMatching::Ignore,
        Normalization::Smart,
        AtomKind::Fuzzy,
    );

    let mut matches = Vec::new();
    let mut buf = Vec::new();
    let mut stack: Vec<&T> = roots.iter().rev().collect();
    while let Some(item) = stack.pop() {
        let haystack = Utf32Str::new(item.label(), &mut buf);
        if let Some(score) = pattern.score(haystack, &mut matcher) {
            matches.push(NodeMatch {
                id: item.id().to_string(),
                score,
            });
        }
        stack.extend(item.children().iter().rev());
    }

    // Stable sort keeps tree order among equal scores
    matches.sort_by(|a, b| b.score.cmp(&a.score));
    matches
}
