//! Dynamic clustering for bookmarks the taxonomy could not place
//!
//! Document-frequency keyword grouping:
//! - Each bookmark becomes a bag of words (title, keywords, description,
//!   scraped content, url path pieces), deduplicated per bookmark
//! - Every surviving token that at least two bookmarks share is a candidate
//! - Candidates are ranked by how many bookmarks share them (ties: token order)
//!   and claimed greedily, so each bookmark ends up in at most one cluster
//!
//! Whatever no cluster claims is returned as `remaining`.

use crate::models::{Bookmark, CategoryNode, CategoryTree, MetadataByUrl, MetadataRecord};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::{debug, trace};

/// A cluster needs at least this many bookmarks
pub const MIN_CLUSTER_SIZE: usize = 2;

/// Tokens must be longer than this
const MIN_TOKEN_LEN: usize = 3;

/// Stop words to filter out (function words plus web page boilerplate)
const STOP_WORDS: &[&str] = &[
    "the", "be", "to", "of", "and", "a", "in", "that", "have", "i", "it", "for", "not", "on",
    "with", "he", "as", "you", "do", "at", "this", "but", "his", "by", "from", "they", "we",
    "say", "her", "she", "or", "an", "will", "my", "one", "all", "would", "there", "their",
    "what", "so", "up", "out", "if", "about", "who", "get", "which", "go", "me", "when",
    "make", "can", "like", "time", "no", "just", "him", "know", "take", "people", "into",
    "year", "your", "good", "some", "could", "them", "see", "other", "than", "then", "now",
    "look", "only", "come", "its", "over", "think", "also", "back", "after", "use", "two",
    "how", "our", "work", "first", "well", "way", "even", "new", "want", "because", "any",
    "these", "give", "day", "most", "us", "is", "are", "was", "were", "has", "had", "been",
    "home", "page", "site", "website", "click", "content", "link", "copyright", "search",
    "login", "sign", "privacy", "terms", "cookies",
];

/// Result of clustering the leftovers
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DynamicClusters {
    /// Cluster name -> node (items only, no children), in ranking order
    pub clusters: CategoryTree,
    /// Bookmarks no cluster claimed, in input order
    pub remaining: Vec<Bookmark>,
}

/// Capitalize first letter
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

/// Path-ish pieces of a url: split on `/ - _ .`, keep pieces longer than three
/// characters that are not scheme or `www` noise. Never fails, whatever the url.
fn url_tokens(url: &str) -> Vec<&str> {
    url.split(['/', '-', '_', '.'])
        .filter(|w| w.chars().count() > 3 && !w.contains("http") && !w.contains("www"))
        .collect()
}

/// Weighted bag of words for one bookmark, lowercased.
/// Weight: title (3x) > keywords (2x) > description = content = url pieces.
fn bag_of_words(bookmark: &Bookmark, meta: &MetadataRecord) -> String {
    let title = meta.title().unwrap_or(&bookmark.title);
    let keywords = meta.keywords();
    let url_part = url_tokens(&bookmark.url).join(" ");

    // Repeats are space-separated so "lemon recipe" x3 never fuses into "recipelemon"
    [
        title,
        title,
        title,
        keywords,
        keywords,
        meta.description(),
        meta.full_content(),
        url_part.as_str(),
    ]
    .join(" ")
    .to_lowercase()
}

/// Distinct tokens of a text: strip everything but `[a-z0-9]` and whitespace,
/// split on whitespace, drop short words and stop words.
fn tokenize(text: &str, stop_set: &HashSet<&str>) -> BTreeSet<String> {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace())
        .collect();

    cleaned
        .split_whitespace()
        .filter(|t| t.len() > MIN_TOKEN_LEN && !stop_set.contains(t))
        .map(str::to_string)
        .collect()
}

/// Token -> indices of the bookmarks containing it (document frequency, not term frequency).
fn document_frequencies(bookmarks: &[Bookmark], metadata: &MetadataByUrl) -> BTreeMap<String, Vec<usize>> {
    let stop_set: HashSet<&str> = STOP_WORDS.iter().copied().collect();
    let empty = MetadataRecord::default();
    let mut terms: BTreeMap<String, Vec<usize>> = BTreeMap::new();

    for (idx, bm) in bookmarks.iter().enumerate() {
        let meta = metadata.get(&bm.url).unwrap_or(&empty);
        for token in tokenize(&bag_of_words(bm, meta), &stop_set) {
            terms.entry(token).or_default().push(idx);
        }
    }

    terms
}

/// Tokens shared by at least `MIN_CLUSTER_SIZE` bookmarks, most shared first.
/// Equal counts are ordered by the token itself so the ranking is reproducible.
fn rank_candidates(terms: BTreeMap<String, Vec<usize>>) -> Vec<(String, Vec<usize>)> {
    let mut candidates: Vec<(String, Vec<usize>)> = terms
        .into_iter()
        .filter(|(_, docs)| docs.len() >= MIN_CLUSTER_SIZE)
        .collect();

    candidates.sort_by(|a, b| b.1.len().cmp(&a.1.len()).then_with(|| a.0.cmp(&b.0)));
    candidates
}

/// Group unclassified bookmarks by shared vocabulary.
///
/// With fewer than `MIN_CLUSTER_SIZE` bookmarks there is nothing to group and
/// the input comes back unchanged as `remaining`.
pub fn cluster(unclassified: &[Bookmark], metadata: &MetadataByUrl) -> DynamicClusters {
    if unclassified.len() < MIN_CLUSTER_SIZE {
        return DynamicClusters {
            clusters: CategoryTree::new(),
            remaining: unclassified.to_vec(),
        };
    }

    let candidates = rank_candidates(document_frequencies(unclassified, metadata));
    let candidate_count = candidates.len();

    // Claims are tracked by position, so duplicate ids can never drop a bookmark
    let mut claimed = vec![false; unclassified.len()];
    let mut clusters = CategoryTree::new();

    for (term, docs) in candidates {
        let unassigned: Vec<usize> = docs.into_iter().filter(|&i| !claimed[i]).collect();
        if unassigned.len() < MIN_CLUSTER_SIZE {
            continue;
        }

        trace!("[Cluster] '{}' claims {} bookmarks", term, unassigned.len());
        let items = unassigned
            .iter()
            .map(|&i| {
                claimed[i] = true;
                unclassified[i].clone()
            })
            .collect();
        clusters.insert(capitalize(&term), CategoryNode::with_items(items));
    }

    let remaining: Vec<Bookmark> = unclassified
        .iter()
        .zip(&claimed)
        .filter(|(_, was_claimed)| !**was_claimed)
        .map(|(bm, _)| bm.clone())
        .collect();

    debug!(
        "[Cluster] {} bookmarks, {} candidate terms -> {} clusters, {} remaining",
        unclassified.len(),
        candidate_count,
        clusters.len(),
        remaining.len()
    );

    DynamicClusters { clusters, remaining }
}
