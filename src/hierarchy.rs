//! Category tree shaping
//!
//! Two steps sit on either side of dynamic clustering:
//! 1. `clean_tree` prunes branches that ended up with no bookmarks
//! 2. `merge` appends dynamic clusters and the "Uncategorized" bucket
//!    as top-level siblings of the taxonomy categories
//!
//! Both preserve the insertion order of the maps they are given.

use crate::models::{Bookmark, CategoryNode, CategoryTree, OutputTree};
use crate::taxonomy::{PDF_BUCKET, UNCATEGORIZED_BUCKET};
use tracing::debug;

/// Recursively drop nodes that have neither items nor (cleaned) children.
pub fn clean_tree(nodes: CategoryTree) -> CategoryTree {
    nodes
        .into_iter()
        .filter_map(|(name, node)| {
            let children = clean_tree(node.children);
            if node.items.is_empty() && children.is_empty() {
                None
            } else {
                Some((
                    name,
                    CategoryNode {
                        items: node.items,
                        children,
                    },
                ))
            }
        })
        .collect()
}

/// First name of `name`, `name (2)`, `name (3)`, ... not already taken.
fn disambiguate(name: &str, taken: impl Fn(&str) -> bool) -> String {
    if !taken(name) {
        return name.to_string();
    }
    (2..)
        .map(|n| format!("{} ({})", name, n))
        .find(|candidate| !taken(candidate))
        .unwrap_or_else(|| name.to_string())
}

/// Combine the cleaned taxonomy tree with dynamic clusters and leftovers.
///
/// A cluster whose name is already used at the top level (or is a reserved
/// bucket name) gets a numeric suffix, so no bookmark is ever overwritten.
pub fn merge(mut tree: CategoryTree, clusters: CategoryTree, remaining: Vec<Bookmark>) -> OutputTree {
    for (name, node) in clusters {
        let final_name = disambiguate(&name, |candidate| {
            tree.contains_key(candidate) || candidate == UNCATEGORIZED_BUCKET || candidate == PDF_BUCKET
        });
        if final_name != name {
            debug!("[Merge] cluster '{}' renamed to '{}'", name, final_name);
        }
        tree.insert(final_name, node);
    }

    if !remaining.is_empty() {
        tree.insert(UNCATEGORIZED_BUCKET.to_string(), CategoryNode::with_items(remaining));
    }

    tree
}

/// Number of bookmarks placed anywhere in the tree.
pub fn count_items(tree: &CategoryTree) -> usize {
    tree.values().map(CategoryNode::total_items).sum()
}

/// True when no node at any depth is empty.
pub fn is_clean(tree: &CategoryTree) -> bool {
    tree.values().all(|node| !node.is_empty() && is_clean(&node.children))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bm(id: u64) -> Bookmark {
        Bookmark::new(id, format!("b{}", id), format!("https://b{}.io", id))
    }

    fn sample_tree() -> CategoryTree {
        let mut tree = CategoryTree::new();

        let mut dev = CategoryNode::new();
        dev.children.insert("Frontend".into(), CategoryNode::with_items(vec![bm(0)]));
        dev.children.insert("Backend".into(), CategoryNode::new());
        tree.insert("Development".into(), dev);

        tree.insert("Media".into(), CategoryNode::new());

        // only an empty grandchild below
        let mut news = CategoryNode::new();
        news.children.insert("Reference".into(), CategoryNode::new());
        tree.insert("News".into(), news);

        tree.insert("Shopping".into(), CategoryNode::with_items(vec![bm(1)]));
        tree
    }

    #[test]
    fn test_clean_tree_drops_empty_branches() {
        let cleaned = clean_tree(sample_tree());

        let keys: Vec<&str> = cleaned.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["Development", "Shopping"]);

        let dev_children: Vec<&str> = cleaned["Development"].children.keys().map(|k| k.as_str()).collect();
        assert_eq!(dev_children, vec!["Frontend"]);
        assert!(is_clean(&cleaned));
    }

    #[test]
    fn test_clean_tree_idempotent() {
        let once = clean_tree(sample_tree());
        let twice = clean_tree(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_clean_tree_keeps_item_count() {
        let tree = sample_tree();
        let before = count_items(&tree);
        assert_eq!(count_items(&clean_tree(tree)), before);
    }

    #[test]
    fn test_merge_appends_clusters_and_uncategorized() {
        let tree = clean_tree(sample_tree());
        let mut clusters = CategoryTree::new();
        clusters.insert("Recipe".into(), CategoryNode::with_items(vec![bm(2), bm(3)]));

        let out = merge(tree, clusters, vec![bm(4)]);

        let keys: Vec<&str> = out.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["Development", "Shopping", "Recipe", UNCATEGORIZED_BUCKET]);
        assert_eq!(out[UNCATEGORIZED_BUCKET].items, vec![bm(4)]);
        assert!(out[UNCATEGORIZED_BUCKET].children.is_empty());
        assert_eq!(count_items(&out), 5);
    }

    #[test]
    fn test_merge_without_remaining_has_no_uncategorized() {
        let out = merge(clean_tree(sample_tree()), CategoryTree::new(), vec![]);
        assert!(!out.contains_key(UNCATEGORIZED_BUCKET));
    }

    #[test]
    fn test_merge_disambiguates_colliding_cluster() {
        let tree = clean_tree(sample_tree());
        let mut clusters = CategoryTree::new();
        clusters.insert("Shopping".into(), CategoryNode::with_items(vec![bm(2), bm(3)]));
        clusters.insert("Uncategorized".into(), CategoryNode::with_items(vec![bm(5), bm(6)]));

        let out = merge(tree, clusters, vec![bm(4)]);

        assert_eq!(out["Shopping"].items, vec![bm(1)]);
        assert_eq!(out["Shopping (2)"].items, vec![bm(2), bm(3)]);
        assert_eq!(out["Uncategorized (2)"].items, vec![bm(5), bm(6)]);
        assert_eq!(out[UNCATEGORIZED_BUCKET].items, vec![bm(4)]);
        assert_eq!(count_items(&out), 7);
    }

    #[test]
    fn test_disambiguate_skips_taken_suffixes() {
        let taken = ["Recipe", "Recipe (2)"];
        assert_eq!(disambiguate("Recipe", |c| taken.contains(&c)), "Recipe (3)");
        assert_eq!(disambiguate("Pasta", |c| taken.contains(&c)), "Pasta");
    }
}
