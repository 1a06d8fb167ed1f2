// =============================================================================
// Bookmark Classification Module
// =============================================================================
//
// Places bookmarks into the fixed taxonomy:
// - PDFs: scraper flagged the url as a PDF document (checked before anything else)
// - Category > Subcategory: first subcategory whose keywords hit the text
// - Category root: no subcategory hit, but a category-level keyword did
// - unclassified: nothing hit, handed on to dynamic clustering
//
// Classification is plain substring matching in declaration order, not scoring.
// The first hit wins and the walk stops there.

use crate::models::{Bookmark, CategoryNode, CategoryTree, MetadataByUrl, MetadataRecord};
use crate::taxonomy::{Taxonomy, TaxonomyEntry, PDF_BUCKET};
use tracing::{debug, trace};

/// Where a single bookmark belongs in the taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement<'t> {
    Pdf,
    Subcategory { category: &'t str, subcategory: &'t str },
    Category(&'t str),
    Unclassified,
}

/// Output of a classification pass
#[derive(Debug, Clone, Default)]
pub struct Classification {
    /// Every taxonomy category (in order) plus "PDFs" when used. May contain empty nodes.
    pub tree: CategoryTree,
    pub unclassified: Vec<Bookmark>,
}

/// Lowercased text the taxonomy keywords are matched against:
/// url, page title (or bookmark title), description, keywords.
pub fn match_text(bookmark: &Bookmark, meta: &MetadataRecord) -> String {
    let title = meta.title().unwrap_or(&bookmark.title);
    format!(
        "{} {} {} {}",
        bookmark.url,
        title,
        meta.description(),
        meta.keywords()
    )
    .to_lowercase()
}

fn any_keyword(keywords: &[String], text: &str) -> bool {
    keywords.iter().any(|k| text.contains(k.as_str()))
}

/// Decide where one bookmark goes
pub fn place<'t>(taxonomy: &'t Taxonomy, bookmark: &Bookmark, meta: &MetadataRecord) -> Placement<'t> {
    // PDFs skip content-based matching entirely
    if meta.is_pdf {
        return Placement::Pdf;
    }

    let text = match_text(bookmark, meta);

    for TaxonomyEntry { name, keywords, subcategories } in taxonomy.entries() {
        // Subcategories are the strong match and take precedence
        if let Some(sub) = subcategories
            .iter()
            .find(|(_, kws)| any_keyword(kws, &text))
            .map(|(sub, _)| sub)
        {
            return Placement::Subcategory {
                category: name,
                subcategory: sub,
            };
        }

        if any_keyword(keywords, &text) {
            return Placement::Category(name);
        }
    }

    Placement::Unclassified
}

/// Classify every bookmark against the taxonomy.
///
/// Bookmarks keep their input order inside each node. The tree is seeded with
/// every category so top-level order follows the taxonomy; run the result
/// through `hierarchy::clean_tree` to drop the ones that stayed empty.
pub fn classify(taxonomy: &Taxonomy, bookmarks: &[Bookmark], metadata: &MetadataByUrl) -> Classification {
    let empty = MetadataRecord::default();
    let mut tree: CategoryTree = taxonomy
        .entries()
        .iter()
        .map(|e| (e.name.clone(), CategoryNode::new()))
        .collect();
    let mut unclassified = Vec::new();

    for bm in bookmarks {
        let meta = metadata.get(&bm.url).unwrap_or(&empty);
        let placement = place(taxonomy, bm, meta);
        trace!("[Classify] {} -> {:?}", bm.url, placement);

        match placement {
            Placement::Pdf => {
                tree.entry(PDF_BUCKET.to_string())
                    .or_default()
                    .items
                    .push(bm.clone());
            }
            Placement::Subcategory { category, subcategory } => {
                tree.entry(category.to_string())
                    .or_default()
                    .children
                    .entry(subcategory.to_string())
                    .or_default()
                    .items
                    .push(bm.clone());
            }
            Placement::Category(category) => {
                tree.entry(category.to_string())
                    .or_default()
                    .items
                    .push(bm.clone());
            }
            Placement::Unclassified => unclassified.push(bm.clone()),
        }
    }

    debug!(
        "[Classify] {} bookmarks: {} placed, {} unclassified",
        bookmarks.len(),
        bookmarks.len() - unclassified.len(),
        unclassified.len()
    );

    Classification { tree, unclassified }
}
