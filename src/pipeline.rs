//! End-to-end categorization.
//!
//! Shared by the CLI and the HTTP server so neither duplicates the wiring:
//! classify -> clean taxonomy tree, cluster leftovers -> merge.

use crate::classification::{classify, Classification};
use crate::clustering::{cluster, DynamicClusters};
use crate::hierarchy::{clean_tree, is_clean, merge};
use crate::models::{CategorizeRequest, CategorizeResponse, OutputTree};
use crate::taxonomy::{Taxonomy, PDF_BUCKET, UNCATEGORIZED_BUCKET};
use serde::Serialize;
use std::time::Instant;
use tracing::info;

// ============================================================================
// Public types
// ============================================================================

/// Where the bookmarks of one run ended up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub total: usize,
    pub pdfs: usize,
    /// Placed by taxonomy keywords (excluding PDFs)
    pub classified: usize,
    /// Placed in a dynamic cluster
    pub clustered: usize,
    pub clusters: usize,
    pub uncategorized: usize,
}

// ============================================================================
// Entry points
// ============================================================================

/// Turn a flat bookmark snapshot into the categorized output tree.
pub fn categorize(taxonomy: &Taxonomy, request: &CategorizeRequest) -> CategorizeResponse {
    categorize_with_summary(taxonomy, request).0
}

/// Same as `categorize`, plus per-stage counts.
pub fn categorize_with_summary(
    taxonomy: &Taxonomy,
    request: &CategorizeRequest,
) -> (CategorizeResponse, RunSummary) {
    let start = Instant::now();
    let metadata = &request.metadata_by_url;

    let Classification { tree, unclassified } = classify(taxonomy, &request.bookmarks, metadata);
    let cleaned = clean_tree(tree);
    let DynamicClusters { clusters, remaining } = cluster(&unclassified, metadata);

    let pdfs = cleaned.get(PDF_BUCKET).map_or(0, |n| n.total_items());
    let summary = RunSummary {
        total: request.bookmarks.len(),
        pdfs,
        classified: request.bookmarks.len() - unclassified.len() - pdfs,
        clustered: unclassified.len() - remaining.len(),
        clusters: clusters.len(),
        uncategorized: remaining.len(),
    };

    let categories: OutputTree = merge(cleaned, clusters, remaining);

    info!(
        "[Pipeline] {} bookmarks in {:.1}ms: {} classified, {} PDFs, {} in {} clusters, {} uncategorized",
        summary.total,
        start.elapsed().as_secs_f64() * 1000.0,
        summary.classified,
        summary.pdfs,
        summary.clustered,
        summary.clusters,
        summary.uncategorized
    );
    debug_assert_eq!(
        categories.get(UNCATEGORIZED_BUCKET).map_or(0, |n| n.items.len()),
        summary.uncategorized
    );
    debug_assert!(is_clean(&categories));

    (CategorizeResponse { categories }, summary)
}
