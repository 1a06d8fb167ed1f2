use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// Bookmark identifier as handed over by the parser: integer index or opaque string.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum BookmarkId {
    Int(u64),
    Str(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    pub id: BookmarkId,
    #[serde(default, deserialize_with = "deserialize_null_as_empty")]
    pub title: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_folder: Option<String>,
    // Raw ADD_DATE attribute (epoch seconds), passed through as text
    #[serde(
        default,
        deserialize_with = "deserialize_add_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub add_date: Option<String>,
}

fn deserialize_null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Parsers emit ADD_DATE either as the raw attribute string or as a number.
fn deserialize_add_date<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawDate {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(Option::<RawDate>::deserialize(deserializer)?.map(|raw| match raw {
        RawDate::Text(s) => s,
        RawDate::Int(n) => n.to_string(),
        RawDate::Float(f) => f.to_string(),
    }))
}

impl Bookmark {
    pub fn new(id: u64, title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: BookmarkId::Int(id),
            title: title.into(),
            url: url.into(),
            original_folder: None,
            add_date: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LinkStatus {
    #[default]
    Alive,
    Dead,
}

/// Scraped page metadata for one url. Every field may be missing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct MetadataRecord {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub keywords: Option<String>,
    #[serde(default)]
    pub full_content: Option<String>,
    #[serde(default)]
    pub is_pdf: bool,
    #[serde(default)]
    pub status: LinkStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MetadataRecord {
    pub fn title(&self) -> Option<&str> {
        non_empty(&self.title)
    }

    pub fn description(&self) -> &str {
        non_empty(&self.description).unwrap_or("")
    }

    pub fn keywords(&self) -> &str {
        non_empty(&self.keywords).unwrap_or("")
    }

    pub fn full_content(&self) -> &str {
        non_empty(&self.full_content).unwrap_or("")
    }
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

pub type MetadataByUrl = HashMap<String, MetadataRecord>;

/// One folder of the output tree: bookmarks placed directly here plus named subfolders.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CategoryNode {
    pub items: Vec<Bookmark>,
    pub children: IndexMap<String, CategoryNode>,
}

impl CategoryNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(items: Vec<Bookmark>) -> Self {
        Self {
            items,
            children: IndexMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.children.is_empty()
    }

    /// Bookmarks in this node and every descendant.
    pub fn total_items(&self) -> usize {
        self.items.len() + self.children.values().map(CategoryNode::total_items).sum::<usize>()
    }

    /// Depth-first walk over every bookmark below this node, parents before children.
    #[cfg(test)]
    pub(crate) fn for_each_item<'a>(&'a self, f: &mut impl FnMut(&'a Bookmark)) {
        for item in &self.items {
            f(item);
        }
        for child in self.children.values() {
            child.for_each_item(f);
        }
    }
}

/// Name-keyed, insertion-ordered forest of category nodes.
pub type CategoryTree = IndexMap<String, CategoryNode>;

/// Final top-level structure handed to the exporter.
pub type OutputTree = CategoryTree;

/// Input of the single public entry point.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CategorizeRequest {
    pub bookmarks: Vec<Bookmark>,
    #[serde(default, alias = "metadata")]
    pub metadata_by_url: MetadataByUrl,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategorizeResponse {
    pub categories: OutputTree,
}
