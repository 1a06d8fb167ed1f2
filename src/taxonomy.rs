//! Fixed keyword taxonomy (Category > Subcategory > Keywords)
//!
//! The table is ordered: categories, subcategories and keywords are evaluated
//! in exactly the order they are declared, and the first hit wins. A taxonomy
//! is built once at startup (built-in or loaded from JSON) and then only read.

use crate::error::{read_json, Error, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Top-level bucket for documents flagged as PDF by the scraper.
pub const PDF_BUCKET: &str = "PDFs";

/// Top-level bucket for bookmarks neither the taxonomy nor clustering could place.
pub const UNCATEGORIZED_BUCKET: &str = "Uncategorized";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaxonomyEntry {
    pub name: String,
    /// Loose, category-level triggers. Only consulted when no subcategory matched.
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub subcategories: IndexMap<String, Vec<String>>,
}

impl TaxonomyEntry {
    fn new(name: &str, keywords: &[&str], subcategories: &[(&str, &[&str])]) -> Self {
        Self {
            name: name.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            subcategories: subcategories
                .iter()
                .map(|(sub, kws)| (sub.to_string(), kws.iter().map(|k| k.to_string()).collect()))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(transparent)]
pub struct Taxonomy {
    entries: Vec<TaxonomyEntry>,
}

impl Taxonomy {
    /// Validate and normalize a list of entries. Keywords are trimmed and lowercased
    /// since matching runs against lowercased text.
    pub fn new(entries: Vec<TaxonomyEntry>) -> Result<Self> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut normalized = Vec::with_capacity(entries.len());

        for entry in entries {
            let name = entry.name.trim().to_string();
            if name.is_empty() {
                return Err(Error::InvalidTaxonomy("category with empty name".into()));
            }
            if name == PDF_BUCKET || name == UNCATEGORIZED_BUCKET {
                return Err(Error::InvalidTaxonomy(format!(
                    "'{}' is a reserved bucket name",
                    name
                )));
            }
            if !seen.insert(name.clone()) {
                return Err(Error::InvalidTaxonomy(format!("duplicate category '{}'", name)));
            }

            let keywords = normalize_keywords(&name, entry.keywords)?;
            let mut subcategories = IndexMap::with_capacity(entry.subcategories.len());
            for (sub, kws) in entry.subcategories {
                let sub = sub.trim().to_string();
                if sub.is_empty() {
                    return Err(Error::InvalidTaxonomy(format!(
                        "subcategory with empty name under '{}'",
                        name
                    )));
                }
                let kws = normalize_keywords(&format!("{} > {}", name, sub), kws)?;
                subcategories.insert(sub, kws);
            }

            normalized.push(TaxonomyEntry {
                name,
                keywords,
                subcategories,
            });
        }

        Ok(Self { entries: normalized })
    }

    /// Load a taxonomy from a JSON array of entries.
    pub fn from_file(path: &Path) -> Result<Self> {
        let entries: Vec<TaxonomyEntry> = read_json(path)?;
        Self::new(entries)
    }

    /// Taxonomy from `path`, or the built-in table when none is configured.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::from_file(p),
            None => Ok(Self::builtin()),
        }
    }

    /// The default five-category table.
    pub fn builtin() -> Self {
        let entries = vec![
            TaxonomyEntry::new(
                "Development",
                &["github", "stackoverflow", "code", "developer", "programming", "docs", "api", "sdk"],
                &[
                    ("Frontend", &["react", "css", "html", "vue", "angular", "bootstrap", "tailwind", "ui", "ux"]),
                    ("Backend", &["node", "express", "django", "flask", "sql", "database", "redis", "mongo", "auth"]),
                    ("DevOps", &["docker", "kubernetes", "aws", "cloud", "server", "linux", "bash"]),
                    ("AI & ML", &["openai", "gpt", "llm", "machine learning", "pytorch", "tensorflow", "model"]),
                ],
            ),
            TaxonomyEntry::new(
                "Media",
                &["video", "music", "streaming", "watch", "listen", "player"],
                &[
                    ("Video", &["youtube", "netflix", "vimeo", "movie", "film"]),
                    ("Music", &["spotify", "soundcloud", "apple music", "bandcamp", "song", "artist"]),
                    ("Gaming", &["twitch", "steam", "game", "discord", "play"]),
                ],
            ),
            TaxonomyEntry::new(
                "News & Reading",
                &["news", "article", "blog", "read", "paper", "journal"],
                &[
                    ("Tech News", &["ycombinator", "hackernews", "techcrunch", "wired", "verge"]),
                    ("World News", &["cnn", "bbc", "nytimes", "reuters", "world"]),
                    ("Reference", &["wikipedia", "wiki", "dictionary"]),
                ],
            ),
            TaxonomyEntry::new(
                "Social",
                &["social", "network", "connect", "community", "profile"],
                &[
                    ("Networks", &["twitter", "facebook", "instagram", "linkedin", "reddit", "bsky"]),
                    ("Messaging", &["whatsapp", "telegram", "messenger", "slack"]),
                ],
            ),
            TaxonomyEntry::new(
                "Shopping",
                &["shop", "store", "buy", "price", "cart", "sale"],
                &[
                    ("Marketplaces", &["amazon", "ebay", "aliexpress", "etsy"]),
                    ("Tech", &["bestbuy", "newegg", "apple store"]),
                ],
            ),
        ];
        Self { entries }
    }

    pub fn entries(&self) -> &[TaxonomyEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn normalize_keywords(owner: &str, keywords: Vec<String>) -> Result<Vec<String>> {
    keywords
        .into_iter()
        .map(|k| {
            let k = k.trim().to_lowercase();
            if k.is_empty() {
                Err(Error::InvalidTaxonomy(format!("empty keyword in '{}'", owner)))
            } else {
                Ok(k)
            }
        })
        .collect()
}
