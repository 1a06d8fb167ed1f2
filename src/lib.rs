pub mod classification;
pub mod clustering;
pub mod error;
pub mod hierarchy;
pub mod http_server;
pub mod models;
pub mod pipeline;
pub mod settings;
pub mod taxonomy;

pub use error::{Error, Result};
pub use models::{Bookmark, CategorizeRequest, CategorizeResponse, CategoryNode, MetadataRecord, OutputTree};
pub use pipeline::{categorize, categorize_with_summary, RunSummary};
pub use taxonomy::Taxonomy;
