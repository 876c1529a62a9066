//! Retrieval: multi-query search over the active document

pub mod section;

pub use section::{section_queries, SectionRetriever};
