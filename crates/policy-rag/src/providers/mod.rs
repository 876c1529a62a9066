//! Provider abstractions for embeddings, generation, and the vector index
//!
//! These traits are the seams to the external collaborators: the embedding
//! service, the text generator, and the vector index. Everything behind them
//! is replaceable without touching the core.

pub mod embedding;
pub mod llm;
pub mod local;
pub mod openai;
pub mod vector_index;

pub use embedding::EmbeddingProvider;
pub use llm::LlmProvider;
pub use local::LocalVectorIndex;
pub use openai::OpenAiClient;
pub use vector_index::{IndexHit, VectorIndexProvider};
