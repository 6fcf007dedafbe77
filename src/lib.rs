//! slides-rag - PDF 슬라이드 RAG 웹 서비스
//!
//! PDF 슬라이드 덱을 페이지 단위 노드로 Qdrant에 수집하고,
//! 질의 시 유사 노드를 검색하여 Gemini LLM으로 답변하는
//! 최소 RAG 시스템입니다.

pub mod cli;
pub mod embedding;
pub mod error;
pub mod extractor;
pub mod knowledge;
pub mod llm;
pub mod web;

// Re-exports
pub use embedding::{EmbeddingProvider, MiniLmEmbedding};
pub use error::{RagError, RagResult};
pub use knowledge::{
    Answer, Node, QdrantVectorStore, RagConfig, RagEngine, ScoredNode, VectorStore,
    COLLECTION_NAME, EMBEDDING_DIMENSION,
};
pub use llm::{get_api_key, has_api_key, GeminiLlm, LlmProvider};
pub use web::format::format_bold_text;
