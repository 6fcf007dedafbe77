//! Knowledge 모듈 - Qdrant 기반 RAG 지식 저장소
//!
//! - Qdrant: 노드(텍스트 + 384차원 벡터) 저장 및 코사인 유사도 검색
//! - Engine: 수집(ingest)과 질의(query) 오케스트레이션

mod engine;
mod qdrant;
mod vector;

// Re-exports
pub use engine::{Answer, RagConfig, RagEngine, COLLECTION_NAME};
pub use qdrant::QdrantVectorStore;
pub use vector::{Node, ScoredNode, VectorStore, EMBEDDING_DIMENSION};
