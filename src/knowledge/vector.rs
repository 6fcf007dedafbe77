//! Vector Store - 벡터 검색 트레이트 및 타입
//!
//! Qdrant 컬렉션에 저장되는 노드와 검색 인터페이스를 정의합니다.

use anyhow::Result;
use async_trait::async_trait;

/// 벡터 임베딩 차원 (all-MiniLM-L6-v2)
pub const EMBEDDING_DIMENSION: u64 = 384;

// ============================================================================
// Types
// ============================================================================

/// 노드 - 텍스트 청크와 임베딩 벡터 쌍 (저장용)
#[derive(Debug, Clone)]
pub struct Node {
    /// 청크 텍스트 (PDF 한 페이지)
    pub text: String,
    /// 임베딩 벡터
    pub embedding: Vec<f32>,
}

/// 검색 결과 노드
#[derive(Debug, Clone)]
pub struct ScoredNode {
    /// 청크 텍스트
    pub text: String,
    /// 유사도 스코어 (코사인)
    pub score: f32,
}

// ============================================================================
// VectorStore Trait
// ============================================================================

/// VectorStore 트레이트 (async)
///
/// 벡터 저장소의 공통 인터페이스입니다.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// 노드 배치 삽입 (삽입된 개수 반환)
    async fn insert_batch(&self, nodes: &[Node]) -> Result<usize>;

    /// 유사 노드 검색 (스코어 내림차순)
    async fn search(&self, query_embedding: &[f32], limit: u64) -> Result<Vec<ScoredNode>>;

    /// 저장된 노드 개수
    async fn count(&self) -> Result<usize>;
}
