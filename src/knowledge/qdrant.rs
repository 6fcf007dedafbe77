//! Qdrant Vector Store - 외부 벡터 DB 서비스 연동
//!
//! gRPC 클라이언트로 Qdrant 컬렉션에 노드를 저장하고
//! 코사인 유사도 검색을 수행합니다.
//! ref: https://qdrant.tech/documentation/

use anyhow::{Context, Result};
use async_trait::async_trait;
use qdrant_client::qdrant::{
    CreateCollectionBuilder, Distance, PointStruct, SearchPointsBuilder, UpsertPointsBuilder,
    VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant};
use uuid::Uuid;

use super::vector::{Node, ScoredNode, VectorStore, EMBEDDING_DIMENSION};

// ============================================================================
// QdrantVectorStore
// ============================================================================

/// Qdrant 벡터 저장소 구현
pub struct QdrantVectorStore {
    client: Qdrant,
    collection: String,
}

impl QdrantVectorStore {
    /// Qdrant에 연결하고 컬렉션을 보장
    ///
    /// 컬렉션이 없으면 고정 차원(384) + 코사인 거리로 생성합니다.
    ///
    /// # Arguments
    /// * `url` - Qdrant gRPC 엔드포인트 (예: http://localhost:6333)
    /// * `collection` - 컬렉션 이름
    pub async fn connect(url: &str, collection: &str) -> Result<Self> {
        let client = Qdrant::from_url(url)
            .build()
            .context("Failed to create Qdrant client")?;

        let store = Self {
            client,
            collection: collection.to_string(),
        };

        store.create_collection_if_missing().await?;

        Ok(store)
    }

    /// 컬렉션이 없으면 생성
    async fn create_collection_if_missing(&self) -> Result<()> {
        let exists = self
            .client
            .collection_exists(&self.collection)
            .await
            .context("Failed to check collection existence")?;

        if exists {
            tracing::debug!("Collection '{}' already exists", self.collection);
            return Ok(());
        }

        tracing::info!("Creating collection: {}", self.collection);

        self.client
            .create_collection(
                CreateCollectionBuilder::new(&self.collection).vectors_config(
                    VectorParamsBuilder::new(EMBEDDING_DIMENSION, Distance::Cosine),
                ),
            )
            .await
            .context("Failed to create collection")?;

        Ok(())
    }
}

/// 노드들을 Qdrant 포인트로 변환
///
/// 포인트 ID는 매번 새 UUIDv4, 청크 텍스트는 "text" 페이로드로 저장됩니다.
fn nodes_to_points(nodes: &[Node]) -> Vec<PointStruct> {
    nodes
        .iter()
        .map(|node| {
            let mut payload = Payload::new();
            payload.insert("text", node.text.clone());
            PointStruct::new(
                Uuid::new_v4().to_string(),
                node.embedding.clone(),
                payload,
            )
        })
        .collect()
}

#[async_trait]
impl VectorStore for QdrantVectorStore {
    async fn insert_batch(&self, nodes: &[Node]) -> Result<usize> {
        if nodes.is_empty() {
            return Ok(0);
        }

        let points = nodes_to_points(nodes);

        self.client
            .upsert_points(UpsertPointsBuilder::new(&self.collection, points))
            .await
            .context("Failed to upsert points")?;

        Ok(nodes.len())
    }

    async fn search(&self, query_embedding: &[f32], limit: u64) -> Result<Vec<ScoredNode>> {
        let response = self
            .client
            .search_points(
                SearchPointsBuilder::new(&self.collection, query_embedding.to_vec(), limit)
                    .with_payload(true),
            )
            .await
            .context("Failed to search points")?;

        Ok(response
            .result
            .into_iter()
            .map(|point| {
                let text = point
                    .payload
                    .get("text")
                    .and_then(|v| v.as_str())
                    .map(String::as_str)
                    .unwrap_or("")
                    .to_string();

                ScoredNode {
                    text,
                    score: point.score,
                }
            })
            .collect())
    }

    async fn count(&self) -> Result<usize> {
        let info = self
            .client
            .collection_info(&self.collection)
            .await
            .context("Failed to fetch collection info")?;

        Ok(info
            .result
            .and_then(|i| i.points_count)
            .unwrap_or(0) as usize)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn test_node(text: &str) -> Node {
        Node {
            text: text.to_string(),
            embedding: vec![0.1; EMBEDDING_DIMENSION as usize],
        }
    }

    #[test]
    fn test_nodes_to_points_carries_text_payload() {
        let nodes = vec![test_node("first page"), test_node("second page")];
        let points = nodes_to_points(&nodes);

        assert_eq!(points.len(), 2);
        let text = points[0]
            .payload
            .get("text")
            .and_then(|v| v.as_str())
            .map(String::as_str);
        assert_eq!(text, Some("first page"));
    }

    #[test]
    fn test_nodes_to_points_empty() {
        let points = nodes_to_points(&[]);
        assert!(points.is_empty());
    }
}
