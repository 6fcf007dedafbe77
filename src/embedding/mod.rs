//! 임베딩 모듈 - all-MiniLM-L6-v2 텍스트 벡터화
//!
//! fastembed의 로컬 ONNX 추론으로 텍스트를 384차원 벡터로 변환합니다.
//! 시맨틱 검색을 위한 핵심 모듈입니다.
//!
//! ## 사용법
//! ```rust,ignore
//! let embedder = MiniLmEmbedding::new()?;
//! let embedding = embedder.embed("Hello, world!").await?;
//! ```

use anyhow::{Context, Result};
use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};

// ============================================================================
// EmbeddingProvider Trait
// ============================================================================

/// 임베딩 프로바이더 트레이트
///
/// 텍스트를 벡터로 변환하는 인터페이스입니다.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// 단일 텍스트 임베딩
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// 배치 임베딩 (기본 구현: 순차 호출)
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }

    /// 임베딩 차원 수
    fn dimension(&self) -> usize;

    /// 프로바이더 이름
    fn name(&self) -> &str;
}

// ============================================================================
// all-MiniLM-L6-v2 Embedding
// ============================================================================

/// 기본 임베딩 차원 (all-MiniLM-L6-v2)
pub const DEFAULT_DIMENSION: usize = 384;

/// all-MiniLM-L6-v2 임베딩 구현체
///
/// ref: https://huggingface.co/sentence-transformers/all-MiniLM-L6-v2
pub struct MiniLmEmbedding {
    model: TextEmbedding,
}

impl MiniLmEmbedding {
    /// 새 임베딩 인스턴스 생성
    ///
    /// 최초 실행 시 모델 파일을 캐시 디렉토리로 다운로드합니다.
    pub fn new() -> Result<Self> {
        let model = TextEmbedding::try_new(
            InitOptions::new(EmbeddingModel::AllMiniLML6V2).with_show_download_progress(false),
        )
        .context("Failed to load all-MiniLM-L6-v2 model")?;

        Ok(Self { model })
    }
}

#[async_trait]
impl EmbeddingProvider for MiniLmEmbedding {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        // 빈 텍스트 처리 (빈 페이지도 노드로 유지되므로 영벡터 반환)
        if text.trim().is_empty() {
            return Ok(vec![0.0; DEFAULT_DIMENSION]);
        }

        // 로컬 ONNX 추론 (네트워크 호출 없음)
        let mut embeddings = self
            .model
            .embed(vec![text], None)
            .context("Failed to compute embedding")?;

        embeddings
            .pop()
            .ok_or_else(|| anyhow::anyhow!("Embedding model returned no vectors"))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        tracing::debug!("Embedding batch of {} chunks", texts.len());

        // 빈 청크는 모델에 넣지 않고 영벡터로 채움
        let mut results = vec![Vec::new(); texts.len()];
        let mut non_empty: Vec<(usize, &str)> = Vec::new();

        for (i, text) in texts.iter().enumerate() {
            if text.trim().is_empty() {
                results[i] = vec![0.0; DEFAULT_DIMENSION];
            } else {
                non_empty.push((i, text.as_str()));
            }
        }

        if !non_empty.is_empty() {
            let inputs: Vec<&str> = non_empty.iter().map(|(_, t)| *t).collect();
            let embeddings = self
                .model
                .embed(inputs, None)
                .context("Failed to compute batch embeddings")?;

            for ((i, _), embedding) in non_empty.into_iter().zip(embeddings) {
                results[i] = embedding;
            }
        }

        Ok(results)
    }

    fn dimension(&self) -> usize {
        DEFAULT_DIMENSION
    }

    fn name(&self) -> &str {
        "all-MiniLM-L6-v2"
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// 테스트용 고정 벡터 프로바이더
    struct FixedEmbedding;

    #[async_trait]
    impl EmbeddingProvider for FixedEmbedding {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            Ok(vec![text.len() as f32, 1.0])
        }

        fn dimension(&self) -> usize {
            2
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    #[tokio::test]
    async fn test_default_embed_batch_is_sequential() {
        let provider = FixedEmbedding;
        let texts = vec!["a".to_string(), "bbb".to_string()];

        let result = provider.embed_batch(&texts).await.unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result[0], vec![1.0, 1.0]);
        assert_eq!(result[1], vec![3.0, 1.0]);
    }

    #[tokio::test]
    async fn test_default_embed_batch_empty_input() {
        let provider = FixedEmbedding;
        let result = provider.embed_batch(&[]).await.unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_dimension_constant() {
        assert_eq!(DEFAULT_DIMENSION, 384);
    }
}
