//! RAG 엔진 - 수집/검색/질의 오케스트레이션
//!
//! PDF 슬라이드 덱을 페이지 단위 노드로 Qdrant에 수집하고,
//! 질의 시 유사 노드를 검색하여 Gemini 프롬프트에 주입합니다.

use std::path::Path;
use std::sync::Arc;

use crate::embedding::{EmbeddingProvider, MiniLmEmbedding};
use crate::error::{RagError, RagResult};
use crate::extractor;
use crate::llm::{get_api_key, GeminiLlm, LlmProvider};

use super::qdrant::QdrantVectorStore;
use super::vector::{Node, ScoredNode, VectorStore};

/// Qdrant 컬렉션 이름
pub const COLLECTION_NAME: &str = "slides-rag";

/// 질의 시 가져올 최대 노드 수
const RETRIEVE_TOP_K: u64 = 2;

/// 컨텍스트로 채택할 유사도 임계값 (이 값을 "초과"해야 통과)
const SCORE_THRESHOLD: f32 = 0.5;

// ============================================================================
// RagConfig
// ============================================================================

/// RAG 엔진 설정
///
/// 숨은 전역 상태 대신 명시적으로 생성하여 엔진에 전달합니다.
#[derive(Debug, Clone)]
pub struct RagConfig {
    /// Qdrant 호스트
    pub qdrant_host: String,
    /// Qdrant 포트
    pub qdrant_port: u16,
    /// 컬렉션 이름
    pub collection: String,
    /// Gemini API 키
    pub gemini_api_key: String,
}

impl RagConfig {
    /// 환경변수에서 설정 로드
    ///
    /// - `QDRANT_HOST` (기본값: localhost)
    /// - `QDRANT_PORT` (기본값: 6333)
    /// - `GEMINI_API_KEY` (필수)
    pub fn from_env() -> RagResult<Self> {
        let qdrant_host =
            std::env::var("QDRANT_HOST").unwrap_or_else(|_| "localhost".to_string());

        let qdrant_port = match std::env::var("QDRANT_PORT") {
            Ok(port) => port
                .parse::<u16>()
                .map_err(|_| RagError::Config(format!("Invalid QDRANT_PORT: {}", port)))?,
            Err(_) => 6333,
        };

        let gemini_api_key = get_api_key().map_err(|e| RagError::Config(e.to_string()))?;

        Ok(Self {
            qdrant_host,
            qdrant_port,
            collection: COLLECTION_NAME.to_string(),
            gemini_api_key,
        })
    }

    /// Qdrant 엔드포인트 URL
    pub fn qdrant_url(&self) -> String {
        format!("http://{}:{}", self.qdrant_host, self.qdrant_port)
    }
}

// ============================================================================
// Answer
// ============================================================================

/// 질의 응답
#[derive(Debug, Clone)]
pub struct Answer {
    /// LLM 완성 텍스트
    pub answer: String,
    /// 임계값을 통과하여 컨텍스트로 사용된 노드 수
    pub sources: usize,
}

// ============================================================================
// RagEngine
// ============================================================================

/// RAG 엔진
///
/// 스토어/임베딩/LLM 핸들을 보유합니다. 모든 핸들은 읽기 전용으로
/// 공유 가능하며, 요청 단위 동기 처리 외에 내부 병렬성은 없습니다.
pub struct RagEngine {
    store: Arc<dyn VectorStore>,
    embedder: Arc<dyn EmbeddingProvider>,
    llm: Arc<dyn LlmProvider>,
}

impl RagEngine {
    /// 설정으로 외부 서비스에 연결하여 엔진 생성
    ///
    /// 컬렉션이 없으면 생성합니다. 연결/생성 실패는 호출자로 전파되며
    /// 기동 시점에는 치명적입니다.
    pub async fn connect(config: &RagConfig) -> RagResult<Self> {
        let store = QdrantVectorStore::connect(&config.qdrant_url(), &config.collection)
            .await
            .map_err(|e| RagError::Store(format!("{:#}", e)))?;

        let embedder =
            MiniLmEmbedding::new().map_err(|e| RagError::Embedding(format!("{:#}", e)))?;

        let llm = GeminiLlm::new(config.gemini_api_key.clone())
            .map_err(|e| RagError::Llm(format!("{:#}", e)))?;

        tracing::info!(
            "RAG engine ready (qdrant: {}, collection: {})",
            config.qdrant_url(),
            config.collection
        );

        Ok(Self::with_providers(
            Arc::new(store),
            Arc::new(embedder),
            Arc::new(llm),
        ))
    }

    /// 프로바이더를 직접 주입하여 생성
    pub fn with_providers(
        store: Arc<dyn VectorStore>,
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Arc<dyn LlmProvider>,
    ) -> Self {
        Self {
            store,
            embedder,
            llm,
        }
    }

    /// PDF 슬라이드 덱 수집
    ///
    /// 페이지별 청크 추출 → 전체 임베딩 → 단일 배치 업서트 순서입니다.
    /// 임베딩이 모두 끝나기 전에는 스토어에 아무것도 쓰지 않습니다.
    ///
    /// # Returns
    /// 저장된 노드 수 (= PDF 페이지 수)
    pub async fn ingest(&self, pdf_path: &Path) -> RagResult<usize> {
        let pages = extractor::load_slide_pages(pdf_path)
            .await
            .map_err(|e| RagError::Pdf(format!("{:#}", e)))?;

        tracing::info!("Extracted {} pages from {:?}", pages.len(), pdf_path);

        let written = self.ingest_pages(&pages).await?;

        tracing::info!("{:?} document ingested successfully ({} nodes)", pdf_path, written);

        Ok(written)
    }

    /// 페이지 청크 수집 (전체 임베딩 → 단일 배치 업서트)
    ///
    /// 임베딩 단계에서 실패하면 스토어에는 아무것도 쓰이지 않습니다.
    pub async fn ingest_pages(&self, pages: &[String]) -> RagResult<usize> {
        let nodes = self.build_nodes(pages).await?;

        self.store
            .insert_batch(&nodes)
            .await
            .map_err(|e| RagError::Store(format!("{:#}", e)))
    }

    /// 페이지 청크를 노드로 변환 (청크당 임베딩 1개)
    pub async fn build_nodes(&self, pages: &[String]) -> RagResult<Vec<Node>> {
        let embeddings = self
            .embedder
            .embed_batch(pages)
            .await
            .map_err(|e| RagError::Embedding(format!("{:#}", e)))?;

        Ok(pages
            .iter()
            .cloned()
            .zip(embeddings)
            .map(|(text, embedding)| Node { text, embedding })
            .collect())
    }

    /// 유사 노드 검색
    pub async fn retrieve(&self, query: &str) -> RagResult<Vec<ScoredNode>> {
        let query_embedding = self
            .embedder
            .embed(query)
            .await
            .map_err(|e| RagError::Embedding(format!("{:#}", e)))?;

        self.store
            .search(&query_embedding, RETRIEVE_TOP_K)
            .await
            .map_err(|e| RagError::Store(format!("{:#}", e)))
    }

    /// 질의 처리
    ///
    /// 임계값(0.5 초과)을 넘긴 노드 텍스트를 개행으로 이어 컨텍스트 블록을
    /// 만들고 고정 프롬프트 템플릿으로 LLM을 호출합니다.
    /// 통과한 노드가 없어도 빈 컨텍스트로 LLM을 호출합니다.
    pub async fn query(&self, user_query: &str) -> RagResult<Answer> {
        let retrieved = self.retrieve(user_query).await?;

        let passages: Vec<String> = retrieved
            .into_iter()
            .filter(|node| node.score > SCORE_THRESHOLD)
            .map(|node| node.text)
            .collect();

        let sources = passages.len();
        let context = passages.join("\n");

        if sources == 0 {
            tracing::debug!("No node cleared the score threshold for: {}", user_query);
        }

        let prompt = build_prompt(user_query, &context);

        let answer = self
            .llm
            .complete(&prompt)
            .await
            .map_err(|e| RagError::Llm(format!("{:#}", e)))?;

        Ok(Answer { answer, sources })
    }

    /// 저장된 노드 수
    pub async fn node_count(&self) -> RagResult<usize> {
        self.store
            .count()
            .await
            .map_err(|e| RagError::Store(format!("{:#}", e)))
    }
}

/// 고정 프롬프트 템플릿에 질의와 컨텍스트 대입
fn build_prompt(query: &str, context: &str) -> String {
    format!(
        "You are a chat-bot responsible for resolving user <Query> by considering the provided context.\n<Query>:{}\n<Context>:{}",
        query, context
    )
}

// ============================================================================
// Tests
// ============================================================================
