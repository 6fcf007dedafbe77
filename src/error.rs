//! 에러 타입 정의
//!
//! 오케스트레이터 경계에서 사용하는 통합 에러입니다.
//! "외부 서비스 장애"와 "잘못된 입력"을 구분하여 호출자가
//! 다르게 반응할 수 있도록 합니다.

use thiserror::Error;

/// RAG 파이프라인 통합 에러
#[derive(Error, Debug)]
pub enum RagError {
    /// 설정 오류 (환경변수 누락 등)
    #[error("Configuration error: {0}")]
    Config(String),

    /// 벡터 스토어 접근 실패 (Qdrant 연결/검색/저장)
    #[error("Vector store error: {0}")]
    Store(String),

    /// 임베딩 생성 실패
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// LLM 호출 실패
    #[error("LLM error: {0}")]
    Llm(String),

    /// PDF 읽기/추출 실패 (잘못된 입력 경로 포함)
    #[error("PDF error: {0}")]
    Pdf(String),

    /// I/O 오류
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RagError {
    /// 외부 서비스(스토어/임베딩/LLM) 쪽 장애 여부
    ///
    /// 웹 레이어에서 502와 그 외 상태 코드를 구분할 때 사용합니다.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            RagError::Store(_) | RagError::Embedding(_) | RagError::Llm(_)
        )
    }

    /// 잘못된 입력(사용자가 고칠 수 있는 오류) 여부
    pub fn is_bad_input(&self) -> bool {
        matches!(self, RagError::Pdf(_))
    }
}

/// Result 타입 별칭
pub type RagResult<T> = Result<T, RagError>;

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_classification() {
        assert!(RagError::Store("down".into()).is_upstream());
        assert!(RagError::Llm("timeout".into()).is_upstream());
        assert!(RagError::Embedding("model".into()).is_upstream());
        assert!(!RagError::Pdf("bad file".into()).is_upstream());
        assert!(!RagError::Config("missing key".into()).is_upstream());
    }

    #[test]
    fn test_bad_input_classification() {
        assert!(RagError::Pdf("not a pdf".into()).is_bad_input());
        assert!(!RagError::Store("down".into()).is_bad_input());
    }

    #[test]
    fn test_display_includes_category() {
        let err = RagError::Llm("boom".into());
        assert_eq!(err.to_string(), "LLM error: boom");
    }
}
