//! 콘텐츠 추출 모듈
//!
//! PDF 슬라이드 덱에서 페이지 단위 텍스트 청크를 추출합니다.

pub mod pdf;

use std::path::Path;

use anyhow::{Context, Result};

/// PDF에서 페이지별 청크 추출 (비동기 래퍼)
///
/// PDF 추출은 CPU 바운드이므로 spawn_blocking에서 실행합니다.
pub async fn load_slide_pages(path: &Path) -> Result<Vec<String>> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || pdf::extract_slide_pages(&path))
        .await
        .context("PDF extraction task failed")?
}
