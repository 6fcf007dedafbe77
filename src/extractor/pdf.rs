//! PDF 텍스트 추출 모듈
//!
//! pdf-extract 크레이트를 사용하여 슬라이드 PDF에서
//! 페이지별 텍스트를 추출합니다.

use std::path::Path;

use anyhow::{Context, Result};

/// 슬라이드 텍스트에서 제거할 불릿 글리프
const BULLET_GLYPHS: [char; 4] = ['►', '●', '▪', '\u{f0b7}'];

/// PDF에서 페이지별 텍스트 추출
///
/// 한 페이지가 한 청크입니다. 빈 페이지도 빈 문자열 청크로 유지되어
/// 페이지 수와 청크 수가 항상 일치합니다.
pub fn extract_slide_pages(path: &Path) -> Result<Vec<String>> {
    // PDF 파일 열기
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read PDF: {:?}", path))?;

    // 전체 텍스트 추출
    let text = pdf_extract::extract_text_from_mem(&bytes)
        .with_context(|| format!("Failed to extract text from PDF: {:?}", path))?;

    // 텍스트가 비어있으면 경고 (스캔본 가능성)
    if text.trim().is_empty() {
        tracing::warn!(
            "No text extracted from PDF: {:?}. It might be a scanned deck.",
            path
        );
    }

    Ok(split_pages(&text)
        .into_iter()
        .map(|page| strip_bullets(&page))
        .collect())
}

/// PDF 텍스트를 페이지별로 분리 (폼피드 문자 기준)
///
/// 폼피드는 구분자이므로 마지막 구분자 뒤의 빈 꼬리 조각은 버리고,
/// 중간의 빈 페이지는 그대로 유지합니다.
fn split_pages(text: &str) -> Vec<String> {
    let mut pages: Vec<String> = text.split('\x0c').map(|s| s.trim().to_string()).collect();

    if pages.len() > 1 && pages.last().map(|p| p.is_empty()).unwrap_or(false) {
        pages.pop();
    }

    pages
}

/// 불릿 글리프 제거
fn strip_bullets(text: &str) -> String {
    text.chars().filter(|c| !BULLET_GLYPHS.contains(c)).collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_split_pages_with_formfeed() {
        let text = "Page 1 content\x0cPage 2 content\x0cPage 3 content";
        let pages = split_pages(text);
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[0], "Page 1 content");
        assert_eq!(pages[1], "Page 2 content");
    }

    #[test]
    fn test_split_pages_keeps_interior_empty_page() {
        let text = "first\x0c\x0cthird";
        let pages = split_pages(text);
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[1], "");
    }

    #[test]
    fn test_split_pages_drops_trailing_separator() {
        let text = "first\x0csecond\x0c";
        let pages = split_pages(text);
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[1], "second");
    }

    #[test]
    fn test_split_pages_no_separator() {
        let text = "Just some text without page breaks";
        let pages = split_pages(text);
        assert_eq!(pages.len(), 1);
    }

    #[test]
    fn test_strip_bullets() {
        assert_eq!(strip_bullets("► item ● one ▪ two"), " item  one  two");
        assert_eq!(strip_bullets("plain text"), "plain text");
        assert_eq!(strip_bullets("\u{f0b7} wingding"), " wingding");
    }

    #[test]
    fn test_extract_rejects_non_pdf() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"this is not a pdf").unwrap();

        let result = extract_slide_pages(file.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_extract_missing_file() {
        let result = extract_slide_pages(Path::new("/nonexistent/deck.pdf"));
        assert!(result.is_err());
    }
}
