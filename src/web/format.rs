//! 텍스트 포맷터 - 마크다운 볼드를 HTML 태그로 변환

use regex::Regex;

/// `**...**` 스팬을 `<b>...</b>`로 치환
///
/// 비탐욕 매칭으로 최소 범위만 캡처하며, 짝이 없는 `**`는 그대로 둡니다.
/// 순수 함수이며 상태가 없습니다.
pub fn format_bold_text(text: &str) -> String {
    let bold = Regex::new(r"\*\*(.*?)\*\*").expect("Invalid regex");
    bold.replace_all(text, "<b>$1</b>").into_owned()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_span() {
        assert_eq!(format_bold_text("**hi** there"), "<b>hi</b> there");
    }

    #[test]
    fn test_no_bold_unchanged() {
        assert_eq!(format_bold_text("no bold"), "no bold");
    }

    #[test]
    fn test_multiple_spans() {
        let out = format_bold_text("**a** and **b** and **c**");
        assert_eq!(out, "<b>a</b> and <b>b</b> and <b>c</b>");
        assert_eq!(out.matches("<b>").count(), 3);
        assert_eq!(out.matches("</b>").count(), 3);
        assert!(!out.contains("**"));
    }

    #[test]
    fn test_non_greedy_match() {
        // 비탐욕 매칭: 첫 짝만 스팬이 되고 남은 `**`는 유지
        assert_eq!(format_bold_text("a**b**c**d"), "a<b>b</b>c**d");
    }

    #[test]
    fn test_unmatched_marker_left_as_is() {
        assert_eq!(format_bold_text("**open"), "**open");
    }

    #[test]
    fn test_empty_span() {
        assert_eq!(format_bold_text("****"), "<b></b>");
    }

    #[test]
    fn test_span_does_not_cross_newline() {
        assert_eq!(format_bold_text("**a\nb**"), "**a\nb**");
    }
}
