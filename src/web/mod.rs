//! 웹 레이어 - HTML 폼 엔드포인트
//!
//! ingest/query 두 폼 페이지를 제공하고 RAG 엔진을 호출해
//! 결과를 템플릿에 렌더링합니다.

pub mod format;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::{Form, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use handlebars::Handlebars;
use serde::Deserialize;
use serde_json::json;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::error::RagError;
use crate::knowledge::RagEngine;

use self::format::format_bold_text;

/// 템플릿/정적 파일 디렉토리
const TEMPLATE_DIR: &str = "static";

// ============================================================================
// App State
// ============================================================================

/// 공유 애플리케이션 상태
///
/// 핸들은 읽기 전용이므로 동시 요청 간 잠금 없이 공유됩니다.
pub struct AppState {
    engine: RagEngine,
    templates: Handlebars<'static>,
}

impl AppState {
    /// 엔진과 템플릿 레지스트리로 상태 생성
    pub fn new(engine: RagEngine) -> Result<Self> {
        let mut templates = Handlebars::new();

        for name in ["index", "query", "ingest"] {
            let path = Path::new(TEMPLATE_DIR).join(format!("{}.html", name));
            templates
                .register_template_file(name, &path)
                .with_context(|| format!("Failed to load template: {:?}", path))?;
        }

        Ok(Self { engine, templates })
    }
}

// ============================================================================
// Router
// ============================================================================

/// 라우터 구성
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/query", get(query_page).post(handle_query))
        .route("/ingest", get(ingest_page).post(handle_ingest))
        .nest_service("/static", ServeDir::new(TEMPLATE_DIR))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// 웹 서버 기동
pub async fn serve(host: &str, port: u16, engine: RagEngine) -> Result<()> {
    let state = Arc::new(AppState::new(engine)?);
    let app = router(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

// ============================================================================
// Handlers
// ============================================================================

#[derive(Deserialize)]
struct QueryForm {
    user_query: String,
}

#[derive(Deserialize)]
struct IngestForm {
    pdf_file_name: String,
}

async fn home(State(state): State<Arc<AppState>>) -> Result<Html<String>, WebError> {
    render(&state, "index", &json!({}))
}

async fn query_page(State(state): State<Arc<AppState>>) -> Result<Html<String>, WebError> {
    render(&state, "query", &json!({}))
}

async fn ingest_page(State(state): State<Arc<AppState>>) -> Result<Html<String>, WebError> {
    render(&state, "ingest", &json!({}))
}

/// 질의 폼 처리
///
/// 엔진 에러는 카테고리별 HTTP 상태 코드로 변환됩니다.
async fn handle_query(
    State(state): State<Arc<AppState>>,
    Form(form): Form<QueryForm>,
) -> Result<Html<String>, WebError> {
    let answer = state.engine.query(&form.user_query).await?;

    render(
        &state,
        "query",
        &json!({
            "user_query": form.user_query,
            "result": format_bold_text(&answer.answer),
            "no_match": answer.sources == 0,
        }),
    )
}

/// 수집 폼 처리
///
/// 수집 실패는 고정 에러 메시지로 페이지에 렌더링됩니다.
async fn handle_ingest(
    State(state): State<Arc<AppState>>,
    Form(form): Form<IngestForm>,
) -> Result<Html<String>, WebError> {
    let result = match state.engine.ingest(Path::new(&form.pdf_file_name)).await {
        Ok(count) => format!(
            "{} document ingested successfully! ({} pages)",
            form.pdf_file_name, count
        ),
        Err(e) => {
            tracing::error!("Ingestion failed: {}", e);
            "Error ingesting docs".to_string()
        }
    };

    render(&state, "ingest", &json!({ "result": result }))
}

/// 템플릿 렌더링
fn render(
    state: &AppState,
    template: &str,
    data: &serde_json::Value,
) -> Result<Html<String>, WebError> {
    let page = state
        .templates
        .render(template, data)
        .map_err(|e| WebError(RagError::Config(format!("Template render failed: {}", e))))?;

    Ok(Html(page))
}

// ============================================================================
// Error Mapping
// ============================================================================

/// RagError → HTTP 응답 래퍼
pub struct WebError(RagError);

impl From<RagError> for WebError {
    fn from(err: RagError) -> Self {
        WebError(err)
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = if self.0.is_upstream() {
            StatusCode::BAD_GATEWAY
        } else if self.0.is_bad_input() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        tracing::error!("Request failed: {}", self.0);

        (status, self.0.to_string()).into_response()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_web_error_status_mapping() {
        let upstream = WebError(RagError::Llm("down".into())).into_response();
        assert_eq!(upstream.status(), StatusCode::BAD_GATEWAY);

        let bad_input = WebError(RagError::Pdf("not a pdf".into())).into_response();
        assert_eq!(bad_input.status(), StatusCode::BAD_REQUEST);

        let internal = WebError(RagError::Config("no template".into())).into_response();
        assert_eq!(internal.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
