//! CLI 모듈
//!
//! slides-rag CLI 명령어 정의 및 구현

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use crate::knowledge::{RagConfig, RagEngine};
use crate::llm::has_api_key;
use crate::web;

// ============================================================================
// CLI Definition
// ============================================================================

#[derive(Parser)]
#[command(name = "slides-rag")]
#[command(version, about = "PDF 슬라이드 RAG 웹 서비스", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 웹 서버 실행
    Serve {
        /// 바인드 주소
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        /// 포트
        #[arg(short, long, default_value = "8000")]
        port: u16,
    },

    /// PDF 슬라이드 덱 수집
    Ingest {
        /// 수집할 PDF 경로
        slide_path: PathBuf,
    },

    /// 지식베이스 질의
    Query {
        /// 질의 문장
        query: String,
    },
}

// ============================================================================
// CLI Runner
// ============================================================================

/// CLI 명령어 실행
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Serve { host, port } => cmd_serve(&host, port).await,
        Commands::Ingest { slide_path } => cmd_ingest(&slide_path).await,
        Commands::Query { query } => cmd_query(&query).await,
    }
}

/// 설정 로드 후 엔진 연결
///
/// Qdrant 연결/컬렉션 생성 실패는 여기서 치명적으로 전파됩니다.
async fn connect_engine() -> Result<RagEngine> {
    // API 키 확인
    if !has_api_key() {
        bail!(
            "API 키가 설정되지 않았습니다.\n\n\
             설정 방법:\n  \
             export GEMINI_API_KEY=your-api-key\n\n\
             API 키 발급: https://aistudio.google.com/app/apikey"
        );
    }

    let config = RagConfig::from_env().context("설정 로드 실패")?;

    RagEngine::connect(&config)
        .await
        .context("RAG 엔진 초기화 실패")
}

// ============================================================================
// Command Implementations
// ============================================================================

/// 웹 서버 명령어 (serve)
async fn cmd_serve(host: &str, port: u16) -> Result<()> {
    let engine = connect_engine().await?;
    web::serve(host, port, engine).await
}

/// 수집 명령어 (ingest)
///
/// PDF 슬라이드 덱 하나를 페이지 단위로 수집합니다.
async fn cmd_ingest(slide_path: &Path) -> Result<()> {
    let engine = connect_engine().await?;

    println!("[*] 수집 중: {:?}", slide_path);

    let count = engine.ingest(slide_path).await.context("수집 실패")?;

    println!("[OK] {} 페이지가 저장되었습니다", count);

    match engine.node_count().await {
        Ok(total) => println!("     전체 노드: {} 개", total),
        Err(e) => tracing::debug!("노드 수 조회 실패: {}", e),
    }

    Ok(())
}

/// 질의 명령어 (query)
async fn cmd_query(query: &str) -> Result<()> {
    let engine = connect_engine().await?;

    println!("[*] 질의 중: \"{}\"", query);

    let answer = engine.query(query).await.context("질의 실패")?;

    if answer.sources == 0 {
        println!("[!] 임계값을 넘긴 슬라이드가 없어 컨텍스트 없이 답변합니다.");
    }

    println!();
    println!("{}", answer.answer);

    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_ingest() {
        let cli = Cli::parse_from(["slides-rag", "ingest", "deck.pdf"]);
        match cli.command {
            Commands::Ingest { slide_path } => {
                assert_eq!(slide_path, PathBuf::from("deck.pdf"));
            }
            _ => panic!("expected ingest command"),
        }
    }

    #[test]
    fn test_parse_serve_defaults() {
        let cli = Cli::parse_from(["slides-rag", "serve"]);
        match cli.command {
            Commands::Serve { host, port } => {
                assert_eq!(host, "0.0.0.0");
                assert_eq!(port, 8000);
            }
            _ => panic!("expected serve command"),
        }
    }
}
