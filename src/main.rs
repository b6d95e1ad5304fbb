//! Scribe 命令行入口
//!
//! 用法：`scribe [transcript.txt] [question]`
//! 未指定文件时从 stdin 读取转写文本；指定问题时在同一会话上追加一次问答。

use std::io::Read;

use anyhow::Context;
use scribe::config::{load_config, AppConfig};
use scribe::core::{generate_session_id, ErrorResponse, Orchestrator, PipelineError};
use scribe::llm::create_llm_from_config;
use scribe::observability;
use tokio_util::sync::CancellationToken;

fn read_transcript(path: Option<&str>) -> anyhow::Result<String> {
    match path {
        Some(p) => std::fs::read_to_string(p).with_context(|| format!("Failed to read {}", p)),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read transcript from stdin")?;
            Ok(buf)
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("Failed to serialize response")?
    );
    Ok(())
}

/// 打印结果；失败时输出错误信封并返回 false
fn report<T: serde::Serialize>(result: Result<T, PipelineError>) -> anyhow::Result<bool> {
    match result {
        Ok(resp) => {
            print_json(&resp)?;
            Ok(true)
        }
        Err(e) => {
            print_json(&ErrorResponse::from(&e))?;
            Ok(false)
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    observability::init();

    let cfg = load_config(None).unwrap_or_else(|e| {
        tracing::warn!("Failed to load config, using defaults: {}", e);
        AppConfig::default()
    });

    let args: Vec<String> = std::env::args().skip(1).collect();
    let transcript = read_transcript(args.first().map(String::as_str))?;

    let orchestrator = Orchestrator::from_config(&cfg, create_llm_from_config(&cfg));

    let shutdown = CancellationToken::new();
    let sweeper = cfg
        .cache
        .sweep_interval()
        .map(|interval| orchestrator.cache().spawn_sweeper(interval, shutdown.clone()));

    let session_id = generate_session_id();
    let mut ok = report(orchestrator.process(&transcript, Some(&session_id)).await)?;

    if let Some(question) = args.get(1) {
        ok &= report(orchestrator.qa(&transcript, question, Some(&session_id)).await)?;
    }

    shutdown.cancel();
    if let Some(handle) = sweeper {
        handle.await.context("Cache sweeper task failed")?;
    }

    if !ok {
        anyhow::bail!("Meeting processing failed");
    }
    Ok(())
}
