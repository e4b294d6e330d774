//! HTTP 接口：转发学习者的请求到语言模型

use std::sync::Arc;

use anyhow::Result;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tower_http::cors::CorsLayer;

use crate::cache::CacheKey;
use crate::error::LookupError;
use crate::models::{ArticleRequest, SpeechRequest, WordInfoRequest};
use crate::service::TutorService;

pub type AppState = Arc<TutorService>;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/generate", post(generate))
        .route("/api/wordinfo", post(word_info))
        .route("/api/tts", post(tts))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "ok": true }))
}

async fn generate(State(svc): State<AppState>, Json(req): Json<ArticleRequest>) -> Response {
    match svc.generate_article(&req).await {
        Ok(article) => Json(article).into_response(),
        Err(e) => {
            tracing::error!("❌ 文章生成失败: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Generation failed")
        }
    }
}

async fn word_info(State(svc): State<AppState>, Json(req): Json<WordInfoRequest>) -> Response {
    if req.word.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Missing word");
    }

    let key = CacheKey::new(req.language, req.level.unwrap_or_default(), req.word, req.sentence);
    match svc.word_info(&key).await {
        Ok(annotation) => Json(annotation).into_response(),
        Err(LookupError::Malformed(reason)) => {
            // 不返回降级结果，避免客户端把它写进缓存
            tracing::warn!("⚠️  模型输出无法解析: {}", reason);
            error_response(StatusCode::BAD_GATEWAY, format!("wordinfo failed: {}", reason))
        }
        Err(e) => {
            tracing::error!("❌ 单词查询失败: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "wordinfo failed")
        }
    }
}

async fn tts(State(svc): State<AppState>, Json(req): Json<SpeechRequest>) -> Response {
    let text = match req.text.as_deref() {
        Some(t) if !t.trim().is_empty() => t,
        _ => return error_response(StatusCode::BAD_REQUEST, "Missing text"),
    };

    match svc.speak(text, req.voice.as_deref()).await {
        Ok(audio) => (
            [
                (header::CONTENT_TYPE, "audio/mpeg".to_string()),
                (header::CONTENT_LENGTH, audio.len().to_string()),
            ],
            audio,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("❌ 语音合成失败: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "tts failed")
        }
    }
}

/// 启动服务器，收到 Ctrl+C / SIGTERM 后优雅退出
pub async fn serve(state: AppState) -> Result<()> {
    let addr = format!("{}:{}", state.config.server.bind_addr, state.config.server.port);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| anyhow::anyhow!("无法绑定地址 {}: {}", addr, e))?;
    tracing::info!("🚀 服务器运行于 http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("服务器错误: {}", e))?;

    tracing::info!("👋 服务器已关闭");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("无法监听 Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("无法监听 SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("收到 Ctrl+C，准备关闭..."),
        _ = terminate => tracing::info!("收到 SIGTERM，准备关闭..."),
    }
}
