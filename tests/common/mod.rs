// 集成测试公共模块
//
// 在本地随机端口上启动假的 OpenAI 接口和真正的 LinguaReader 服务器

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{Value, json};

use lingua_reader::server::create_router;
use lingua_reader::{Config, TutorService};

pub const ARTICLE_TEXT: &str = "Я йду в банк. Банк закритий!\nЩо робити?";

/// 点击这个单词时，假模型会回复无法解析的内容
pub const BROKEN_WORD: &str = "зламано";

#[derive(Clone, Default)]
pub struct StubModel {
    pub chat_calls: Arc<AtomicUsize>,
    pub speech_calls: Arc<AtomicUsize>,
}

impl StubModel {
    pub fn chat_calls(&self) -> usize {
        self.chat_calls.load(Ordering::SeqCst)
    }
}

fn clicked_word(prompt: &str) -> Option<&str> {
    let start = prompt.find("clicked word: \"")? + "clicked word: \"".len();
    let end = prompt[start..].find('"')? + start;
    Some(&prompt[start..end])
}

async fn stub_chat(State(stub): State<StubModel>, Json(body): Json<Value>) -> Json<Value> {
    stub.chat_calls.fetch_add(1, Ordering::SeqCst);
    let prompt = body["messages"][1]["content"].as_str().unwrap_or_default();

    let content = match clicked_word(prompt) {
        Some(BROKEN_WORD) => "Sorry, I can't help with that.".to_string(),
        Some(word) => format!(
            "```json\n{}\n```",
            json!({
                "surface": word,
                "lemma": word.to_lowercase(),
                "pos": "noun",
                "definition_en": "bank",
                "morphology": {"case": "accusative", "number": "singular", "gender": "masculine",
                               "tense": null, "aspect": null, "person": null},
                "notes": "Accusative after в with a verb of motion."
            })
        ),
        None => json!({
            "title": "Ранок",
            "article": ARTICLE_TEXT,
            "vocabulary": [{"term": "банк", "gloss": "bank"}],
            "questions": ["Куди я йду?"]
        })
        .to_string(),
    };

    Json(json!({ "choices": [{ "message": { "role": "assistant", "content": content } }] }))
}

async fn stub_speech(State(stub): State<StubModel>, Json(_body): Json<Value>) -> Response {
    stub.speech_calls.fetch_add(1, Ordering::SeqCst);
    ([(header::CONTENT_TYPE, "audio/mpeg")], vec![0x49u8, 0x44, 0x33]).into_response()
}

pub async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

/// 启动假模型和服务器，返回服务器地址
pub async fn spawn_stack() -> (String, StubModel) {
    let stub = StubModel::default();
    let model_app = Router::new()
        .route("/v1/chat/completions", post(stub_chat))
        .route("/v1/audio/speech", post(stub_speech))
        .with_state(stub.clone());
    let model_url = spawn(model_app).await;

    let mut config = Config::default();
    config.api.openai_key = "sk-test".to_string();
    config.api.base_url = format!("{}/v1", model_url);
    config.processing.max_retries = 0;
    let service = Arc::new(TutorService::new(config).unwrap());

    let server_url = spawn(create_router(service)).await;
    (server_url, stub)
}

/// 指向无法连接的模型地址的服务（不会发出真实请求）
pub fn offline_service() -> Arc<TutorService> {
    let mut config = Config::default();
    config.api.base_url = "http://127.0.0.1:9/v1".to_string();
    config.processing.max_retries = 0;
    config.processing.request_timeout_seconds = 2;
    Arc::new(TutorService::new(config).unwrap())
}
