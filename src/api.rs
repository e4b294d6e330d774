use anyhow::Result;
use reqwest::{Client, ClientBuilder, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;

use crate::config::Config;

// OpenAI 兼容的 chat completions 响应结构
#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: Message,
}

#[derive(Debug, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatResponse {
    /// 第一条回复的内容，没有时返回 "{}"
    pub fn first_content(&self) -> &str {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .unwrap_or("{}")
    }
}

#[derive(Debug, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<RequestMessage>,
    pub temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct RequestMessage {
    pub role: String,
    pub content: String,
}

impl RequestMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system".to_string(), content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".to_string(), content: content.into() }
    }
}

#[derive(Debug, Serialize)]
pub struct SpeechApiRequest {
    pub model: String,
    pub voice: String,
    pub input: String,
}

pub struct ApiClient {
    client: Client,
    config: Config,
}

impl ApiClient {
    pub fn new(config: Config) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.processing.request_timeout_seconds))
            .build()?;

        Ok(ApiClient { client, config })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.api.base_url.trim_end_matches('/'), path)
    }

    // 带重试机制的 chat completions 请求
    pub async fn chat_with_retry(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let url = self.endpoint("chat/completions");
        let url = url.as_str();
        self.with_retry("chat", move || async move {
            let response = self.post_json(url, request).await?;
            response
                .json::<ChatResponse>()
                .await
                .map_err(|e| anyhow::anyhow!("JSON解析失败: {}", e))
        })
        .await
    }

    // 语音合成，返回 mp3 音频数据
    pub async fn speech_with_retry(&self, request: &SpeechApiRequest) -> Result<Vec<u8>> {
        let url = self.endpoint("audio/speech");
        let url = url.as_str();
        self.with_retry("speech", move || async move {
            let response = self.post_json(url, request).await?;
            let bytes = response
                .bytes()
                .await
                .map_err(|e| anyhow::anyhow!("读取音频数据失败: {}", e))?;
            if bytes.is_empty() {
                anyhow::bail!("未收到音频数据");
            }
            Ok(bytes.to_vec())
        })
        .await
    }

    async fn post_json<T: Serialize + ?Sized>(&self, url: &str, body: &T) -> Result<Response> {
        let response = self
            .client
            .post(url)
            .header("Authorization", format!("Bearer {}", self.config.api.openai_key))
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("网络请求失败: {}", e))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        match response.text().await {
            Ok(error_text) => Err(anyhow::anyhow!("API请求失败 (状态码: {}): {}", status, error_text)),
            Err(e) => Err(anyhow::anyhow!("读取错误响应失败: {}", e)),
        }
    }

    async fn with_retry<T, F, Fut>(&self, what: &str, mut attempt_fn: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let max_retries = self.config.processing.max_retries;
        let mut last_error = None;

        for attempt in 0..=max_retries {
            if attempt > 0 {
                let delay = Duration::from_millis(self.config.processing.request_delay_ms * (attempt as u64 + 1));
                tracing::info!("⏳ {} 重试 {}/{} 次，等待 {:?}...", what, attempt, max_retries, delay);
                sleep(delay).await;
            }

            match attempt_fn().await {
                Ok(value) => {
                    if attempt > 0 {
                        tracing::info!("✅ {} 重试成功！", what);
                    }
                    return Ok(value);
                }
                Err(e) => {
                    tracing::warn!("❌ {} 尝试 {}: {}", what, attempt + 1, e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| anyhow::anyhow!("所有重试都失败了")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_content_defaults_to_empty_object() {
        let empty: ChatResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert_eq!(empty.first_content(), "{}");

        let null_content: ChatResponse =
            serde_json::from_str(r#"{"choices": [{"message": {"role": "assistant", "content": null}}]}"#).unwrap();
        assert_eq!(null_content.first_content(), "{}");

        let normal: ChatResponse =
            serde_json::from_str(r#"{"choices": [{"message": {"content": "{\"a\":1}"}}]}"#).unwrap();
        assert_eq!(normal.first_content(), r#"{"a":1}"#);
    }

    #[test]
    fn request_omits_unset_max_tokens() {
        let request = ChatRequest {
            model: "gpt-4.1-mini".to_string(),
            messages: vec![RequestMessage::system("s"), RequestMessage::user("u")],
            temperature: 0.2,
            max_tokens: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("max_tokens").is_none());
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "u");
    }

    #[test]
    fn endpoint_joins_base_url() {
        let mut config = Config::default();
        config.api.base_url = "http://localhost:9999/v1/".to_string();
        let client = ApiClient::new(config).unwrap();
        assert_eq!(client.endpoint("chat/completions"), "http://localhost:9999/v1/chat/completions");
    }

    #[tokio::test]
    async fn unreachable_endpoint_fails_after_retries() {
        let mut config = Config::default();
        config.api.base_url = "http://127.0.0.1:9/v1".to_string();
        config.processing.max_retries = 1;
        config.processing.request_delay_ms = 1;
        config.processing.request_timeout_seconds = 2;
        let client = ApiClient::new(config).unwrap();

        let request = ChatRequest {
            model: "m".to_string(),
            messages: vec![RequestMessage::user("hi")],
            temperature: 0.0,
            max_tokens: None,
        };
        let err = client.chat_with_retry(&request).await.unwrap_err();
        assert!(err.to_string().contains("网络请求失败"));
    }
}
