//! 阅读器客户端：调用服务器的 /api 接口

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};

use crate::cache::{CacheKey, WordLookup};
use crate::error::LookupError;
use crate::models::{Article, ArticleRequest, SpeechRequest, WordAnnotation, WordInfoRequest};
use crate::service::annotation_from_content;

pub struct ReaderClient {
    client: Client,
    base_url: String,
}

impl ReaderClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = ClientBuilder::new().timeout(timeout).build()?;
        Ok(ReaderClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path)
    }

    pub async fn health(&self) -> Result<bool> {
        let response = self.client.get(self.url("health")).send().await?;
        if !response.status().is_success() {
            return Ok(false);
        }
        let body: serde_json::Value = response.json().await?;
        Ok(body["ok"].as_bool().unwrap_or(false))
    }

    pub async fn generate_article(&self, req: &ArticleRequest) -> Result<Article> {
        let response = self
            .client
            .post(self.url("generate"))
            .json(req)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("网络请求失败: {}", e))?;

        if !response.status().is_success() {
            anyhow::bail!("文章生成请求失败 (状态码: {})", response.status());
        }
        Ok(response.json().await?)
    }

    pub async fn word_info(&self, key: &CacheKey) -> Result<WordAnnotation, LookupError> {
        let body = WordInfoRequest {
            language: key.language.clone(),
            level: Some(key.level.clone()),
            word: key.word.clone(),
            sentence: key.sentence.clone(),
        };
        let response = self.client.post(self.url("wordinfo")).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LookupError::Status { status: status.as_u16(), body });
        }

        // 200 但缺少单词本身（如 {"error": ...}）同样视为格式错误，不能进缓存
        let text = response.text().await?;
        annotation_from_content(&text)
    }

    /// 返回 mp3 音频数据
    pub async fn speak(&self, text: &str, voice: Option<&str>) -> Result<Vec<u8>> {
        let body = SpeechRequest {
            text: Some(text.to_string()),
            voice: voice.map(str::to_string),
        };
        let response = self
            .client
            .post(self.url("tts"))
            .json(&body)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("网络请求失败: {}", e))?;

        if !response.status().is_success() {
            anyhow::bail!("语音合成请求失败 (状态码: {})", response.status());
        }
        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl WordLookup for ReaderClient {
    async fn lookup(&self, key: &CacheKey) -> Result<WordAnnotation, LookupError> {
        self.word_info(key).await
    }
}
