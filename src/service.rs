use anyhow::Result;
use async_trait::async_trait;

use crate::api::{ApiClient, ChatRequest, RequestMessage, SpeechApiRequest};
use crate::cache::{CacheKey, WordLookup};
use crate::config::Config;
use crate::error::LookupError;
use crate::json_repair::parse_model_json;
use crate::models::{Article, ArticleRequest, WordAnnotation};
use crate::prompts::{JSON_ONLY_SYSTEM_PROMPT, build_article_prompt, build_word_info_prompt};

/// 服务端：把学习者的设置转成提示词，调用语言模型
pub struct TutorService {
    api_client: ApiClient,
    pub config: Config,
}

impl TutorService {
    pub fn new(config: Config) -> Result<Self> {
        let api_client = ApiClient::new(config.clone())?;
        Ok(TutorService { api_client, config })
    }

    fn chat_request(&self, prompt: String, temperature: f32) -> ChatRequest {
        ChatRequest {
            model: self.config.api.chat_model.clone(),
            messages: vec![RequestMessage::system(JSON_ONLY_SYSTEM_PROMPT), RequestMessage::user(prompt)],
            temperature,
            max_tokens: None,
        }
    }

    // 生成阅读文章
    pub async fn generate_article(&self, req: &ArticleRequest) -> Result<Article> {
        tracing::info!("📝 生成文章: {} {} ({})", req.language, req.level, req.topics_or_default());

        let request = self.chat_request(build_article_prompt(req), self.config.processing.article_temperature);
        let response = self.api_client.chat_with_retry(&request).await?;

        Ok(article_from_content(response.first_content()))
    }

    // 查询单词信息
    pub async fn word_info(&self, key: &CacheKey) -> Result<WordAnnotation, LookupError> {
        tracing::info!("🔍 查询单词: {} ({})", key.word, key.language);

        let request = self.chat_request(build_word_info_prompt(key), self.config.processing.word_info_temperature);
        let response = self
            .api_client
            .chat_with_retry(&request)
            .await
            .map_err(|e| LookupError::Service(e.to_string()))?;

        annotation_from_content(response.first_content())
    }

    // 语音合成，输入超过上限时截断
    pub async fn speak(&self, text: &str, voice: Option<&str>) -> Result<Vec<u8>> {
        let voice = voice
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or(self.config.tts.default_voice.as_str());
        let input = truncate_chars(text, self.config.tts.max_input_chars);

        tracing::info!("🔊 语音合成: {} 个字符, 声音 {}", input.chars().count(), voice);

        let request = SpeechApiRequest {
            model: self.config.api.speech_model.clone(),
            voice: voice.to_string(),
            input: input.to_string(),
        };
        self.api_client.speech_with_retry(&request).await
    }
}

#[async_trait]
impl WordLookup for TutorService {
    async fn lookup(&self, key: &CacheKey) -> Result<WordAnnotation, LookupError> {
        self.word_info(key).await
    }
}

/// 解析失败时把模型原文作为文章正文
pub fn article_from_content(content: &str) -> Article {
    match parse_model_json::<Article>(content) {
        Ok(article) => article,
        Err(e) => {
            tracing::warn!("⚠️  文章 JSON 解析失败，使用原文: {}", e);
            Article::from_raw_text(content)
        }
    }
}

/// 无法解析或缺少单词本身时视为格式错误
pub fn annotation_from_content(content: &str) -> Result<WordAnnotation, LookupError> {
    let annotation: WordAnnotation = parse_model_json(content)?;
    if annotation.surface.trim().is_empty() && annotation.lemma.trim().is_empty() {
        return Err(LookupError::Malformed("模型输出缺少 surface 和 lemma".to_string()));
    }
    Ok(annotation)
}

pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn article_falls_back_to_raw_text() {
        let article = article_from_content("Жила-була собі кішка.");
        assert_eq!(article.title, "");
        assert_eq!(article.article, "Жила-була собі кішка.");
        assert!(article.vocabulary.is_empty());
        assert!(article.questions.is_empty());
    }

    #[test]
    fn article_parses_full_shape() {
        let content = r#"{"title": "Біг", "article": "Я бігаю щоранку.",
            "vocabulary": [{"term": "бігати", "gloss": "to run"}], "questions": ["Коли я бігаю?"]}"#;
        let article = article_from_content(content);
        assert_eq!(article.vocabulary[0].gloss, "to run");
        assert_eq!(article.questions.len(), 1);
    }

    #[test]
    fn empty_object_is_malformed_annotation() {
        assert!(matches!(annotation_from_content("{}"), Err(LookupError::Malformed(_))));
        assert!(matches!(annotation_from_content("not json"), Err(LookupError::Malformed(_))));
    }

    #[test]
    fn annotation_parses_with_fences() {
        let ann = annotation_from_content("```json\n{\"surface\": \"їжа\", \"lemma\": \"їжа\", \"pos\": \"noun\"}\n```")
            .unwrap();
        assert_eq!(ann.pos, "noun");
    }

    #[test]
    fn truncation_counts_characters() {
        assert_eq!(truncate_chars("привіт", 3), "при");
        assert_eq!(truncate_chars("hi", 10), "hi");
        assert_eq!(truncate_chars("", 0), "");
    }

    #[tokio::test]
    async fn unreachable_model_is_a_lookup_failure() {
        let mut config = Config::default();
        config.api.base_url = "http://127.0.0.1:9/v1".to_string();
        config.processing.max_retries = 0;
        let service = TutorService::new(config).unwrap();

        let key = CacheKey::new("Ukrainian", "B1", "тест", "Це тест.");
        let err = service.lookup(&key).await.unwrap_err();
        assert!(matches!(err, LookupError::Service(_)));
    }
}
