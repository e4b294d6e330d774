use anyhow::Result;
use serde::Deserialize;

// 配置文件结构
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub processing: ProcessingConfig,
    pub server: ServerConfig,
    pub tts: TtsConfig,
    pub reader: ReaderConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ApiConfig {
    pub openai_key: String,
    pub base_url: String,
    pub chat_model: String,
    pub speech_model: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            openai_key: String::new(),
            base_url: "https://api.openai.com/v1".to_string(),
            chat_model: "gpt-4.1-mini".to_string(),
            speech_model: "gpt-4o-mini-tts".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ProcessingConfig {
    pub max_retries: u32,
    pub request_delay_ms: u64,
    pub request_timeout_seconds: u64,
    pub article_temperature: f32,
    pub word_info_temperature: f32,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            max_retries: 1,
            request_delay_ms: 500,
            request_timeout_seconds: 120,
            article_temperature: 0.7,
            word_info_temperature: 0.2,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub port: u16,
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1".to_string(),
            port: 3001,
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TtsConfig {
    pub default_voice: String,
    pub max_input_chars: usize,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            default_voice: "alloy".to_string(),
            max_input_chars: 4000,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ReaderConfig {
    pub server_url: String,
    pub request_timeout_seconds: u64,
    pub history_limit: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:3001".to_string(),
            request_timeout_seconds: 120,
            history_limit: 10,
        }
    }
}

impl Config {
    // 读取 config.toml（不存在时使用默认值），再应用环境变量
    pub fn load() -> Result<Config> {
        let mut config = match std::fs::read_to_string("config.toml") {
            Ok(content) => Self::parse(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Config::default(),
            Err(e) => return Err(anyhow::anyhow!("配置文件 config.toml 无法读取: {}", e)),
        };
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Config> {
        toml::from_str(content).map_err(|e| anyhow::anyhow!("配置文件解析失败: {}", e))
    }

    /// 用环境变量覆盖配置项，`lookup` 通常是 `std::env::var`
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("OPENAI_API_KEY").filter(|k| !k.trim().is_empty()) {
            self.api.openai_key = key;
        }
        if let Some(port) = lookup("PORT").and_then(|p| p.trim().parse().ok()) {
            self.server.port = port;
        }
        if let Some(url) = lookup("LINGUA_READER_SERVER").filter(|u| !u.trim().is_empty()) {
            self.reader.server_url = url;
        }
    }

    pub fn require_api_key(&self) -> Result<()> {
        if self.api.openai_key.trim().is_empty() {
            anyhow::bail!("未设置 API 密钥：请在 config.toml 的 [api] openai_key 中配置，或设置 OPENAI_API_KEY 环境变量");
        }
        Ok(())
    }
}
