use std::sync::Arc;

use anyhow::Result;

use lingua_reader::logging::init_tracing;
use lingua_reader::{Config, TutorService, server};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;
    init_tracing(&config.server.log_level);

    tracing::info!("📚 LinguaReader 服务器 v{}", env!("CARGO_PKG_VERSION"));

    // 从配置文件或 OPENAI_API_KEY 环境变量获取 API 密钥
    if let Err(e) = config.require_api_key() {
        tracing::error!("⚠️  {}", e);
        tracing::error!("   export OPENAI_API_KEY=your_api_key");
        return Err(e);
    }

    tracing::info!("🤖 模型: {} / {}", config.api.chat_model, config.api.speech_model);

    let service = Arc::new(TutorService::new(config)?);
    server::serve(service).await
}
