//! 终端阅读器：生成文章后输入单词编号即可查询

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use lingua_reader::logging::init_tracing;
use lingua_reader::{Anchor, ArticleRequest, Config, LookupStatus, ReaderClient, ReaderSession, WordPopover};

#[derive(Parser, Debug)]
#[command(name = "lingua-reader-cli", version, about = "LinguaReader 终端阅读器")]
struct Cli {
    // 默认使用 config.toml 中的 reader.server_url
    #[arg(short, long, value_name = "URL")]
    server: Option<String>,

    #[arg(short, long, default_value = "Ukrainian")]
    language: String,

    // A1-C2
    #[arg(long, default_value = "B1")]
    level: String,

    // 逗号分隔
    #[arg(short, long)]
    topics: Option<String>,

    // short | medium | long
    #[arg(long)]
    length: Option<String>,

    #[arg(long)]
    style: Option<String>,

    #[arg(long)]
    no_vocab: bool,

    #[arg(long)]
    no_questions: bool,
}

impl Cli {
    // 未指定的可选项沿用默认设置
    fn settings(&self) -> ArticleRequest {
        let defaults = ArticleRequest::default();
        ArticleRequest {
            language: self.language.clone(),
            level: self.level.clone(),
            topics: self.topics.clone().or(defaults.topics),
            length: self.length.clone().or(defaults.length),
            style: self.style.clone().or(defaults.style),
            include_vocab: !self.no_vocab,
            include_questions: !self.no_questions,
        }
    }
}

// 渲染后可点击的单词
struct WordRef {
    text: String,
    anchor: Anchor,
}

fn print_commands() {
    println!("📋 命令: <编号> 查询单词 | speak <文件.mp3> | new | history | load <id> | stats | quit");
}

// 打印文章，单词前加 [编号]，返回编号对应的单词
fn render(session: &ReaderSession) -> Vec<WordRef> {
    let mut words = Vec::new();
    let Some(article) = session.article() else {
        return words;
    };

    println!();
    println!("📖 {}", article.title);
    println!();
    for (line_no, tokens) in session.article_lines().iter().enumerate() {
        let mut line = String::new();
        let mut column = 0usize;
        for token in tokens {
            if token.word_like {
                words.push(WordRef {
                    text: token.text.to_string(),
                    anchor: Anchor::new(column as f64, line_no as f64),
                });
                line.push_str(&format!("[{}]", words.len()));
            }
            line.push_str(token.text);
            column += token.text.chars().count();
        }
        println!("{}", line);
    }

    if !article.vocabulary.is_empty() {
        println!();
        println!("📝 Vocabulary");
        for v in &article.vocabulary {
            println!("   {} — {}", v.term, v.gloss);
        }
    }
    if !article.questions.is_empty() {
        println!();
        println!("❓ Questions");
        for (i, q) in article.questions.iter().enumerate() {
            println!("   {}. {}", i + 1, q);
        }
    }
    println!();
    words
}

fn print_popover(popover: &WordPopover) {
    let ann = &popover.annotation;
    let or_dash = |s: &str| if s.is_empty() { "—".to_string() } else { s.to_string() };

    println!("── {} ──", or_dash(&ann.surface));
    println!("   Lemma: {}", or_dash(&ann.lemma));
    println!("   POS: {}", or_dash(&ann.pos));
    if !ann.definition_en.is_empty() {
        println!("   Definition: {}", ann.definition_en);
    }
    for (name, value) in ann.morphology.fields() {
        if let Some(value) = value {
            println!("   {}: {}", name, value);
        }
    }
    if !ann.notes.is_empty() {
        println!("   {}", ann.notes);
    }
    println!("   ({})", popover.sentence);
}

async fn generate(client: &ReaderClient, session: &mut ReaderSession) -> Result<Vec<WordRef>> {
    let settings = session.settings();
    println!("🔄 正在生成文章: {} {} ...", settings.language, settings.level);
    let article = client.generate_article(settings).await?;
    session.show_article(article);
    Ok(render(session))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;
    init_tracing("warn");

    let server_url = cli.server.clone().unwrap_or_else(|| config.reader.server_url.clone());
    let client = Arc::new(ReaderClient::new(
        &server_url,
        Duration::from_secs(config.reader.request_timeout_seconds),
    )?);
    if !client.health().await.unwrap_or(false) {
        anyhow::bail!("无法连接服务器 {}，请先启动 lingua-reader", server_url);
    }

    let mut session = ReaderSession::with_history_limit(client.clone(), config.reader.history_limit);
    session.set_settings(cli.settings());

    let mut words = generate(&client, &mut session).await?;
    print_commands();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        let (command, rest) = line.split_once(' ').map(|(c, r)| (c, r.trim())).unwrap_or((line, ""));

        match command {
            "" => {}
            "quit" | "q" | "exit" => break,
            "new" => match generate(&client, &mut session).await {
                Ok(rendered) => words = rendered,
                Err(e) => println!("❌ {}", e),
            },
            "history" => {
                for h in session.history() {
                    println!(
                        "   [{}] {} — {} {} {}",
                        h.id,
                        h.created_at.format("%Y-%m-%d %H:%M:%S"),
                        h.settings.language,
                        h.settings.level,
                        h.article.title
                    );
                }
            }
            "load" => match rest.parse::<u64>() {
                Ok(id) if session.load_history(id) => words = render(&session),
                _ => println!("❌ 没有找到历史记录: {}", rest),
            },
            "stats" => {
                let stats = session.cache_stats();
                println!(
                    "📊 命中 {} | 查询 {} | 合并 {} | 失败 {}",
                    stats.hits, stats.misses, stats.joined, stats.failures
                );
            }
            "speak" => {
                let Some(article) = session.article() else { continue };
                let path = if rest.is_empty() { "article.mp3" } else { rest };
                let text = format!("{}\n\n{}", article.title, article.article);
                println!("🔊 正在生成语音...");
                match client.speak(&text, Some(&config.tts.default_voice)).await {
                    Ok(audio) => {
                        tokio::fs::write(path, &audio).await?;
                        println!("✅ 已保存: {} ({} 字节)", path, audio.len());
                    }
                    Err(e) => println!("❌ {}", e),
                }
            }
            number => match number.parse::<usize>().ok().and_then(|n| n.checked_sub(1)).and_then(|n| words.get(n)) {
                Some(word) => match session.prepare_click(word.anchor, &word.text) {
                    Some(click) => {
                        if click.status != LookupStatus::Cached {
                            println!("   Looking it up…");
                        }
                        let popover = session.resolve(click).await;
                        print_popover(&popover);
                    }
                    None => println!("   (不是可查询的单词)"),
                },
                None => print_commands(),
            },
        }
    }

    Ok(())
}
