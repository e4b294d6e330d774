use std::collections::VecDeque;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cache::{CacheKey, CacheStats, LookupCache, LookupStatus, WordLookup};
use crate::models::{Article, ArticleRequest, WordAnnotation};
use crate::text::{Token, find_sentence, normalize_word, tokenize_article};

pub const DEFAULT_HISTORY_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Anchor {
    pub x: f64,
    pub y: f64,
}

impl Anchor {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

// 已解析但尚未查询的点击
#[derive(Debug, Clone)]
pub struct WordClick {
    pub anchor: Anchor,
    pub key: CacheKey,
    // 点击时的状态，`Cached` 以外应先显示加载中
    pub status: LookupStatus,
}

#[derive(Debug, Clone)]
pub struct WordPopover {
    pub anchor: Anchor,
    pub word: String,
    pub sentence: String,
    pub annotation: Arc<WordAnnotation>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub id: u64,
    pub created_at: DateTime<Utc>,
    pub settings: ArticleRequest,
    pub article: Article,
}

pub struct ReaderSession {
    settings: ArticleRequest,
    article: Option<Article>,
    cache: LookupCache,
    history: VecDeque<HistoryEntry>,
    history_limit: usize,
    next_history_id: u64,
}

impl ReaderSession {
    pub fn new(lookup: Arc<dyn WordLookup>) -> Self {
        Self::with_history_limit(lookup, DEFAULT_HISTORY_LIMIT)
    }

    pub fn with_history_limit(lookup: Arc<dyn WordLookup>, history_limit: usize) -> Self {
        Self {
            settings: ArticleRequest::default(),
            article: None,
            cache: LookupCache::new(lookup),
            history: VecDeque::new(),
            history_limit,
            next_history_id: 1,
        }
    }

    pub fn settings(&self) -> &ArticleRequest {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: ArticleRequest) {
        self.settings = settings;
    }

    pub fn article(&self) -> Option<&Article> {
        self.article.as_ref()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    // 显示新生成的文章，并记入历史（最新的在前）
    pub fn show_article(&mut self, article: Article) -> u64 {
        let id = self.next_history_id;
        self.next_history_id += 1;

        self.history.push_front(HistoryEntry {
            id,
            created_at: Utc::now(),
            settings: self.settings.clone(),
            article: article.clone(),
        });
        self.history.truncate(self.history_limit);
        self.article = Some(article);
        id
    }

    pub fn history(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.history.iter()
    }

    // 恢复历史记录中的设置和文章
    pub fn load_history(&mut self, id: u64) -> bool {
        let Some(entry) = self.history.iter().find(|h| h.id == id) else {
            return false;
        };
        self.settings = entry.settings.clone();
        self.article = Some(entry.article.clone());
        true
    }

    pub fn article_lines(&self) -> Vec<Vec<Token<'_>>> {
        match &self.article {
            Some(article) => tokenize_article(&article.article),
            None => Vec::new(),
        }
    }

    // 没有文章或规范化后为空时返回 `None`（点击无效）
    pub fn prepare_click(&self, anchor: Anchor, raw_token: &str) -> Option<WordClick> {
        let article = self.article.as_ref()?;
        if article.article.is_empty() {
            return None;
        }
        let word = normalize_word(raw_token)?;
        let sentence = find_sentence(&article.article, &word).to_string();

        let key = CacheKey::new(self.settings.language.clone(), self.settings.level.clone(), word, sentence);
        let status = self.cache.status(&key);
        Some(WordClick { anchor, key, status })
    }

    pub async fn resolve(&self, click: WordClick) -> WordPopover {
        let annotation = self.cache.lookup(&click.key).await;
        WordPopover {
            anchor: click.anchor,
            word: click.key.word,
            sentence: click.key.sentence,
            annotation,
        }
    }

    pub async fn on_word_click(&self, anchor: Anchor, raw_token: &str) -> Option<WordPopover> {
        let click = self.prepare_click(anchor, raw_token)?;
        Some(self.resolve(click).await)
    }
}
