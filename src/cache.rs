use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use serde::{Deserialize, Serialize};

use crate::error::LookupError;
use crate::models::WordAnnotation;

// 缓存键：结构化的四元组，不做字符串拼接
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    pub language: String,
    pub level: String,
    pub word: String,
    pub sentence: String,
}

impl CacheKey {
    pub fn new(
        language: impl Into<String>,
        level: impl Into<String>,
        word: impl Into<String>,
        sentence: impl Into<String>,
    ) -> Self {
        Self {
            language: language.into(),
            level: level.into(),
            word: word.into(),
            sentence: sentence.into(),
        }
    }
}

// 外部单词查询服务
#[async_trait]
pub trait WordLookup: Send + Sync {
    async fn lookup(&self, key: &CacheKey) -> Result<WordAnnotation, LookupError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupStatus {
    Cached,
    Pending,
    Missing,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    // 实际发出的外部调用次数
    pub misses: u64,
    pub joined: u64,
    pub failures: u64,
}

type PendingLookup = Shared<BoxFuture<'static, Result<Arc<WordAnnotation>, LookupError>>>;

#[derive(Default)]
struct CacheState {
    entries: HashMap<CacheKey, Arc<WordAnnotation>>,
    in_flight: HashMap<CacheKey, PendingLookup>,
    stats: CacheStats,
}

pub struct LookupCache {
    service: Arc<dyn WordLookup>,
    state: Mutex<CacheState>,
}

impl LookupCache {
    pub fn new(service: Arc<dyn WordLookup>) -> Self {
        Self {
            service,
            state: Mutex::new(CacheState::default()),
        }
    }

    // 锁只在同步代码中持有，从不跨越 await
    fn state(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // 同步路径：命中时立即返回
    pub fn cached(&self, key: &CacheKey) -> Option<Arc<WordAnnotation>> {
        self.state().entries.get(key).cloned()
    }

    pub fn status(&self, key: &CacheKey) -> LookupStatus {
        let state = self.state();
        if state.entries.contains_key(key) {
            LookupStatus::Cached
        } else if state.in_flight.contains_key(key) {
            LookupStatus::Pending
        } else {
            LookupStatus::Missing
        }
    }

    // 查询单词；失败时返回降级注释，不会写入缓存
    pub async fn lookup(&self, key: &CacheKey) -> Arc<WordAnnotation> {
        match self.try_lookup(key).await {
            Ok(annotation) => annotation,
            Err(e) => {
                tracing::warn!(word = %key.word, error = %e, "⚠️  单词查询失败，使用降级注释");
                Arc::new(WordAnnotation::degraded(&key.word, &e))
            }
        }
    }

    pub async fn try_lookup(&self, key: &CacheKey) -> Result<Arc<WordAnnotation>, LookupError> {
        let pending = {
            let mut state = self.state();
            if let Some(hit) = state.entries.get(key).cloned() {
                state.stats.hits += 1;
                tracing::debug!(word = %key.word, "缓存命中");
                return Ok(hit);
            }
            match state.in_flight.get(key).cloned() {
                Some(pending) => {
                    state.stats.joined += 1;
                    tracing::debug!(word = %key.word, "加入进行中的查询");
                    pending
                }
                None => {
                    let pending = self.start_lookup(key.clone());
                    state.in_flight.insert(key.clone(), pending.clone());
                    state.stats.misses += 1;
                    tracing::debug!(word = %key.word, "🔍 发起单词查询");
                    pending
                }
            }
        };

        let result = pending.clone().await;

        let mut state = self.state();
        // 只有第一个完成等待的调用者负责收尾
        if state.in_flight.get(key).is_some_and(|p| p.ptr_eq(&pending)) {
            state.in_flight.remove(key);
            match &result {
                Ok(annotation) => {
                    state.entries.insert(key.clone(), annotation.clone());
                }
                Err(_) => state.stats.failures += 1,
            }
        }
        result
    }

    fn start_lookup(&self, key: CacheKey) -> PendingLookup {
        let service = self.service.clone();
        async move { service.lookup(&key).await.map(Arc::new) }
            .boxed()
            .shared()
    }

    pub fn len(&self) -> usize {
        self.state().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        self.state().stats
    }

    // 会话重置：进行中的查询照常返回给等待者，但结果不再写入缓存
    pub fn clear(&self) {
        let mut state = self.state();
        state.entries.clear();
        state.in_flight.clear();
    }
}
