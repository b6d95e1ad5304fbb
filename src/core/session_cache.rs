//! 会话缓存：缓存会议理解阶段的输出，供同一会话的后续问答复用
//!
//! - 条目在 `now - created_at < ttl` 时视为新鲜，过期条目读取时视为不存在
//! - 容量有上限：插入新会话时若已满，先清理过期条目，仍满则淘汰最早创建的条目
//! - 可选后台清理任务按固定间隔回收过期条目（`spawn_sweeper`）
//!
//! 同一 session 并发未命中时两次计算都会写入，后写者覆盖前者。

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::agents::Understanding;

pub const DEFAULT_TTL: Duration = Duration::from_secs(30 * 60);
pub const DEFAULT_CAPACITY: usize = 1024;

/// 单个缓存条目
#[derive(Debug, Clone)]
pub struct SessionCacheEntry {
    pub understanding: Understanding,
    pub created_at: Instant,
}

impl SessionCacheEntry {
    fn is_fresh(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.created_at) < ttl
    }
}

/// 进程内会话缓存（session_id -> 会议理解结果）
pub struct SessionCache {
    entries: RwLock<HashMap<String, SessionCacheEntry>>,
    ttl: Duration,
    capacity: usize,
}

impl Default for SessionCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL, DEFAULT_CAPACITY)
    }
}

impl SessionCache {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            capacity: capacity.max(1),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// 读取新鲜条目；过期条目不返回（由清理或覆盖回收）
    pub async fn get(&self, session_id: &str) -> Option<Understanding> {
        let entries = self.entries.read().await;
        let entry = entries.get(session_id)?;
        if entry.is_fresh(Instant::now(), self.ttl) {
            Some(entry.understanding.clone())
        } else {
            tracing::debug!("Session cache entry for {} expired", session_id);
            None
        }
    }

    /// 写入（覆盖同 id 的旧条目），时间戳为当前时刻
    pub async fn insert(&self, session_id: &str, understanding: Understanding) {
        let now = Instant::now();
        let mut entries = self.entries.write().await;

        if !entries.contains_key(session_id) && entries.len() >= self.capacity {
            let ttl = self.ttl;
            entries.retain(|_, e| e.is_fresh(now, ttl));
            if entries.len() >= self.capacity {
                let oldest = entries
                    .iter()
                    .min_by_key(|(_, e)| e.created_at)
                    .map(|(id, _)| id.clone());
                if let Some(id) = oldest {
                    tracing::info!("Session cache full, evicting {}", id);
                    entries.remove(&id);
                }
            }
        }

        entries.insert(
            session_id.to_string(),
            SessionCacheEntry {
                understanding,
                created_at: now,
            },
        );
    }

    pub async fn remove(&self, session_id: &str) -> bool {
        self.entries.write().await.remove(session_id).is_some()
    }

    /// 清空全部条目，返回清除数量
    pub async fn clear(&self) -> usize {
        let mut entries = self.entries.write().await;
        let n = entries.len();
        entries.clear();
        n
    }

    /// 回收过期条目，返回回收数量
    pub async fn sweep_expired(&self) -> usize {
        let now = Instant::now();
        let ttl = self.ttl;
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, e| e.is_fresh(now, ttl));
        before - entries.len()
    }

    /// 当前条目数（含尚未回收的过期条目）
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// 启动后台清理任务，token 取消后退出
    pub fn spawn_sweeper(self: &Arc<Self>, interval: Duration, token: CancellationToken) -> JoinHandle<()> {
        let cache = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        let expired = cache.sweep_expired().await;
                        if expired > 0 {
                            tracing::info!("Cleaned up {} expired sessions", expired);
                        }
                    }
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::UnderstandingRecord;

    fn understanding(name: &str) -> Understanding {
        Understanding {
            data: UnderstandingRecord {
                participants: vec![name.to_string()],
                ..Default::default()
            },
            raw_transcript: format!("{}: hi", name),
        }
    }

    const MINUTE: Duration = Duration::from_secs(60);

    #[tokio::test(start_paused = true)]
    async fn test_fresh_within_ttl_expired_after() {
        let cache = SessionCache::default();
        cache.insert("s1", understanding("Alice")).await;

        tokio::time::advance(29 * MINUTE).await;
        assert_eq!(cache.get("s1").await, Some(understanding("Alice")));

        tokio::time::advance(2 * MINUTE).await;
        assert_eq!(cache.get("s1").await, None);
        // 读取不回收
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_overwrite_resets_timestamp() {
        let cache = SessionCache::default();
        cache.insert("s1", understanding("Alice")).await;
        tokio::time::advance(20 * MINUTE).await;
        cache.insert("s1", understanding("Bob")).await;
        tokio::time::advance(20 * MINUTE).await;
        assert_eq!(cache.get("s1").await, Some(understanding("Bob")));
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_remove_and_clear() {
        let cache = SessionCache::default();
        cache.insert("a", understanding("A")).await;
        cache.insert("b", understanding("B")).await;
        assert!(cache.remove("a").await);
        assert!(!cache.remove("a").await);
        assert_eq!(cache.clear().await, 1);
        assert!(cache.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_capacity_prefers_expired_then_oldest() {
        let cache = SessionCache::new(10 * MINUTE, 2);
        cache.insert("old", understanding("Old")).await;
        tokio::time::advance(11 * MINUTE).await;
        cache.insert("mid", understanding("Mid")).await;
        tokio::time::advance(MINUTE).await;

        // 满：先回收过期的 old
        cache.insert("new", understanding("New")).await;
        assert_eq!(cache.len().await, 2);
        assert!(cache.get("mid").await.is_some());

        // 仍满且无过期：淘汰最早创建的 mid
        tokio::time::advance(MINUTE).await;
        cache.insert("newest", understanding("Newest")).await;
        assert_eq!(cache.len().await, 2);
        assert!(cache.get("mid").await.is_none());
        assert!(cache.get("new").await.is_some());
        assert!(cache.get("newest").await.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_expired() {
        let cache = SessionCache::new(MINUTE, 16);
        cache.insert("a", understanding("A")).await;
        tokio::time::advance(2 * MINUTE).await;
        cache.insert("b", understanding("B")).await;
        assert_eq!(cache.sweep_expired().await, 1);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_background_sweeper() {
        let cache = Arc::new(SessionCache::new(MINUTE, 16));
        let token = CancellationToken::new();
        let handle = cache.spawn_sweeper(Duration::from_secs(10), token.clone());

        cache.insert("a", understanding("A")).await;
        tokio::time::sleep(2 * MINUTE).await;
        assert!(cache.is_empty().await);

        token.cancel();
        handle.await.unwrap();
    }
}
