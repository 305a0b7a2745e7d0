//! In-memory chat sessions keyed by the session cookie.
//!
//! Sessions idle longer than `chat.session_ttl_secs` are swept on access,
//! and once `chat.max_sessions` is reached the least recently used one is
//! evicted to make room.

use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

use lru::LruCache;
use tracing::debug;
use uuid::Uuid;

use editais_client::chat::ChatWidget;
use editais_common::config::ChatConfig;

struct Session {
    widget: ChatWidget,
    last_used: Instant,
}

pub struct ChatSessions {
    sessions: LruCache<Uuid, Session>,
    idle_ttl: Duration,
}

impl ChatSessions {
    pub fn new(config: &ChatConfig) -> Self {
        let cap = NonZeroUsize::new(config.max_sessions).unwrap_or(NonZeroUsize::MIN);
        Self {
            sessions: LruCache::new(cap),
            idle_ttl: Duration::from_secs(config.session_ttl_secs),
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// The widget for `id`, if the session is still alive.
    pub fn get_mut(&mut self, id: &Uuid) -> Option<&mut ChatWidget> {
        self.get_mut_at(id, Instant::now())
    }

    /// The widget for `id`, creating a fresh one when absent.
    pub fn get_or_insert(&mut self, id: Uuid) -> &mut ChatWidget {
        self.get_or_insert_at(id, Instant::now())
    }

    fn get_mut_at(&mut self, id: &Uuid, now: Instant) -> Option<&mut ChatWidget> {
        self.sweep(now);
        let session = self.sessions.get_mut(id)?;
        session.last_used = now;
        Some(&mut session.widget)
    }

    fn get_or_insert_at(&mut self, id: Uuid, now: Instant) -> &mut ChatWidget {
        self.sweep(now);
        if !self.sessions.contains(&id) && self.sessions.len() == self.sessions.cap().get() {
            if let Some((evicted, _)) = self.sessions.pop_lru() {
                debug!(session = %evicted, "Evicting least recently used chat session");
            }
        }
        let session = self.sessions.get_or_insert_mut(id, || Session {
            widget: ChatWidget::new(),
            last_used: now,
        });
        session.last_used = now;
        &mut session.widget
    }

    /// Drops sessions idle for at least the TTL. LRU order matches
    /// `last_used` order, so only the cold end needs checking.
    fn sweep(&mut self, now: Instant) -> usize {
        let mut expired = 0;
        loop {
            let stale = matches!(
                self.sessions.peek_lru(),
                Some((_, s)) if now.saturating_duration_since(s.last_used) >= self.idle_ttl
            );
            if !stale {
                break;
            }
            self.sessions.pop_lru();
            expired += 1;
        }
        if expired > 0 {
            debug!(expired, remaining = self.sessions.len(), "Swept idle chat sessions");
        }
        expired
    }
}
