use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::keys::Namespace;
use crate::model::BookId;
use crate::service::ReadingService;
use crate::store::KvStore;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReadingStats {
    pub words_read: u64,
    pub pages_read: u64,
    /// Words per minute.
    pub reading_speed: f64,
    pub last_read: Option<DateTime<Utc>>,
    /// Seconds.
    pub total_reading_time: f64,
}

/// Fields to overwrite on [`ReadingStats`]; `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatsUpdate {
    pub words_read: Option<u64>,
    pub pages_read: Option<u64>,
    pub reading_speed: Option<f64>,
    pub total_reading_time: Option<f64>,
}

impl ReadingStats {
    fn apply(&mut self, update: &StatsUpdate) {
        if let Some(words) = update.words_read {
            self.words_read = words;
        }
        if let Some(pages) = update.pages_read {
            self.pages_read = pages;
        }
        if let Some(speed) = update.reading_speed {
            self.reading_speed = speed;
        }
        if let Some(time) = update.total_reading_time {
            self.total_reading_time = time;
        }
    }
}

impl<S: KvStore> ReadingService<S> {
    pub fn get_stats(&mut self, book_id: &BookId) -> ReadingStats {
        let key = self.storage.book_key(Namespace::ReadingStats, book_id);
        self.storage.read(&key, ReadingStats::default())
    }

    /// Overwrites the given fields and stamps `last_read`.
    pub fn update_stats(&mut self, book_id: &BookId, update: &StatsUpdate) -> ReadingStats {
        self.update_stats_at(book_id, update, Utc::now())
    }

    pub fn update_stats_at(
        &mut self,
        book_id: &BookId,
        update: &StatsUpdate,
        now: DateTime<Utc>,
    ) -> ReadingStats {
        let mut stats = self.get_stats(book_id);
        stats.apply(update);
        stats.last_read = Some(now);
        self.put_stats(book_id, &stats);
        stats
    }

    /// Adds one reading session to the running totals and recomputes the
    /// reading speed over the accumulated time.
    pub fn record_session(
        &mut self,
        book_id: &BookId,
        words: u64,
        pages: u64,
        seconds: f64,
    ) -> ReadingStats {
        self.record_session_at(book_id, words, pages, seconds, Utc::now())
    }

    pub fn record_session_at(
        &mut self,
        book_id: &BookId,
        words: u64,
        pages: u64,
        seconds: f64,
        now: DateTime<Utc>,
    ) -> ReadingStats {
        let mut stats = self.get_stats(book_id);
        if !seconds.is_finite() {
            tracing::warn!(book_id = %book_id, seconds, "ignoring reading session with non-finite length");
            return stats;
        }
        stats.words_read = stats.words_read.saturating_add(words);
        stats.pages_read = stats.pages_read.saturating_add(pages);
        stats.total_reading_time += seconds.max(0.0);
        if stats.total_reading_time > 0.0 {
            stats.reading_speed = stats.words_read as f64 / (stats.total_reading_time / 60.0);
        }
        stats.last_read = Some(now);
        self.put_stats(book_id, &stats);
        stats
    }

    fn put_stats(&mut self, book_id: &BookId, stats: &ReadingStats) {
        let key = self.storage.book_key(Namespace::ReadingStats, book_id);
        if !self.storage.write(&key, stats) {
            tracing::warn!(book_id = %book_id, "reading stats not persisted");
        }
        tracing::debug!(book_id = %book_id, words_read = stats.words_read, pages_read = stats.pages_read, "updated reading stats");
    }
}
