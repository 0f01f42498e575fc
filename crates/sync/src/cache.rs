// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Offline book cache.
//!
//! Books, reading progress, notes and highlights each live in one namespace
//! blob in the [`KeyValueStore`], keyed by book id inside the blob. A cached
//! book is the only source of truth for offline reads: callers re-fetch from
//! the remote only when [`OfflineBookCache::get_cached_book`] returns `None`.
//!
//! Every operation inherits the store's fail-soft contract. A failed persist
//! is reported through the store's observer and otherwise silent.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use kasbook_core::{
    Annotation, AnnotationKind, CacheEntry, CacheStats, ClockSource, Fields, KeyValueStore,
    ProgressRecord,
};
use serde::de::DeserializeOwned;
use serde::Serialize;

pub const BOOKS_KEY: &str = "offline_books";
pub const PROGRESS_KEY: &str = "offline_progress";
pub const NOTES_KEY: &str = "offline_notes";
pub const HIGHLIGHTS_KEY: &str = "offline_highlights";

/// Every namespace the cache owns.
pub const NAMESPACES: [&str; 4] = [BOOKS_KEY, PROGRESS_KEY, NOTES_KEY, HIGHLIGHTS_KEY];

type Books = BTreeMap<String, CacheEntry>;
type Progress = BTreeMap<String, ProgressRecord>;
type Annotations = BTreeMap<String, Vec<Annotation>>;

fn annotations_key(kind: AnnotationKind) -> &'static str {
    match kind {
        AnnotationKind::Note => NOTES_KEY,
        AnnotationKind::Highlight => HIGHLIGHTS_KEY,
    }
}

/// Caches book content and per-book reading state for offline use.
pub struct OfflineBookCache {
    store: Arc<KeyValueStore>,
    clock: Arc<dyn ClockSource>,
    /// Serializes read-modify-write cycles on the namespace blobs.
    write_lock: Mutex<()>,
}

impl OfflineBookCache {
    pub fn new(store: Arc<KeyValueStore>, clock: Arc<dyn ClockSource>) -> Self {
        OfflineBookCache {
            store,
            clock,
            write_lock: Mutex::new(()),
        }
    }

    fn load<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        self.store.get_as(key).unwrap_or_default()
    }

    fn save<T: Serialize>(&self, key: &str, value: &T) {
        self.store.set_as(key, value);
    }

    /// Apply `f` to a namespace blob under the write lock and persist it.
    fn update<T, R>(&self, key: &str, f: impl FnOnce(&mut T) -> R) -> R
    where
        T: DeserializeOwned + Serialize + Default,
    {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut blob: T = self.load(key);
        let result = f(&mut blob);
        self.save(key, &blob);
        result
    }

    /// Cache a book, replacing any previous entry in full.
    pub fn cache_book(&self, book_id: &str, book_data: Fields) -> CacheEntry {
        let entry = CacheEntry::new(book_data, self.clock.now());
        self.update(BOOKS_KEY, |books: &mut Books| {
            books.insert(book_id.to_string(), entry.clone());
        });
        tracing::debug!(book_id, "cached book");
        entry
    }

    /// Return a cached book and record the access.
    pub fn get_cached_book(&self, book_id: &str) -> Option<CacheEntry> {
        let now = self.clock.now();
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut books: Books = self.load(BOOKS_KEY);
        let entry = books.get_mut(book_id)?;
        entry.touch(now);
        let entry = entry.clone();
        self.save(BOOKS_KEY, &books);
        Some(entry)
    }

    /// Ids of cached books, most recently accessed first.
    pub fn cached_book_ids(&self) -> Vec<String> {
        let books: Books = self.load(BOOKS_KEY);
        let mut entries: Vec<(&String, &CacheEntry)> = books.iter().collect();
        entries.sort_by(|a, b| b.1.last_accessed.cmp(&a.1.last_accessed));
        entries.into_iter().map(|(id, _)| id.clone()).collect()
    }

    /// Evict one book's content. Its progress, notes and highlights stay.
    pub fn remove_book(&self, book_id: &str) -> bool {
        self.update(BOOKS_KEY, |books: &mut Books| books.remove(book_id).is_some())
    }

    /// Shallow-merge `progress` into the book's progress record.
    pub fn update_reading_progress(&self, book_id: &str, progress: Fields) -> ProgressRecord {
        let now = self.clock.now();
        self.update(PROGRESS_KEY, |all: &mut Progress| {
            let record = all.entry(book_id.to_string()).or_default();
            record.merge(progress, now);
            record.clone()
        })
    }

    /// The book's progress record, empty if none was saved.
    pub fn get_reading_progress(&self, book_id: &str) -> ProgressRecord {
        let mut all: Progress = self.load(PROGRESS_KEY);
        all.remove(book_id).unwrap_or_default()
    }

    fn save_annotation(&self, kind: AnnotationKind, book_id: &str, entry: Fields) -> Annotation {
        let annotation = Annotation::new(entry, self.clock.now());
        self.update(annotations_key(kind), |all: &mut Annotations| {
            all.entry(book_id.to_string())
                .or_default()
                .push(annotation.clone());
        });
        tracing::debug!(book_id, %kind, id = %annotation.id, "saved annotation");
        annotation
    }

    fn annotations(&self, kind: AnnotationKind, book_id: &str) -> Vec<Annotation> {
        let mut all: Annotations = self.load(annotations_key(kind));
        all.remove(book_id).unwrap_or_default()
    }

    /// Append a note to the book's notes. Returns it with its generated id.
    pub fn save_note(&self, book_id: &str, note: Fields) -> Annotation {
        self.save_annotation(AnnotationKind::Note, book_id, note)
    }

    /// Append a highlight to the book's highlights.
    pub fn save_highlight(&self, book_id: &str, highlight: Fields) -> Annotation {
        self.save_annotation(AnnotationKind::Highlight, book_id, highlight)
    }

    /// Notes for a book in the order they were saved.
    pub fn get_notes(&self, book_id: &str) -> Vec<Annotation> {
        self.annotations(AnnotationKind::Note, book_id)
    }

    /// Highlights for a book in the order they were saved.
    pub fn get_highlights(&self, book_id: &str) -> Vec<Annotation> {
        self.annotations(AnnotationKind::Highlight, book_id)
    }

    /// Delete all four namespaces.
    pub fn clear_cache(&self) {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        for key in NAMESPACES {
            self.store.delete(key);
        }
        tracing::info!("cleared offline cache");
    }

    /// Book count and approximate serialized size of all namespaces.
    pub fn get_cache_stats(&self) -> CacheStats {
        let books: Books = self.load(BOOKS_KEY);
        let total_bytes: usize = NAMESPACES
            .iter()
            .filter_map(|key| self.store.get(key))
            .map(|value| value.to_string().len())
            .sum();
        CacheStats::new(books.len(), u64::try_from(total_bytes).unwrap_or(u64::MAX))
    }
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
