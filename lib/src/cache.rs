//! Persistent memoization of word scores.
//!
//! Scores are keyed by `(word, candidate set fingerprint)`. Since a fingerprint identifies an
//! immutable set of words, a stored score never goes stale: entries are only ever added.
//!
//! A [`ScoreCache`] checks an in-process map first and then an optional durable [`CacheStore`].
//! Reads take a shared lock, so any number of readers proceed together and only wait for the
//! short in-memory insert of a writer. Durable writes are batched, and each store serialises its
//! own writers. Any failure in the durable layer is logged and treated as a cache miss.

use crate::results::WordleError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError, RwLock};

/// The default number of writes to buffer before they are flushed to the durable store.
pub const DEFAULT_CHECKPOINT_EVERY: usize = 1024;

/// Pending writes are discarded after this many checkpoints in a row fail.
const MAX_FAILED_CHECKPOINTS: usize = 3;

/// A single cached score, as it is written to a durable store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheRecord {
    pub word: String,
    pub fingerprint: String,
    pub score: f64,
}

/// Scores grouped by candidate set fingerprint, then by word.
type ScoreMap = HashMap<String, HashMap<String, f64>>;

fn lookup(map: &ScoreMap, word: &str, fingerprint: &str) -> Option<f64> {
    map.get(fingerprint)
        .and_then(|scores| scores.get(word))
        .copied()
}

fn insert(map: &mut ScoreMap, record: &CacheRecord) {
    map.entry(record.fingerprint.clone())
        .or_default()
        .insert(record.word.clone(), record.score);
}

/// A durable key-value store that backs a [`ScoreCache`].
pub trait CacheStore: Send + Sync {
    /// Looks up a single score.
    fn read(&self, word: &str, fingerprint: &str) -> Result<Option<f64>, WordleError>;
    /// Durably records every given score. Concurrent calls must not interleave.
    fn write_batch(&self, records: &[CacheRecord]) -> Result<(), WordleError>;
    /// A human-readable description of this store, used in log messages.
    fn name(&self) -> String;
}

/// Keeps scores in memory only.
#[derive(Default)]
pub struct MemoryStore {
    scores: RwLock<ScoreMap>,
}

impl CacheStore for MemoryStore {
    fn read(&self, word: &str, fingerprint: &str) -> Result<Option<f64>, WordleError> {
        let scores = self.scores.read().unwrap_or_else(PoisonError::into_inner);
        Ok(lookup(&scores, word, fingerprint))
    }

    fn write_batch(&self, records: &[CacheRecord]) -> Result<(), WordleError> {
        let mut scores = self.scores.write().unwrap_or_else(PoisonError::into_inner);
        for record in records {
            insert(&mut scores, record);
        }
        Ok(())
    }

    fn name(&self) -> String {
        "memory".to_string()
    }
}

/// Stores scores in a RON file as a list of [`CacheRecord`]s.
///
/// The file is read when the store is opened. Each batch first merges in whatever is on disk at
/// that point, then rewrites the whole file through a per-process temporary file and a rename, so
/// a crash mid-write leaves the previous contents intact.
///
/// Several processes may share one file, but there is no file lock: if two of them write at the
/// same moment, the scores in the batch that is renamed first can be lost. They are recomputed
/// and written again the next time they are needed.
#[derive(Debug)]
pub struct RonFileStore {
    path: PathBuf,
    scores: RwLock<ScoreMap>,
    write_lock: Mutex<()>,
}

impl RonFileStore {
    /// Opens the store at the given path. A missing file is treated as an empty store.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<RonFileStore, WordleError> {
        let path = path.as_ref().to_path_buf();
        let records = read_records(&path)?;
        let mut scores = ScoreMap::new();
        for record in &records {
            insert(&mut scores, record);
        }
        if !records.is_empty() {
            log::info!(
                "Loaded {} cached scores from {}",
                records.len(),
                path.display()
            );
        }
        Ok(RonFileStore {
            path,
            scores: RwLock::new(scores),
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn snapshot(&self) -> Vec<CacheRecord> {
        let scores = self.scores.read().unwrap_or_else(PoisonError::into_inner);
        let mut records: Vec<CacheRecord> = scores
            .iter()
            .flat_map(|(fingerprint, by_word)| {
                by_word.iter().map(move |(word, score)| CacheRecord {
                    word: word.clone(),
                    fingerprint: fingerprint.clone(),
                    score: *score,
                })
            })
            .collect();
        records.sort_by(|a, b| {
            a.fingerprint
                .cmp(&b.fingerprint)
                .then_with(|| a.word.cmp(&b.word))
        });
        records
    }
}

impl CacheStore for RonFileStore {
    fn read(&self, word: &str, fingerprint: &str) -> Result<Option<f64>, WordleError> {
        let scores = self.scores.read().unwrap_or_else(PoisonError::into_inner);
        Ok(lookup(&scores, word, fingerprint))
    }

    fn write_batch(&self, records: &[CacheRecord]) -> Result<(), WordleError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        // Other processes may have written to the file since it was opened.
        let on_disk = match read_records(&self.path) {
            Ok(on_disk) => on_disk,
            Err(error) => {
                log::warn!(
                    "Ignoring unreadable contents of {}: {}",
                    self.path.display(),
                    error
                );
                Vec::new()
            }
        };
        {
            let mut scores = self.scores.write().unwrap_or_else(PoisonError::into_inner);
            for record in on_disk.iter().chain(records) {
                insert(&mut scores, record);
            }
        }
        let serialized = ron::ser::to_string_pretty(&self.snapshot(), Default::default())?;
        let mut temp_path = self.path.clone().into_os_string();
        temp_path.push(format!(".{}.tmp", std::process::id()));
        fs::write(&temp_path, serialized)?;
        if let Err(error) = fs::rename(&temp_path, &self.path) {
            let _ = fs::remove_file(&temp_path);
            return Err(error.into());
        }
        Ok(())
    }

    fn name(&self) -> String {
        self.path.display().to_string()
    }
}

fn read_records(path: &Path) -> Result<Vec<CacheRecord>, WordleError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let contents = fs::read_to_string(path)?;
    if contents.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(ron::from_str(&contents)?)
}

/// Counters describing how a [`ScoreCache`] has been used.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub writes: u64,
}

/// A two-layer score cache: an in-process map in front of an optional durable store.
///
/// Pending writes are flushed to the store every `checkpoint_every` writes, on
/// [`ScoreCache::flush()`], and when the cache is dropped. If a flush fails, the writes stay
/// pending until another `checkpoint_every` writes have been made. After three failures in a row
/// they are dropped, keeping only the in-memory copy.
///
/// ```
/// use wordle_ranker::ScoreCache;
///
/// let cache = ScoreCache::in_memory();
/// cache.put("crane", "fingerprint", 5.7);
///
/// assert_eq!(cache.get("crane", "fingerprint"), Some(5.7));
/// assert_eq!(cache.get("slate", "fingerprint"), None);
/// ```
pub struct ScoreCache {
    memory: RwLock<ScoreMap>,
    pending: Mutex<Pending>,
    store: Option<Box<dyn CacheStore>>,
    checkpoint_every: usize,
    hits: AtomicU64,
    misses: AtomicU64,
    writes: AtomicU64,
}

/// Writes waiting for the next checkpoint.
#[derive(Default)]
struct Pending {
    records: Vec<CacheRecord>,
    /// The number of pending records at which the next checkpoint is taken.
    next_checkpoint: usize,
    failed_checkpoints: usize,
    warned: bool,
}

impl ScoreCache {
    /// Creates a cache that only lives as long as this process.
    pub fn in_memory() -> ScoreCache {
        ScoreCache::build(None, DEFAULT_CHECKPOINT_EVERY)
    }

    /// Creates a cache backed by the given durable store.
    pub fn with_store(store: Box<dyn CacheStore>, checkpoint_every: usize) -> ScoreCache {
        ScoreCache::build(Some(store), checkpoint_every)
    }

    /// Creates a cache backed by a [`RonFileStore`] at the given path.
    pub fn open_file<P: AsRef<Path>>(
        path: P,
        checkpoint_every: usize,
    ) -> Result<ScoreCache, WordleError> {
        Ok(ScoreCache::with_store(
            Box::new(RonFileStore::open(path)?),
            checkpoint_every,
        ))
    }

    fn build(store: Option<Box<dyn CacheStore>>, checkpoint_every: usize) -> ScoreCache {
        let checkpoint_every = checkpoint_every.max(1);
        ScoreCache {
            memory: RwLock::new(ScoreMap::new()),
            pending: Mutex::new(Pending {
                next_checkpoint: checkpoint_every,
                ..Pending::default()
            }),
            store,
            checkpoint_every,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            writes: AtomicU64::new(0),
        }
    }

    /// Looks up a score, checking memory before the durable store.
    pub fn get(&self, word: &str, fingerprint: &str) -> Option<f64> {
        let in_memory = {
            let memory = self.memory.read().unwrap_or_else(PoisonError::into_inner);
            lookup(&memory, word, fingerprint)
        };
        if in_memory.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return in_memory;
        }
        let stored = match &self.store {
            Some(store) => match store.read(word, fingerprint) {
                Ok(stored) => stored,
                Err(error) => {
                    log::warn!("Failed to read from score cache {}: {}", store.name(), error);
                    None
                }
            },
            None => None,
        };
        match stored {
            Some(score) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                let mut memory = self.memory.write().unwrap_or_else(PoisonError::into_inner);
                memory
                    .entry(fingerprint.to_string())
                    .or_default()
                    .insert(word.to_string(), score);
                Some(score)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Records a score. It is immediately visible to [`ScoreCache::get()`], and becomes durable
    /// at the next checkpoint.
    pub fn put(&self, word: &str, fingerprint: &str, score: f64) {
        let record = CacheRecord {
            word: word.to_string(),
            fingerprint: fingerprint.to_string(),
            score,
        };
        {
            let mut memory = self.memory.write().unwrap_or_else(PoisonError::into_inner);
            insert(&mut memory, &record);
        }
        self.writes.fetch_add(1, Ordering::Relaxed);
        if self.store.is_none() {
            return;
        }
        let batch = {
            let mut pending = self.lock_pending();
            pending.records.push(record);
            if pending.records.len() < pending.next_checkpoint {
                return;
            }
            std::mem::take(&mut pending.records)
        };
        self.write_to_store(batch);
    }

    /// Writes every pending score to the durable store.
    pub fn flush(&self) {
        let batch = std::mem::take(&mut self.lock_pending().records);
        if !batch.is_empty() {
            self.write_to_store(batch);
        }
    }

    fn write_to_store(&self, batch: Vec<CacheRecord>) {
        let Some(store) = &self.store else {
            return;
        };
        let result = store.write_batch(&batch);
        let mut pending = self.lock_pending();
        match result {
            Ok(()) => {
                log::info!("Flushed {} scores to {}", batch.len(), store.name());
                pending.failed_checkpoints = 0;
                pending.warned = false;
                pending.next_checkpoint = self.checkpoint_every;
            }
            Err(error) => {
                if !pending.warned {
                    log::warn!(
                        "Failed to write {} scores to {}, keeping them in memory only: {}",
                        batch.len(),
                        store.name(),
                        error
                    );
                    pending.warned = true;
                } else {
                    log::debug!(
                        "Failed to write {} scores to {}: {}",
                        batch.len(),
                        store.name(),
                        error
                    );
                }
                pending.failed_checkpoints += 1;
                if pending.failed_checkpoints >= MAX_FAILED_CHECKPOINTS {
                    log::debug!(
                        "Dropping {} scores after {} failed checkpoints",
                        batch.len(),
                        pending.failed_checkpoints
                    );
                    pending.failed_checkpoints = 0;
                } else {
                    // Keep the original order, ahead of anything queued during the write.
                    let queued = std::mem::replace(&mut pending.records, batch);
                    pending.records.extend(queued);
                }
                pending.next_checkpoint = pending.records.len() + self.checkpoint_every;
            }
        }
    }

    fn lock_pending(&self) -> MutexGuard<'_, Pending> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The number of pending writes that have not reached the durable store yet.
    pub fn num_pending(&self) -> usize {
        self.lock_pending().records.len()
    }

    /// The number of scores held in memory.
    pub fn len(&self) -> usize {
        self.memory
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(HashMap::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
        }
    }
}

impl Drop for ScoreCache {
    fn drop(&mut self) {
        self.flush();
    }
}
