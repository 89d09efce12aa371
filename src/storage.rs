use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;

use tracing::{error, info};

use crate::error::CrawlError;

/// Object key for one game's table. Game ids are unique upstream, so keys are too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StorageKey {
    pub game_pk: i64,
}

impl StorageKey {
    pub fn for_game(game_pk: i64) -> Self {
        Self { game_pk }
    }

    pub fn key(&self) -> String {
        format!("{}.csv", self.game_pk)
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.csv", self.game_pk)
    }
}

/// A bucket-scoped put-object primitive.
pub trait ObjectStore {
    fn put_object(&self, bucket: &str, key: &str, body: &[u8]) -> Result<(), CrawlError>;
}

impl<T: ObjectStore + ?Sized> ObjectStore for &T {
    fn put_object(&self, bucket: &str, key: &str, body: &[u8]) -> Result<(), CrawlError> {
        (**self).put_object(bucket, key, body)
    }
}

/// Writes game tables into one bucket. No internal retry.
#[derive(Debug, Clone)]
pub struct Storage<S> {
    bucket: String,
    store: S,
}

impl<S: ObjectStore> Storage<S> {
    pub fn new(bucket: impl Into<String>, store: S) -> Self {
        Self {
            bucket: bucket.into(),
            store,
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Write `payload` under `key`, logging the outcome either way.
    pub fn store_game(&self, key: &StorageKey, payload: &[u8]) -> Result<(), CrawlError> {
        let key_str = key.key();
        match self.store.put_object(&self.bucket, &key_str, payload) {
            Ok(()) => {
                info!(bucket = %self.bucket, key = %key_str, bytes = payload.len(), "Stored game");
                Ok(())
            }
            Err(e) => {
                error!(bucket = %self.bucket, key = %key_str, error = %e, "Failed to store game");
                Err(e)
            }
        }
    }
}

/// In-process store, used for dry runs and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: RefCell<BTreeMap<(String, String), Vec<u8>>>,
    puts: Cell<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        self.objects
            .borrow()
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    /// Keys stored in `bucket`, sorted.
    pub fn keys(&self, bucket: &str) -> Vec<String> {
        self.objects
            .borrow()
            .keys()
            .filter(|(b, _)| b == bucket)
            .map(|(_, k)| k.clone())
            .collect()
    }

    /// Number of successful `put_object` calls, including overwrites.
    pub fn put_count(&self) -> usize {
        self.puts.get()
    }
}

impl ObjectStore for MemoryStore {
    fn put_object(&self, bucket: &str, key: &str, body: &[u8]) -> Result<(), CrawlError> {
        self.objects
            .borrow_mut()
            .insert((bucket.to_string(), key.to_string()), body.to_vec());
        self.puts.set(self.puts.get() + 1);
        Ok(())
    }
}
