//! Cache storage (the `caches` global).

use bytes::Bytes;
use hashbrown::HashMap;
use sherdor_core::types::{Request, RequestKey, Response};
use url::Url;

/// A cached request/response pair.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub key: RequestKey,
    pub url: Url,
    pub status: u16,
    pub status_text: String,
    pub headers: HashMap<String, String>,
    pub body: Bytes,
    /// Cached at timestamp (ms since epoch).
    pub cached_at: i64,
}

impl CacheEntry {
    /// Capture a network response for `request`.
    pub fn capture(request: &Request, response: Response) -> Self {
        Self {
            key: request.key(),
            url: response.url,
            status: response.status,
            status_text: response.status_text,
            headers: response.headers,
            body: response.body,
            cached_at: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Replay the entry as a response.
    pub fn to_response(&self) -> Response {
        Response {
            url: self.url.clone(),
            status: self.status,
            status_text: self.status_text.clone(),
            headers: self.headers.clone(),
            body: self.body.clone(),
            from_cache: true,
        }
    }
}

/// A named cache.
#[derive(Debug, Default)]
pub struct Cache {
    pub name: String,
    entries: HashMap<RequestKey, CacheEntry>,
}

impl Cache {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            entries: HashMap::new(),
        }
    }

    /// Match a request by method and URL.
    pub fn match_request(&self, request: &Request) -> Option<&CacheEntry> {
        self.entries.get(&request.key())
    }

    pub fn put(&mut self, entry: CacheEntry) {
        self.entries.insert(entry.key.clone(), entry);
    }

    /// Commit a batch of entries.
    pub fn put_all(&mut self, entries: impl IntoIterator<Item = CacheEntry>) {
        for entry in entries {
            self.put(entry);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// All caches of one origin, addressed by name.
#[derive(Debug, Default)]
pub struct CacheStorage {
    caches: HashMap<String, Cache>,
}

impl CacheStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a cache (creates if doesn't exist).
    pub fn open(&mut self, name: &str) -> &mut Cache {
        self.caches
            .entry(name.to_string())
            .or_insert_with(|| Cache::new(name))
    }

    pub fn get(&self, name: &str) -> Option<&Cache> {
        self.caches.get(name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.caches.contains_key(name)
    }

    /// Get all cache names.
    pub fn keys(&self) -> Vec<&str> {
        self.caches.keys().map(|s| s.as_str()).collect()
    }
}
