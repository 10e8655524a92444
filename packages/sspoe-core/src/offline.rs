//! Offline cache policy
//!
//! Versioned cache-first strategy for the application shell:
//!
//! - `install` precaches every shell asset, all or nothing
//! - `activate` drops every cache whose name is not the current version
//! - `fetch` answers from cache, then network; successful same-origin
//!   responses are cached on the way through, and navigations fall back to
//!   the cached index page when the network is down
//!
//! Bumping [`CACHE_VERSION`] is the only invalidation mechanism.

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;
use url::Url;

// ==================== Constants ====================

pub const CACHE_VERSION: &str = "sspoe-v1";

pub const PRECACHE_ASSETS: [&str; 7] = [
    "./",
    "./index.html",
    "./style.css",
    "./script.js",
    "./data.js",
    "./manifest.json",
    "./icons/icon-192.svg",
];

pub const NAVIGATION_FALLBACK: &str = "./index.html";

// ==================== Types ====================

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum OfflineError {
    #[error("invalid cache scope {scope}: {source}")]
    Scope {
        scope: String,
        #[source]
        source: url::ParseError,
    },
    #[error("failed to precache {asset}: {source}")]
    Fetch {
        asset: String,
        #[source]
        source: FetchError,
    },
    #[error("failed to precache {asset}: status {status}")]
    Status { asset: String, status: u16 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMode {
    Navigate,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub url: String,
    pub mode: RequestMode,
}

impl Request {
    pub fn navigate(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            mode: RequestMode::Navigate,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            mode: RequestMode::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub url: String,
    pub body: Vec<u8>,
}

impl Response {
    pub fn ok(url: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            url: url.into(),
            body: body.into(),
        }
    }
}

/// Named caches of responses keyed by absolute URL.
pub trait CacheStorage {
    fn keys(&self) -> Vec<String>;
    fn lookup(&self, cache: &str, url: &str) -> Option<Response>;
    fn put(&mut self, cache: &str, url: &str, response: Response);
    fn delete(&mut self, cache: &str) -> bool;
}

pub trait Network {
    fn fetch(&mut self, url: &str) -> Result<Response, FetchError>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryCacheStorage {
    caches: BTreeMap<String, BTreeMap<String, Response>>,
}

impl MemoryCacheStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of responses stored under `cache`.
    pub fn entry_count(&self, cache: &str) -> usize {
        self.caches.get(cache).map_or(0, BTreeMap::len)
    }
}

impl CacheStorage for MemoryCacheStorage {
    fn keys(&self) -> Vec<String> {
        self.caches.keys().cloned().collect()
    }

    fn lookup(&self, cache: &str, url: &str) -> Option<Response> {
        self.caches.get(cache)?.get(url).cloned()
    }

    fn put(&mut self, cache: &str, url: &str, response: Response) {
        self.caches
            .entry(cache.to_string())
            .or_default()
            .insert(url.to_string(), response);
    }

    fn delete(&mut self, cache: &str) -> bool {
        self.caches.remove(cache).is_some()
    }
}

/// What the shell publishes so a client can precache it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheManifest {
    pub version: String,
    pub assets: Vec<String>,
}

impl Default for CacheManifest {
    fn default() -> Self {
        Self {
            version: CACHE_VERSION.to_string(),
            assets: PRECACHE_ASSETS.iter().map(|a| a.to_string()).collect(),
        }
    }
}

// ==================== Cache policy ====================

#[derive(Debug, Clone)]
pub struct OfflineCache {
    version: String,
    scope: Url,
    assets: Vec<String>,
}

impl OfflineCache {
    /// Policy for the default shell under `scope` (e.g. `https://host/app/`).
    pub fn new(scope: &str) -> Result<Self, OfflineError> {
        Self::with_manifest(scope, CacheManifest::default())
    }

    pub fn with_manifest(scope: &str, manifest: CacheManifest) -> Result<Self, OfflineError> {
        let scope = Url::parse(scope).map_err(|source| OfflineError::Scope {
            scope: scope.to_string(),
            source,
        })?;
        Ok(Self {
            version: manifest.version,
            scope,
            assets: manifest.assets,
        })
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn manifest(&self) -> CacheManifest {
        CacheManifest {
            version: self.version.clone(),
            assets: self.assets.clone(),
        }
    }

    fn resolve(&self, url: &str) -> Option<Url> {
        self.scope.join(url).ok()
    }

    fn is_same_origin(&self, url: &Url) -> bool {
        url.origin() == self.scope.origin()
    }

    /// Precaches the shell. Nothing is stored unless every asset succeeds.
    pub fn install(
        &self,
        storage: &mut impl CacheStorage,
        network: &mut impl Network,
    ) -> Result<(), OfflineError> {
        let mut fetched = Vec::with_capacity(self.assets.len());

        for asset in &self.assets {
            let key = self
                .resolve(asset)
                .map(String::from)
                .unwrap_or_else(|| asset.clone());
            let response = network
                .fetch(&key)
                .map_err(|source| OfflineError::Fetch {
                    asset: asset.clone(),
                    source,
                })?;
            if response.status != 200 {
                return Err(OfflineError::Status {
                    asset: asset.clone(),
                    status: response.status,
                });
            }
            fetched.push((key, response));
        }

        for (key, response) in fetched {
            storage.put(&self.version, &key, response);
        }
        tracing::info!(version = %self.version, assets = self.assets.len(), "precached app shell");
        Ok(())
    }

    /// Deletes stale caches. Returns the names removed.
    pub fn activate(&self, storage: &mut impl CacheStorage) -> Vec<String> {
        let stale: Vec<String> = storage
            .keys()
            .into_iter()
            .filter(|key| *key != self.version)
            .collect();

        for key in &stale {
            tracing::info!(cache = %key, "removing old cache");
            storage.delete(key);
        }
        stale
    }

    fn match_any(&self, storage: &impl CacheStorage, key: &str) -> Option<Response> {
        storage
            .keys()
            .iter()
            .find_map(|cache| storage.lookup(cache, key))
    }

    /// Cache first, then network. `None` means the request cannot be served.
    pub fn fetch(
        &self,
        storage: &mut impl CacheStorage,
        network: &mut impl Network,
        request: &Request,
    ) -> Option<Response> {
        let resolved = self.resolve(&request.url);
        let key = resolved
            .as_ref()
            .map(|url| url.to_string())
            .unwrap_or_else(|| request.url.clone());

        if let Some(cached) = self.match_any(storage, &key) {
            return Some(cached);
        }

        match network.fetch(&key) {
            Ok(response) => {
                let same_origin = resolved.as_ref().is_some_and(|url| self.is_same_origin(url));
                if response.status == 200 && same_origin {
                    storage.put(&self.version, &key, response.clone());
                }
                Some(response)
            }
            Err(err) => {
                tracing::debug!(url = %key, error = %err, "network fetch failed");
                if request.mode != RequestMode::Navigate {
                    return None;
                }
                let fallback = self.resolve(NAVIGATION_FALLBACK)?;
                self.match_any(storage, fallback.as_str())
            }
        }
    }
}
