//! Best-effort illustrations for won puzzles.
//!
//! Lookups go cache first, then join a generation already in flight for the
//! same (word, language), and only then call the external generator. The
//! in-flight table is process-local: two server processes can still both
//! generate the same artifact, and the unique cache key keeps only one.
//! Failures never reach the caller; they are logged and queued for retry.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use serde::{Deserialize, Serialize};

use crate::domain::{Clock, ContentKey, ContentRequest, Illustration};
use crate::error::GameError;
use crate::persistence::ContentStore;

/// The external image generator.
#[async_trait]
pub trait ImageGenerator: Send + Sync + fmt::Debug {
    /// Produces an artifact for `request` and returns where it lives.
    async fn generate(&self, request: &ContentRequest) -> Result<Illustration, GameError>;
}

#[derive(Debug, Deserialize)]
struct GeneratedImage {
    url: String,
    #[serde(default)]
    cached: bool,
}

#[derive(Debug, Serialize)]
struct GenerateBody<'a> {
    word: &'a str,
    language: &'a str,
    description: &'a str,
}

/// Generator reached over HTTP: `POST {endpoint}` with a JSON body of
/// `{word, language, description}`, answered by `{url, cached}`.
#[derive(Debug, Clone)]
pub struct HttpImageGenerator {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpImageGenerator {
    /// Creates a client for `endpoint` with a per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Content`] if the HTTP client cannot be built.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, GameError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GameError::Content(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl ImageGenerator for HttpImageGenerator {
    async fn generate(&self, request: &ContentRequest) -> Result<Illustration, GameError> {
        let body = GenerateBody {
            word: &request.word,
            language: &request.language,
            description: &request.description,
        };
        let image: GeneratedImage = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| GameError::Content(e.to_string()))?
            .json()
            .await
            .map_err(|e| GameError::Content(e.to_string()))?;
        Ok(Illustration {
            url: image.url,
            cached: image.cached,
        })
    }
}

type Generation = Shared<BoxFuture<'static, Option<String>>>;
type InFlight = Arc<Mutex<HashMap<ContentKey, Generation>>>;

/// Removes its key from the in-flight table when the generation future
/// finishes, fails, panics or is dropped unpolled.
struct InFlightGuard {
    table: InFlight,
    key: ContentKey,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.table
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}

/// Cache-backed, de-duplicated access to the image generator.
#[derive(Clone)]
pub struct IllustrationService {
    store: Arc<dyn ContentStore>,
    generator: Arc<dyn ImageGenerator>,
    clock: Arc<dyn Clock>,
    in_flight: InFlight,
}

impl fmt::Debug for IllustrationService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IllustrationService")
            .field("generator", &self.generator)
            .field("in_flight", &self.in_flight_count())
            .finish_non_exhaustive()
    }
}

impl IllustrationService {
    /// Creates a new `IllustrationService`.
    #[must_use]
    pub fn new(
        store: Arc<dyn ContentStore>,
        generator: Arc<dyn ImageGenerator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            generator,
            clock,
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Number of generations currently running.
    #[must_use]
    pub fn in_flight_count(&self) -> usize {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns an illustration for `request`, or `None` if none could be
    /// produced. Never fails.
    pub async fn illustrate(&self, request: &ContentRequest) -> Option<Illustration> {
        let key = request.key();
        match self.store.cached_content(&key).await {
            Ok(Some(url)) => return Some(Illustration { url, cached: true }),
            Ok(None) => {}
            Err(e) => tracing::warn!(content = %key, error = %e, "content cache lookup failed"),
        }

        let generation = self.join_or_start(key, request);
        generation.await.map(|url| Illustration { url, cached: false })
    }

    /// Starts generating `request` in the background unless it is cached or
    /// already being generated. Returns immediately.
    pub fn prewarm(&self, request: ContentRequest) {
        let this = self.clone();
        tokio::spawn(async move {
            let _ = this.illustrate(&request).await;
        });
    }

    fn join_or_start(&self, key: ContentKey, request: &ContentRequest) -> Generation {
        let mut table = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = table.get(&key) {
            tracing::debug!(content = %key, "joining in-flight generation");
            return existing.clone();
        }

        let guard = InFlightGuard {
            table: Arc::clone(&self.in_flight),
            key: key.clone(),
        };
        let store = Arc::clone(&self.store);
        let generator = Arc::clone(&self.generator);
        let clock = Arc::clone(&self.clock);
        let request = request.clone();
        let generation = async move {
            let _guard = guard;
            let key = request.key();
            match generator.generate(&request).await {
                Ok(image) => {
                    if let Err(e) = store.store_content(&key, &image.url, clock.now()).await {
                        tracing::warn!(content = %key, error = %e, "failed to cache illustration");
                    }
                    tracing::info!(content = %key, "illustration generated");
                    Some(image.url)
                }
                Err(e) => {
                    tracing::warn!(content = %key, error = %e, "illustration generation failed");
                    if let Err(qe) = store.enqueue_retry(&request, &e.to_string(), clock.now()).await {
                        tracing::warn!(content = %key, error = %qe, "failed to queue illustration retry");
                    }
                    None
                }
            }
        }
        .boxed()
        .shared();

        table.insert(key, generation.clone());
        generation
    }
}
