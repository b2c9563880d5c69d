//! HTTP GET abstraction so fetches can be mocked in tests.
//!
//! Native builds use reqwest's blocking client from inside the IO task pool;
//! WASM builds use the browser fetch API through reqwest's async client.

use std::sync::Arc;

use bevy::prelude::*;
use bevy::tasks::{BoxedFuture, IoTaskPool, Task};

use crate::engine::tileset::error::FetchError;

pub trait HttpClient: Send + Sync + 'static {
    /// Fetch the full body of `url`.
    fn get(&self, url: &str) -> BoxedFuture<'static, Result<Vec<u8>, FetchError>>;
}

/// Client shared by every system that reaches the network.
#[derive(Resource, Clone, Deref)]
pub struct SharedHttpClient(pub Arc<dyn HttpClient>);

/// Spawn a fetch on the IO task pool. Poll the task, never await it on the frame.
pub fn spawn_fetch(client: &dyn HttpClient, url: &str) -> Task<Result<Vec<u8>, FetchError>> {
    IoTaskPool::get().spawn(client.get(url))
}

/// IO threads left free for the descriptor and terrain fetches.
const RESERVED_IO_THREADS: usize = 2;

/// Tile fetches allowed in flight at once. Native fetches block an IO pool
/// thread each, so they are capped below the pool size.
pub fn concurrent_fetch_limit(requested: usize) -> usize {
    #[cfg(not(target_arch = "wasm32"))]
    {
        match IoTaskPool::try_get() {
            Some(pool) => fetch_limit_for_threads(requested, pool.thread_num()),
            None => requested.max(1),
        }
    }

    #[cfg(target_arch = "wasm32")]
    {
        requested.max(1)
    }
}

pub fn fetch_limit_for_threads(requested: usize, io_threads: usize) -> usize {
    requested
        .min(io_threads.saturating_sub(RESERVED_IO_THREADS))
        .max(1)
}

/// Real HTTP client implementation using reqwest.
#[derive(Clone)]
pub struct ReqwestClient {
    #[cfg(not(target_arch = "wasm32"))]
    client: reqwest::blocking::Client,
    #[cfg(target_arch = "wasm32")]
    client: reqwest::Client,
}

impl ReqwestClient {
    #[cfg(not(target_arch = "wasm32"))]
    pub fn new() -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| FetchError::Http {
                url: String::new(),
                message: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self { client })
    }

    #[cfg(target_arch = "wasm32")]
    pub fn new() -> Result<Self, FetchError> {
        Ok(Self {
            client: reqwest::Client::new(),
        })
    }
}

impl HttpClient for ReqwestClient {
    #[cfg(not(target_arch = "wasm32"))]
    fn get(&self, url: &str) -> BoxedFuture<'static, Result<Vec<u8>, FetchError>> {
        let client = self.client.clone();
        let url = url.to_string();

        Box::pin(async move {
            let response = client.get(&url).send().map_err(|e| http_error(&url, e))?;

            if !response.status().is_success() {
                return Err(FetchError::Status {
                    status: response.status().as_u16(),
                    url,
                });
            }

            response
                .bytes()
                .map(|b| b.to_vec())
                .map_err(|e| http_error(&url, e))
        })
    }

    #[cfg(target_arch = "wasm32")]
    fn get(&self, url: &str) -> BoxedFuture<'static, Result<Vec<u8>, FetchError>> {
        let client = self.client.clone();
        let url = url.to_string();

        Box::pin(async move {
            let response = client
                .get(&url)
                .send()
                .await
                .map_err(|e| http_error(&url, e))?;

            if !response.status().is_success() {
                return Err(FetchError::Status {
                    status: response.status().as_u16(),
                    url,
                });
            }

            response
                .bytes()
                .await
                .map(|b| b.to_vec())
                .map_err(|e| http_error(&url, e))
        })
    }
}

fn http_error(url: &str, error: reqwest::Error) -> FetchError {
    FetchError::Http {
        url: url.to_string(),
        message: error.to_string(),
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Mock HTTP client serving canned bodies by URL.
    #[derive(Default)]
    pub struct MockHttpClient {
        pub responses: HashMap<String, Result<Vec<u8>, FetchError>>,
        pub requests: AtomicUsize,
    }

    impl MockHttpClient {
        pub fn with(mut self, url: &str, body: &[u8]) -> Self {
            self.responses.insert(url.to_string(), Ok(body.to_vec()));
            self
        }

        pub fn failing(mut self, url: &str, status: u16) -> Self {
            self.responses.insert(
                url.to_string(),
                Err(FetchError::Status {
                    url: url.to_string(),
                    status,
                }),
            );
            self
        }

        pub fn request_count(&self) -> usize {
            self.requests.load(Ordering::SeqCst)
        }
    }

    impl HttpClient for MockHttpClient {
        fn get(&self, url: &str) -> BoxedFuture<'static, Result<Vec<u8>, FetchError>> {
            self.requests.fetch_add(1, Ordering::SeqCst);
            let response = self.responses.get(url).cloned().unwrap_or_else(|| {
                Err(FetchError::Status {
                    url: url.to_string(),
                    status: 404,
                })
            });
            Box::pin(async move { response })
        }
    }

    #[test]
    fn blocking_fetches_leave_io_threads_free() {
        assert_eq!(fetch_limit_for_threads(8, 16), 8);
        assert_eq!(fetch_limit_for_threads(8, 6), 4);
        assert_eq!(fetch_limit_for_threads(8, 2), 1);
        assert_eq!(fetch_limit_for_threads(8, 1), 1);
        assert_eq!(fetch_limit_for_threads(0, 16), 1);
    }

    #[test]
    fn mock_serves_known_and_missing_urls() {
        let mock = MockHttpClient::default().with("http://a/ok", b"body");

        let ok = bevy::tasks::block_on(mock.get("http://a/ok"));
        assert_eq!(ok.unwrap(), b"body".to_vec());

        let missing = bevy::tasks::block_on(mock.get("http://a/missing"));
        assert!(matches!(missing, Err(FetchError::Status { status: 404, .. })));
        assert_eq!(mock.request_count(), 2);
    }
}
