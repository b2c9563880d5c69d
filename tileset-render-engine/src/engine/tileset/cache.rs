use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use bevy::prelude::*;
use bevy::tasks::{Task, block_on, futures_lite::future};
use slab::Slab;

use super::error::{FetchError, StreamError};
use super::streamer::{RequestState, TileCacheManager};
use crate::engine::loading::http_client::HttpClient;

struct PendingRequest {
    url: String,
    task: Task<Result<Vec<u8>, FetchError>>,
    cancelled: Arc<AtomicBool>,
}

struct CachedPayload {
    bytes: Vec<u8>,
    last_used: u64,
}

/// Tile payload cache with least-recently-used eviction.
///
/// At most `max_concurrent` fetches run at once; further requests wait in a
/// FIFO queue. Cancelling an in-flight fetch flags it, and when it completes it
/// is reported as [`StreamError::Aborted`] and its bytes are discarded.
pub struct LruTileCache {
    client: Arc<dyn HttpClient>,
    capacity: usize,
    max_concurrent: usize,
    resident: HashMap<String, CachedPayload>,
    pending: Slab<PendingRequest>,
    queued: VecDeque<String>,
    frame: u64,
}

impl LruTileCache {
    pub fn new(client: Arc<dyn HttpClient>, capacity: usize, max_concurrent: usize) -> Self {
        Self {
            client,
            capacity,
            max_concurrent: max_concurrent.max(1),
            resident: HashMap::new(),
            pending: Slab::with_capacity(max_concurrent.max(1)),
            queued: VecDeque::new(),
            frame: 0,
        }
    }

    pub fn in_flight(&self) -> usize {
        self.pending.len()
    }

    pub fn queued(&self) -> usize {
        self.queued.len()
    }

    fn pending_key(&self, url: &str) -> Option<usize> {
        self.pending
            .iter()
            .find(|(_, request)| request.url == url)
            .map(|(key, _)| key)
    }

    fn finish_loading(&mut self) -> Vec<StreamError> {
        let mut errors = Vec::new();
        let frame = self.frame;
        let resident = &mut self.resident;

        self.pending.retain(|_, request| {
            let Some(result) = block_on(future::poll_once(&mut request.task)) else {
                return true;
            };

            let cancelled = request.cancelled.load(Ordering::Acquire);
            match result {
                Ok(_) if cancelled => errors.push(StreamError::Aborted {
                    url: request.url.clone(),
                }),
                Ok(bytes) => {
                    resident.insert(
                        request.url.clone(),
                        CachedPayload {
                            bytes,
                            last_used: frame,
                        },
                    );
                }
                Err(error) => errors.push(error.into()),
            }
            false
        });

        errors
    }

    fn start_loading(&mut self) {
        while self.pending.len() < self.max_concurrent {
            let Some(url) = self.queued.pop_front() else {
                break;
            };

            let cancelled = Arc::new(AtomicBool::new(false));
            let flag = cancelled.clone();
            let fetch = self.client.get(&url);
            let task_url = url.clone();
            let task = bevy::tasks::IoTaskPool::get().spawn(async move {
                let result = fetch.await;
                if flag.load(Ordering::Acquire) {
                    return Err(FetchError::Aborted { url: task_url });
                }
                result
            });

            self.pending.insert(PendingRequest {
                url,
                task,
                cancelled,
            });
        }
    }

    fn evict(&mut self) {
        while self.resident.len() > self.capacity {
            let Some(oldest) = self
                .resident
                .iter()
                .min_by_key(|(_, payload)| payload.last_used)
                .map(|(url, _)| url.clone())
            else {
                break;
            };
            self.resident.remove(&oldest);
            debug!("Evicted tile payload {}", oldest);
        }
    }
}

impl TileCacheManager for LruTileCache {
    fn request(&mut self, url: &str) -> RequestState {
        if let Some(payload) = self.resident.get_mut(url) {
            payload.last_used = self.frame;
            return RequestState::Resident;
        }

        if let Some(key) = self.pending_key(url) {
            // Interest is back before the fetch finished; keep its result.
            self.pending[key].cancelled.store(false, Ordering::Release);
            return RequestState::Pending;
        }

        if !self.queued.iter().any(|queued| queued == url) {
            self.queued.push_back(url.to_string());
        }
        RequestState::Queued
    }

    fn cancel(&mut self, url: &str) {
        self.queued.retain(|queued| queued != url);
        if let Some(key) = self.pending_key(url) {
            self.pending[key].cancelled.store(true, Ordering::Release);
        }
    }

    fn payload(&self, url: &str) -> Option<&[u8]> {
        self.resident.get(url).map(|payload| payload.bytes.as_slice())
    }

    fn update(&mut self) -> Result<(), StreamError> {
        self.frame += 1;
        let errors = self.finish_loading();
        self.start_loading();
        self.evict();

        match StreamError::collect(errors) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn len(&self) -> usize {
        self.resident.len()
    }
}
