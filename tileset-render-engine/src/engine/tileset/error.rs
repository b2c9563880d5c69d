use thiserror::Error;

/// Failure of a single HTTP fetch.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {message}")]
    Http { url: String, message: String },

    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    /// The request was abandoned because nothing needs its result any more.
    #[error("request to {url} was aborted")]
    Aborted { url: String },
}

/// Errors raised while parsing a tileset descriptor.
#[derive(Debug, Error)]
pub enum DescriptorError {
    #[error("invalid tileset JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cannot resolve content uri {uri} against {base}")]
    Uri { base: String, uri: String },

    #[error("tileset has no usable bounding volume on tile {0}")]
    MissingBounds(usize),
}

/// Errors surfaced by the per-frame tileset and cache updates.
#[derive(Debug, Error)]
pub enum StreamError {
    /// An in-flight request was cancelled because the tile became irrelevant.
    #[error("tile request aborted: {url}")]
    Aborted { url: String },

    #[error("fetch failed: {0}")]
    Fetch(FetchError),

    #[error("tileset descriptor {url}: {source}")]
    Descriptor {
        url: String,
        #[source]
        source: DescriptorError,
    },

    #[error("{} tile errors this frame: {}", error_count(.0), join_errors(.0))]
    Multiple(Vec<StreamError>),
}

impl StreamError {
    /// Expected steady-state aborts, as opposed to real faults.
    pub fn is_cancellation(&self) -> bool {
        match self {
            StreamError::Aborted { .. } => true,
            StreamError::Fetch(FetchError::Aborted { .. }) => true,
            StreamError::Multiple(errors) => errors.iter().all(StreamError::is_cancellation),
            _ => false,
        }
    }

    /// Fold several per-request errors into one frame error.
    /// Non-cancellation errors are kept ahead of aborts.
    pub fn collect(mut errors: Vec<StreamError>) -> Option<StreamError> {
        errors.sort_by_key(StreamError::is_cancellation);
        match errors.len() {
            0 => None,
            1 => errors.pop(),
            _ => Some(StreamError::Multiple(errors)),
        }
    }
}

impl From<FetchError> for StreamError {
    fn from(error: FetchError) -> Self {
        match error {
            FetchError::Aborted { url } => StreamError::Aborted { url },
            other => StreamError::Fetch(other),
        }
    }
}

fn error_count(errors: &[StreamError]) -> usize {
    errors.len()
}

fn join_errors(errors: &[StreamError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aborted(url: &str) -> StreamError {
        StreamError::Aborted {
            url: url.to_string(),
        }
    }

    fn http_failure(url: &str) -> StreamError {
        StreamError::Fetch(FetchError::Status {
            url: url.to_string(),
            status: 503,
        })
    }

    #[test]
    fn abort_from_fetch_is_cancellation() {
        let error = StreamError::from(FetchError::Aborted {
            url: "a.b3dm".to_string(),
        });
        assert!(error.is_cancellation());
        assert!(matches!(error, StreamError::Aborted { .. }));
    }

    #[test]
    fn mixed_batch_is_not_cancellation() {
        let batch = StreamError::collect(vec![aborted("a"), http_failure("b")]).unwrap();
        assert!(!batch.is_cancellation());

        let StreamError::Multiple(errors) = batch else {
            panic!("expected a batch");
        };
        assert!(!errors[0].is_cancellation());
    }

    #[test]
    fn all_aborts_batch_is_cancellation() {
        let batch = StreamError::collect(vec![aborted("a"), aborted("b")]).unwrap();
        assert!(batch.is_cancellation());
    }

    #[test]
    fn single_error_is_not_wrapped() {
        let error = StreamError::collect(vec![http_failure("x")]).unwrap();
        assert!(matches!(error, StreamError::Fetch(_)));
        assert!(StreamError::collect(Vec::new()).is_none());
    }
}
