use thiserror::Error;

/// Failure of an outbound call to one of the external services.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Failed to send request to {service}")]
    Request {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} request failed with status {status}: {body}")]
    Status {
        service: &'static str,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Failed to parse {service} JSON")]
    Decode {
        service: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("{service} returned malformed data: {reason}")]
    Malformed {
        service: &'static str,
        reason: String,
    },
}

/// Failure to turn a place name into coordinates.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Location '{0}' not found")]
    NotFound(String),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Parallel series whose sequences do not share one length.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{series} series misaligned: field '{field}' has {found} entries, expected {expected}")]
pub struct MisalignedSeries {
    pub series: &'static str,
    pub field: &'static str,
    pub expected: usize,
    pub found: usize,
}
