use thiserror::Error;

/// Result type alias for rotor operations
pub type Result<T, E = RotorError> = std::result::Result<T, E>;

/// Errors that can occur while serving a rotation request
#[derive(Error, Debug)]
pub enum RotorError {
    #[error("key-value store connection parameters are not configured")]
    StoreNotConfigured,

    #[error("store request failed: {0}")]
    StoreRequest(String),

    #[error("unexpected store response: {0}")]
    StoreProtocol(String),

    #[error("failed to load agent catalog from {path}: {reason}")]
    CatalogLoad { path: String, reason: String },

    #[error("agent catalog contains no user agents")]
    EmptyCatalog,

    #[error("internal error: {0}")]
    InternalError(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl RotorError {
    /// One-line summary for the failure body, stable across requests so
    /// callers can match on it.
    pub fn summary(&self) -> &'static str {
        match self {
            RotorError::StoreNotConfigured => {
                "Key-value store not configured. Please ensure KV_REST_API_URL and \
                 KV_REST_API_TOKEN environment variables are set."
            }
            RotorError::StoreRequest(_) | RotorError::StoreProtocol(_) => {
                "Key-value store request failed."
            }
            RotorError::CatalogLoad { .. } | RotorError::EmptyCatalog => {
                "User agent catalog could not be loaded."
            }
            RotorError::InternalError(_) | RotorError::Io(_) => "Internal server error.",
        }
    }

    /// Operator-facing remediation hint included in the failure body.
    pub fn instructions(&self) -> &'static str {
        match self {
            RotorError::StoreNotConfigured => {
                "Set KV_REST_API_URL and KV_REST_API_TOKEN (or UPSTASH_REDIS_REST_URL and \
                 UPSTASH_REDIS_REST_TOKEN) in the service environment, or add a `store` \
                 section to the configuration file."
            }
            RotorError::StoreRequest(_) | RotorError::StoreProtocol(_) => {
                "Check that the key-value store is reachable and the credentials are valid."
            }
            RotorError::CatalogLoad { .. } | RotorError::EmptyCatalog => {
                "Check the `catalog_path` entry in the configuration file and the catalog \
                 file contents."
            }
            RotorError::InternalError(_) | RotorError::Io(_) => {
                "Check the server logs for details."
            }
        }
    }
}
