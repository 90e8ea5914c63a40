/// Errors returned by snapshot stores.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// No snapshot has been written yet.
    #[error("No cached snapshot at {bucket}/{key}")]
    NotFound {
        /// Bucket or namespace that was read.
        bucket: String,
        /// Object key that was read.
        key: String,
    },

    /// The storage backend failed (credentials, network, permissions).
    #[error("Cache backend error: {0}")]
    Backend(String),
}

impl CacheError {
    /// Whether this error only means the snapshot does not exist yet.
    pub fn is_not_found(&self) -> bool {
        matches!(self, CacheError::NotFound { .. })
    }
}
