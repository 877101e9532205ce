#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Record store adapters surface their backend failures here.
    #[error("Storage error: {0}")]
    Storage(String),
}
