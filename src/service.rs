use crate::error::ServiceError;

/// The narrow surface the pipeline needs from a compression backend.
///
/// The live implementation is [`crate::tinify::TinifyClient`]; tests plug in
/// an in-memory double.
pub trait CompressionService {
    /// Checks the configured key with a single round-trip. Also primes
    /// [`current_usage_count`](Self::current_usage_count).
    fn validate_credential(&self) -> Result<(), ServiceError>;

    /// Compressions already used in the current billing period, as last
    /// reported by the service.
    fn current_usage_count(&self) -> Result<u64, ServiceError>;

    /// Sends an image and returns the compressed bytes.
    fn compress_file(&self, bytes: &[u8]) -> Result<Vec<u8>, ServiceError>;
}

impl<S: CompressionService + ?Sized> CompressionService for &S {
    fn validate_credential(&self) -> Result<(), ServiceError> {
        (**self).validate_credential()
    }

    fn current_usage_count(&self) -> Result<u64, ServiceError> {
        (**self).current_usage_count()
    }

    fn compress_file(&self, bytes: &[u8]) -> Result<Vec<u8>, ServiceError> {
        (**self).compress_file(bytes)
    }
}
