use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    #[error("provider rejected start request: {reason}")]
    StartRejected { reason: String },
    #[error("provider stop failed: {reason}")]
    StopFailed { reason: String },
    #[error("no active call to operate on")]
    NotConnected,
}
