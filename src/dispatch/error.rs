use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error("collaborator rejected request: {reason}")]
    Rejected { reason: String },
    #[error("collaborator unreachable: {reason}")]
    Unreachable { reason: String },
}
