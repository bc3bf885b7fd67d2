//! 下游调度：面试生成与反馈报告。

pub mod error;
pub mod feedback;
pub mod generation;
pub mod traits;
pub mod types;

pub use error::DispatchError;
pub use feedback::FeedbackDispatcher;
pub use generation::{DispatchOutcome, GenerationDispatcher};
pub use traits::{FeedbackBuilder, InterviewGenerator};
pub use types::{
    FeedbackRequest, FeedbackResponse, GenerationRequest, GenerationResponse, NavigationTarget,
};
