use async_trait::async_trait;

use crate::dispatch::error::DispatchError;
use crate::dispatch::types::{
    FeedbackRequest, FeedbackResponse, GenerationRequest, GenerationResponse,
};

/// 面试生成协作方：把结构化规格换成一套面试题。
#[async_trait]
pub trait InterviewGenerator: Send + Sync {
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse, DispatchError>;
}

/// 反馈协作方：把完整转写历史换成一份反馈报告。
#[async_trait]
pub trait FeedbackBuilder: Send + Sync {
    async fn build(&self, request: FeedbackRequest) -> Result<FeedbackResponse, DispatchError>;
}

/// 未接线协作方的占位实现，所有请求以 unreachable 失败并由调度层记录。
#[derive(Debug, Default)]
pub(crate) struct UnconfiguredCollaborator;

#[async_trait]
impl InterviewGenerator for UnconfiguredCollaborator {
    async fn generate(
        &self,
        _request: GenerationRequest,
    ) -> Result<GenerationResponse, DispatchError> {
        Err(DispatchError::Unreachable {
            reason: "no interview generator configured".to_string(),
        })
    }
}

#[async_trait]
impl FeedbackBuilder for UnconfiguredCollaborator {
    async fn build(&self, _request: FeedbackRequest) -> Result<FeedbackResponse, DispatchError> {
        Err(DispatchError::Unreachable {
            reason: "no feedback builder configured".to_string(),
        })
    }
}
