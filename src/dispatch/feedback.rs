use std::sync::Arc;

use tracing::{info, warn};

use crate::dispatch::traits::FeedbackBuilder;
use crate::dispatch::types::{FeedbackRequest, NavigationTarget};
use crate::session::router::TranscriptMessage;
use crate::telemetry::events::record_feedback_dispatch;

/// 反馈调度器。
///
/// 通话进入终态后以完整转写历史发出一次请求：成功导航到反馈视图，
/// 失败退回首页，均不重试。
pub struct FeedbackDispatcher {
    session_id: String,
    builder: Arc<dyn FeedbackBuilder>,
}

impl FeedbackDispatcher {
    pub fn new<S: Into<String>>(session_id: S, builder: Arc<dyn FeedbackBuilder>) -> Self {
        Self {
            session_id: session_id.into(),
            builder,
        }
    }

    pub async fn dispatch(
        &self,
        session_artifact_id: &str,
        subject_id: &str,
        transcript: Vec<TranscriptMessage>,
    ) -> NavigationTarget {
        let transcript_len = transcript.len();
        let request = FeedbackRequest {
            session_artifact_id: session_artifact_id.to_string(),
            subject_id: subject_id.to_string(),
            transcript,
        };

        let target = match self.builder.build(request).await {
            Ok(response) if response.success => {
                // 协作方未返回制品 id 时退回会话制品 id 作为视图键。
                let artifact_id = response
                    .artifact_id
                    .unwrap_or_else(|| session_artifact_id.to_string());
                info!(
                    target: "feedback_dispatch",
                    session_id = %self.session_id,
                    artifact_id = %artifact_id,
                    "feedback report created"
                );
                NavigationTarget::FeedbackView { artifact_id }
            }
            Ok(_) => {
                warn!(
                    target: "feedback_dispatch",
                    session_id = %self.session_id,
                    "feedback collaborator reported failure"
                );
                NavigationTarget::Home
            }
            Err(err) => {
                warn!(
                    target: "feedback_dispatch",
                    session_id = %self.session_id,
                    %err,
                    "feedback request failed"
                );
                NavigationTarget::Home
            }
        };

        record_feedback_dispatch(&self.session_id, target.as_str(), transcript_len);
        target
    }
}
