use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::dispatch::traits::InterviewGenerator;
use crate::dispatch::types::GenerationRequest;
use crate::extract::ExtractedSpecification;
use crate::telemetry::events::record_generation_dispatch;

/// 本次派发的结局。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Completed { artifact_id: Option<String> },
    Failed,
    AlreadyDispatched,
}

impl DispatchOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            DispatchOutcome::Completed { .. } => "completed",
            DispatchOutcome::Failed => "failed",
            DispatchOutcome::AlreadyDispatched => "already_dispatched",
        }
    }
}

/// 生成调度器：一个会话内至多发出一次下游请求。
///
/// 助手可能重复说出触发话术，重复派发是 no-op。下游失败记录后吞掉，
/// 不做重试：产生这份规格的对话上下文已经结束，重试只会基于过期转写
/// 重新推导。
pub struct GenerationDispatcher {
    session_id: String,
    generator: Arc<dyn InterviewGenerator>,
    dispatched: AtomicBool,
}

impl GenerationDispatcher {
    pub fn new<S: Into<String>>(session_id: S, generator: Arc<dyn InterviewGenerator>) -> Self {
        Self {
            session_id: session_id.into(),
            generator,
            dispatched: AtomicBool::new(false),
        }
    }

    pub fn has_dispatched(&self) -> bool {
        self.dispatched.load(Ordering::SeqCst)
    }

    pub async fn dispatch(
        &self,
        specification: ExtractedSpecification,
        subject_id: &str,
    ) -> DispatchOutcome {
        if self.dispatched.swap(true, Ordering::SeqCst) {
            debug!(
                target: "generation_dispatch",
                session_id = %self.session_id,
                "duplicate generation trigger ignored"
            );
            return DispatchOutcome::AlreadyDispatched;
        }

        let question_count = specification.question_count;
        let request = GenerationRequest::from_specification(specification, subject_id);

        let outcome = match self.generator.generate(request).await {
            Ok(response) if response.success => {
                info!(
                    target: "generation_dispatch",
                    session_id = %self.session_id,
                    artifact_id = response.artifact_id.as_deref().unwrap_or("unknown"),
                    "interview generation dispatched"
                );
                DispatchOutcome::Completed {
                    artifact_id: response.artifact_id,
                }
            }
            Ok(_) => {
                warn!(
                    target: "generation_dispatch",
                    session_id = %self.session_id,
                    "generation collaborator reported failure"
                );
                DispatchOutcome::Failed
            }
            Err(err) => {
                warn!(
                    target: "generation_dispatch",
                    session_id = %self.session_id,
                    %err,
                    "generation request failed"
                );
                DispatchOutcome::Failed
            }
        };

        record_generation_dispatch(&self.session_id, outcome.as_str(), question_count);
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::error::DispatchError;
    use crate::dispatch::types::GenerationResponse;
    use crate::extract::{ExperienceLevel, InterviewFocus};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct RecordingGenerator {
        requests: Mutex<Vec<GenerationRequest>>,
        response: Result<GenerationResponse, DispatchError>,
    }

    impl RecordingGenerator {
        fn new(response: Result<GenerationResponse, DispatchError>) -> Self {
            Self {
                requests: Mutex::new(Vec::new()),
                response,
            }
        }

        fn request_count(&self) -> usize {
            self.requests.lock().expect("requests lock poisoned").len()
        }
    }

    #[async_trait]
    impl InterviewGenerator for RecordingGenerator {
        async fn generate(
            &self,
            request: GenerationRequest,
        ) -> Result<GenerationResponse, DispatchError> {
            self.requests
                .lock()
                .expect("requests lock poisoned")
                .push(request);
            self.response.clone()
        }
    }

    fn specification() -> ExtractedSpecification {
        ExtractedSpecification {
            role: "Backend Developer".into(),
            focus: InterviewFocus::Behavioral,
            experience_level: ExperienceLevel::Senior,
            tech_stack: vec!["Go".into()],
            question_count: 8,
        }
    }

    #[tokio::test]
    async fn dispatches_exactly_once() {
        let generator = Arc::new(RecordingGenerator::new(Ok(GenerationResponse {
            success: true,
            artifact_id: Some("interview-1".into()),
        })));
        let dispatcher = GenerationDispatcher::new("session-1", generator.clone());

        let first = dispatcher.dispatch(specification(), "user-1").await;
        let second = dispatcher.dispatch(specification(), "user-1").await;

        assert_eq!(
            first,
            DispatchOutcome::Completed {
                artifact_id: Some("interview-1".into())
            }
        );
        assert_eq!(second, DispatchOutcome::AlreadyDispatched);
        assert_eq!(generator.request_count(), 1);
        assert!(dispatcher.has_dispatched());
    }

    #[tokio::test]
    async fn downstream_failure_is_swallowed() {
        let generator = Arc::new(RecordingGenerator::new(Err(DispatchError::Unreachable {
            reason: "503".into(),
        })));
        let dispatcher = GenerationDispatcher::new("session-2", generator.clone());

        let outcome = dispatcher.dispatch(specification(), "user-1").await;
        assert_eq!(outcome, DispatchOutcome::Failed);

        // A failed dispatch still consumes the session's single attempt.
        let retry = dispatcher.dispatch(specification(), "user-1").await;
        assert_eq!(retry, DispatchOutcome::AlreadyDispatched);
        assert_eq!(generator.request_count(), 1);
    }

    #[tokio::test]
    async fn unsuccessful_response_maps_to_failed() {
        let generator = Arc::new(RecordingGenerator::new(Ok(GenerationResponse {
            success: false,
            artifact_id: None,
        })));
        let dispatcher = GenerationDispatcher::new("session-3", generator);

        let outcome = dispatcher.dispatch(specification(), "user-1").await;
        assert_eq!(outcome, DispatchOutcome::Failed);
    }

    #[tokio::test]
    async fn request_carries_specification_and_subject() {
        let generator = Arc::new(RecordingGenerator::new(Ok(GenerationResponse {
            success: true,
            artifact_id: None,
        })));
        let dispatcher = GenerationDispatcher::new("session-4", generator.clone());

        dispatcher.dispatch(specification(), "user-42").await;

        let requests = generator.requests.lock().expect("requests lock poisoned");
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].subject_id, "user-42");
        assert_eq!(requests[0].role, "Backend Developer");
        assert_eq!(requests[0].question_count, 8);
    }
}
