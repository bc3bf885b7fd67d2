//! 通话会话编排脚手架。

pub mod lifecycle;
pub mod router;
pub mod runtime;

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::{broadcast, mpsc};
use tracing::info;

use crate::dispatch::traits::UnconfiguredCollaborator;
use crate::dispatch::{FeedbackBuilder, InterviewGenerator, NavigationTarget};
use crate::provider::{SessionTimingConfig, SimulatedCallProvider, VoiceCallProvider};
use crate::session::lifecycle::{CallPurpose, PhaseUpdate};
use crate::session::router::TranscriptMessage;
use crate::session::runtime::CallSessionHandle;

const UPDATE_BROADCAST_CAPACITY: usize = 64;
const LIFECYCLE_BROADCAST_CAPACITY: usize = 32;

/// 一次通话的输入描述。
#[derive(Debug, Clone)]
pub struct SessionDescriptor {
    pub session_id: String,
    pub purpose: CallPurpose,
    pub subject_id: String,
    /// 计分面试读写的制品引用；规格收集通话无需提供。
    pub session_artifact_id: Option<String>,
    pub display_name: String,
    /// 计分面试朗读的固定题目。
    pub questions: Vec<String>,
}

impl SessionDescriptor {
    /// 规格收集通话。
    pub fn generate<S: Into<String>>(session_id: S, subject_id: S, display_name: S) -> Self {
        Self {
            session_id: session_id.into(),
            purpose: CallPurpose::Generate,
            subject_id: subject_id.into(),
            session_artifact_id: None,
            display_name: display_name.into(),
            questions: Vec::new(),
        }
    }

    /// 计分面试通话。
    pub fn scored_interview<S: Into<String>>(
        session_id: S,
        subject_id: S,
        session_artifact_id: S,
        display_name: S,
        questions: Vec<String>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            purpose: CallPurpose::ScoredInterview,
            subject_id: subject_id.into(),
            session_artifact_id: Some(session_artifact_id.into()),
            display_name: display_name.into(),
            questions,
        }
    }
}

/// 会话过程中对外广播的更新。
#[derive(Debug, Clone, PartialEq)]
pub enum SessionUpdate {
    Transcript(TranscriptMessage),
    AssistantSpeaking(bool),
    Navigate(NavigationTarget),
}

/// 会话管理器。
///
/// 供应商与下游协作方在构造时注入；每次 `start_call` 生成一个独立
/// 会话（工作循环 + 句柄），管理器自身不持有会话状态。管理器不阻止
/// 并发发起第二通呼叫，单占语义由调用方持有唯一句柄保证。
pub struct SessionManager {
    provider: Arc<dyn VoiceCallProvider>,
    generator: Arc<dyn InterviewGenerator>,
    feedback: Arc<dyn FeedbackBuilder>,
    timing: SessionTimingConfig,
    update_tx: broadcast::Sender<SessionUpdate>,
    lifecycle_tx: broadcast::Sender<PhaseUpdate>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::with_components(
            Arc::new(SimulatedCallProvider::new()),
            Arc::new(UnconfiguredCollaborator),
            Arc::new(UnconfiguredCollaborator),
            SessionTimingConfig::default(),
        )
    }

    pub fn with_provider(provider: Arc<dyn VoiceCallProvider>) -> Self {
        Self::with_components(
            provider,
            Arc::new(UnconfiguredCollaborator),
            Arc::new(UnconfiguredCollaborator),
            SessionTimingConfig::default(),
        )
    }

    pub fn with_components(
        provider: Arc<dyn VoiceCallProvider>,
        generator: Arc<dyn InterviewGenerator>,
        feedback: Arc<dyn FeedbackBuilder>,
        timing: SessionTimingConfig,
    ) -> Self {
        let (update_tx, _) = broadcast::channel(UPDATE_BROADCAST_CAPACITY);
        let (lifecycle_tx, _) = broadcast::channel(LIFECYCLE_BROADCAST_CAPACITY);

        Self {
            provider,
            generator,
            feedback,
            timing,
            update_tx,
            lifecycle_tx,
        }
    }

    pub async fn run(&self) -> Result<()> {
        info!(target: "session_manager", "running bootstrap tasks");
        Ok(())
    }

    pub fn subscribe_updates(&self) -> broadcast::Receiver<SessionUpdate> {
        self.update_tx.subscribe()
    }

    pub fn subscribe_lifecycle(&self) -> broadcast::Receiver<PhaseUpdate> {
        self.lifecycle_tx.subscribe()
    }

    /// 发起一通呼叫，返回会话句柄与该会话的更新流。
    pub fn start_call(
        &self,
        descriptor: SessionDescriptor,
    ) -> (CallSessionHandle, mpsc::Receiver<SessionUpdate>) {
        runtime::spawn_session(
            descriptor,
            self.timing.clone(),
            Arc::clone(&self.provider),
            Arc::clone(&self.generator),
            Arc::clone(&self.feedback),
            self.update_tx.clone(),
            self.lifecycle_tx.clone(),
        )
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests;
