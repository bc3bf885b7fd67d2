//! 通话生命周期阶段与广播负载定义。

use std::time::SystemTime;

use thiserror::Error;

use crate::provider::ProviderErrorKind;

/// 通话状态机的阶段划分。`Finished` 为终态，再次通话需新建会话。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallPhase {
    Inactive,
    Connecting,
    Active,
    Finished,
}

impl CallPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallPhase::Inactive => "inactive",
            CallPhase::Connecting => "connecting",
            CallPhase::Active => "active",
            CallPhase::Finished => "finished",
        }
    }

    /// 合法迁移表。回到 `Inactive` 的两条边对应供应商错误路径。
    pub fn can_transition(self, next: CallPhase) -> bool {
        matches!(
            (self, next),
            (CallPhase::Inactive, CallPhase::Connecting)
                | (CallPhase::Connecting, CallPhase::Active)
                | (CallPhase::Connecting, CallPhase::Inactive)
                | (CallPhase::Active, CallPhase::Finished)
                | (CallPhase::Active, CallPhase::Inactive)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, CallPhase::Finished)
    }
}

/// 会话目的：从对话推导规格，或朗读固定题目并收集作答。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallPurpose {
    Generate,
    ScoredInterview,
}

impl CallPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallPurpose::Generate => "generate",
            CallPurpose::ScoredInterview => "scored_interview",
        }
    }
}

/// 进入终态的原因。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    ProviderDisconnected,
    UserRequested,
}

impl FinishReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FinishReason::ProviderDisconnected => "provider_disconnected",
            FinishReason::UserRequested => "user_requested",
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid phase transition {} -> {}", .from.as_str(), .to.as_str())]
pub struct InvalidTransition {
    pub from: CallPhase,
    pub to: CallPhase,
}

/// 生命周期事件的附加信息。
#[derive(Debug, Clone)]
pub enum PhasePayload {
    None,
    Failed(FailurePayload),
    Finished(CompletionPayload),
}

impl Default for PhasePayload {
    fn default() -> Self {
        PhasePayload::None
    }
}

/// 供应商错误导致回到 `Inactive` 时的上下文。分类仅供诊断。
#[derive(Debug, Clone)]
pub struct FailurePayload {
    pub kind: ProviderErrorKind,
    pub message: String,
}

/// 进入终态时的摘要。
#[derive(Debug, Clone)]
pub struct CompletionPayload {
    pub reason: FinishReason,
}

/// 生命周期事件。
#[derive(Debug, Clone)]
pub struct PhaseUpdate {
    pub session_id: String,
    pub phase: CallPhase,
    pub issued_at: SystemTime,
    pub payload: PhasePayload,
}

impl PhaseUpdate {
    /// 构造一个空载荷的事件。
    pub fn new<S: Into<String>>(session_id: S, phase: CallPhase) -> Self {
        Self {
            session_id: session_id.into(),
            phase,
            issued_at: SystemTime::now(),
            payload: PhasePayload::None,
        }
    }

    /// 声明会话因供应商错误回到 `Inactive`。
    pub fn failed<S: Into<String>>(
        session_id: S,
        kind: ProviderErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            phase: CallPhase::Inactive,
            issued_at: SystemTime::now(),
            payload: PhasePayload::Failed(FailurePayload {
                kind,
                message: message.into(),
            }),
        }
    }

    /// 声明会话进入终态。
    pub fn finished<S: Into<String>>(session_id: S, reason: FinishReason) -> Self {
        Self {
            session_id: session_id.into(),
            phase: CallPhase::Finished,
            issued_at: SystemTime::now(),
            payload: PhasePayload::Finished(CompletionPayload { reason }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inactive_only_accepts_start() {
        assert!(CallPhase::Inactive.can_transition(CallPhase::Connecting));
        assert!(!CallPhase::Inactive.can_transition(CallPhase::Active));
        assert!(!CallPhase::Inactive.can_transition(CallPhase::Finished));
        assert!(!CallPhase::Inactive.can_transition(CallPhase::Inactive));
    }

    #[test]
    fn finished_is_terminal() {
        assert!(CallPhase::Finished.is_terminal());
        assert!(!CallPhase::Finished.can_transition(CallPhase::Inactive));
        assert!(!CallPhase::Finished.can_transition(CallPhase::Connecting));
        assert!(!CallPhase::Finished.can_transition(CallPhase::Active));
        assert!(!CallPhase::Finished.can_transition(CallPhase::Finished));
    }

    #[test]
    fn error_paths_fall_back_to_inactive() {
        assert!(CallPhase::Connecting.can_transition(CallPhase::Inactive));
        assert!(CallPhase::Active.can_transition(CallPhase::Inactive));
        assert!(!CallPhase::Connecting.can_transition(CallPhase::Finished));
    }

    #[test]
    fn failed_helper_carries_classification() {
        let update = PhaseUpdate::failed(
            "session",
            ProviderErrorKind::Authorization,
            "401 unauthorized",
        );

        assert_eq!(update.phase, CallPhase::Inactive);
        match update.payload {
            PhasePayload::Failed(payload) => {
                assert_eq!(payload.kind, ProviderErrorKind::Authorization);
                assert_eq!(payload.message, "401 unauthorized");
            }
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    #[test]
    fn finished_helper_wraps_reason() {
        let update = PhaseUpdate::finished("session", FinishReason::UserRequested);

        assert_eq!(update.phase, CallPhase::Finished);
        match update.payload {
            PhasePayload::Finished(payload) => {
                assert_eq!(payload.reason, FinishReason::UserRequested);
            }
            other => panic!("unexpected payload: {other:?}"),
        }
    }
}
