use tokio::task::JoinHandle;

use crate::session::lifecycle::{CallPhase, InvalidTransition};
use crate::session::router::TranscriptRouter;
use crate::telemetry::events::record_phase_transition;

/// 单个会话的独占状态：阶段、转写历史与延迟动作句柄。
///
/// 仅由会话工作循环持有；定时器句柄存在这里，终态或销毁时统一撤销，
/// 保证不会有动作落在已收场的会话上。
pub(crate) struct SessionState {
    session_id: String,
    phase: CallPhase,
    router: TranscriptRouter,
    generation_timer: Option<JoinHandle<()>>,
    hangup_timer: Option<JoinHandle<()>>,
    navigation_timer: Option<JoinHandle<()>>,
}

impl SessionState {
    pub(crate) fn new<S: Into<String>>(session_id: S) -> Self {
        Self {
            session_id: session_id.into(),
            phase: CallPhase::Inactive,
            router: TranscriptRouter::new(),
            generation_timer: None,
            hangup_timer: None,
            navigation_timer: None,
        }
    }

    pub(crate) fn phase(&self) -> CallPhase {
        self.phase
    }

    pub(crate) fn transition(&mut self, next: CallPhase) -> Result<(), InvalidTransition> {
        if !self.phase.can_transition(next) {
            return Err(InvalidTransition {
                from: self.phase,
                to: next,
            });
        }

        record_phase_transition(&self.session_id, self.phase.as_str(), next.as_str());
        self.phase = next;
        Ok(())
    }

    pub(crate) fn router(&self) -> &TranscriptRouter {
        &self.router
    }

    pub(crate) fn router_mut(&mut self) -> &mut TranscriptRouter {
        &mut self.router
    }

    pub(crate) fn generation_timer_armed(&self) -> bool {
        self.generation_timer.is_some()
    }

    pub(crate) fn hangup_timer_armed(&self) -> bool {
        self.hangup_timer.is_some()
    }

    pub(crate) fn set_generation_timer(&mut self, timer: JoinHandle<()>) {
        if let Some(previous) = self.generation_timer.replace(timer) {
            previous.abort();
        }
    }

    pub(crate) fn set_hangup_timer(&mut self, timer: JoinHandle<()>) {
        if let Some(previous) = self.hangup_timer.replace(timer) {
            previous.abort();
        }
    }

    pub(crate) fn set_navigation_timer(&mut self, timer: JoinHandle<()>) {
        if let Some(previous) = self.navigation_timer.replace(timer) {
            previous.abort();
        }
    }

    /// 撤销触发类延迟动作（生成、挂断）。进入终态时调用。
    pub(crate) fn cancel_deferred(&mut self) {
        if let Some(timer) = self.generation_timer.take() {
            timer.abort();
        }
        if let Some(timer) = self.hangup_timer.take() {
            timer.abort();
        }
    }

    /// 撤销全部延迟动作。会话销毁时调用。
    pub(crate) fn cancel_all(&mut self) {
        self.cancel_deferred();
        if let Some(timer) = self.navigation_timer.take() {
            timer.abort();
        }
    }
}

impl Drop for SessionState {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
