use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::dispatch::{FeedbackDispatcher, GenerationDispatcher, NavigationTarget};
use crate::extract::extract_specification;
use crate::intent::{detect_intent, TriggerIntent};
use crate::provider::{
    CallAssistantConfig, ProviderErrorKind, ProviderEvent, SessionTimingConfig, Speaker,
    VoiceCallProvider,
};
use crate::session::lifecycle::{CallPhase, CallPurpose, FinishReason, PhaseUpdate};
use crate::session::router::{RoutedEvent, TranscriptMessage};
use crate::session::{SessionDescriptor, SessionUpdate};
use crate::telemetry::events::{record_provider_error, record_trigger_detected};

use super::state::SessionState;
use super::SessionCommand;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Stop,
}

/// 会话工作循环。
///
/// 供应商事件与内部命令经由同一个 select 循环顺序处理，任一处理函数
/// 跑完之前不会消费下一个事件，转写历史因此无并发修改。延迟动作以
/// 定时任务实现，到点后把命令送回本循环，在循环内取当时的最新状态
/// 执行。
pub(crate) struct SessionWorker {
    descriptor: SessionDescriptor,
    timing: SessionTimingConfig,
    provider: Arc<dyn VoiceCallProvider>,
    generation: GenerationDispatcher,
    feedback: FeedbackDispatcher,
    events_rx: broadcast::Receiver<ProviderEvent>,
    command_rx: mpsc::Receiver<SessionCommand>,
    command_tx: mpsc::Sender<SessionCommand>,
    client_tx: mpsc::Sender<SessionUpdate>,
    updates_bus: broadcast::Sender<SessionUpdate>,
    lifecycle_tx: broadcast::Sender<PhaseUpdate>,
    state: SessionState,
}

impl SessionWorker {
    pub(crate) fn new(
        descriptor: SessionDescriptor,
        timing: SessionTimingConfig,
        provider: Arc<dyn VoiceCallProvider>,
        generation: GenerationDispatcher,
        feedback: FeedbackDispatcher,
        events_rx: broadcast::Receiver<ProviderEvent>,
        command_rx: mpsc::Receiver<SessionCommand>,
        command_tx: mpsc::Sender<SessionCommand>,
        client_tx: mpsc::Sender<SessionUpdate>,
        updates_bus: broadcast::Sender<SessionUpdate>,
        lifecycle_tx: broadcast::Sender<PhaseUpdate>,
    ) -> Self {
        let state = SessionState::new(descriptor.session_id.clone());
        Self {
            descriptor,
            timing,
            provider,
            generation,
            feedback,
            events_rx,
            command_rx,
            command_tx,
            client_tx,
            updates_bus,
            lifecycle_tx,
            state,
        }
    }

    pub(crate) fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }

    async fn run(mut self) {
        if !self.begin_call().await {
            return;
        }

        let mut events_closed = false;

        loop {
            let flow = tokio::select! {
                biased;

                maybe_command = self.command_rx.recv() => match maybe_command {
                    Some(command) => self.handle_command(command).await,
                    // 句柄已释放，会话随之销毁。
                    None => Flow::Stop,
                },

                maybe_event = self.events_rx.recv(), if !events_closed => match maybe_event {
                    Ok(event) => self.handle_event(event).await,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(
                            target: "call_session",
                            session_id = %self.descriptor.session_id,
                            skipped,
                            "provider event stream lagged"
                        );
                        Flow::Continue
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        events_closed = true;
                        Flow::Continue
                    }
                },
            };

            if flow == Flow::Stop {
                break;
            }
        }

        self.state.cancel_all();
    }

    /// `Inactive --(start requested)--> Connecting`，并向供应商下发
    /// start 命令。失败则退回 `Inactive`，本次会话不产出任何制品。
    async fn begin_call(&mut self) -> bool {
        let session_id = self.descriptor.session_id.clone();

        if let Err(err) = self.state.transition(CallPhase::Connecting) {
            warn!(
                target: "call_session",
                session_id = %session_id,
                %err,
                "failed to enter connecting phase"
            );
            return false;
        }
        self.emit_phase(PhaseUpdate::new(&session_id, CallPhase::Connecting));

        let config = match self.descriptor.purpose {
            CallPurpose::Generate => {
                CallAssistantConfig::for_generation(&self.descriptor.display_name)
            }
            CallPurpose::ScoredInterview => CallAssistantConfig::for_scored_interview(
                &self.descriptor.display_name,
                &self.descriptor.questions,
            ),
        };

        match self.provider.start(config).await {
            Ok(()) => {
                info!(
                    target: "call_session",
                    session_id = %session_id,
                    purpose = self.descriptor.purpose.as_str(),
                    "call start issued"
                );
                true
            }
            Err(err) => {
                let message = err.to_string();
                let kind = ProviderErrorKind::classify(&message);
                warn!(
                    target: "call_session",
                    session_id = %session_id,
                    %err,
                    "provider rejected call start"
                );
                record_provider_error(&session_id, kind.as_str(), &message);

                if let Err(err) = self.state.transition(CallPhase::Inactive) {
                    warn!(
                        target: "call_session",
                        session_id = %session_id,
                        %err,
                        "failed to reset session after start failure"
                    );
                }
                self.emit_phase(PhaseUpdate::failed(&session_id, kind, message));
                false
            }
        }
    }

    async fn handle_event(&mut self, event: ProviderEvent) -> Flow {
        match self.state.router_mut().route(event) {
            RoutedEvent::Connected => {
                if self.state.phase() == CallPhase::Connecting {
                    if self.state.transition(CallPhase::Active).is_ok() {
                        self.emit_phase(PhaseUpdate::new(
                            &self.descriptor.session_id,
                            CallPhase::Active,
                        ));
                    }
                } else {
                    debug!(
                        target: "call_session",
                        session_id = %self.descriptor.session_id,
                        phase = self.state.phase().as_str(),
                        "call-started event outside connecting phase"
                    );
                }
                Flow::Continue
            }
            RoutedEvent::Disconnected => self.finish(FinishReason::ProviderDisconnected).await,
            RoutedEvent::MessageAppended(message) => {
                self.emit_update(SessionUpdate::Transcript(message.clone()))
                    .await;
                self.evaluate_triggers(&message);
                Flow::Continue
            }
            RoutedEvent::SpeakingChanged(speaking) => {
                self.emit_update(SessionUpdate::AssistantSpeaking(speaking))
                    .await;
                Flow::Continue
            }
            RoutedEvent::ProviderFailure { kind, message } => self.fail(kind, message).await,
            RoutedEvent::Ignored => Flow::Continue,
        }
    }

    /// 触发词只在规格收集通话里、且仅对助手的定稿话术求值。
    fn evaluate_triggers(&mut self, message: &TranscriptMessage) {
        if self.descriptor.purpose != CallPurpose::Generate
            || message.speaker != Speaker::Assistant
            || self.state.phase() != CallPhase::Active
        {
            return;
        }

        let intent = detect_intent(&message.text);
        match intent {
            TriggerIntent::None => {}
            TriggerIntent::ReadyToGenerate => {
                record_trigger_detected(&self.descriptor.session_id, intent.as_str());
                self.arm_generation_timer();
            }
            TriggerIntent::EndCall => {
                record_trigger_detected(&self.descriptor.session_id, intent.as_str());
                self.arm_hangup_timer();
            }
        }
    }

    /// 延迟生成：等尾随语音定稿后再基于届时的历史做提炼。助手重复
    /// 触发话术时只保留首个计划。
    fn arm_generation_timer(&mut self) {
        if self.generation.has_dispatched() || self.state.generation_timer_armed() {
            debug!(
                target: "call_session",
                session_id = %self.descriptor.session_id,
                "generation already scheduled"
            );
            return;
        }

        let command_tx = self.command_tx.clone();
        let delay = self.timing.generation_trigger_delay;
        let timer = tokio::spawn(async move {
            sleep(delay).await;
            let _ = command_tx.send(SessionCommand::FireGeneration).await;
        });
        self.state.set_generation_timer(timer);

        info!(
            target: "call_session",
            session_id = %self.descriptor.session_id,
            delay = ?delay,
            "generation scheduled"
        );
    }

    /// 延迟挂断：让告别语音播完再撤线。
    fn arm_hangup_timer(&mut self) {
        if self.state.hangup_timer_armed() {
            debug!(
                target: "call_session",
                session_id = %self.descriptor.session_id,
                "hang-up already scheduled"
            );
            return;
        }

        let command_tx = self.command_tx.clone();
        let delay = self.timing.hangup_delay;
        let timer = tokio::spawn(async move {
            sleep(delay).await;
            let _ = command_tx.send(SessionCommand::FireHangup).await;
        });
        self.state.set_hangup_timer(timer);

        info!(
            target: "call_session",
            session_id = %self.descriptor.session_id,
            delay = ?delay,
            "hang-up scheduled"
        );
    }

    fn arm_navigation_timer(&mut self) {
        let command_tx = self.command_tx.clone();
        let delay = self.timing.post_call_navigation_delay;
        let timer = tokio::spawn(async move {
            sleep(delay).await;
            let _ = command_tx.send(SessionCommand::FireNavigation).await;
        });
        self.state.set_navigation_timer(timer);
    }

    async fn handle_command(&mut self, command: SessionCommand) -> Flow {
        match command {
            SessionCommand::EndCall => {
                if self.state.phase() != CallPhase::Active {
                    debug!(
                        target: "call_session",
                        session_id = %self.descriptor.session_id,
                        phase = self.state.phase().as_str(),
                        "end-call request outside an active call"
                    );
                    return Flow::Continue;
                }

                if let Err(err) = self.provider.stop().await {
                    warn!(
                        target: "call_session",
                        session_id = %self.descriptor.session_id,
                        %err,
                        "provider stop failed during user hang-up"
                    );
                }
                self.finish(FinishReason::UserRequested).await
            }
            SessionCommand::FireGeneration => {
                if self.state.phase() != CallPhase::Active {
                    debug!(
                        target: "call_session",
                        session_id = %self.descriptor.session_id,
                        "scheduled generation skipped outside an active call"
                    );
                    return Flow::Continue;
                }

                // 执行时重读历史：触发后到点前可能又有用户语音定稿。
                let history = self.state.router().history_snapshot();
                let specification = extract_specification(&history);
                self.generation
                    .dispatch(specification, &self.descriptor.subject_id)
                    .await;
                Flow::Continue
            }
            SessionCommand::FireHangup => {
                if self.state.phase() != CallPhase::Active {
                    debug!(
                        target: "call_session",
                        session_id = %self.descriptor.session_id,
                        "scheduled hang-up skipped outside an active call"
                    );
                    return Flow::Continue;
                }

                if let Err(err) = self.provider.stop().await {
                    warn!(
                        target: "call_session",
                        session_id = %self.descriptor.session_id,
                        %err,
                        "provider stop failed during scheduled hang-up"
                    );
                }
                self.emit_update(SessionUpdate::Navigate(NavigationTarget::Home))
                    .await;
                Flow::Continue
            }
            SessionCommand::FireNavigation => {
                self.emit_update(SessionUpdate::Navigate(NavigationTarget::Home))
                    .await;
                Flow::Stop
            }
        }
    }

    /// 进入终态。撤销触发类定时器后，规格收集通话安排一次纯导航的
    /// 延迟动作；计分面试同步派发反馈并按结果导航。
    async fn finish(&mut self, reason: FinishReason) -> Flow {
        if self.state.phase().is_terminal() {
            debug!(
                target: "call_session",
                session_id = %self.descriptor.session_id,
                "call already finished"
            );
            return Flow::Continue;
        }

        if let Err(err) = self.state.transition(CallPhase::Finished) {
            warn!(
                target: "call_session",
                session_id = %self.descriptor.session_id,
                %err,
                "ignoring finish outside an active call"
            );
            return Flow::Continue;
        }

        self.state.cancel_deferred();
        self.emit_phase(PhaseUpdate::finished(&self.descriptor.session_id, reason));

        match self.descriptor.purpose {
            CallPurpose::Generate => {
                self.arm_navigation_timer();
                Flow::Continue
            }
            CallPurpose::ScoredInterview => {
                let transcript = self.state.router().history_snapshot();
                let target = match self.descriptor.session_artifact_id.as_deref() {
                    Some(artifact_id) => {
                        self.feedback
                            .dispatch(artifact_id, &self.descriptor.subject_id, transcript)
                            .await
                    }
                    None => {
                        warn!(
                            target: "call_session",
                            session_id = %self.descriptor.session_id,
                            "scored interview finished without a session artifact id"
                        );
                        NavigationTarget::Home
                    }
                };
                self.emit_update(SessionUpdate::Navigate(target)).await;
                Flow::Stop
            }
        }
    }

    /// 供应商错误：回到 `Inactive`，撤销延迟动作，跳过下游派发。
    async fn fail(&mut self, kind: ProviderErrorKind, message: String) -> Flow {
        record_provider_error(&self.descriptor.session_id, kind.as_str(), &message);

        if self.state.phase().is_terminal() || self.state.phase() == CallPhase::Inactive {
            debug!(
                target: "call_session",
                session_id = %self.descriptor.session_id,
                "provider error after session settled"
            );
            return Flow::Continue;
        }

        if let Err(err) = self.state.transition(CallPhase::Inactive) {
            warn!(
                target: "call_session",
                session_id = %self.descriptor.session_id,
                %err,
                "unable to reset session after provider error"
            );
            return Flow::Continue;
        }

        self.state.cancel_deferred();
        self.emit_phase(PhaseUpdate::failed(&self.descriptor.session_id, kind, message));
        Flow::Stop
    }

    /// 更新同时进入管理器级广播与本会话的客户端通道。导航指令保证
    /// 送达，其余更新在客户端拥塞时丢弃。
    async fn emit_update(&self, update: SessionUpdate) {
        let _ = self.updates_bus.send(update.clone());

        let guarantee_delivery = matches!(update, SessionUpdate::Navigate(_));
        match self.client_tx.try_send(update) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(update)) => {
                if guarantee_delivery {
                    let _ = self.client_tx.send(update).await;
                } else {
                    warn!(
                        target: "call_session",
                        session_id = %self.descriptor.session_id,
                        "dropping session update due to slow consumer"
                    );
                }
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {}
        }
    }

    fn emit_phase(&self, update: PhaseUpdate) {
        if self.lifecycle_tx.send(update).is_err() {
            debug!(
                target: "call_session",
                session_id = %self.descriptor.session_id,
                "no lifecycle subscribers"
            );
        }
    }
}
