use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::info;

use crate::provider::config::CallAssistantConfig;
use crate::provider::error::ProviderError;
use crate::provider::events::ProviderEvent;
use crate::provider::traits::VoiceCallProvider;

/// Default capacity for the simulated provider's event broadcast channel.
const DEFAULT_EVENT_BROADCAST_CAPACITY: usize = 256;

/// 供应商替身收到的出站命令，测试据此断言命令面行为。
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderCommand {
    Start(Box<CallAssistantConfig>),
    Stop,
}

/// 无真实传输时的供应商替身。
///
/// `start` 会回放预置脚本（脚本为空则只上报 call-started），`stop` 上报
/// call-ended；`emit` 允许测试在通话中途注入任意事件。
pub struct SimulatedCallProvider {
    events_tx: broadcast::Sender<ProviderEvent>,
    script: Mutex<Vec<ProviderEvent>>,
    commands: Mutex<Vec<ProviderCommand>>,
    connected: AtomicBool,
    fail_next_start: AtomicBool,
}

impl Default for SimulatedCallProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedCallProvider {
    pub fn new() -> Self {
        let (events_tx, _) = broadcast::channel(DEFAULT_EVENT_BROADCAST_CAPACITY);
        Self {
            events_tx,
            script: Mutex::new(Vec::new()),
            commands: Mutex::new(Vec::new()),
            connected: AtomicBool::new(false),
            fail_next_start: AtomicBool::new(false),
        }
    }

    /// 预置 `start` 后按序回放的事件脚本。
    pub fn with_script(script: Vec<ProviderEvent>) -> Self {
        let provider = Self::new();
        *provider.script.lock().expect("script lock poisoned") = script;
        provider
    }

    /// 让下一次 `start` 返回错误，模拟发起失败。
    pub fn fail_next_start(&self) {
        self.fail_next_start.store(true, Ordering::SeqCst);
    }

    /// 向订阅者注入一个事件。
    pub fn emit(&self, event: ProviderEvent) {
        let _ = self.events_tx.send(event);
    }

    /// 已下发命令的快照。
    pub fn issued_commands(&self) -> Vec<ProviderCommand> {
        self.commands.lock().expect("commands lock poisoned").clone()
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn record_command(&self, command: ProviderCommand) {
        self.commands
            .lock()
            .expect("commands lock poisoned")
            .push(command);
    }
}

#[async_trait]
impl VoiceCallProvider for SimulatedCallProvider {
    async fn start(&self, config: CallAssistantConfig) -> Result<(), ProviderError> {
        self.record_command(ProviderCommand::Start(Box::new(config)));

        if self.fail_next_start.swap(false, Ordering::SeqCst) {
            return Err(ProviderError::StartRejected {
                reason: "simulated start failure".to_string(),
            });
        }

        info!(target: "simulated_provider", "starting simulated call");
        self.connected.store(true, Ordering::SeqCst);
        let _ = self.events_tx.send(ProviderEvent::CallStarted);

        let script: Vec<ProviderEvent> =
            self.script.lock().expect("script lock poisoned").drain(..).collect();
        for event in script {
            let _ = self.events_tx.send(event);
        }

        Ok(())
    }

    async fn stop(&self) -> Result<(), ProviderError> {
        self.record_command(ProviderCommand::Stop);

        if !self.connected.swap(false, Ordering::SeqCst) {
            return Err(ProviderError::NotConnected);
        }

        info!(target: "simulated_provider", "stopping simulated call");
        let _ = self.events_tx.send(ProviderEvent::CallEnded);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<ProviderEvent> {
        self.events_tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::events::{Speaker, TranscriptFragment};

    #[tokio::test]
    async fn replays_script_after_call_started() {
        let provider = SimulatedCallProvider::with_script(vec![ProviderEvent::Transcript(
            TranscriptFragment::finalized(Speaker::Assistant, "Are you ready?"),
        )]);
        let mut rx = provider.subscribe();

        provider
            .start(CallAssistantConfig::for_generation("Ada"))
            .await
            .expect("start should succeed");

        assert_eq!(rx.recv().await.expect("event"), ProviderEvent::CallStarted);
        match rx.recv().await.expect("event") {
            ProviderEvent::Transcript(fragment) => {
                assert_eq!(fragment.speaker, Speaker::Assistant);
                assert!(fragment.is_final);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn stop_without_start_is_rejected() {
        let provider = SimulatedCallProvider::new();
        assert_eq!(provider.stop().await, Err(ProviderError::NotConnected));
    }

    #[tokio::test]
    async fn records_issued_commands_in_order() {
        let provider = SimulatedCallProvider::new();
        provider
            .start(CallAssistantConfig::for_generation("Ada"))
            .await
            .expect("start should succeed");
        provider.stop().await.expect("stop should succeed");

        let commands = provider.issued_commands();
        assert_eq!(commands.len(), 2);
        assert!(matches!(commands[0], ProviderCommand::Start(_)));
        assert_eq!(commands[1], ProviderCommand::Stop);
    }

    #[tokio::test]
    async fn failed_start_emits_no_events() {
        let provider = SimulatedCallProvider::new();
        provider.fail_next_start();
        let mut rx = provider.subscribe();

        let result = provider
            .start(CallAssistantConfig::for_generation("Ada"))
            .await;
        assert!(result.is_err());
        assert!(rx.try_recv().is_err());
        assert!(!provider.is_connected());
    }
}
