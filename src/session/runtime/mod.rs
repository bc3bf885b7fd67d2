mod handle;
mod state;
mod worker;

pub use handle::CallSessionHandle;

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};

use crate::dispatch::{
    FeedbackBuilder, FeedbackDispatcher, GenerationDispatcher, InterviewGenerator,
};
use crate::provider::{SessionTimingConfig, VoiceCallProvider};
use crate::session::lifecycle::PhaseUpdate;
use crate::session::{SessionDescriptor, SessionUpdate};

use self::worker::SessionWorker;

/// 工作循环消费的内部命令。定时器到点后也经由这里回到循环内执行。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SessionCommand {
    EndCall,
    FireGeneration,
    FireHangup,
    FireNavigation,
}

pub(crate) fn spawn_session(
    descriptor: SessionDescriptor,
    timing: SessionTimingConfig,
    provider: Arc<dyn VoiceCallProvider>,
    generator: Arc<dyn InterviewGenerator>,
    feedback_builder: Arc<dyn FeedbackBuilder>,
    updates_bus: broadcast::Sender<SessionUpdate>,
    lifecycle_tx: broadcast::Sender<PhaseUpdate>,
) -> (CallSessionHandle, mpsc::Receiver<SessionUpdate>) {
    let (client_tx, client_rx) = mpsc::channel(timing.buffer_capacity);
    let (command_tx, command_rx) = mpsc::channel(timing.buffer_capacity);
    let events_rx = provider.subscribe();

    let session_id = descriptor.session_id.clone();
    let generation = GenerationDispatcher::new(session_id.clone(), generator);
    let feedback = FeedbackDispatcher::new(session_id.clone(), feedback_builder);

    let worker = SessionWorker::new(
        descriptor,
        timing,
        provider,
        generation,
        feedback,
        events_rx,
        command_rx,
        command_tx.clone(),
        client_tx,
        updates_bus,
        lifecycle_tx,
    );

    let worker_handle = worker.spawn();
    let handle = CallSessionHandle::new(session_id, command_tx, worker_handle);

    (handle, client_rx)
}
