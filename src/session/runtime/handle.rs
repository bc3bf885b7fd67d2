use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::warn;

use super::SessionCommand;

/// 会话句柄。持有期内会话存活；Drop 终止工作循环，连带撤销所有
/// 延迟动作。
pub struct CallSessionHandle {
    session_id: String,
    command_tx: mpsc::Sender<SessionCommand>,
    worker: Option<JoinHandle<()>>,
}

impl CallSessionHandle {
    pub(crate) fn new(
        session_id: String,
        command_tx: mpsc::Sender<SessionCommand>,
        worker: JoinHandle<()>,
    ) -> Self {
        Self {
            session_id,
            command_tx,
            worker: Some(worker),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// 用户主动挂断。
    pub async fn end_call(&self) {
        if self
            .command_tx
            .send(SessionCommand::EndCall)
            .await
            .is_err()
        {
            warn!(
                target: "call_session",
                session_id = %self.session_id,
                "end-call request ignored: session already torn down"
            );
        }
    }

    pub fn is_finished(&self) -> bool {
        self.worker
            .as_ref()
            .map(|worker| worker.is_finished())
            .unwrap_or(true)
    }
}

impl Drop for CallSessionHandle {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.take() {
            worker.abort();
        }
    }
}
