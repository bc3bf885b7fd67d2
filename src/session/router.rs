//! 供应商事件归一化与转写历史维护。

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::provider::{ProviderErrorKind, ProviderEvent, Speaker};

/// 一条已定稿的转写消息。追加后不可变，`sequence` 单调递增记录到达顺序。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptMessage {
    pub speaker: Speaker,
    pub text: String,
    pub sequence: u64,
}

/// 归一化后的路由结果，交由会话工作循环决定状态迁移与副作用。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutedEvent {
    Connected,
    Disconnected,
    MessageAppended(TranscriptMessage),
    SpeakingChanged(bool),
    ProviderFailure {
        kind: ProviderErrorKind,
        message: String,
    },
    Ignored,
}

/// 转写事件路由器。
///
/// 只有 `is_final` 的片段会进入历史，流式中间稿一律丢弃，避免同一句话
/// 被重复计入。重复投递的定稿片段按原样追加（各自拿到新的 sequence），
/// 历史不做去重。
#[derive(Debug, Default)]
pub struct TranscriptRouter {
    messages: Vec<TranscriptMessage>,
    next_sequence: u64,
    assistant_speaking: bool,
}

impl TranscriptRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(&mut self, event: ProviderEvent) -> RoutedEvent {
        match event {
            ProviderEvent::CallStarted => RoutedEvent::Connected,
            ProviderEvent::CallEnded => RoutedEvent::Disconnected,
            ProviderEvent::SpeechStarted => {
                self.assistant_speaking = true;
                RoutedEvent::SpeakingChanged(true)
            }
            ProviderEvent::SpeechEnded => {
                self.assistant_speaking = false;
                RoutedEvent::SpeakingChanged(false)
            }
            ProviderEvent::Transcript(fragment) => {
                if !fragment.is_final {
                    debug!(
                        target: "event_router",
                        speaker = fragment.speaker.as_str(),
                        "dropping partial transcript fragment"
                    );
                    return RoutedEvent::Ignored;
                }

                if fragment.text.is_empty() {
                    debug!(target: "event_router", "dropping empty transcript fragment");
                    return RoutedEvent::Ignored;
                }

                self.next_sequence += 1;
                let message = TranscriptMessage {
                    speaker: fragment.speaker,
                    text: fragment.text,
                    sequence: self.next_sequence,
                };
                self.messages.push(message.clone());
                RoutedEvent::MessageAppended(message)
            }
            ProviderEvent::Error(payload) => {
                let kind = ProviderErrorKind::from_payload(&payload);
                warn!(
                    target: "event_router",
                    kind = kind.as_str(),
                    stage = payload.stage.as_deref().unwrap_or("unknown"),
                    message = %payload.message,
                    "provider reported an error"
                );
                RoutedEvent::ProviderFailure {
                    kind,
                    message: payload.message,
                }
            }
        }
    }

    pub fn messages(&self) -> &[TranscriptMessage] {
        &self.messages
    }

    /// 当前历史的快照，供延迟动作在执行时重读。
    pub fn history_snapshot(&self) -> Vec<TranscriptMessage> {
        self.messages.clone()
    }

    pub fn assistant_speaking(&self) -> bool {
        self.assistant_speaking
    }
}
