//! 语音通话供应商接口脚手架。

mod simulated;

pub mod config;
pub mod error;
pub mod events;
pub mod traits;

pub use config::{CallAssistantConfig, SessionTimingConfig, TranscriberSelector, VoiceSelector};
pub use error::ProviderError;
pub use events::{
    ProviderErrorKind, ProviderErrorPayload, ProviderEvent, Speaker, TranscriptFragment,
};
pub use simulated::{ProviderCommand, SimulatedCallProvider};
pub use traits::VoiceCallProvider;
