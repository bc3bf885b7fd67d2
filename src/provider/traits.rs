use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::provider::config::CallAssistantConfig;
use crate::provider::error::ProviderError;
use crate::provider::events::ProviderEvent;

/// 语音通话供应商的出站命令面与入站事件面。
///
/// 实现方负责真实的网络与音频传输；本 crate 只消费归一化事件流并
/// 下发 start/stop 命令。会话编排层在构造时注入实现，测试用
/// [`SimulatedCallProvider`](crate::provider::SimulatedCallProvider) 替身。
#[async_trait]
pub trait VoiceCallProvider: Send + Sync {
    /// 以给定助手配置发起通话。
    async fn start(&self, config: CallAssistantConfig) -> Result<(), ProviderError>;

    /// 结束当前通话。
    async fn stop(&self) -> Result<(), ProviderError>;

    /// 订阅归一化事件流。
    fn subscribe(&self) -> broadcast::Receiver<ProviderEvent>;
}
