use serde::{Deserialize, Serialize};

/// 通话中的说话方。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    User,
    Assistant,
    System,
}

impl Speaker {
    pub fn as_str(&self) -> &'static str {
        match self {
            Speaker::User => "user",
            Speaker::Assistant => "assistant",
            Speaker::System => "system",
        }
    }
}

/// 供应商上报的转写片段。
///
/// 流式识别会多次下发同一句话的中间稿，仅 `is_final` 为真的片段可进入
/// 会话历史。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptFragment {
    pub speaker: Speaker,
    pub text: String,
    pub is_final: bool,
}

impl TranscriptFragment {
    pub fn partial<S: Into<String>>(speaker: Speaker, text: S) -> Self {
        Self {
            speaker,
            text: text.into(),
            is_final: false,
        }
    }

    pub fn finalized<S: Into<String>>(speaker: Speaker, text: S) -> Self {
        Self {
            speaker,
            text: text.into(),
            is_final: true,
        }
    }
}

/// 供应商错误负载。仅用于诊断分类，不携带控制流语义。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderErrorPayload {
    pub message: String,
    pub stage: Option<String>,
}

impl ProviderErrorPayload {
    pub fn new<S: Into<String>>(message: S) -> Self {
        Self {
            message: message.into(),
            stage: None,
        }
    }

    pub fn with_stage<S: Into<String>, T: Into<String>>(message: S, stage: T) -> Self {
        Self {
            message: message.into(),
            stage: Some(stage.into()),
        }
    }
}

/// 错误分类。所有分类走同一条 provider-error 迁移，差异只体现在日志里。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    Authorization,
    MalformedRequest,
    Unknown,
}

impl ProviderErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderErrorKind::Authorization => "authorization",
            ProviderErrorKind::MalformedRequest => "malformed_request",
            ProviderErrorKind::Unknown => "unknown",
        }
    }

    /// 按状态码样式的子串归类错误文本。
    pub fn classify(message: &str) -> Self {
        let lowered = message.to_lowercase();
        if lowered.contains("401") || lowered.contains("unauthorized") {
            ProviderErrorKind::Authorization
        } else if lowered.contains("400") {
            ProviderErrorKind::MalformedRequest
        } else {
            ProviderErrorKind::Unknown
        }
    }

    pub fn from_payload(payload: &ProviderErrorPayload) -> Self {
        Self::classify(&payload.message)
    }
}

/// 归一化后的供应商事件。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderEvent {
    CallStarted,
    CallEnded,
    Transcript(TranscriptFragment),
    SpeechStarted,
    SpeechEnded,
    Error(ProviderErrorPayload),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_authorization_errors() {
        assert_eq!(
            ProviderErrorKind::classify("request failed with status 401"),
            ProviderErrorKind::Authorization
        );
        assert_eq!(
            ProviderErrorKind::classify("Unauthorized: bad api key"),
            ProviderErrorKind::Authorization
        );
    }

    #[test]
    fn classifies_malformed_request_errors() {
        assert_eq!(
            ProviderErrorKind::classify("400 Bad Request"),
            ProviderErrorKind::MalformedRequest
        );
    }

    #[test]
    fn falls_back_to_unknown() {
        assert_eq!(
            ProviderErrorKind::classify("connection reset by peer"),
            ProviderErrorKind::Unknown
        );
    }

    #[test]
    fn authorization_wins_over_malformed_when_both_present() {
        assert_eq!(
            ProviderErrorKind::classify("401 after retrying 400 response"),
            ProviderErrorKind::Authorization
        );
    }
}
