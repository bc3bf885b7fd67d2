//! 调度请求、响应与导航指令 DTO。

use serde::{Deserialize, Serialize};

use crate::extract::{ExperienceLevel, ExtractedSpecification, InterviewFocus};
use crate::session::router::TranscriptMessage;

/// 下发给 UI 层的导航指令。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "view")]
pub enum NavigationTarget {
    Home,
    #[serde(rename_all = "camelCase")]
    FeedbackView {
        artifact_id: String,
    },
}

impl NavigationTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            NavigationTarget::Home => "home",
            NavigationTarget::FeedbackView { .. } => "feedback_view",
        }
    }
}

/// 面试生成协作方的请求体。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub role: String,
    pub focus: InterviewFocus,
    pub experience_level: ExperienceLevel,
    pub tech_stack: Vec<String>,
    pub question_count: u32,
    pub subject_id: String,
}

impl GenerationRequest {
    pub fn from_specification(specification: ExtractedSpecification, subject_id: &str) -> Self {
        Self {
            role: specification.role,
            focus: specification.focus,
            experience_level: specification.experience_level,
            tech_stack: specification.tech_stack,
            question_count: specification.question_count,
            subject_id: subject_id.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResponse {
    pub success: bool,
    #[serde(default)]
    pub artifact_id: Option<String>,
}

/// 反馈协作方的请求体：完整转写历史换取一份反馈报告。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRequest {
    pub session_artifact_id: String,
    pub subject_id: String,
    pub transcript: Vec<TranscriptMessage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackResponse {
    pub success: bool,
    #[serde(default)]
    pub artifact_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_request_serializes_in_wire_shape() {
        let request = GenerationRequest {
            role: "Backend Developer".into(),
            focus: InterviewFocus::Behavioral,
            experience_level: ExperienceLevel::Senior,
            tech_stack: vec!["Go".into()],
            question_count: 8,
            subject_id: "user-1".into(),
        };

        let encoded = serde_json::to_value(&request).expect("serializable");
        assert_eq!(encoded["focus"], "behavioral");
        assert_eq!(encoded["experienceLevel"], "senior");
        assert_eq!(encoded["questionCount"], 8);
        assert_eq!(encoded["subjectId"], "user-1");
    }

    #[test]
    fn navigation_target_tags_the_view() {
        let target = NavigationTarget::FeedbackView {
            artifact_id: "feedback-7".into(),
        };
        let encoded = serde_json::to_value(&target).expect("serializable");
        assert_eq!(encoded["view"], "feedbackView");
        assert_eq!(encoded["artifactId"], "feedback-7");
    }
}
