//! 从自由对话中提炼结构化面试规格。
//!
//! 引擎是全函数：语音输入天然嘈杂，任何槽位无法识别时落到默认值，
//! 永不报错，派发前规格始终完整。

mod rules;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::provider::Speaker;
use crate::session::router::TranscriptMessage;

const DEFAULT_ROLE: &str = "Software Engineer";
const DEFAULT_TECH_STACK_ENTRY: &str = "JavaScript";
const DEFAULT_QUESTION_COUNT: u32 = 5;

static QUESTION_COUNT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)\s*questions?").expect("question count pattern is valid"));

/// 面试侧重点。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewFocus {
    Technical,
    Behavioral,
    Mixed,
}

impl InterviewFocus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterviewFocus::Technical => "technical",
            InterviewFocus::Behavioral => "behavioral",
            InterviewFocus::Mixed => "mixed",
        }
    }
}

/// 候选人经验档位。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceLevel {
    Junior,
    Mid,
    Senior,
}

impl ExperienceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExperienceLevel::Junior => "junior",
            ExperienceLevel::Mid => "mid",
            ExperienceLevel::Senior => "senior",
        }
    }
}

/// 提炼出的面试规格。每个字段都有确定的默认值，构造结果总是完整的。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedSpecification {
    pub role: String,
    pub focus: InterviewFocus,
    pub experience_level: ExperienceLevel,
    pub tech_stack: Vec<String>,
    pub question_count: u32,
}

/// 对用户侧历史做槽位提炼。
///
/// 输入是按到达顺序拼接、统一小写后的用户消息全文；逐槽位扫描规则表。
/// 确定性且幂等：相同输入必得相同输出。
pub fn extract_specification(messages: &[TranscriptMessage]) -> ExtractedSpecification {
    let user_text = messages
        .iter()
        .filter(|message| message.speaker == Speaker::User)
        .map(|message| message.text.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ");

    debug!(
        target: "slot_extraction",
        user_chars = user_text.len(),
        message_count = messages.len(),
        "analyzing user responses"
    );

    let role = rules::first_match(&user_text, rules::ROLE_RULES)
        .unwrap_or(DEFAULT_ROLE)
        .to_string();

    let focus =
        rules::first_match(&user_text, rules::FOCUS_RULES).unwrap_or(InterviewFocus::Technical);

    let experience_level =
        rules::first_match(&user_text, rules::LEVEL_RULES).unwrap_or(ExperienceLevel::Mid);

    let mut tech_stack = rules::collect_stack_matches(&user_text);
    if tech_stack.is_empty() && role == "Data Scientist" {
        tech_stack = rules::DATA_SCIENCE_STACK
            .iter()
            .map(|entry| (*entry).to_string())
            .collect();
    }
    if tech_stack.is_empty() {
        tech_stack.push(DEFAULT_TECH_STACK_ENTRY.to_string());
    }

    let question_count = resolve_question_count(&user_text);

    ExtractedSpecification {
        role,
        focus,
        experience_level,
        tech_stack,
        question_count,
    }
}

/// 题目数量优先尝试直接捕获 "N questions" 形式的基数词，未命中再走
/// 数量词规则表。零不是合法数量，按未命中处理。
fn resolve_question_count(text: &str) -> u32 {
    if let Some(captures) = QUESTION_COUNT_PATTERN.captures(text) {
        if let Some(count) = captures
            .get(1)
            .and_then(|group| group.as_str().parse::<u32>().ok())
        {
            if count > 0 {
                return count;
            }
        }
    }

    rules::first_match(text, rules::COUNT_RULES).unwrap_or(DEFAULT_QUESTION_COUNT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_message(sequence: u64, text: &str) -> TranscriptMessage {
        TranscriptMessage {
            speaker: Speaker::User,
            text: text.to_string(),
            sequence,
        }
    }

    fn assistant_message(sequence: u64, text: &str) -> TranscriptMessage {
        TranscriptMessage {
            speaker: Speaker::Assistant,
            text: text.to_string(),
            sequence,
        }
    }

    #[test]
    fn extracts_fully_specified_request() {
        let messages = vec![
            assistant_message(1, "What kind of interview would you like?"),
            user_message(
                2,
                "I want a behavioral interview for a senior backend developer, 8 questions, \
                 using Go and Docker",
            ),
        ];

        let spec = extract_specification(&messages);
        assert_eq!(spec.role, "Backend Developer");
        assert_eq!(spec.focus, InterviewFocus::Behavioral);
        assert_eq!(spec.experience_level, ExperienceLevel::Senior);
        assert_eq!(spec.tech_stack, vec!["Go", "Docker", "Kubernetes"]);
        assert_eq!(spec.question_count, 8);
    }

    #[test]
    fn unrecognized_content_resolves_to_defaults() {
        let messages = vec![user_message(1, "hmm, whatever works for you honestly")];

        let spec = extract_specification(&messages);
        assert_eq!(spec.role, "Software Engineer");
        assert_eq!(spec.focus, InterviewFocus::Technical);
        assert_eq!(spec.experience_level, ExperienceLevel::Mid);
        assert_eq!(spec.tech_stack, vec!["JavaScript"]);
        assert_eq!(spec.question_count, 5);
    }

    #[test]
    fn empty_history_resolves_to_defaults() {
        let spec = extract_specification(&[]);
        assert_eq!(spec.role, "Software Engineer");
        assert_eq!(spec.question_count, 5);
    }

    #[test]
    fn assistant_messages_are_not_part_of_the_input() {
        let messages = vec![
            assistant_message(1, "Would you like a senior behavioral interview in Rust?"),
            user_message(2, "just something easy please"),
        ];

        let spec = extract_specification(&messages);
        assert_eq!(spec.experience_level, ExperienceLevel::Mid);
        assert_eq!(spec.focus, InterviewFocus::Technical);
        assert_eq!(spec.tech_stack, vec!["JavaScript"]);
    }

    #[test]
    fn extraction_is_deterministic_and_idempotent() {
        let messages = vec![user_message(
            1,
            "mixed interview, junior frontend role with react, maybe ten questions",
        )];

        let first = extract_specification(&messages);
        let second = extract_specification(&messages);
        assert_eq!(first, second);
        assert_eq!(first.focus, InterviewFocus::Mixed);
        assert_eq!(first.experience_level, ExperienceLevel::Junior);
        assert_eq!(first.question_count, 10);
    }

    #[test]
    fn cardinal_capture_wins_over_the_count_table() {
        let messages = vec![user_message(1, "three rounds sounded fine but give me 7 questions")];
        let spec = extract_specification(&messages);
        assert_eq!(spec.question_count, 7);
    }

    #[test]
    fn zero_questions_is_not_a_valid_capture() {
        let messages = vec![user_message(1, "0 questions")];
        let spec = extract_specification(&messages);
        assert_eq!(spec.question_count, 5);
    }

    #[test]
    fn data_scientist_role_fills_in_the_ml_stack() {
        let messages = vec![user_message(
            1,
            "i'm preparing for a data scientist position, senior level",
        )];

        let spec = extract_specification(&messages);
        assert_eq!(spec.role, "Data Scientist");
        assert_eq!(
            spec.tech_stack,
            vec!["Python", "TensorFlow", "Pandas", "Jupyter", "AWS"]
        );
    }

    #[test]
    fn messages_concatenate_across_turns() {
        let messages = vec![
            user_message(1, "backend developer"),
            user_message(2, "behavioral please"),
            user_message(3, "senior"),
            user_message(4, "8 questions"),
        ];

        let spec = extract_specification(&messages);
        assert_eq!(spec.role, "Backend Developer");
        assert_eq!(spec.focus, InterviewFocus::Behavioral);
        assert_eq!(spec.experience_level, ExperienceLevel::Senior);
        assert_eq!(spec.question_count, 8);
    }
}
