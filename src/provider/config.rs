use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 会话定时参数。
///
/// 两个触发延迟对应助手话术与实际动作之间的缓冲：生成动作等待尾随的
/// 用户语音定稿，挂断动作等待告别语音播完。
#[derive(Debug, Clone)]
pub struct SessionTimingConfig {
    pub generation_trigger_delay: Duration,
    pub hangup_delay: Duration,
    pub post_call_navigation_delay: Duration,
    pub buffer_capacity: usize,
}

impl Default for SessionTimingConfig {
    fn default() -> Self {
        Self {
            generation_trigger_delay: Duration::from_secs(2),
            hangup_delay: Duration::from_secs(3),
            post_call_navigation_delay: Duration::from_secs(2),
            buffer_capacity: 64,
        }
    }
}

/// 语音合成选择器。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceSelector {
    pub provider: String,
    pub voice_id: String,
}

impl Default for VoiceSelector {
    fn default() -> Self {
        Self {
            provider: "playht".to_string(),
            voice_id: "jennifer".to_string(),
        }
    }
}

/// 语音转写选择器。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriberSelector {
    pub provider: String,
    pub model: String,
    pub language: String,
}

impl Default for TranscriberSelector {
    fn default() -> Self {
        Self {
            provider: "deepgram".to_string(),
            model: "nova-2".to_string(),
            language: "en-US".to_string(),
        }
    }
}

/// 下发给语音供应商的助手配置。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallAssistantConfig {
    pub name: String,
    pub greeting: String,
    pub instructions: String,
    pub voice: VoiceSelector,
    pub transcriber: TranscriberSelector,
}

impl CallAssistantConfig {
    /// 规格收集通话的助手配置。
    ///
    /// 指令块里的两句固定话术（收集完成、告别）同时是触发词检测的
    /// 锚点，改动时需与 `intent` 模块的规则表保持一致。
    pub fn for_generation(display_name: &str) -> Self {
        let greeting = format!(
            "Hello {display_name}! Let's prepare your interview. I will ask you a few \
             questions and generate a perfect interview just for you. Are you ready?"
        );

        let instructions = "You are Viva, an AI interview preparation assistant. You need to \
collect the following information from the user step by step:

1. What role are they interviewing for?
2. What type of interview do they want? (technical, behavioral, or mixed)
3. What is their experience level? (junior, mid, senior)
4. What tech stack should be covered? (optional, can be \"General\" if none specified)
5. How many questions do they want? (3-10)

After collecting ALL this information, say: \"Perfect! I have all the information I need. \
Let me generate your interview questions now.\"

Then say: \"Your interview has been successfully created and saved! Thank you for using \
Viva. Goodbye!\"

The word \"Goodbye\" will end the call and the user will be redirected to see their new \
interview.

Ask questions ONE BY ONE and wait for complete answers before proceeding. Be \
conversational and helpful. Do not proceed until you have clear answers to all 5 \
questions."
            .to_string();

        Self {
            name: "Viva Interview Generator".to_string(),
            greeting,
            instructions,
            voice: VoiceSelector::default(),
            transcriber: TranscriberSelector::default(),
        }
    }

    /// 固定题目朗读通话的助手配置。
    pub fn for_scored_interview(display_name: &str, questions: &[String]) -> Self {
        let greeting = format!(
            "Hello {display_name}! Welcome to your mock interview. I have {} questions \
             prepared for you. Let's start with the first question. Are you ready?",
            questions.len()
        );

        let formatted_questions = questions
            .iter()
            .enumerate()
            .map(|(index, question)| format!("{}. {question}", index + 1))
            .collect::<Vec<_>>()
            .join("\n");

        let instructions = format!(
            "You are an AI interviewer conducting a mock interview.

Here are the questions you must ask ONE BY ONE:
{formatted_questions}

IMPORTANT INSTRUCTIONS:
1. Ask ONLY ONE question at a time
2. Wait for the candidate's complete answer before moving to the next question
3. Provide brief, encouraging feedback after each answer
4. Keep the conversation professional but friendly
5. After asking all questions, provide a summary and end the interview
6. Do not ask questions outside of the provided list
7. Guide the conversation naturally and help the candidate if they seem stuck

Start by asking if they're ready, then ask the first question."
        );

        Self {
            name: "Viva Interview Assistant".to_string(),
            greeting,
            instructions,
            voice: VoiceSelector::default(),
            transcriber: TranscriberSelector::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_config_greets_by_name() {
        let config = CallAssistantConfig::for_generation("Ada");
        assert!(config.greeting.contains("Hello Ada!"));
        assert!(config.instructions.contains("Let me generate your interview questions now"));
        assert!(config.instructions.contains("Goodbye"));
    }

    #[test]
    fn scored_config_numbers_the_question_script() {
        let questions = vec![
            "Tell me about yourself.".to_string(),
            "Why this role?".to_string(),
        ];
        let config = CallAssistantConfig::for_scored_interview("Ada", &questions);
        assert!(config.greeting.contains("2 questions"));
        assert!(config.instructions.contains("1. Tell me about yourself."));
        assert!(config.instructions.contains("2. Why this role?"));
    }

    #[test]
    fn default_selectors_match_provider_stack() {
        let voice = VoiceSelector::default();
        assert_eq!(voice.provider, "playht");
        let transcriber = TranscriberSelector::default();
        assert_eq!(transcriber.model, "nova-2");
        assert_eq!(transcriber.language, "en-US");
    }
}
