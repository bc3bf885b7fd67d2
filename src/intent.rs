//! 助手话术触发词检测。

/// 一条新定稿助手话术蕴含的意图。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerIntent {
    None,
    ReadyToGenerate,
    EndCall,
}

impl TriggerIntent {
    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerIntent::None => "none",
            TriggerIntent::ReadyToGenerate => "ready_to_generate",
            TriggerIntent::EndCall => "end_call",
        }
    }
}

struct IntentRule {
    needles: &'static [&'static str],
    intent: TriggerIntent,
}

/// 规则按声明顺序求值，行内任一短语命中即触发。
///
/// 匹配刻意宽松：助手话术由生成模型产出，措辞会漂移，锚定短语须覆盖
/// 常见变体。短语与 `CallAssistantConfig::for_generation` 的指令块对应。
const INTENT_RULES: &[IntentRule] = &[
    IntentRule {
        needles: &[
            "i have all the information",
            "let me generate your interview",
            "generate your interview questions",
        ],
        intent: TriggerIntent::ReadyToGenerate,
    },
    IntentRule {
        needles: &["goodbye", "thank you for using"],
        intent: TriggerIntent::EndCall,
    },
];

/// 对单条助手话术做子串匹配，返回检测到的意图。
///
/// 纯函数；调用方负责仅在规格收集通话、且说话方为助手时求值。
pub fn detect_intent(utterance: &str) -> TriggerIntent {
    let lowered = utterance.to_lowercase();

    for rule in INTENT_RULES {
        if rule.needles.iter().any(|needle| lowered.contains(needle)) {
            return rule.intent;
        }
    }

    TriggerIntent::None
}
