//! 槽位规则表。
//!
//! 每张表按声明顺序扫描：标量槽位首个命中生效，技术栈槽位把所有命中
//! 行的条目按序并集。needle 的字母数字边缘按整词匹配，避免 "go" 命中
//! "good" 这类误报。

use crate::extract::{ExperienceLevel, InterviewFocus};

pub(crate) struct SlotRule<T: 'static> {
    pub(crate) needles: &'static [&'static str],
    pub(crate) value: T,
}

pub(crate) const DATA_SCIENCE_STACK: &[&str] = &["Python", "TensorFlow", "Pandas", "Jupyter", "AWS"];

pub(crate) const ROLE_RULES: &[SlotRule<&'static str>] = &[
    SlotRule {
        needles: &["data scientist", "data science", "machine learning engineer"],
        value: "Data Scientist",
    },
    SlotRule {
        needles: &["software engineer", "software developer", "programmer"],
        value: "Software Engineer",
    },
    SlotRule {
        needles: &["frontend", "front-end", "react developer", "vue developer"],
        value: "Frontend Developer",
    },
    SlotRule {
        needles: &["backend", "back-end", "server developer", "api developer"],
        value: "Backend Developer",
    },
    SlotRule {
        needles: &["fullstack", "full-stack", "full stack developer"],
        value: "Fullstack Developer",
    },
    SlotRule {
        needles: &["product manager", "pm", "product owner"],
        value: "Product Manager",
    },
    SlotRule {
        needles: &["designer", "ui", "ux", "user experience", "user interface"],
        value: "Designer",
    },
    SlotRule {
        needles: &["devops", "site reliability", "sre", "infrastructure"],
        value: "DevOps Engineer",
    },
];

pub(crate) const FOCUS_RULES: &[SlotRule<InterviewFocus>] = &[
    SlotRule {
        needles: &["technical", "coding", "algorithm", "programming"],
        value: InterviewFocus::Technical,
    },
    SlotRule {
        needles: &["behavioral", "behavior", "soft skill", "leadership", "teamwork"],
        value: InterviewFocus::Behavioral,
    },
    SlotRule {
        needles: &["mixed", "both", "combination"],
        value: InterviewFocus::Mixed,
    },
];

pub(crate) const LEVEL_RULES: &[SlotRule<ExperienceLevel>] = &[
    SlotRule {
        needles: &["junior", "entry", "beginner", "new grad", "1-2 years"],
        value: ExperienceLevel::Junior,
    },
    SlotRule {
        needles: &["senior", "lead", "principal", "experienced", "5+ years"],
        value: ExperienceLevel::Senior,
    },
    SlotRule {
        needles: &["mid", "middle", "intermediate", "3-5 years"],
        value: ExperienceLevel::Mid,
    },
];

pub(crate) const TECH_RULES: &[SlotRule<&'static [&'static str]>] = &[
    SlotRule {
        needles: &[
            "python",
            "pandas",
            "tensorflow",
            "scikit",
            "numpy",
            "django",
            "flask",
            "data science",
            "machine learning",
            "ml",
            "ai",
        ],
        value: DATA_SCIENCE_STACK,
    },
    SlotRule {
        needles: &[
            "react",
            "javascript",
            "js",
            "node",
            "next.js",
            "nextjs",
            "typescript",
            "frontend",
            "front-end",
        ],
        value: &["JavaScript", "React", "Node.js"],
    },
    SlotRule {
        needles: &["java", "spring", "hibernate"],
        value: &["Java", "Spring"],
    },
    SlotRule {
        needles: &["c++", "cpp"],
        value: &["C++"],
    },
    SlotRule {
        needles: &["c#", "dotnet", ".net"],
        value: &["C#", ".NET"],
    },
    SlotRule {
        needles: &["go", "golang"],
        value: &["Go"],
    },
    SlotRule {
        needles: &["rust"],
        value: &["Rust"],
    },
    SlotRule {
        needles: &["aws", "amazon web services", "cloud", "s3", "ec2"],
        value: &["AWS"],
    },
    SlotRule {
        needles: &["docker", "kubernetes", "k8s", "devops"],
        value: &["Docker", "Kubernetes"],
    },
];

pub(crate) const COUNT_RULES: &[SlotRule<u32>] = &[
    SlotRule {
        needles: &["few", "3", "three"],
        value: 3,
    },
    SlotRule {
        needles: &["many", "10", "ten"],
        value: 10,
    },
    SlotRule {
        needles: &["five", "5"],
        value: 5,
    },
    SlotRule {
        needles: &["eight", "8", "seven"],
        value: 8,
    },
];

/// 整词出现判定。仅当 needle 边缘是字母数字时才要求对应侧的词边界，
/// 因此 ".net" 能命中 "asp.net"，而 "go" 不会命中 "good"。
pub(crate) fn contains_term(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }

    let needs_left_boundary = needle
        .chars()
        .next()
        .map(|c| c.is_ascii_alphanumeric())
        .unwrap_or(false);
    let needs_right_boundary = needle
        .chars()
        .next_back()
        .map(|c| c.is_ascii_alphanumeric())
        .unwrap_or(false);

    let mut search_from = 0;
    while let Some(offset) = haystack[search_from..].find(needle) {
        let start = search_from + offset;
        let end = start + needle.len();

        let left_ok = !needs_left_boundary
            || haystack[..start]
                .chars()
                .next_back()
                .map(|c| !c.is_ascii_alphanumeric())
                .unwrap_or(true);
        let right_ok = !needs_right_boundary
            || haystack[end..]
                .chars()
                .next()
                .map(|c| !c.is_ascii_alphanumeric())
                .unwrap_or(true);

        if left_ok && right_ok {
            return true;
        }

        search_from = end;
    }

    false
}

/// 标量槽位：首个命中行的值。
pub(crate) fn first_match<T: Copy>(text: &str, rules: &[SlotRule<T>]) -> Option<T> {
    rules
        .iter()
        .find(|rule| rule.needles.iter().any(|needle| contains_term(text, needle)))
        .map(|rule| rule.value)
}

/// 技术栈槽位：所有命中行的条目按声明顺序并集（去重）。
pub(crate) fn collect_stack_matches(text: &str) -> Vec<String> {
    let mut stack: Vec<String> = Vec::new();

    for rule in TECH_RULES {
        if rule.needles.iter().any(|needle| contains_term(text, needle)) {
            for entry in rule.value {
                if !stack.iter().any(|existing| existing == entry) {
                    stack.push((*entry).to_string());
                }
            }
        }
    }

    stack
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn term_matching_requires_word_boundaries_on_alphanumeric_edges() {
        assert!(contains_term("using go and docker", "go"));
        assert!(!contains_term("that sounds good", "go"));
        assert!(!contains_term("django experience", "go"));
        assert!(contains_term("c++ mostly", "c++"));
        assert!(contains_term("we ship asp.net services", ".net"));
    }

    #[test]
    fn javascript_does_not_leak_into_the_java_rule() {
        assert!(!contains_term("javascript all day", "java"));
        assert!(contains_term("java and spring", "java"));
    }

    #[test]
    fn stack_union_preserves_declaration_order() {
        let stack = collect_stack_matches("docker plus go");
        assert_eq!(stack, vec!["Go", "Docker", "Kubernetes"]);
    }

    #[test]
    fn overlapping_rows_deduplicate_entries() {
        // Both the data-science row and the aws row resolve AWS.
        let stack = collect_stack_matches("python on aws");
        assert_eq!(
            stack,
            vec!["Python", "TensorFlow", "Pandas", "Jupyter", "AWS"]
        );
    }
}
