//! System prompts for sorting questions.
//!
//! Domain logic for building the chat messages sent to a model. Provider-agnostic.

use crate::attribute::Category;
use crate::gateway::Message;

// =============================================================================
// Templates
// =============================================================================

pub const ATTRIBUTE_SYSTEM_PROMPT: &str = "\
You are a helpful assistant that sorts items by their attributes.
Please follow these instructions carefully:
1. Return ONLY a list of item names in the correct order
2. Format your answer like this example: ['Student C', 'Student A', 'Student B']
3. Do not include any explanations or additional text
4. Make sure to include all items from the question";

pub const NUMERIC_SYSTEM_PROMPT: &str = "\
You are a helpful assistant that sorts numbers.
Please follow these instructions carefully:
1. Return ONLY a list of strings representing the sorted numbers
2. Format your answer exactly like this example: ['-80', '-72', '-51', '48']
3. Do not include any explanations or additional text
4. Make sure all numbers are strings inside the list";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionKind {
    Attribute,
    Numeric,
}

impl QuestionKind {
    /// Attribute questions open with "Sort these <category>"; everything else
    /// is treated as a numeric question.
    pub fn detect(question: &str) -> Self {
        let is_attribute = Category::ALL
            .iter()
            .any(|c| question.contains(&format!("Sort these {}", c.key())));
        if is_attribute {
            QuestionKind::Attribute
        } else {
            QuestionKind::Numeric
        }
    }

    pub fn system_prompt(self) -> &'static str {
        match self {
            QuestionKind::Attribute => ATTRIBUTE_SYSTEM_PROMPT,
            QuestionKind::Numeric => NUMERIC_SYSTEM_PROMPT,
        }
    }
}

/// `[system, user]` messages for `question`.
pub fn sort_messages(question: &str) -> Vec<Message> {
    let kind = QuestionKind::detect(question);
    vec![Message::system(kind.system_prompt()), Message::user(question)]
}

/// Strip Markdown code fences and surrounding whitespace from a reply.
pub fn clean_answer(raw: &str) -> String {
    raw.replace("```python", "").replace("```", "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::Role;

    #[test]
    fn detects_question_kind() {
        assert_eq!(
            QuestionKind::detect("Sort these cities by their population in ascending order:\nCity A: 10,000 people"),
            QuestionKind::Attribute
        );
        assert_eq!(
            QuestionKind::detect("Sort these numbers in descending order: 1, 2"),
            QuestionKind::Numeric
        );
    }

    #[test]
    fn messages_pair_system_prompt_with_question() {
        let msgs = sort_messages("Sort these students by their test score in ascending order:");
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[0].role, Role::System);
        assert_eq!(msgs[0].content, ATTRIBUTE_SYSTEM_PROMPT);
        assert_eq!(msgs[1].role, Role::User);

        let msgs = sort_messages("Sort these numbers in ascending order: 3, 1");
        assert_eq!(msgs[0].content, NUMERIC_SYSTEM_PROMPT);
    }

    #[test]
    fn strips_code_fences() {
        assert_eq!(
            clean_answer("```python\n['City B', 'City A']\n```\n"),
            "['City B', 'City A']"
        );
        assert_eq!(clean_answer("  ['1']  "), "['1']");
    }
}
