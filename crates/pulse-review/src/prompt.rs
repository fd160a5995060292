use crate::llm::{ChatMessage, Role};

/// System prompt sent with every review request.
pub const SYSTEM_PROMPT: &str = "You are a helpful assistant.";

const REVIEW_TEMPLATE: &str = "\
Read the following GitHub issue or pull request the way an experienced \
maintainer would. React to it as a human reviewer: say what you think of it, \
point out anything unclear or missing, and then suggest a short reply that \
could be posted on the thread.

";

/// Build the user prompt for an item's text.
///
/// # Examples
///
/// ```
/// use pulse_review::prompt::build_review_prompt;
///
/// let prompt = build_review_prompt("Crash on start Details here");
/// assert!(prompt.ends_with("Crash on start Details here"));
/// assert!(prompt.contains("human reviewer"));
/// ```
pub fn build_review_prompt(text: &str) -> String {
    format!("{REVIEW_TEMPLATE}{text}")
}

/// The system and user messages for one review request.
pub fn review_messages(text: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::new(Role::System, SYSTEM_PROMPT),
        ChatMessage::new(Role::User, build_review_prompt(text)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_system_then_user() {
        let messages = review_messages("Title Body");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[0].content, "You are a helpful assistant.");
        assert_eq!(messages[1].role, Role::User);
        assert!(messages[1].content.contains("Title Body"));
    }

    #[test]
    fn prompt_asks_for_a_reply() {
        assert!(build_review_prompt("x").contains("suggest a short reply"));
    }
}
