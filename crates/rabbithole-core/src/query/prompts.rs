//! Prompt construction for the query service.

use crate::config::{FOLLOW_UP_END_MARKER, FOLLOW_UP_START_MARKER};

use super::types::{ConversationTurn, FollowUpMode};

/// Fills the placeholders of a system prompt template.
pub fn build_system_prompt(template: &str, follow_up_count: usize) -> String {
    template
        .replace("{follow_up_count}", &follow_up_count.to_string())
        .replace("{start_marker}", FOLLOW_UP_START_MARKER)
        .replace("{end_marker}", FOLLOW_UP_END_MARKER)
}

/// Renders prior turns as `User:` / `Assistant:` lines.
pub fn build_context_block(turns: &[ConversationTurn]) -> String {
    turns
        .iter()
        .map(|turn| {
            let mut block = String::new();
            if let Some(ref user) = turn.user {
                block.push_str(&format!("User: {user}\n"));
            }
            if let Some(ref assistant) = turn.assistant {
                block.push_str(&format!("Assistant: {assistant}\n"));
            }
            block
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Builds the user message embedding context and raw search results.
pub fn build_user_prompt(
    query: &str,
    context: &str,
    search_json: &str,
    subject: &str,
    mode: FollowUpMode,
) -> String {
    let mode = mode.describe();
    format!(
        r#"Previous conversation:
{context}

Search results about "{query}":
{search_json}

Please provide a comprehensive response about {subject}. Include relevant facts, context, and relationships to other topics. Format the response in markdown with #### headers and wrap key terms in :item[] tags. The response should be {mode}."#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_SYSTEM_PROMPT;

    #[test]
    fn test_context_block_skips_missing_sides() {
        let turns = vec![
            ConversationTurn::new("What is X?", "X is Y."),
            ConversationTurn {
                user: Some("And Z?".to_string()),
                assistant: None,
            },
        ];
        let block = build_context_block(&turns);
        assert_eq!(block, "User: What is X?\nAssistant: X is Y.\n\nUser: And Z?\n");
    }

    #[test]
    fn test_empty_history_is_empty_block() {
        assert_eq!(build_context_block(&[]), "");
    }

    #[test]
    fn test_system_prompt_has_markers() {
        let prompt = build_system_prompt(DEFAULT_SYSTEM_PROMPT, 3);
        assert!(prompt.contains(FOLLOW_UP_START_MARKER));
        assert!(prompt.contains(FOLLOW_UP_END_MARKER));
        assert!(prompt.contains("exactly 3 concise"));
        assert!(!prompt.contains("{start_marker}"));
    }

    #[test]
    fn test_user_prompt_mentions_subject_and_mode() {
        let prompt = build_user_prompt(
            "octopus",
            "User: hi\n",
            "{}",
            "cephalopod nervous systems",
            FollowUpMode::Focused,
        );
        assert!(prompt.contains("Search results about \"octopus\""));
        assert!(prompt.contains("response about cephalopod nervous systems"));
        assert!(prompt.ends_with("focused and specific."));
    }
}
