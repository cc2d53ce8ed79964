//! Prompt assembly: knowledge context, formatting rules and history

use serde::{Deserialize, Serialize};

use crate::llm::Message;
use crate::store::KnowledgeSnippet;

/// Style rules appended to the knowledge context in the system message
pub const FORMAT_INSTRUCTIONS: &str = "Respond naturally and conversationally like a helpful human assistant. \
Be friendly, empathetic, and informative. \
When listing items, use numbered lists (1. 2. 3.) with clear line breaks. \
Format course names and important terms in bold using **text** syntax. \
When mentioning web pages or resources, format them as clickable links using [Link Text](URL) markdown syntax. \
For example: [English Language Requirements](https://www.ncirl.ie/english-requirements). \
Remember the conversation context and refer back to previous questions when the user says 'yes', 'no', or gives short responses.";

/// One earlier exchange as the browser sends it back
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryTurn {
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub bot: String,
}

impl HistoryTurn {
    pub fn new(user: impl Into<String>, bot: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            bot: bot.into(),
        }
    }
}

/// Render every knowledge entry under a one-line preamble
pub fn knowledge_context(institution: &str, entries: &[KnowledgeSnippet]) -> String {
    let mut context = format!(
        "You are a helpful {} student support assistant. Use this knowledge base to answer questions:\n\n",
        institution
    );
    for entry in entries {
        context.push_str(&format!(
            "Category: {}\nQ: {}\nA: {}\n\n",
            entry.category, entry.question, entry.answer
        ));
    }
    context
}

/// Assemble the outbound message list
///
/// System message first, then the last `history_turns` exchanges in their
/// original order (user before assistant), then the new user message.
pub fn build_messages(
    context: &str,
    history: &[HistoryTurn],
    user_message: &str,
    history_turns: usize,
) -> Vec<Message> {
    let recent = &history[history.len().saturating_sub(history_turns)..];

    let mut messages = Vec::with_capacity(recent.len() * 2 + 2);
    messages.push(Message::system(format!("{}\n{}", context, FORMAT_INSTRUCTIONS)));
    for turn in recent {
        messages.push(Message::user(turn.user.as_str()));
        messages.push(Message::assistant(turn.bot.as_str()));
    }
    messages.push(Message::user(user_message));
    messages
}
