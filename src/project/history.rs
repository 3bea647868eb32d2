// src/project/history.rs

use crate::types::ConversationEntry;

/// Number of entries kept on every save unless configured otherwise.
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// Keep only the most recent `limit` entries, preserving their order.
pub fn trim_history(history: &mut Vec<ConversationEntry>, limit: usize) {
    if history.len() > limit {
        let excess = history.len() - limit;
        history.drain(..excess);
    }
}
