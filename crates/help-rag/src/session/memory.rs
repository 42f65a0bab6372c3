//! Per-session chat history

use dashmap::DashMap;

use crate::types::ChatTurn;

/// Conversation history keyed by session identifier.
///
/// History lives in memory only and is lost when the process exits. Each
/// session keeps at most `max_turns` turns; older ones are dropped on record.
pub struct ChatMemory {
    sessions: DashMap<String, Vec<ChatTurn>>,
    max_turns: usize,
}

impl ChatMemory {
    pub fn new(max_turns: usize) -> Self {
        Self {
            sessions: DashMap::new(),
            max_turns,
        }
    }

    /// Retained turns for a session, oldest first
    pub fn history(&self, session_id: &str) -> Vec<ChatTurn> {
        self.sessions
            .get(session_id)
            .map(|turns| turns.clone())
            .unwrap_or_default()
    }

    /// Append a completed turn, dropping the oldest beyond the cap
    pub fn record(&self, session_id: &str, turn: ChatTurn) {
        let mut turns = self.sessions.entry(session_id.to_string()).or_default();
        turns.push(turn);

        let excess = turns.len().saturating_sub(self.max_turns);
        if excess > 0 {
            turns.drain(..excess);
        }
    }

    /// Number of turns stored for a session
    pub fn turn_count(&self, session_id: &str) -> usize {
        self.sessions.get(session_id).map(|t| t.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_keeps_only_latest_turns() {
        let memory = ChatMemory::new(2);
        for i in 0..4 {
            memory.record("developer", ChatTurn::new(format!("q{}", i), format!("a{}", i)));
        }

        let history = memory.history("developer");
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].user, "q2");
        assert_eq!(history[1].assistant, "a3");
        assert_eq!(memory.turn_count("developer"), 2);
    }

    #[test]
    fn test_zero_cap_stores_nothing() {
        let memory = ChatMemory::new(0);
        memory.record("developer", ChatTurn::new("hi", "hello"));
        assert_eq!(memory.turn_count("developer"), 0);
        assert!(memory.history("developer").is_empty());
    }

    #[test]
    fn test_sessions_are_isolated() {
        let memory = ChatMemory::new(5);
        memory.record("developer", ChatTurn::new("hi", "hello"));

        assert!(memory.history("someone-else").is_empty());
        assert_eq!(memory.turn_count("developer"), 1);
        assert_eq!(memory.turn_count("someone-else"), 0);
    }
}
