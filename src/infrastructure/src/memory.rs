use domain::entities::message::ChatMessage;
use domain::services::ConversationMemory;
use shared::error::Result;
use std::collections::VecDeque;

/// Sliding window over the most recent user/assistant exchanges.
#[derive(Debug, Clone)]
pub struct WindowMemory {
    capacity: usize,
    turns: VecDeque<(String, String)>,
}

impl WindowMemory {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            turns: VecDeque::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

impl ConversationMemory for WindowMemory {
    fn append(&mut self, user: &str, assistant: &str) {
        if self.capacity == 0 {
            return;
        }
        while self.turns.len() >= self.capacity {
            self.turns.pop_front();
        }
        self.turns.push_back((user.to_string(), assistant.to_string()));
    }

    fn clear(&mut self) -> Result<()> {
        self.turns.clear();
        Ok(())
    }

    fn messages(&self) -> Vec<ChatMessage> {
        self.turns
            .iter()
            .flat_map(|(user, assistant)| {
                [ChatMessage::user(user.as_str()), ChatMessage::assistant(assistant.as_str())]
            })
            .collect()
    }
}
