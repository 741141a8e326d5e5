use crate::message::{Message, Role};

/// Append-only transcript of one query. It is the only state carried between turns
/// and is sent to the model verbatim on every call.
#[derive(Default, Clone, Debug, PartialEq)]
pub struct ConversationMemory {
    messages: Vec<Message>,
}

impl ConversationMemory {
    /// Starts a transcript with the system instruction followed by the user's query.
    pub fn seeded(system_prompt: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::system(system_prompt), Message::user(query)],
        }
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn append(&mut self, role: Role, content: impl Into<String>) {
        self.push(Message::new(role, content));
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Message> + '_ {
        self.messages.iter()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
