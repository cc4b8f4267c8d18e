use async_trait::async_trait;
use futures::stream::BoxStream;
use shared::error::Result;

use crate::entities::message::ChatMessage;

pub mod script_executor;

pub use script_executor::ScriptExecutor;

/// Text chunks of one model response, yielded in receipt order.
pub type ChunkStream = BoxStream<'static, Result<String>>;

/// Language model that answers a chat transcript as a lazy chunk stream.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn stream_chat(&self, messages: Vec<ChatMessage>) -> Result<ChunkStream>;
}

/// Bounded transcript of recent user/assistant exchanges.
pub trait ConversationMemory: Send {
    fn append(&mut self, user: &str, assistant: &str);
    fn clear(&mut self) -> Result<()>;
    /// History oldest first, alternating user and assistant messages.
    fn messages(&self) -> Vec<ChatMessage>;
}

/// Interactive line input plus textual output.
#[async_trait]
pub trait Terminal: Send {
    /// `Ok(None)` means the user interrupted or closed input.
    async fn read_line(&mut self, prompt: &str) -> Result<Option<String>>;

    fn print(&mut self, text: &str);

    fn println(&mut self, text: &str) {
        self.print(text);
        self.print("\n");
    }
}
