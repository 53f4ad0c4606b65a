//! Core logic of the chat client: the conversation transcript and the
//! turn-by-turn exchange with a model provider.

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

mod conversation;
mod error;
mod model_client;

pub use conversation::{
    Conversation, ConversationBuilder, DEFAULT_MAX_OUTPUT_TOKENS,
};
pub use error::Error;
pub use palaver_model::{ErrorKind, Message, Role};
