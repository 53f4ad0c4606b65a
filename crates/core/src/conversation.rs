mod builder;
#[cfg(test)]
mod tests;

use std::num::NonZeroU32;

use palaver_model::{Message, ModelRequest, Role};

use crate::error::Error;
use crate::model_client::ModelClient;
pub use builder::{ConversationBuilder, DEFAULT_MAX_OUTPUT_TOKENS};

/// A linear conversation with a model.
///
/// The conversation owns the transcript, an ordered list of user and
/// assistant messages, and replays all of it to the model on every turn.
/// Entries are only ever appended, and the transcript is emptied only by
/// [`Conversation::clear_history`].
pub struct Conversation {
    model_client: ModelClient,
    transcript: Vec<Message>,
    max_output_tokens: NonZeroU32,
}

impl Conversation {
    /// Sends a user message and returns the assistant's reply.
    ///
    /// On success the transcript grows by two entries: the user message and
    /// the reply. On failure the user message stays in the transcript and
    /// the error is returned as-is; nothing is retried.
    ///
    /// # Cancel safety
    ///
    /// If the returned future is dropped after it was first polled, the
    /// user message stays in the transcript without a reply, exactly as if
    /// the provider had failed.
    pub async fn send_message(&mut self, text: &str) -> Result<String, Error> {
        self.transcript.push(Message::user(text));

        let request = self.build_model_request();
        let reply = self
            .model_client
            .send_request(request)
            .await
            .map_err(Error::from_provider)?;
        debug_assert_eq!(reply.role, Role::Assistant);

        let content = reply.content.clone();
        self.transcript.push(reply);
        debug!("transcript has {} entries", self.transcript.len());
        Ok(content)
    }

    /// Removes every entry from the transcript.
    #[inline]
    pub fn clear_history(&mut self) {
        self.transcript.clear();
    }

    /// Returns a copy of the transcript, oldest first.
    #[inline]
    pub fn history(&self) -> Vec<Message> {
        self.transcript.clone()
    }

    /// Returns the number of entries in the transcript.
    #[inline]
    pub fn len(&self) -> usize {
        self.transcript.len()
    }

    /// Returns `true` if the transcript has no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.transcript.is_empty()
    }

    /// Returns the output token bound sent with every request.
    #[inline]
    pub fn max_output_tokens(&self) -> NonZeroU32 {
        self.max_output_tokens
    }

    fn build_model_request(&self) -> ModelRequest {
        ModelRequest {
            messages: self.transcript.clone(),
            max_output_tokens: self.max_output_tokens,
        }
    }
}

impl Conversation {
    fn from_builder(builder: ConversationBuilder) -> Self {
        let ConversationBuilder {
            model_client,
            max_output_tokens,
        } = builder;

        Self {
            model_client,
            transcript: Vec::new(),
            max_output_tokens,
        }
    }
}
