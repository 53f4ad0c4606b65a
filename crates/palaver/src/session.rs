use std::num::NonZeroU32;

use palaver_anthropic_model::{
    AnthropicConfig, AnthropicProvider, Error as AnthropicError,
};
use palaver_core::{Conversation, ConversationBuilder, Error, Message};
use palaver_model::ModelProvider;

/// A session builder.
///
/// See [`Session`].
pub struct SessionBuilder {
    conversation_builder: ConversationBuilder,
}

impl SessionBuilder {
    /// Creates a session builder with a specified model provider.
    pub fn with_model_provider<M: ModelProvider + 'static>(
        provider: M,
    ) -> Self {
        let conversation_builder =
            ConversationBuilder::with_model_provider(provider);
        Self {
            conversation_builder,
        }
    }

    /// Creates a session builder that talks to the Anthropic API.
    ///
    /// Fails if the HTTP client cannot be set up.
    pub fn with_anthropic(
        config: AnthropicConfig,
    ) -> Result<Self, AnthropicError> {
        let provider = AnthropicProvider::new(config)?;
        Ok(Self::with_model_provider(provider))
    }

    /// Sets the upper bound of tokens the model may generate per turn.
    #[inline]
    pub fn with_max_output_tokens(mut self, max: NonZeroU32) -> Self {
        self.conversation_builder =
            self.conversation_builder.with_max_output_tokens(max);
        self
    }

    /// Builds a new session.
    pub fn build(self) -> Session {
        Session {
            conversation: self.conversation_builder.build(),
        }
    }
}

/// A chat session, a single conversation bound to one model provider.
///
/// The session holds a fully configured conversation that you can use
/// directly, and it is basically a wrapper around [`Conversation`].
pub struct Session {
    conversation: Conversation,
}

impl Session {
    /// Sends a message and waits for the reply.
    #[inline]
    pub async fn send_message(
        &mut self,
        message: &str,
    ) -> Result<String, Error> {
        self.conversation.send_message(message).await
    }

    /// Forgets everything said so far.
    #[inline]
    pub fn clear_history(&mut self) {
        self.conversation.clear_history();
    }

    /// Returns a copy of the conversation history.
    #[inline]
    pub fn history(&self) -> Vec<Message> {
        self.conversation.history()
    }

    /// Returns the underlying conversation.
    #[inline]
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }
}

#[cfg(test)]
mod tests {
    use palaver_anthropic_model::AnthropicConfigBuilder;
    use palaver_test_model::TestModelProvider;

    use super::*;

    #[tokio::test]
    async fn test_session_round_trip() {
        let provider = TestModelProvider::echo();
        let observer = provider.clone();
        let max = NonZeroU32::new(77).unwrap();
        let mut session = SessionBuilder::with_model_provider(provider)
            .with_max_output_tokens(max)
            .build();

        assert_eq!(session.send_message("hey").await.unwrap(), "echo:hey");
        assert_eq!(session.history().len(), 2);
        assert_eq!(observer.requests()[0].max_output_tokens, max);

        session.clear_history();
        assert!(session.conversation().is_empty());
    }

    #[test]
    fn test_with_anthropic() {
        let config = AnthropicConfigBuilder::with_api_key("sk-ant").build();
        let session = SessionBuilder::with_anthropic(config).unwrap().build();
        assert!(session.history().is_empty());
    }
}
