use std::num::NonZeroU32;

use palaver_model::ModelProvider;

use super::Conversation;
use crate::model_client::ModelClient;

/// The output token bound used when none is configured.
pub const DEFAULT_MAX_OUTPUT_TOKENS: NonZeroU32 = match NonZeroU32::new(4096)
{
    Some(n) => n,
    None => unreachable!(),
};

/// [`Conversation`] builder.
pub struct ConversationBuilder {
    pub(crate) model_client: ModelClient,
    pub(crate) max_output_tokens: NonZeroU32,
}

impl ConversationBuilder {
    /// Creates a new builder with the specified model provider.
    #[inline]
    pub fn with_model_provider<P: ModelProvider + 'static>(
        provider: P,
    ) -> Self {
        Self {
            model_client: ModelClient::new(provider),
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
        }
    }

    /// Sets the upper bound of tokens the model may generate per turn.
    #[inline]
    pub fn with_max_output_tokens(mut self, max: NonZeroU32) -> Self {
        self.max_output_tokens = max;
        self
    }

    /// Builds the conversation, starting with an empty transcript.
    #[inline]
    pub fn build(self) -> Conversation {
        Conversation::from_builder(self)
    }
}
