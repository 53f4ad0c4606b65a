use std::num::NonZeroU32;

use crate::Message;

/// A request to be sent to the model provider.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ModelRequest {
    /// The input messages, oldest first.
    pub messages: Vec<Message>,
    /// Upper bound of tokens the model may generate for this request.
    pub max_output_tokens: NonZeroU32,
}

impl ModelRequest {
    /// Creates a request that carries a single user message.
    #[inline]
    pub fn single_user_text<S: Into<String>>(
        text: S,
        max_output_tokens: NonZeroU32,
    ) -> Self {
        Self {
            messages: vec![Message::user(text)],
            max_output_tokens,
        }
    }
}
