use std::error::Error;
use std::num::NonZeroU32;

use crate::error::ErrorKind;
use crate::message::Message;
use crate::request::ModelRequest;

/// The error type for a model provider.
pub trait ModelProviderError: Error + Send + Sync + 'static {
    /// Returns the kind of this error.
    fn kind(&self) -> ErrorKind;
}

/// A type that represents a model provider, which accepts a list of
/// messages and returns the assistant's reply.
///
/// Once the provider is created, it should behave like a stateless object.
/// It never sees the conversation other than through the messages passed
/// in a request, and it should be prepared for being dropped anytime.
pub trait ModelProvider: Send + Sync {
    /// The error type that may be returned by the provider.
    type Error: ModelProviderError;

    /// Sends a request to the model.
    ///
    /// The returned message always has the [`Role::Assistant`] role.
    /// Failures are returned as-is; implementations must not retry.
    ///
    /// [`Role::Assistant`]: crate::Role::Assistant
    fn send_request(
        &self,
        req: &ModelRequest,
    ) -> impl Future<Output = Result<Message, Self::Error>>
    + Send
    + 'static
    + use<Self>;

    /// Sends a single user text and returns only the reply text.
    fn send_text(
        &self,
        text: &str,
        max_output_tokens: NonZeroU32,
    ) -> impl Future<Output = Result<String, Self::Error>>
    + Send
    + 'static
    + use<Self> {
        let req = ModelRequest::single_user_text(text, max_output_tokens);
        let fut = self.send_request(&req);
        async move { fut.await.map(|msg| msg.content) }
    }
}
