use std::pin::Pin;
use std::sync::Arc;

use palaver_model::{Message, ModelProvider, ModelProviderError, ModelRequest};
use tracing::Instrument;

type SendRequestResult = Result<Message, Box<dyn ModelProviderError>>;
type BoxedSendRequestFuture =
    Pin<Box<dyn Future<Output = SendRequestResult> + Send>>;
type HandlerFn =
    Arc<dyn Fn(ModelRequest) -> BoxedSendRequestFuture + Send + Sync>;

/// A wrapper around a model provider that provides a type-erased
/// interface for the other modules.
#[derive(Clone)]
pub struct ModelClient {
    handler_fn: HandlerFn,
}

impl ModelClient {
    #[inline]
    pub fn new<P: ModelProvider + 'static>(provider: P) -> Self {
        // We have to erase the type `P`, since `Conversation` doesn't have a
        // generic parameter and we don't want it either.
        let handler_fn: HandlerFn = Arc::new(move |req| {
            let fut = provider.send_request(&req);
            Box::pin(
                async move {
                    trace!("got a request: {:?}", req);
                    match fut.await {
                        Ok(msg) => {
                            trace!("finished a request");
                            Ok(msg)
                        }
                        Err(err) => {
                            error!("got an error: {err:?}");
                            Err(Box::new(err) as Box<dyn ModelProviderError>)
                        }
                    }
                }
                .instrument(trace_span!("model client req")),
            )
        });
        Self { handler_fn }
    }

    /// Sends a request and returns the assistant's reply.
    ///
    /// # Cancel safety
    ///
    /// This method is cancel safe. Dropping the future abandons the
    /// underlying provider call.
    #[inline]
    pub async fn send_request(&self, req: ModelRequest) -> SendRequestResult {
        (self.handler_fn)(req).await
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroU32;

    use palaver_model::ErrorKind;
    use palaver_test_model::{PresetReply, TestModelProvider};

    use super::*;

    fn request(text: &str) -> ModelRequest {
        ModelRequest::single_user_text(text, NonZeroU32::new(8).unwrap())
    }

    #[tokio::test]
    async fn test_send_request() {
        let mut model_provider = TestModelProvider::default();
        model_provider.add_reply(PresetReply::text("How are you?"));
        let observer = model_provider.clone();

        let model_client = ModelClient::new(model_provider);

        for _ in 0..3 {
            let resp = model_client.send_request(request("Hi")).await.unwrap();
            assert_eq!(resp, Message::assistant("How are you?"));
        }
        assert_eq!(observer.request_count(), 3);
    }

    #[tokio::test]
    async fn test_error_handling() {
        let model_provider = TestModelProvider::default();
        let model_client = ModelClient::new(model_provider);
        let resp_or_err = model_client.send_request(request("Hi")).await;
        let err = resp_or_err.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Other);
    }
}
