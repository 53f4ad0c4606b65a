use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::future::ready;
use std::num::NonZeroU32;

use palaver_model::{
    ErrorKind, Message, ModelProvider, ModelProviderError, ModelRequest, Role,
};

#[derive(Debug)]
struct FakeModelProviderError(ErrorKind);

impl Display for FakeModelProviderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

impl Error for FakeModelProviderError {}

impl ModelProviderError for FakeModelProviderError {
    fn kind(&self) -> ErrorKind {
        self.0
    }
}

struct FakeModelProvider;

impl ModelProvider for FakeModelProvider {
    type Error = FakeModelProviderError;

    fn send_request(
        &self,
        req: &ModelRequest,
    ) -> impl Future<Output = Result<Message, Self::Error>>
    + Send
    + 'static
    + use<> {
        let result = 'blk: {
            let Some(last) = req.messages.last() else {
                break 'blk Err(FakeModelProviderError(
                    ErrorKind::InvalidRequest,
                ));
            };
            assert_eq!(last.role, Role::User, "unexpected message: {last:?}");

            // Pretend the bound is measured in words.
            let words: Vec<_> = format!("You said {}", last.content)
                .split(' ')
                .take(req.max_output_tokens.get() as usize)
                .map(ToString::to_string)
                .collect();
            Ok(Message::assistant(words.join(" ")))
        };
        ready(result)
    }
}

mod tests {
    use super::*;

    fn tokens(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).unwrap()
    }

    #[tokio::test]
    async fn test_completion() {
        let provider = FakeModelProvider;
        let req = ModelRequest {
            messages: vec![Message::user("Good morning")],
            max_output_tokens: tokens(100),
        };
        let reply = provider.send_request(&req).await.unwrap();
        assert_eq!(reply.role, Role::Assistant);
        assert_eq!(reply.content, "You said Good morning");
    }

    #[tokio::test]
    async fn test_output_bound() {
        let provider = FakeModelProvider;
        let req = ModelRequest::single_user_text("one two three", tokens(3));
        let reply = provider.send_request(&req).await.unwrap();
        assert_eq!(reply.content, "You said one");
    }

    #[tokio::test]
    async fn test_send_text() {
        let provider = FakeModelProvider;
        let reply = provider.send_text("hello", tokens(20)).await.unwrap();
        assert_eq!(reply, "You said hello");
    }

    #[tokio::test]
    async fn test_reply_outlives_request() {
        let provider = FakeModelProvider;
        let fut = {
            let req = ModelRequest::single_user_text("bye", tokens(5));
            provider.send_request(&req)
        };
        let reply = fut.await.unwrap();
        assert_eq!(reply.content, "You said bye");
    }

    #[tokio::test]
    async fn test_error() {
        let provider = FakeModelProvider;
        let req = ModelRequest {
            messages: vec![],
            max_output_tokens: tokens(1),
        };
        let result = provider.send_request(&req).await;
        let err = result.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRequest);
    }
}
