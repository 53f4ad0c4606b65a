//! A local fake model for testing purpose.

mod preset;

use std::error::Error as StdError;
use std::fmt::{self, Display, Formatter};
use std::future::pending;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use palaver_model::{
    ErrorKind, Message, ModelProvider, ModelProviderError, ModelRequest, Role,
};

pub use preset::*;

#[derive(Debug)]
pub struct Error {
    message: &'static str,
    kind: ErrorKind,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.kind)
    }
}

impl StdError for Error {}

impl ModelProviderError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

/// A local fake model for testing purpose.
///
/// Before sending requests, you need to setup the reply script, which is
/// how the model should answer each user turn. The reply is selected by the
/// number of user messages in the request, so the first user turn gets the
/// first reply, and so on. If there are no enough replies in the script and
/// no fallback is set, an error will be returned.
///
/// Every received request is recorded, and clones of the provider share the
/// same record, so a test can keep a clone around after handing the
/// provider over.
///
/// # Note
///
/// This type is not optimized for production use, there are heavy memory
/// copies involved. You should only use it for testing.
#[derive(Clone, Default)]
pub struct TestModelProvider {
    script: Vec<PresetReply>,
    fallback: Option<PresetReply>,
    delay: Option<Duration>,
    requests: Arc<Mutex<Vec<ModelRequest>>>,
}

impl TestModelProvider {
    /// Creates a provider that echoes every user turn.
    #[inline]
    pub fn echo() -> Self {
        Self {
            fallback: Some(PresetReply::Echo),
            ..Default::default()
        }
    }

    /// Appends the reply for the next user turn.
    #[inline]
    pub fn add_reply(&mut self, reply: PresetReply) {
        self.script.push(reply);
    }

    /// Sets the reply used once the script runs out.
    #[inline]
    pub fn set_fallback(&mut self, reply: PresetReply) {
        self.fallback = Some(reply);
    }

    /// Makes every reply wait for `duration` first.
    #[inline]
    pub fn set_delay(&mut self, duration: Duration) {
        self.delay = Some(duration);
    }

    /// Returns all requests received so far, oldest first.
    pub fn requests(&self) -> Vec<ModelRequest> {
        self.lock_requests().clone()
    }

    /// Returns how many requests have been received.
    pub fn request_count(&self) -> usize {
        self.lock_requests().len()
    }

    fn lock_requests(&self) -> MutexGuard<'_, Vec<ModelRequest>> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn select_reply(&self, req: &ModelRequest) -> Result<PresetReply, Error> {
        let user_turns = req
            .messages
            .iter()
            .filter(|msg| msg.role == Role::User)
            .count();
        if user_turns == 0 {
            return Err(Error {
                message: "request has no user message",
                kind: ErrorKind::InvalidRequest,
            });
        }
        self.script
            .get(user_turns - 1)
            .or(self.fallback.as_ref())
            .cloned()
            .ok_or(Error {
                message: "no enough replies",
                kind: ErrorKind::Other,
            })
    }
}

impl ModelProvider for TestModelProvider {
    type Error = crate::Error;

    fn send_request(
        &self,
        req: &ModelRequest,
    ) -> impl Future<Output = Result<Message, Self::Error>>
    + Send
    + 'static
    + use<> {
        self.lock_requests().push(req.clone());

        let reply = self.select_reply(req);
        let content = reply
            .as_ref()
            .ok()
            .and_then(|reply| reply.render(&req.messages));
        let delay = self.delay;

        async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            match (reply, content) {
                (Err(err), _) => Err(err),
                (_, Some(content)) => Ok(Message::assistant(content)),
                (Ok(PresetReply::Fail(kind)), _) => Err(Error {
                    message: "preset failure",
                    kind,
                }),
                _ => pending().await,
            }
        }
    }
}
