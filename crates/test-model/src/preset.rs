use palaver_model::{ErrorKind, Message, Role};

/// How the fake model answers one user turn.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PresetReply {
    /// Replies with a fixed text.
    Text(String),
    /// Replies with `"echo:"` followed by the latest user message.
    Echo,
    /// Fails with an error of the given kind.
    Fail(ErrorKind),
    /// Never replies.
    Pending,
}

impl PresetReply {
    /// Creates a `PresetReply::Text` reply.
    #[inline]
    pub fn text<S: Into<String>>(text: S) -> Self {
        Self::Text(text.into())
    }

    pub(crate) fn render(&self, messages: &[Message]) -> Option<String> {
        match self {
            PresetReply::Text(text) => Some(text.clone()),
            PresetReply::Echo => {
                let last_user = messages
                    .iter()
                    .rev()
                    .find(|msg| msg.role == Role::User)
                    .map(|msg| msg.content.as_str())
                    .unwrap_or("");
                Some(format!("echo:{last_user}"))
            }
            PresetReply::Fail(_) | PresetReply::Pending => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_echo_uses_latest_user_message() {
        let messages = [
            Message::user("first"),
            Message::assistant("echo:first"),
            Message::user("second"),
        ];
        assert_eq!(
            PresetReply::Echo.render(&messages).as_deref(),
            Some("echo:second")
        );
        assert_eq!(
            PresetReply::text("fixed").render(&messages).as_deref(),
            Some("fixed")
        );
        assert_eq!(
            PresetReply::Fail(ErrorKind::Transport).render(&messages),
            None
        );
    }
}
