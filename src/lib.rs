pub mod error;
pub mod config;
pub mod providers;
pub mod request;
pub mod failover;
pub mod client;

pub use client::{ChatBackend, Completer};
pub use config::{ClientConfig, RetryConfig};
pub use error::{Error, FailureKind};
pub use failover::{RetryPolicy, RetryingCompleter};
pub use providers::CompletionClient;

/*

aichat: the chat core of a small mobile demo app, pulled out of
the GUI. A screen hands it a prompt, it asks the completion API,
and the screen renders whatever string comes back.

aichat/
├── Cargo.toml
├── src/
│   ├── lib.rs          # Result/message types and the backend API
│   ├── main.rs         # Terminal chat screen
│   ├── error.rs        # Error and failure kinds
│   ├── config.rs       # Client and retry configuration
│   ├── client.rs       # Completer trait and ChatBackend task
│   ├── providers/
│   │   ├── mod.rs
│   │   └── openai.rs   # CompletionClient
│   ├── request.rs      # Wire request/response handling
│   └── failover.rs     # Retry decorator
└── tests/

*/

/// Text shown when the API answered without usable content
pub const PLACEHOLDER_REPLY: &str = "No response from AI.";

/// AICHAT STRUCTURES:

/// Outcome of one completion call.
/// Every call ends in exactly one of these; nothing is thrown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionResult
{   /// The assistant's reply text
    Success(String)
  , /// The API answered but carried no reply content
    EmptyReply
  , /// The call could not get an answer
    Failure
    {   kind: crate::error::FailureKind
      , message: String
    }
}

impl CompletionResult
{   pub fn failure(
      kind: crate::error::FailureKind
    , message: impl Into<String>
    ) -> Self
    {   CompletionResult::Failure
        {   kind
          , message: message.into()
        }
    }

    pub fn is_success(&self) -> bool
    {   matches!(self, CompletionResult::Success(_))
    }

    pub fn is_failure(&self) -> bool
    {   matches!(self, CompletionResult::Failure { .. })
    }

    /// Failure kind, if this is a failure
    pub fn failure_kind(&self) -> Option<&crate::error::FailureKind>
    {   match self
        {   CompletionResult::Failure { kind, .. } => Some(kind)
          , _ => None
        }
    }

    /// The string a chat screen shows for this outcome
    pub fn display_text(&self) -> String
    {   match self
        {   CompletionResult::Success(text) => text.clone()
          , CompletionResult::EmptyReply => PLACEHOLDER_REPLY.to_string()
          , CompletionResult::Failure { message, .. } => {
              format!("Error: {}", message)
            }
        }
    }
}

/// One displayed chat turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage
{   pub content: String
  , pub is_user: bool
}

impl ChatMessage
{   pub fn user(content: impl Into<String>) -> Self
    {   ChatMessage
        {   content: content.into()
          , is_user: true
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self
    {   ChatMessage
        {   content: content.into()
          , is_user: false
        }
    }
}

/// Message history owned by a chat screen.
/// The completion client never reads it; each call is independent.
#[derive(Debug, Clone, Default)]
pub struct Conversation
{   messages: Vec<ChatMessage>
}

impl Conversation
{   pub fn new() -> Self
    {   Conversation::default()
    }

    pub fn push_user(&mut self, prompt: impl Into<String>)
    {   self.messages.push(ChatMessage::user(prompt));
    }

    /// Append the rendered reply for a completion outcome
    pub fn push_reply(&mut self, result: &CompletionResult)
    {   self.messages.push(
          ChatMessage::assistant(result.display_text())
        );
    }

    pub fn messages(&self) -> &[ChatMessage]
    {   &self.messages
    }

    pub fn len(&self) -> usize
    {   self.messages.len()
    }

    pub fn is_empty(&self) -> bool
    {   self.messages.is_empty()
    }

    pub fn clear(&mut self)
    {   self.messages.clear();
    }
}

/// AICHAT BACKEND API:

// ===== SendPrompt =====

pub type SendPromptReply = CompletionResult;
pub type SendPromptReplySender
  = tokio::sync::mpsc::UnboundedSender<SendPromptReply>;

pub struct SendPromptArgs
{   pub prompt: String
  , pub reply: SendPromptReplySender
}

// ===== KillProcess =====

pub type KillProcessReply = Result<(), crate::error::Error>;
pub type KillProcessReplySender
  = tokio::sync::mpsc::UnboundedSender<KillProcessReply>;

pub struct KillProcessArgs
{   pub reply: KillProcessReplySender
}

// ===== ChatHand (sender side) =====

pub struct ChatHand
{   pub send_prompt_tx
      : tokio::sync::mpsc::UnboundedSender<SendPromptArgs>
  , pub kill_process_tx
      : tokio::sync::mpsc::UnboundedSender<KillProcessArgs>
}

// ===== ChatFoot (receiver side) =====

pub struct ChatFoot
{   pub send_prompt_rx
      : tokio::sync::mpsc::UnboundedReceiver<SendPromptArgs>
  , pub kill_process_rx
      : tokio::sync::mpsc::UnboundedReceiver<KillProcessArgs>
}

#[cfg(test)]
mod tests
{   use super::*;

    #[test]
    fn display_text_per_outcome()
    {   assert_eq!(
          CompletionResult::Success("hello".into()).display_text(),
          "hello"
        );
        assert_eq!(
          CompletionResult::EmptyReply.display_text(),
          "No response from AI."
        );
        assert_eq!(
          CompletionResult::failure(
            FailureKind::Network, "connection refused"
          ).display_text(),
          "Error: connection refused"
        );
    }

    #[test]
    fn conversation_records_turns_in_order()
    {   let mut conversation = Conversation::new();
        assert!(conversation.is_empty());

        conversation.push_user("hi");
        conversation.push_reply(&CompletionResult::Success("hey".into()));
        conversation.push_user("again");
        conversation.push_reply(&CompletionResult::EmptyReply);

        assert_eq!(
          conversation.messages(),
          &[
            ChatMessage::user("hi")
          , ChatMessage::assistant("hey")
          , ChatMessage::user("again")
          , ChatMessage::assistant(PLACEHOLDER_REPLY)
          ]
        );

        conversation.clear();
        assert_eq!(conversation.len(), 0);
    }

    #[test]
    fn failure_kind_accessor()
    {   let result = CompletionResult::failure(
          FailureKind::Timeout, "timed out"
        );
        assert!(result.is_failure());
        assert_eq!(result.failure_kind(), Some(&FailureKind::Timeout));
        assert!(CompletionResult::EmptyReply.failure_kind().is_none());
        assert!(!CompletionResult::EmptyReply.is_success());
    }
}
