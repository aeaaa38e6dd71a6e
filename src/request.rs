//! Wire types for the chat completions endpoint

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Longest upstream body excerpt kept in a failure message
const MAX_ERROR_BODY_CHARS: usize = 200;

/// One `{role, content}` turn on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireMessage
{   pub role: String
  , pub content: String
}

impl WireMessage
{   pub fn user(content: impl Into<String>) -> Self
    {   WireMessage
        {   role: "user".to_string()
          , content: content.into()
        }
    }
}

/// Request body for `POST /chat/completions`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest
{   pub model: String
  , pub messages: Vec<WireMessage>
}

impl CompletionRequest
{   /// Single-turn conversation holding only the prompt
    pub fn single_turn(
      model: impl Into<String>
    , prompt: impl Into<String>
    ) -> Self
    {   CompletionRequest
        {   model: model.into()
          , messages: vec![WireMessage::user(prompt)]
        }
    }
}

/// Outcome of reading a successful response body
#[derive(Debug, Clone, PartialEq)]
pub enum ReplyBody
{   /// `choices[0].message.content` as a string
    Content(String)
  , /// Valid JSON without a usable content field
    Missing
}

/// Pull the reply text out of a response body.
/// Keys other than the content path are ignored.
pub fn extract_reply(body: &str)
  -> Result<ReplyBody, serde_json::Error>
{   let value: Value = serde_json::from_str(body)?;
    Ok(
      match value.pointer("/choices/0/message/content")
      {   Some(Value::String(text)) => ReplyBody::Content(text.clone())
        , _ => ReplyBody::Missing
      }
    )
}

/// Human-readable summary of a non-success response body.
/// Prefers the `error.message` field the API returns.
pub fn upstream_error_message(body: &str) -> String
{   let from_json = serde_json::from_str::<Value>(body)
      .ok()
      .and_then(|v| {
        v.pointer("/error/message")
          .and_then(Value::as_str)
          .map(str::to_string)
      });

    match from_json
    {   Some(message) => message
      , None => {
          let trimmed = body.trim();
          if trimmed.is_empty()
          {   "empty response body".to_string()
          } else if trimmed.chars().count() > MAX_ERROR_BODY_CHARS
          {   let head: String = trimmed
                .chars()
                .take(MAX_ERROR_BODY_CHARS)
                .collect();
              format!("{}...", head)
          } else
          {   trimmed.to_string()
          }
        }
    }
}
