use std::time::Duration;
use async_trait::async_trait;
use log::{debug, trace, error};

use crate::error::FailureKind;
use crate::request::{CompletionRequest, ReplyBody};
use crate::CompletionResult;

/// Client for the OpenAI chat completions endpoint.
///
/// Holds configuration only. Each call builds its own HTTP transport
/// and drops it before returning, so calls share nothing and may run
/// concurrently from any number of tasks.
#[derive(Debug, Clone)]
pub struct CompletionClient
{   config: crate::config::ClientConfig
}

impl CompletionClient
{   pub fn new(config: crate::config::ClientConfig) -> Self
    {   debug!(
          "Creating CompletionClient for {} ({})",
          config.base_url, config.model
        );
        CompletionClient { config }
    }

    pub fn config(&self) -> &crate::config::ClientConfig
    {   &self.config
    }

    pub fn timeout(&self) -> Duration
    {   Duration::from_secs(self.config.timeout_secs)
    }

    /// Ask the endpoint to complete `prompt`.
    ///
    /// Single attempt, bounded by the configured timeout. Empty prompts
    /// are sent as-is.
    pub async fn complete(&self, prompt: &str) -> CompletionResult
    {   debug!("complete: prompt of {} chars", prompt.chars().count());

        if self.config.api_key.trim().is_empty()
        {   error!("No API key configured");
            return CompletionResult::failure(
              FailureKind::Configuration
            , "no API key configured"
            );
        }

        let http_client = match reqwest::Client::builder()
          .timeout(self.timeout())
          .build()
        {   Ok(c) => c
          , Err(e) => {
              error!("Failed to build HTTP client: {}", e);
              return CompletionResult::failure(
                FailureKind::Configuration
              , describe(&e)
              );
            }
        };

        let result = self.exchange(&http_client, prompt).await;
        drop(http_client);
        result
    }

    async fn exchange(
      &self
    , http_client: &reqwest::Client
    , prompt: &str
    ) -> CompletionResult
    {   let request = CompletionRequest::single_turn(
          self.config.model.clone()
        , prompt
        );
        trace!("Completion request: {:?}", request);

        let response = match http_client
          .post(self.config.completions_url())
          .header(
            "Authorization"
          , format!("Bearer {}", self.config.api_key)
          )
          .header("Content-Type", "application/json")
          .json(&request)
          .send()
          .await
        {   Ok(r) => r
          , Err(e) => {
              error!("HTTP error: {}", e);
              return transport_failure(&e);
            }
        };

        let status = response.status();
        trace!("Completion response status: {}", status);

        let body = match response.text().await
        {   Ok(b) => b
          , Err(e) => {
              error!("Failed to read response body: {}", e);
              return transport_failure(&e);
            }
        };

        if !status.is_success()
        {   let message = crate::request::upstream_error_message(&body);
            error!("Completion API error {}: {}", status, message);
            return CompletionResult::failure(
              FailureKind::Upstream { status: status.as_u16() }
            , format!("API returned {}: {}", status, message)
            );
        }

        match crate::request::extract_reply(&body)
        {   Ok(ReplyBody::Content(text)) => {
              debug!("Received reply of {} chars", text.chars().count());
              CompletionResult::Success(text)
            }
          , Ok(ReplyBody::Missing) => {
              debug!("Response carried no reply content");
              CompletionResult::EmptyReply
            }
          , Err(e) => {
              error!("Parse error: {}", e);
              CompletionResult::failure(
                FailureKind::Parse
              , format!("invalid JSON in response: {}", e)
              )
            }
        }
    }
}

#[async_trait]
impl crate::client::Completer for CompletionClient
{   async fn complete(&self, prompt: &str) -> CompletionResult
    {   CompletionClient::complete(self, prompt).await
    }
}

fn transport_failure(e: &reqwest::Error) -> CompletionResult
{   let kind = if e.is_builder()
    {   FailureKind::Configuration
    } else if e.is_timeout()
    {   FailureKind::Timeout
    } else
    {   FailureKind::Network
    };
    CompletionResult::failure(kind, describe(e))
}

/// Error text including its source chain
fn describe(e: &dyn std::error::Error) -> String
{   let mut message = e.to_string();
    let mut source = e.source();
    while let Some(inner) = source
    {   let text = inner.to_string();
        if !message.contains(&text)
        {   message.push_str(": ");
            message.push_str(&text);
        }
        source = inner.source();
    }
    if message.is_empty()
    {   "request failed".to_string()
    } else
    {   message
    }
}
