//! Terminal chat screen: one prompt per line, replies printed below.

use std::sync::Arc;
use log::{debug, error, info};
use tokio::io::{AsyncBufReadExt, BufReader};

use aichat::{
  ChatBackend, ClientConfig, CompletionClient, CompletionResult
, Completer, Conversation, RetryConfig, RetryPolicy, RetryingCompleter
};

const MAX_RETRIES_VAR: &str = "AICHAT_MAX_RETRIES";

#[tokio::main]
async fn main()
{   env_logger::init();

    let config = match ClientConfig::from_env()
    {   Ok(c) => c
      , Err(e) => {
          error!("Configuration error: {}", e);
          eprintln!("{}", e);
          std::process::exit(2);
        }
    };
    info!("Using model {} at {}", config.model, config.base_url);

    let client = CompletionClient::new(config);
    let completer: Arc<dyn Completer> = match retry_config()
    {   Some(retry) => {
          debug!("Retrying transient failures: {:?}", retry);
          Arc::new(RetryingCompleter::new(
            client
          , RetryPolicy::from(&retry)
          ))
        }
      , None => Arc::new(client)
    };

    let backend = ChatBackend::new(completer);
    let mut conversation = Conversation::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("Type a message and press Enter. Ctrl-D to quit.");
    loop
    {   let line = match lines.next_line().await
        {   Ok(Some(line)) => line
          , Ok(None) => break
          , Err(e) => {
              error!("Failed to read stdin: {}", e);
              break;
            }
        };
        let prompt = line.trim().to_string();
        if prompt.is_empty()
        {   continue;
        }

        conversation.push_user(prompt.clone());
        let result = match backend.ask(prompt).await
        {   Ok(r) => r
          , Err(e) => {
              error!("Backend error: {}", e);
              break;
            }
        };
        render(&result);
        conversation.push_reply(&result);
    }

    debug!("Conversation ended after {} messages", conversation.len());
    if let Err(e) = backend.shutdown().await
    {   error!("Shutdown failed: {}", e);
    }
}

/// Retry settings, when `AICHAT_MAX_RETRIES` asks for any
fn retry_config() -> Option<RetryConfig>
{   let raw = std::env::var(MAX_RETRIES_VAR).ok()?;
    match raw.trim().parse::<usize>()
    {   Ok(0) => None
      , Ok(max_retries) => Some(RetryConfig
        {   max_retries
          , ..RetryConfig::default()
        })
      , Err(_) => {
          error!("Ignoring {}={}: not a number", MAX_RETRIES_VAR, raw);
          None
        }
    }
}

fn render(result: &CompletionResult)
{   match result
    {   CompletionResult::Success(text) => println!("AI: {}", text)
      , CompletionResult::EmptyReply => {
          println!("AI: ({})", result.display_text())
        }
      , CompletionResult::Failure { kind, message } => {
          eprintln!("[{} error] {}", kind, message)
        }
    }
}
