use std::sync::Arc;
use async_trait::async_trait;
use tokio::sync::mpsc;
use log::{debug, error, info};
use crate::ChatFoot;

/// Anything that turns a prompt into a completion outcome
#[async_trait]
pub trait Completer: Send + Sync
{   async fn complete(&self, prompt: &str) -> crate::CompletionResult;
}

#[async_trait]
impl<C> Completer for Arc<C>
where
  C: Completer + ?Sized
{   async fn complete(&self, prompt: &str) -> crate::CompletionResult
    {   (**self).complete(prompt).await
    }
}

/// Public API for the chat backend - owns the task
pub struct ChatBackend
{   hand: crate::ChatHand
  , _task_handle: tokio::task::JoinHandle<()>
}

impl ChatBackend
{   /// Create and spawn a new chat backend.
    /// Returns immediately - spawns background task
    pub fn new(completer: Arc<dyn Completer>) -> Self
    {   debug!("Creating ChatBackend with task ownership");

        let (send_prompt_tx, send_prompt_rx)
          = mpsc::unbounded_channel();
        let (kill_process_tx, kill_process_rx)
          = mpsc::unbounded_channel();

        let hand = crate::ChatHand
        {   send_prompt_tx
          , kill_process_tx
        };

        let foot = crate::ChatFoot
        {   send_prompt_rx
          , kill_process_rx
        };

        let _task_handle = tokio::spawn(async move {
          run_backend_loop(foot, completer).await
        });

        ChatBackend
        {   hand
          , _task_handle
        }
    }

    /// Backend over a plain client built from `config`
    pub fn from_config(config: crate::config::ClientConfig) -> Self
    {   ChatBackend::new(Arc::new(
          crate::providers::CompletionClient::new(config)
        ))
    }

    /// Send a prompt - returns almost immediately.
    /// The reply arrives on the returned receiver.
    pub fn send_prompt(
      &self
    , prompt: String
    ) -> Result<
        mpsc::UnboundedReceiver<crate::SendPromptReply>,
        crate::error::Error
      >
    {   debug!("send_prompt queuing command");
        let (reply_tx, reply_rx)
          = mpsc::unbounded_channel();

        let cmd = crate::SendPromptArgs
        {   prompt
          , reply: reply_tx
        };

        self.hand.send_prompt_tx
          .send(cmd)
          .map_err(|_| {
            error!("Backend channel closed");
            crate::error::Error::BackendClosed
          })?;

        Ok(reply_rx)
    }

    /// Send a prompt and wait for its reply
    pub async fn ask(
      &self
    , prompt: String
    ) -> Result<crate::CompletionResult, crate::error::Error>
    {   let mut reply_rx = self.send_prompt(prompt)?;
        reply_rx.recv().await
          .ok_or(crate::error::Error::BackendClosed)
    }

    /// Gracefully shutdown the backend.
    /// Prompts accepted before the shutdown still deliver their replies.
    pub async fn shutdown(&self)
      -> Result<(), crate::error::Error>
    {   debug!("Shutting down ChatBackend");
        let (reply_tx, mut reply_rx)
          = mpsc::unbounded_channel();

        let cmd = crate::KillProcessArgs
        {   reply: reply_tx
        };

        self.hand.kill_process_tx
          .send(cmd)
          .map_err(|_| {
            error!("Backend channel already closed");
            crate::error::Error::BackendClosed
          })?;

        // Wait for shutdown confirmation
        if let Some(result) = reply_rx.recv().await
        {   debug!("Backend shutdown confirmed");
            result
        } else
        {   error!("Backend exited without confirming shutdown");
            Err(crate::error::Error::BackendClosed)
        }
    }
}

/// Main backend event loop
///
/// tokio::select! only routes commands. Each prompt runs on its own
/// task, so a slow completion never holds up the next one.
async fn run_backend_loop(
  foot: crate::ChatFoot
, completer: Arc<dyn Completer>
)
{   debug!("Starting ChatBackend event loop");
    let ChatFoot
    {   mut send_prompt_rx
      , mut kill_process_rx
    } = foot;

    loop
    { tokio::select!
      { Some(cmd) = send_prompt_rx.recv() => {
          debug!("Received SendPrompt");
          spawn_prompt(&completer, cmd);
        }
      , Some(cmd) = kill_process_rx.recv() => {
          debug!("Received KillProcess");
          send_prompt_rx.close();
          kill_process_rx.close();
          // Prompts queued before the close were already accepted
          while let Ok(queued) = send_prompt_rx.try_recv()
          {   debug!("Running prompt queued before shutdown");
              spawn_prompt(&completer, queued);
          }
          let _ = cmd.reply.send(Ok(()));
          info!("ChatBackend shutting down");
          break;
        }
      , else => {
          debug!("All backend channels closed");
          break;
        }
      }
    }
}

/// Run one prompt on its own task and send the outcome back
fn spawn_prompt(
  completer: &Arc<dyn Completer>
, cmd: crate::SendPromptArgs
)
{   let completer = Arc::clone(completer);
    tokio::spawn(async move {
      let result = completer.complete(&cmd.prompt).await;
      if cmd.reply.send(result).is_err()
      {   debug!("Prompt reply dropped by caller");
      }
    });
}
