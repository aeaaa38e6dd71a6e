use std::fmt;

/// Error type for the surfaces around a completion call:
/// configuration loading and the backend channels.
/// Implements Clone for sending through channels
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error
{   /// API key is missing
    MissingApiKey(String)
  , /// Invalid configuration
    InvalidConfiguration(String)
  , /// Backend task is no longer running
    BackendClosed
}

impl fmt::Display for Error
{   fn fmt(&self, f: &mut fmt::Formatter<'_>)
      -> fmt::Result
    {   match self
        {   Error::MissingApiKey(source) => {
              write!(f, "Missing API key: {}", source)
            }
          , Error::InvalidConfiguration(msg) => {
              write!(f, "Invalid configuration: {}", msg)
            }
          , Error::BackendClosed => {
              write!(f, "Chat backend is closed")
            }
        }
    }
}

impl std::error::Error for Error {}

/// Why a completion call failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind
{   /// Connection could not be established or was interrupted
    Network
  , /// No response within the timeout window
    Timeout
  , /// Response body was not valid JSON
    Parse
  , /// Endpoint answered with a non-success status
    Upstream { status: u16 }
  , /// Client could not be set up for the call
    Configuration
}

impl FailureKind
{   /// Whether another attempt could plausibly succeed
    pub fn is_transient(&self) -> bool
    {   match self
        {   FailureKind::Network | FailureKind::Timeout => true
          , FailureKind::Upstream { status } => {
              *status == 429 || *status >= 500
            }
          , FailureKind::Parse | FailureKind::Configuration => false
        }
    }
}

impl fmt::Display for FailureKind
{   fn fmt(&self, f: &mut fmt::Formatter<'_>)
      -> fmt::Result
    {   match self
        {   FailureKind::Network => write!(f, "network")
          , FailureKind::Timeout => write!(f, "timeout")
          , FailureKind::Parse => write!(f, "parse")
          , FailureKind::Upstream { status } => {
              write!(f, "upstream {}", status)
            }
          , FailureKind::Configuration => write!(f, "configuration")
        }
    }
}
