//! Configuration for the completion client and retry behavior

use std::fmt;
use serde::{Deserialize, Serialize};
use log::debug;

pub const DEFAULT_API_BASE: &str
  = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const API_KEY_VAR: &str = "OPENAI_API_KEY";
pub const BASE_URL_VAR: &str = "OPENAI_BASE_URL";
pub const MODEL_VAR: &str = "OPENAI_MODEL";
pub const TIMEOUT_VAR: &str = "OPENAI_TIMEOUT_SECS";

/// Client configuration, handed to the client at construction
#[derive(Clone, Serialize, Deserialize)]
pub struct ClientConfig
{   /// Bearer token for the completion endpoint
    pub api_key: String
  , /// API base URL, without the trailing endpoint path
    #[serde(default = "default_base_url")]
    pub base_url: String
  , /// Model identifier sent with every request
    #[serde(default = "default_model")]
    pub model: String
  , /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64
}

fn default_base_url() -> String
{   DEFAULT_API_BASE.to_string()
}

fn default_model() -> String
{   DEFAULT_MODEL.to_string()
}

fn default_timeout_secs() -> u64
{   DEFAULT_TIMEOUT_SECS
}

impl ClientConfig
{   /// Config with default endpoint, model and timeout
    pub fn new(api_key: impl Into<String>) -> Self
    {   ClientConfig
        {   api_key: api_key.into()
          , base_url: default_base_url()
          , model: default_model()
          , timeout_secs: default_timeout_secs()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self
    {   self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self
    {   self.model = model.into();
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self
    {   self.timeout_secs = timeout_secs;
        self
    }

    /// Read the config from the process environment
    pub fn from_env() -> Result<Self, crate::error::Error>
    {   Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the config through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F)
      -> Result<Self, crate::error::Error>
    where
      F: Fn(&str) -> Option<String>
    {   let api_key = lookup(API_KEY_VAR)
          .filter(|k| !k.trim().is_empty())
          .ok_or_else(|| {
            crate::error::Error::MissingApiKey(
              API_KEY_VAR.to_string()
            )
          })?;

        let mut config = ClientConfig::new(api_key);
        if let Some(base_url) = lookup(BASE_URL_VAR)
        {   debug!("Using base URL from {}", BASE_URL_VAR);
            config.base_url = base_url;
        }
        if let Some(model) = lookup(MODEL_VAR)
        {   config.model = model;
        }
        if let Some(raw) = lookup(TIMEOUT_VAR)
        {   config.timeout_secs = raw.trim().parse()
              .map_err(|_| {
                crate::error::Error::InvalidConfiguration(
                  format!("{} is not a number: {}", TIMEOUT_VAR, raw)
                )
              })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse the config from JSON
    pub fn from_json_str(json: &str)
      -> Result<Self, crate::error::Error>
    {   let config: ClientConfig = serde_json::from_str(json)
          .map_err(|e| {
            crate::error::Error::InvalidConfiguration(e.to_string())
          })?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that would make every call fail
    pub fn validate(&self) -> Result<(), crate::error::Error>
    {   if self.api_key.trim().is_empty()
        {   return Err(crate::error::Error::MissingApiKey(
              "api_key".to_string()
            ));
        }
        if self.timeout_secs == 0
        {   return Err(crate::error::Error::InvalidConfiguration(
              "timeout_secs must be positive".to_string()
            ));
        }
        if !(self.base_url.starts_with("http://")
          || self.base_url.starts_with("https://"))
        {   return Err(crate::error::Error::InvalidConfiguration(
              format!("base_url is not an http(s) URL: {}", self.base_url)
            ));
        }
        Ok(())
    }

    /// Full URL of the chat completions endpoint
    pub fn completions_url(&self) -> String
    {   format!(
          "{}/chat/completions",
          self.base_url.trim_end_matches('/')
        )
    }
}

impl fmt::Debug for ClientConfig
{   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {   f.debug_struct("ClientConfig")
          .field("api_key", &"<redacted>")
          .field("base_url", &self.base_url)
          .field("model", &self.model)
          .field("timeout_secs", &self.timeout_secs)
          .finish()
    }
}

/// Retry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig
{   /// Max retry attempts after the first call
    pub max_retries: usize
  , /// Backoff multiplier for retries
    pub backoff_multiplier: f32
  , /// Initial backoff duration in milliseconds
    pub initial_backoff_ms: u64
}

impl Default for RetryConfig
{   fn default() -> Self
    {   RetryConfig
        {   max_retries: 3
          , backoff_multiplier: 2.0
          , initial_backoff_ms: 100
        }
    }
}
