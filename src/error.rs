// error.rs

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("invalid API base URL '{0}'")]
    InvalidBaseUrl(String),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server responded with HTTP {0}")]
    Status(StatusCode),

    #[error("could not decode response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Reasons a draft is refused before anything is sent.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DraftError {
    #[error("Please enter a name for the todo.")]
    MissingName,

    #[error("Please choose a day for the todo.")]
    MissingDay,

    #[error("The previous todo is still being added.")]
    AlreadySending,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config file i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("config file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
