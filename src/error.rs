use std::path::PathBuf;
use thiserror::Error;

/// Everything that can end a fetch → group → render cycle.
///
/// All variants are terminal for the current cycle only; the control panel moves to its
/// error state and the next trigger starts cleanly.
#[derive(Debug, Error)]
pub enum ChartError {
    /// The forecast endpoint answered with a non-success status.
    #[error("forecast request failed with HTTP {status}: {body}")]
    Transport { status: u16, body: String },

    /// The request never produced a response (DNS, connect, timeout, …).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The response body was not the expected forecast object.
    #[error("could not decode forecast payload: {source}")]
    Decode {
        body: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("no hourly time data returned")]
    MissingTimeData,

    /// The render target does not exist (e.g. output directory missing).
    #[error("chart container not found: {}", .0.display())]
    ContainerNotFound(PathBuf),

    #[error("drawing failed: {0}")]
    Draw(String),
}

impl ChartError {
    /// HTTP status of a transport failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ChartError::Transport { status, .. } => Some(*status),
            ChartError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
