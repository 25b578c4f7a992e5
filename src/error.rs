use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures reported by a transcript provider
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Captions are turned off for the video
    #[error("Transcripts are disabled for video {0}")]
    TranscriptsDisabled(String),

    /// The video has captions, but none in the requested languages
    #[error("No transcript found for video {video_id} in {requested:?} (available: {available:?})")]
    NoTranscriptFound {
        video_id: String,
        requested: Vec<String>,
        available: Vec<String>,
    },

    /// YouTube refused to play the video (private, removed, age-gated, bot check)
    #[error("Video {video_id} is unavailable: {reason}")]
    VideoUnavailable { video_id: String, reason: String },

    /// YouTube answered with a captcha page
    #[error("Too many requests: YouTube is rate limiting this address")]
    TooManyRequests,

    /// YouTube served its cookie-consent interstitial instead of the watch page
    #[error("YouTube requires cookie consent before serving this video")]
    ConsentRequired,

    #[error("Request to YouTube failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected response from YouTube: {0}")]
    Parse(String),
}

impl ProviderError {
    /// Disabled and not-found failures are about the video itself, everything
    /// else is a failure of the provider
    pub fn is_missing_transcript(&self) -> bool {
        matches!(self, Self::TranscriptsDisabled(_) | Self::NoTranscriptFound { .. })
    }
}

/// How provider failures map onto HTTP status codes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// 404 for disabled / not found, 500 for anything else
    #[default]
    Strict,
    /// 404 for every provider failure
    Collapse,
}

impl FailurePolicy {
    pub fn status_for(self, err: &ProviderError) -> StatusCode {
        match self {
            Self::Strict if !err.is_missing_transcript() => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::NOT_FOUND,
        }
    }
}

/// Errors surfaced to API callers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Please provide 'url' parameter")]
    MissingParameter,

    #[error("{message}")]
    Provider { status: StatusCode, message: String },
}

impl ApiError {
    pub fn from_provider(err: &ProviderError, policy: FailurePolicy) -> Self {
        let message = match err {
            ProviderError::TranscriptsDisabled(_) => "Transcripts are disabled for this video".to_string(),
            ProviderError::NoTranscriptFound { .. } => "No transcript found for this video".to_string(),
            other => other.to_string(),
        };

        Self::Provider {
            status: policy.status_for(err),
            message,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingParameter => StatusCode::BAD_REQUEST,
            Self::Provider { status, .. } => *status,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(ErrorBody { error: self.to_string() })).into_response()
    }
}
