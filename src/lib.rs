pub mod config;
pub mod error;
pub mod output;
pub mod server;
pub mod youtube;

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Language tried when the caller does not pass `lang`
pub const DEFAULT_LANG: &str = "zh";

/// Languages tried, in order, after the requested one
pub const FALLBACK_LANGS: [&str; 3] = ["zh-Hans", "zh-Hant", "en"];

/// A single captioned segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub text: String,
    pub start: f64,
    pub duration: f64,
}

/// Body returned for a successful transcript request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptResponse {
    pub video_id: String,
    pub transcript_text: String,
    pub transcript_json: Vec<Segment>,
}

// Order matters: the generic pattern also matches shorts/ and youtu.be/ URLs,
// so the last two only fire for inputs the first one rejects.
static ID_PATTERNS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        Regex::new(r"(?:v=|/)([0-9A-Za-z_-]{11}).*").expect("valid id pattern"),
        Regex::new(r"(?:shorts/)([0-9A-Za-z_-]{11})").expect("valid shorts pattern"),
        Regex::new(r"(?:youtu\.be/)([0-9A-Za-z_-]{11})").expect("valid short-link pattern"),
    ]
});

/// Resolve a video ID from a bare ID, watch URL, shorts URL or youtu.be link.
///
/// Never fails: input that matches none of the known shapes is returned as-is
/// and left for the provider to reject.
pub fn resolve_video_id(input: &str) -> String {
    if input.chars().count() == 11 && !input.contains('/') {
        return input.to_string();
    }

    for pattern in ID_PATTERNS.iter() {
        if let Some(caps) = pattern.captures(input) {
            return caps[1].to_string();
        }
    }

    input.to_string()
}

/// Build the ordered language list handed to the provider: the requested
/// language first, then the fallbacks. Duplicates are kept.
pub fn language_preference<S: AsRef<str>>(requested: &str, fallbacks: &[S]) -> Vec<String> {
    std::iter::once(requested.to_string())
        .chain(fallbacks.iter().map(|l| l.as_ref().to_string()))
        .collect()
}
