use std::sync::LazyLock;

use async_trait::async_trait;
use log::debug;
use regex::Regex;
use serde::Deserialize;

use crate::Segment;
use crate::error::ProviderError;

type Result<T> = std::result::Result<T, ProviderError>;

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

static MARKUP_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid markup pattern"));

// Older pages expose the key in ytcfg, newer ones as a JS assignment
static API_KEY_PATTERNS: LazyLock<[Regex; 2]> = LazyLock::new(|| {
    [
        Regex::new(r#""INNERTUBE_API_KEY"\s*:\s*"([^"]+)""#).expect("valid ytcfg key pattern"),
        Regex::new(r#"innertubeApiKey\s*[=:]\s*"([^"]+)""#).expect("valid inline key pattern"),
    ]
});

const CONSENT_FORM: &str = "action=\"https://consent.youtube.com/s\"";
const RECAPTCHA: &str = "class=\"g-recaptcha\"";

/// Source of caption tracks for a video
#[async_trait]
pub trait TranscriptProvider: Send + Sync {
    /// Fetch the first available track in `languages` order
    async fn fetch_transcript(&self, video_id: &str, languages: &[String]) -> Result<Vec<Segment>>;
}

#[derive(Debug, Deserialize)]
struct InnerTubePlayerResponse {
    #[serde(rename = "playabilityStatus")]
    playability_status: Option<PlayabilityStatus>,
    captions: Option<CaptionsData>,
}

#[derive(Debug, Deserialize)]
struct PlayabilityStatus {
    status: Option<String>,
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CaptionsData {
    #[serde(rename = "playerCaptionsTracklistRenderer")]
    player_captions_tracklist_renderer: Option<CaptionTracklistRenderer>,
}

#[derive(Debug, Deserialize)]
struct CaptionTracklistRenderer {
    #[serde(rename = "captionTracks")]
    caption_tracks: Option<Vec<CaptionTrack>>,
}

#[derive(Debug, Clone, Deserialize)]
struct CaptionTrack {
    #[serde(rename = "baseUrl")]
    base_url: String,
    #[serde(rename = "languageCode")]
    language_code: String,
    /// "asr" for auto-generated tracks
    kind: Option<String>,
}

impl CaptionTrack {
    fn is_generated(&self) -> bool {
        self.kind.as_deref() == Some("asr")
    }
}

/// Fetches captions through YouTube's InnerTube player API
#[derive(Debug, Clone, Default)]
pub struct YouTubeProvider {
    client: reqwest::Client,
}

impl YouTubeProvider {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn fetch_tracks(&self, video_id: &str) -> Result<Vec<CaptionTrack>> {
        // Step 1: Fetch the watch page to get the InnerTube API key
        let watch_url = format!("https://www.youtube.com/watch?v={video_id}");
        debug!("Fetching watch page: {watch_url}");

        let page_html = self
            .client
            .get(&watch_url)
            .header("User-Agent", USER_AGENT)
            .header("Accept-Language", "en-US")
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let api_key = inspect_watch_page(&page_html)?;
        debug!("Extracted InnerTube API key: {api_key}");

        // Step 2: Call InnerTube player endpoint
        let player_url = format!("https://www.youtube.com/youtubei/v1/player?key={api_key}&prettyPrint=false");

        let body = serde_json::json!({
            "context": {
                "client": {
                    "clientName": "ANDROID",
                    "clientVersion": "20.10.38"
                }
            },
            "videoId": video_id
        });

        let resp: InnerTubePlayerResponse = self
            .client
            .post(&player_url)
            .header("User-Agent", USER_AGENT)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        caption_tracks(video_id, resp)
    }

    async fn fetch_track(&self, track: &CaptionTrack) -> Result<Vec<Segment>> {
        let url = track.base_url.replace("&fmt=srv3", "");

        let caption_xml = self
            .client
            .get(&url)
            .header("User-Agent", USER_AGENT)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        parse_caption_xml(&caption_xml)
    }
}

#[async_trait]
impl TranscriptProvider for YouTubeProvider {
    async fn fetch_transcript(&self, video_id: &str, languages: &[String]) -> Result<Vec<Segment>> {
        let tracks = self.fetch_tracks(video_id).await?;
        let track = select_track(video_id, &tracks, languages)?;
        debug!(
            "Using caption track: lang={} generated={}",
            track.language_code,
            track.is_generated()
        );

        self.fetch_track(track).await
    }
}

fn caption_tracks(video_id: &str, resp: InnerTubePlayerResponse) -> Result<Vec<CaptionTrack>> {
    if let Some(playability) = resp.playability_status {
        let status = playability.status.unwrap_or_default();
        if status != "OK" {
            return Err(ProviderError::VideoUnavailable {
                video_id: video_id.to_string(),
                reason: playability.reason.unwrap_or(status),
            });
        }
    }

    let tracks = resp
        .captions
        .and_then(|c| c.player_captions_tracklist_renderer)
        .and_then(|r| r.caption_tracks)
        .unwrap_or_default();

    if tracks.is_empty() {
        return Err(ProviderError::TranscriptsDisabled(video_id.to_string()));
    }

    Ok(tracks)
}

/// Walk the preference list in order; for each language a manually created
/// track beats an auto-generated one.
fn select_track<'a>(video_id: &str, tracks: &'a [CaptionTrack], languages: &[String]) -> Result<&'a CaptionTrack> {
    for lang in languages {
        let mut matching = tracks.iter().filter(|t| &t.language_code == lang);
        let manual = matching.clone().find(|t| !t.is_generated());
        if let Some(track) = manual.or_else(|| matching.next()) {
            return Ok(track);
        }
    }

    Err(ProviderError::NoTranscriptFound {
        video_id: video_id.to_string(),
        requested: languages.to_vec(),
        available: tracks.iter().map(|t| t.language_code.clone()).collect(),
    })
}

/// Pull the InnerTube API key out of a watch page, recognising the
/// interstitials YouTube serves instead of the player.
fn inspect_watch_page(html: &str) -> Result<String> {
    if html.contains(RECAPTCHA) {
        return Err(ProviderError::TooManyRequests);
    }
    if html.contains(CONSENT_FORM) {
        return Err(ProviderError::ConsentRequired);
    }

    API_KEY_PATTERNS
        .iter()
        .find_map(|re| re.captures(html).map(|caps| caps[1].to_string()))
        .ok_or_else(|| ProviderError::Parse("watch page carries no InnerTube API key".to_string()))
}

fn parse_caption_xml(xml: &str) -> Result<Vec<Segment>> {
    use quick_xml::Reader;
    use quick_xml::events::Event;

    let mut reader = Reader::from_str(xml);
    let mut segments = Vec::new();
    let mut current: Option<(f64, f64)> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) if e.name().as_ref() == b"text" => {
                let mut start = None;
                let mut dur = None;
                for attr in e.attributes().flatten() {
                    match attr.key.as_ref() {
                        b"start" => {
                            start = String::from_utf8_lossy(&attr.value).parse::<f64>().ok();
                        }
                        b"dur" => {
                            dur = String::from_utf8_lossy(&attr.value).parse::<f64>().ok();
                        }
                        _ => {}
                    }
                }
                current = start.map(|s| (s, dur.unwrap_or(0.0)));
            }
            Ok(Event::End(ref e)) if e.name().as_ref() == b"text" => {
                current = None;
            }
            Ok(Event::Text(ref e)) => {
                if let Some((start, duration)) = current.take() {
                    let raw_text = e.unescape().unwrap_or_default().to_string();
                    let decoded = html_escape::decode_html_entities(&raw_text);
                    let text = MARKUP_TAG.replace_all(&decoded, "").to_string();
                    if !text.is_empty() {
                        segments.push(Segment { text, start, duration });
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ProviderError::Parse(format!("error parsing caption XML: {e}"))),
            _ => {}
        }
    }

    Ok(segments)
}
