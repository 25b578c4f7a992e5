use crate::{Segment, TranscriptResponse};

/// Render segments as plain text (space-separated, no timestamps)
pub fn render_text(segments: &[Segment]) -> String {
    segments
        .iter()
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn build_response(video_id: String, segments: Vec<Segment>) -> TranscriptResponse {
    TranscriptResponse {
        video_id,
        transcript_text: render_text(&segments),
        transcript_json: segments,
    }
}
