//! Server-sent-event line parsing for streamed chat completions.
//!
//! OpenAI-compatible endpoints stream `data: <json>` lines terminated by a
//! `data: [DONE]` sentinel; each JSON payload carries a content delta at
//! `choices[0].delta.content`.

use serde::Deserialize;

#[derive(Deserialize)]
struct StreamChunk {
    choices: Vec<StreamChoice>,
}

#[derive(Deserialize)]
struct StreamChoice {
    delta: StreamDelta,
}

#[derive(Deserialize)]
struct StreamDelta {
    #[serde(default)]
    content: Option<String>,
}

/// Result of parsing one SSE line.
#[derive(Debug, PartialEq)]
pub(crate) enum SseEvent {
    /// A content token delta (may be empty for role/metadata chunks)
    Delta(String),
    /// The `[DONE]` sentinel
    Done,
    /// A line carrying no data payload (comments, event names, blanks)
    Ignore,
}

/// Parse one line of an SSE body.
pub(crate) fn parse_sse_line(line: &str) -> SseEvent {
    let line = line.trim();
    let Some(data) = line.strip_prefix("data:") else {
        return SseEvent::Ignore;
    };
    let data = data.trim();

    if data == "[DONE]" {
        return SseEvent::Done;
    }

    match serde_json::from_str::<StreamChunk>(data) {
        Ok(chunk) => {
            let delta = chunk
                .choices
                .first()
                .and_then(|c| c.delta.content.clone())
                .unwrap_or_default();
            SseEvent::Delta(delta)
        }
        // Malformed chunks are skipped rather than aborting the stream
        Err(_) => SseEvent::Ignore,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_content_delta() {
        let line = r#"data: {"choices":[{"delta":{"content":"안녕"}}]}"#;
        assert_eq!(parse_sse_line(line), SseEvent::Delta("안녕".to_string()));
    }

    #[test]
    fn test_parse_role_chunk_empty_delta() {
        let line = r#"data: {"choices":[{"delta":{"role":"assistant"}}]}"#;
        assert_eq!(parse_sse_line(line), SseEvent::Delta(String::new()));
    }

    #[test]
    fn test_parse_done_sentinel() {
        assert_eq!(parse_sse_line("data: [DONE]"), SseEvent::Done);
    }

    #[test]
    fn test_parse_non_data_line_ignored() {
        assert_eq!(parse_sse_line(": keep-alive"), SseEvent::Ignore);
        assert_eq!(parse_sse_line(""), SseEvent::Ignore);
    }

    #[test]
    fn test_parse_malformed_json_ignored() {
        assert_eq!(parse_sse_line("data: {not json"), SseEvent::Ignore);
    }
}
