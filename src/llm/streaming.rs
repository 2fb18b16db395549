//! Streaming response handling

use std::pin::Pin;

use futures::Stream;
use futures::StreamExt;

use crate::errors::Result;
use crate::errors::ScrubMateError;

pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// Streaming response from LLM
pub struct StreamingResponse {
    stream: ChunkStream,
}

impl StreamingResponse {
    pub fn new(stream: ChunkStream) -> Self {
        Self { stream }
    }

    /// Response that yields the given chunks in order
    pub fn from_chunks<I>(chunks: I) -> Self
    where
        I: IntoIterator<Item = String>,
        I::IntoIter: Send + 'static,
    {
        Self::new(Box::pin(futures::stream::iter(chunks.into_iter().map(Ok))))
    }

    /// Collect all chunks into a single string
    pub async fn collect_all(mut self) -> Result<String> {
        let mut result = String::new();
        while let Some(chunk) = self.stream.next().await {
            result.push_str(&chunk?);
        }
        Ok(result)
    }

    /// Get the underlying stream
    pub fn into_stream(self) -> ChunkStream {
        self.stream
    }
}

/// One parsed line of a server-sent-events body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseEvent {
    /// Text delta to append to the reply
    Content(String),
    /// End-of-stream marker
    Done,
    /// Comment, keep-alive, role-only delta, or anything without text
    Skip,
}

/// Parse one line of an OpenAI-compatible chat-completions stream
pub fn parse_sse_line(line: &str) -> SseEvent {
    let Some(data) = line.trim().strip_prefix("data:") else {
        return SseEvent::Skip;
    };
    let data = data.trim();
    if data == "[DONE]" {
        return SseEvent::Done;
    }

    match serde_json::from_str::<serde_json::Value>(data) {
        Ok(parsed) => match parsed["choices"][0]["delta"]["content"].as_str() {
            Some(content) if !content.is_empty() => SseEvent::Content(content.to_string()),
            _ => SseEvent::Skip,
        },
        Err(e) => {
            tracing::debug!("Skipping unparsable stream line: {}", e);
            SseEvent::Skip
        }
    }
}

/// Decode a chat-completions SSE body into text chunks.
///
/// Lines are split on raw bytes so a multi-byte character cut across network
/// chunks stays intact. Decoding stops at `[DONE]` or at the first transport
/// error; a final line without a trailing newline is still parsed.
pub fn decode_sse<S, B, E>(bytes: S) -> ChunkStream
where
    S: Stream<Item = std::result::Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Into<ScrubMateError> + Send + 'static,
{
    Box::pin(async_stream::stream! {
        let mut bytes = Box::pin(bytes);
        let mut buffer: Vec<u8> = Vec::new();
        while let Some(chunk) = bytes.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    let err: ScrubMateError = e.into();
                    yield Err(err);
                    return;
                }
            };
            buffer.extend_from_slice(chunk.as_ref());

            while let Some(pos) = buffer.iter().position(|b| *b == b'\n') {
                let line: Vec<u8> = buffer.drain(..=pos).collect();
                match parse_sse_line(&String::from_utf8_lossy(&line)) {
                    SseEvent::Content(text) => {
                        yield Ok::<String, ScrubMateError>(text);
                    }
                    SseEvent::Done => return,
                    SseEvent::Skip => {}
                }
            }
        }

        if let SseEvent::Content(text) = parse_sse_line(&String::from_utf8_lossy(&buffer)) {
            yield Ok(text);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(parts: &[&[u8]]) -> ChunkStream {
        let parts: Vec<std::result::Result<Vec<u8>, ScrubMateError>> =
            parts.iter().map(|p| Ok(p.to_vec())).collect();
        decode_sse(futures::stream::iter(parts))
    }

    async fn collect(stream: ChunkStream) -> Vec<Result<String>> {
        stream.collect().await
    }

    #[test]
    fn test_parse_content_delta() {
        let line = r#"data: {"choices":[{"delta":{"content":"1. Foley"}}]}"#;
        assert_eq!(parse_sse_line(line), SseEvent::Content("1. Foley".to_string()));
    }

    #[test]
    fn test_parse_done_and_noise() {
        assert_eq!(parse_sse_line("data: [DONE]"), SseEvent::Done);
        assert_eq!(parse_sse_line(": keep-alive"), SseEvent::Skip);
        assert_eq!(parse_sse_line(""), SseEvent::Skip);
        assert_eq!(parse_sse_line("data: {broken"), SseEvent::Skip);
        assert_eq!(
            parse_sse_line(r#"data: {"choices":[{"delta":{"role":"assistant"}}]}"#),
            SseEvent::Skip
        );
    }

    #[tokio::test]
    async fn test_decode_keeps_split_multibyte_char() {
        let line = "data: {\"choices\":[{\"delta\":{\"content\":\"수술\"}}]}\n".as_bytes();
        // cut inside the first Hangul syllable
        let cut = line.iter().position(|b| *b >= 0x80).unwrap() + 1;
        let text = StreamingResponse::new(body(&[&line[..cut], &line[cut..]]))
            .collect_all()
            .await
            .unwrap();
        assert_eq!(text, "수술");
    }

    #[tokio::test]
    async fn test_decode_stops_at_done() {
        let stream = body(&[
            b"data: {\"choices\":[{\"delta\":{\"content\":\"a\"}}]}\n\ndata: [DONE]\n",
            b"data: {\"choices\":[{\"delta\":{\"content\":\"late\"}}]}\n",
        ]);
        let chunks: Vec<String> = collect(stream).await.into_iter().map(|c| c.unwrap()).collect();
        assert_eq!(chunks, vec!["a"]);
    }

    #[tokio::test]
    async fn test_decode_parses_unterminated_last_line() {
        let stream = body(&[
            b"data: {\"choices\":[{\"delta\":{\"content\":\"1. \"}}]}\n",
            b"data: {\"choices\":[{\"delta\":{\"content\":\"Foley\"}}]}",
        ]);
        let text = StreamingResponse::new(stream).collect_all().await.unwrap();
        assert_eq!(text, "1. Foley");
    }

    #[tokio::test]
    async fn test_decode_ends_on_transport_error() {
        let parts: Vec<std::result::Result<Vec<u8>, ScrubMateError>> = vec![
            Ok(b"data: {\"choices\":[{\"delta\":{\"content\":\"a\"}}]}\n".to_vec()),
            Err(ScrubMateError::LlmError("reset".to_string())),
            Ok(b"data: {\"choices\":[{\"delta\":{\"content\":\"b\"}}]}\n".to_vec()),
        ];
        let chunks = collect(decode_sse(futures::stream::iter(parts))).await;
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].as_deref().unwrap(), "a");
        assert!(matches!(chunks[1], Err(ScrubMateError::LlmError(_))));
    }

    #[tokio::test]
    async fn test_collect_all() {
        let response = StreamingResponse::from_chunks(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(response.collect_all().await.unwrap(), "ab");
    }

    #[tokio::test]
    async fn test_collect_all_propagates_error() {
        let stream = futures::stream::iter(vec![
            Ok("partial".to_string()),
            Err(crate::ScrubMateError::LlmError("connection reset".to_string())),
        ]);
        let response = StreamingResponse::new(Box::pin(stream));
        assert!(response.collect_all().await.is_err());
    }
}
