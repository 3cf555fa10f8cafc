//! Server-Sent Events (SSE) processing for streaming responses.
//!
//! `streamGenerateContent?alt=sse` answers with a sequence of `data:` events,
//! each holding one complete `GenerateContentResponse` chunk. This module turns
//! the raw byte stream into a stream of parsed chunks.

use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};
use serde::Deserialize;

use crate::observability::{STREAM_BYTES, STREAM_CHUNKS, STREAM_ERRORS};
use crate::{Error, GenerateContentResponse, Result};

/// Process a stream of bytes into a stream of response chunks.
///
/// Handles buffering across network reads (including multi-byte characters
/// split between reads), CRLF line endings, comment and keep-alive events,
/// and error objects sent in place of a chunk.
pub fn process_sse<S, E>(byte_stream: S) -> impl Stream<Item = Result<GenerateContentResponse>>
where
    S: Stream<Item = std::result::Result<Bytes, E>> + Unpin + Send + 'static,
    E: std::error::Error + Send + Sync + 'static,
{
    let stream = byte_stream.map(|result| {
        result
            .map_err(|e| Error::streaming(format!("Error in HTTP stream: {e}"), Some(Box::new(e))))
    });

    let buffer: Vec<u8> = Vec::new();

    stream::unfold(
        (stream, buffer),
        move |(mut stream, mut buffer)| async move {
            loop {
                // Drain complete events already in the buffer
                while let Some((event, remaining)) = extract_event(&buffer) {
                    buffer = remaining;
                    if let Some(event) = event {
                        record(&event);
                        return Some((event, (stream, buffer)));
                    }
                }

                match stream.next().await {
                    Some(Ok(bytes)) => {
                        STREAM_BYTES.count(bytes.len() as u64);
                        buffer.extend(bytes.iter().copied().filter(|b| *b != b'\r'));
                    }
                    Some(Err(e)) => {
                        STREAM_ERRORS.click();
                        return Some((Err(e), (stream, buffer)));
                    }
                    None => {
                        // A final event may lack its trailing blank line
                        if buffer.iter().any(|b| !b.is_ascii_whitespace()) {
                            buffer.extend_from_slice(b"\n\n");
                            if let Some((Some(event), _)) = extract_event(&buffer) {
                                record(&event);
                                return Some((event, (stream, Vec::new())));
                            }
                        }
                        return None;
                    }
                }
            }
        },
    )
}

fn record(event: &Result<GenerateContentResponse>) {
    match event {
        Ok(_) => STREAM_CHUNKS.click(),
        Err(_) => STREAM_ERRORS.click(),
    }
}

/// Extract a complete SSE event from the front of the buffer.
///
/// Returns `None` when no complete event is buffered yet. The inner option is
/// `None` for events that carry no data (comments, keep-alives).
#[allow(clippy::type_complexity)]
fn extract_event(buffer: &[u8]) -> Option<(Option<Result<GenerateContentResponse>>, Vec<u8>)> {
    let end = buffer.windows(2).position(|w| w == b"\n\n")?;
    let rest = buffer[end + 2..].to_vec();

    let event_text = match std::str::from_utf8(&buffer[..end]) {
        Ok(text) => text,
        Err(e) => return Some((Some(Err(e.into())), rest)),
    };

    let data: Vec<&str> = event_text
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|data| data.strip_prefix(' ').unwrap_or(data))
        .collect();
    if data.is_empty() {
        return Some((None, rest));
    }

    Some((Some(parse_data(&data.join("\n"))), rest))
}

/// Parse the payload of one event.
fn parse_data(data: &str) -> Result<GenerateContentResponse> {
    #[derive(Deserialize)]
    struct ErrorEnvelope {
        error: ErrorDetail,
    }

    #[derive(Deserialize)]
    struct ErrorDetail {
        #[serde(default)]
        code: Option<u16>,
        #[serde(default)]
        message: Option<String>,
        #[serde(default)]
        status: Option<String>,
    }

    if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(data) {
        let detail = envelope.error;
        return Err(Error::api(
            detail.code.unwrap_or(500),
            detail.status.or_else(|| Some("stream_error".to_string())),
            detail.message.unwrap_or_else(|| data.to_string()),
        ));
    }

    serde_json::from_str::<GenerateContentResponse>(data).map_err(|e| {
        Error::serialization(
            format!("Failed to parse stream chunk: {e}"),
            Some(Box::new(e)),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use std::io;

    fn chunks(
        parts: Vec<&'static [u8]>,
    ) -> impl Stream<Item = std::result::Result<Bytes, io::Error>> + Unpin + Send + 'static {
        stream::iter(parts.into_iter().map(|p| Ok(Bytes::from_static(p))))
    }

    const HELLO: &[u8] =
        br#"data: {"candidates":[{"content":{"role":"model","parts":[{"text":"Hello"}]}}]}"#;

    #[tokio::test]
    async fn parse_single_chunk() {
        let mut sse = Box::pin(process_sse(chunks(vec![HELLO, &b"\r\n\r\n"[..]])));
        let chunk = sse.next().await.unwrap().unwrap();
        assert_eq!(chunk.text(), "Hello");
        assert!(sse.next().await.is_none());
    }

    #[tokio::test]
    async fn parse_multiple_chunks() {
        let data: &'static [u8] = b"data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"a\",\"thought\":true}]}}]}\n\ndata: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"b\"}]}}]}\n\n";
        let mut sse = Box::pin(process_sse(chunks(vec![data])));

        let first = sse.next().await.unwrap().unwrap();
        assert!(first.parts().next().unwrap().is_thought());
        let second = sse.next().await.unwrap().unwrap();
        assert_eq!(second.text(), "b");
        assert!(sse.next().await.is_none());
    }

    #[tokio::test]
    async fn handle_split_event() {
        let mut sse = Box::pin(process_sse(chunks(vec![
            &HELLO[..20],
            &HELLO[20..],
            &b"\n"[..],
            &b"\n"[..],
        ])));
        let chunk = sse.next().await.unwrap().unwrap();
        assert_eq!(chunk.text(), "Hello");
    }

    #[tokio::test]
    async fn handle_split_multibyte_character() {
        let data = "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"é\"}]}}]}\n\n"
            .as_bytes();
        let split = data.iter().position(|b| *b == 0xc3).unwrap() + 1;
        let (head, tail) = data.split_at(split);
        let stream = stream::iter(vec![
            Ok::<_, io::Error>(Bytes::copy_from_slice(head)),
            Ok(Bytes::copy_from_slice(tail)),
        ]);
        let mut sse = Box::pin(process_sse(stream));
        assert_eq!(sse.next().await.unwrap().unwrap().text(), "é");
    }

    #[tokio::test]
    async fn skip_comments() {
        let mut sse = Box::pin(process_sse(chunks(vec![&b": keep-alive\n\n"[..], HELLO, &b"\n\n"[..]])));
        assert_eq!(sse.next().await.unwrap().unwrap().text(), "Hello");
    }

    #[tokio::test]
    async fn final_event_without_blank_line() {
        let mut sse = Box::pin(process_sse(chunks(vec![HELLO])));
        assert_eq!(sse.next().await.unwrap().unwrap().text(), "Hello");
        assert!(sse.next().await.is_none());
    }

    #[tokio::test]
    async fn error_object_becomes_api_error() {
        let data: &'static [u8] =
            b"data: {\"error\":{\"code\":429,\"message\":\"quota\",\"status\":\"RESOURCE_EXHAUSTED\"}}\n\n";
        let mut sse = Box::pin(process_sse(chunks(vec![data])));
        let err = sse.next().await.unwrap().unwrap_err();
        assert_eq!(err.status_code(), Some(429));
        assert_eq!(err.message(), "quota");
    }

    #[tokio::test]
    async fn malformed_chunk_is_error() {
        let mut sse = Box::pin(process_sse(chunks(vec![&b"data: {not json\n\n"[..]])));
        let err = sse.next().await.unwrap().unwrap_err();
        assert!(err.is_serialization());
    }

    #[tokio::test]
    async fn transport_error_is_streaming_error() {
        let stream = stream::iter(vec![Err::<Bytes, _>(io::Error::other("reset"))]);
        let mut sse = Box::pin(process_sse(stream));
        let err = sse.next().await.unwrap().unwrap_err();
        assert!(matches!(err, Error::Streaming { .. }));
    }
}
