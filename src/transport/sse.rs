//! Server-sent-event decoding (bytes -> [`StreamEvent`]).
//!
//! Lines are split on `\n` from a byte buffer, so multi-byte characters cut by
//! a chunk boundary are reassembled before decoding. Only `data:` lines carry
//! payloads; `event:`, `id:` and `:` comment lines are ignored. The stream ends
//! right after the end-of-stream marker (`[DONE]`, or the provider's own stop
//! event) has been yielded.

use super::provider::{Provider, StreamFrame};
use crate::types::StreamEvent;
use crate::{BoxStream, Error, Result};
use bytes::Bytes;
use futures::{stream, StreamExt};
use serde_json::Value;

const DONE_SIGNAL: &str = "[DONE]";

struct DecodeState {
    input: BoxStream<'static, Bytes>,
    buf: Vec<u8>,
    eof: bool,
    finished: bool,
}

pub fn decode_events(
    provider: Provider,
    input: BoxStream<'static, Bytes>,
) -> BoxStream<'static, StreamEvent> {
    let state = DecodeState {
        input,
        buf: Vec::new(),
        eof: false,
        finished: false,
    };

    let events = stream::unfold(state, move |mut st| async move {
        if st.finished {
            return None;
        }
        loop {
            if let Some(line) = next_line(&mut st.buf, st.eof) {
                match decode_line(provider, &line) {
                    Ok(None) => continue,
                    Ok(Some(event)) => {
                        st.finished = event.is_done();
                        return Some((Ok(event), st));
                    }
                    Err(e) => {
                        st.finished = true;
                        return Some((Err(e), st));
                    }
                }
            }

            if st.eof {
                st.finished = true;
                let err = Error::MalformedResponse(
                    "stream closed before the end-of-stream marker".to_string(),
                );
                return Some((Err(err), st));
            }

            match st.input.next().await {
                Some(Ok(bytes)) => st.buf.extend_from_slice(&bytes),
                Some(Err(e)) => {
                    st.finished = true;
                    return Some((Err(e), st));
                }
                None => st.eof = true,
            }
        }
    });

    Box::pin(events)
}

// Pops one complete line; at EOF a trailing unterminated line counts too.
fn next_line(buf: &mut Vec<u8>, eof: bool) -> Option<String> {
    let end = match buf.iter().position(|&b| b == b'\n') {
        Some(idx) => idx,
        None if eof && !buf.is_empty() => buf.len(),
        None => return None,
    };
    let mut line: Vec<u8> = buf.drain(..end).collect();
    if !buf.is_empty() {
        buf.remove(0);
    }
    if line.last() == Some(&b'\r') {
        line.pop();
    }
    Some(String::from_utf8_lossy(&line).into_owned())
}

fn decode_line(provider: Provider, line: &str) -> Result<Option<StreamEvent>> {
    let Some(payload) = line.strip_prefix("data:") else {
        return Ok(None);
    };
    let payload = payload.trim();
    if payload.is_empty() {
        return Ok(None);
    }
    if payload == DONE_SIGNAL {
        return Ok(Some(StreamEvent::Done));
    }

    let value: Value = serde_json::from_str(payload).map_err(invalid_payload)?;
    match provider.parse_stream_payload(&value)? {
        StreamFrame::Event(event) => Ok(Some(event)),
        StreamFrame::Skip => Ok(None),
    }
}

fn invalid_payload(e: serde_json::Error) -> Error {
    Error::MalformedResponse(format!("invalid stream payload: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunks(parts: &[&'static [u8]]) -> BoxStream<'static, Bytes> {
        let items: Vec<Result<Bytes>> = parts.iter().map(|p| Ok(Bytes::from_static(p))).collect();
        Box::pin(stream::iter(items))
    }

    async fn collect(provider: Provider, parts: &[&'static [u8]]) -> Vec<Result<StreamEvent>> {
        decode_events(provider, chunks(parts)).collect().await
    }

    #[tokio::test]
    async fn openai_deltas_then_done() {
        let events = collect(
            Provider::OpenAi,
            &[
                b"data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\n\n",
                b"data: {\"choices\":[{\"delta\":{\"content\":\"Hello\"}}]}\n\ndata: {\"choices\":[{\"delta\":{\"content\":\" World\"}}]}\n\n",
                b"data: [DONE]\n\n",
                b"data: {\"choices\":[{\"delta\":{\"content\":\"ignored\"}}]}\n\n",
            ],
        )
        .await;
        let events: Vec<StreamEvent> = events.into_iter().map(|e| e.unwrap()).collect();
        let expected = vec![
            StreamEvent::text("Hello"),
            StreamEvent::text(" World"),
            StreamEvent::Done,
        ];
        assert_eq!(events, expected);
    }

    #[tokio::test]
    async fn reassembles_lines_split_across_chunks() {
        // "é" is two bytes; split between them.
        let events = collect(
            Provider::OpenAi,
            &[
                b"data: {\"choices\":[{\"delta\":{\"content\":\"caf\xc3",
                b"\xa9\"}}]}\r\n",
                b"data: [DONE]",
            ],
        )
        .await;
        let events: Vec<StreamEvent> = events.into_iter().map(|e| e.unwrap()).collect();
        assert_eq!(events, vec![StreamEvent::text("café"), StreamEvent::Done]);
    }

    #[tokio::test]
    async fn anthropic_events_end_on_message_stop() {
        let events = collect(
            Provider::Anthropic,
            &[
                b"event: message_start\ndata: {\"type\":\"message_start\",\"message\":{}}\n\n",
                b"event: content_block_delta\ndata: {\"type\":\"content_block_delta\",\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\"Hi\"}}\n\n",
                b"event: message_stop\ndata: {\"type\":\"message_stop\"}\n\n",
            ],
        )
        .await;
        let events: Vec<StreamEvent> = events.into_iter().map(|e| e.unwrap()).collect();
        assert_eq!(events, vec![StreamEvent::text("Hi"), StreamEvent::Done]);
    }

    #[tokio::test]
    async fn missing_done_marker_is_malformed() {
        let events = collect(
            Provider::OpenAi,
            &[b"data: {\"choices\":[{\"delta\":{\"content\":\"partial\"}}]}\n\n"],
        )
        .await;
        assert_eq!(events.len(), 2);
        assert!(matches!(events[1], Err(Error::MalformedResponse(_))));
    }

    #[tokio::test]
    async fn invalid_json_payload_is_malformed() {
        let events = collect(Provider::OpenAi, &[b"data: {not json\n\n"]).await;
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], Err(Error::MalformedResponse(_))));
    }
}
