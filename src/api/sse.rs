//! Server-Sent Events support
//!
//! Frames are unnamed `data: <json>` events; clients dispatch on the JSON keys
//! (`start`, `text`, `error`, `end`).

use crate::llm::{EventStream, StreamEvent};
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::StreamExt;

/// Convert a model event stream to an SSE response body
pub fn sse_stream(events: EventStream) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let frames = events.map(|event| Ok(stream_event_to_axum(&event)));

    // Models can think for a while before the first line
    Sse::new(frames).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}

fn stream_event_to_axum(event: &StreamEvent) -> Event {
    Event::default().data(event.to_json().to_string())
}
