//! Session preparation and result streaming.

use std::convert::Infallible;
use std::time::Duration;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, KeepAliveStream, Sse},
        IntoResponse, Response,
    },
    Form, Json,
};
use futures::stream::{self, BoxStream, StreamExt};
use log::{info, warn};
use tokio_stream::wrappers::UnboundedReceiverStream;

use super::super::types::{AppState, ErrorBody, SessionCreated, StreamQuery};
use crate::batch::BatchEvent;
use crate::ranking::RankCheckResult;
use crate::session::SessionForm;

const INVALID_SESSION_DATA: &str = r#"{"error":"Invalid session"}"#;
const PROCESSING_FAILED_DATA: &str = r#"{"error":"Processing failed"}"#;

type EventStream = BoxStream<'static, Result<Event, Infallible>>;

/// Validates posted lists and stores them under a new session token
pub async fn save_session_handler(
    State(state): State<AppState>,
    Form(form): Form<SessionForm>,
) -> Response {
    match form.into_params() {
        Ok(params) => {
            let pairs = params.pairs.len();
            let session_id = state.sessions.prepare(params);
            info!("Session {} prepared with {} pairs", session_id, pairs);
            Json(SessionCreated { session_id }).into_response()
        }
        Err(e) => {
            warn!("Rejected session input: {}", e);
            (StatusCode::BAD_REQUEST, Json(ErrorBody::new(e.to_string()))).into_response()
        }
    }
}

/// Streams one event per result in completion order, then `event: end`.
pub async fn stream_handler(
    State(state): State<AppState>,
    Query(query): Query<StreamQuery>,
) -> Sse<KeepAliveStream<EventStream>> {
    let session_id = query.session_id.trim();

    let events: EventStream = match state.sessions.get(session_id) {
        Some(params) => {
            info!(
                "Streaming session {} ({} pairs)",
                session_id,
                params.pairs.len()
            );
            UnboundedReceiverStream::new(state.runner.stream_batch(params))
                .map(|event| {
                    Ok::<_, Infallible>(match event {
                        BatchEvent::Result(result) => result_event(&result),
                        BatchEvent::End(_) => end_event(),
                    })
                })
                .boxed()
        }
        None => {
            warn!("Stream requested for unknown session '{}'", session_id);
            stream::iter([
                Ok::<_, Infallible>(Event::default().data(INVALID_SESSION_DATA)),
                Ok(end_event()),
            ])
            .boxed()
        }
    };

    Sse::new(events).keep_alive(KeepAlive::default().interval(Duration::from_secs(15)))
}

fn result_event(result: &RankCheckResult) -> Event {
    match Event::default().json_data(result) {
        Ok(event) => event,
        Err(e) => {
            warn!("Could not serialize result for {}: {}", result.keyword, e);
            Event::default().data(PROCESSING_FAILED_DATA)
        }
    }
}

fn end_event() -> Event {
    Event::default().event("end").data("done")
}
