// POST /chat handler

use futures_util::stream::StreamExt;
use std::convert::Infallible;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use warp::http::StatusCode;
use warp::reply::Response;
use warp::Reply;

use super::error_response;
use crate::models::ChatRequest;
use crate::relay::{ChatError, ChatService};
use crate::sse::ChatEvent;

/// Events buffered between the relay task and the response body
const EVENT_BUFFER: usize = 32;

pub async fn chat_handler(request: ChatRequest, chat: ChatService) -> Result<Response, Infallible> {
    tracing::info!(
        message_len = request.message.len(),
        history_len = request.history.len(),
        "POST /chat"
    );

    match chat.start(request.message, request.history).await {
        Ok(events) => {
            // warp needs a Sync body stream; the relay runs in its own task
            let (tx, rx) = mpsc::channel(EVENT_BUFFER);
            tokio::spawn(async move {
                let mut events = Box::pin(events);
                while let Some(event) = events.next().await {
                    if tx.send(event.into_event()).await.is_err() {
                        tracing::debug!("Chat client disconnected");
                        break;
                    }
                }
            });

            let event_stream = ReceiverStream::new(rx);
            let reply = warp::sse::reply(warp::sse::keep_alive().stream(event_stream));
            let reply = warp::reply::with_header(reply, "cache-control", "no-cache");
            let reply = warp::reply::with_header(reply, "x-accel-buffering", "no");
            Ok(reply.into_response())
        }
        Err(ChatError::EmptyMessage) => Ok(error_response(
            StatusCode::BAD_REQUEST,
            ChatError::EmptyMessage.to_string(),
        )),
        Err(err) => {
            tracing::error!(error = %err, "Chat could not start");
            Ok(error_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string()))
        }
    }
}
