//! Chat API route handlers.
//!
//! JSON endpoints for the assistant widget. Each visitor's conversation is
//! keyed by an id stored in their session, created on the first message.

use std::convert::Infallible;

use async_stream::stream;
use axum::response::sse::{Event, KeepAlive};
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response, Sse},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;
use uuid::Uuid;

use crate::error::{Result, add_breadcrumb};
use crate::middleware::session::keys;
use crate::routes::cart::{load_cart, save_cart};
use crate::services::ChatSnapshot;
use crate::state::AppState;

/// Request body for sending a message.
#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub text: String,
}

/// Response after a turn completes.
#[derive(Debug, Serialize)]
pub struct SendMessageResponse {
    pub snapshot: ChatSnapshot,
    /// Route the widget should navigate to.
    pub navigate_to: Option<String>,
    pub cart_count: u32,
}

/// Response for cancel requests.
#[derive(Debug, Serialize)]
pub struct CancelResponse {
    pub cancelled: bool,
}

async fn existing_conversation_id(session: &Session) -> Result<Option<String>> {
    Ok(session.get::<String>(keys::CONVERSATION_ID).await?)
}

async fn conversation_id(session: &Session) -> Result<String> {
    if let Some(id) = existing_conversation_id(session).await? {
        return Ok(id);
    }

    let id = Uuid::new_v4().to_string();
    session.insert(keys::CONVERSATION_ID, &id).await?;
    tracing::debug!(conversation_id = %id, "Started conversation");
    Ok(id)
}

/// Current transcript.
///
/// GET /chat/messages
#[instrument(skip(state, session))]
pub async fn messages(State(state): State<AppState>, session: Session) -> Result<Json<ChatSnapshot>> {
    let snapshot = match existing_conversation_id(&session).await? {
        Some(id) => state.chat().snapshot(&id).await,
        None => ChatSnapshot::default(),
    };
    Ok(Json(snapshot))
}

/// Send a user turn and wait for the reply.
///
/// POST /chat/messages
///
/// An `[ADD_TO_CART:...]` directive in the reply is applied to the
/// visitor's cart before responding. A cart that can't take the item is
/// left as it was and the turn still succeeds.
#[instrument(skip(state, session, request))]
pub async fn send(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<SendMessageRequest>,
) -> Result<Json<SendMessageResponse>> {
    let id = conversation_id(&session).await?;
    let chat = state.chat();
    let mut cart = load_cart(&session).await?;
    let effects = chat
        .send_message(&id, &request.text, &mut cart)
        .await?
        .unwrap_or_default();

    if let Some(item) = effects.add_to_cart {
        save_cart(&session, &cart).await?;
        add_breadcrumb("chat", "Assistant added to cart", Some(&[("item_id", item.id)]));
    }

    Ok(Json(SendMessageResponse {
        snapshot: chat.snapshot(&id).await,
        navigate_to: effects.navigate_to,
        cart_count: cart.item_count(),
    }))
}

/// Cancel the outstanding reply.
///
/// POST /chat/cancel
#[instrument(skip(state, session))]
pub async fn cancel(State(state): State<AppState>, session: Session) -> Result<Json<CancelResponse>> {
    let cancelled = match existing_conversation_id(&session).await? {
        Some(id) => state.chat().cancel(&id).await,
        None => false,
    };
    Ok(Json(CancelResponse { cancelled }))
}

/// Clear the conversation.
///
/// DELETE /chat
#[instrument(skip(state, session))]
pub async fn reset(State(state): State<AppState>, session: Session) -> Result<StatusCode> {
    if let Some(id) = existing_conversation_id(&session).await? {
        state.chat().reset(&id).await;
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Typing effect for the newest reply.
///
/// GET /chat/reveal
///
/// Streams `char`, then `done` or `interrupted` events. Responds 204 when
/// there is no new reply to reveal.
#[instrument(skip(state, session))]
pub async fn reveal(State(state): State<AppState>, session: Session) -> Result<Response> {
    let Some(id) = existing_conversation_id(&session).await? else {
        return Ok(StatusCode::NO_CONTENT.into_response());
    };
    let Some(mut frames) = state.chat().start_reveal(&id).await else {
        return Ok(StatusCode::NO_CONTENT.into_response());
    };

    let events = stream! {
        while let Some(frame) = frames.recv().await {
            let data = serde_json::to_string(&frame).unwrap_or_else(|_| {
                r#"{"type":"error","message":"Failed to serialize frame"}"#.to_string()
            });
            yield Ok::<_, Infallible>(Event::default().event(frame.event_name()).data(data));
        }
    };

    Ok(Sse::new(events).keep_alive(KeepAlive::default()).into_response())
}
