//! Per-connection handler: frame decoding, subscriptions, and routing.
//!
//! Each accepted connection gets its own task running [`handle_connection`].
//! Outbound traffic has a single writer:
//!
//! ```text
//! reader loop ──┐
//!               ├─► mpsc ─► writer task ─► WsSender
//! forwarder(s) ─┘
//! ```
//!
//! A forwarder task exists per subscribed topic and copies bus events
//! into the queue, so replies and room events never interleave
//! mid-frame.

use std::collections::HashMap;
use std::sync::Arc;

use platepick_protocol::{ClientFrame, Codec, JsonCodec, RoomEvent, ServerFrame, room_topic};
use platepick_suggest::SuggestionProvider;
use platepick_transport::{ConnectionId, TransportError, WsReceiver, WsSender};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use crate::PlatepickError;
use crate::server::ServerState;

/// Outbound frames queued per connection before senders wait.
const OUTBOUND_CAPACITY: usize = 64;

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<P: SuggestionProvider>(
    tx: WsSender,
    mut rx: WsReceiver,
    state: Arc<ServerState<P>>,
) -> Result<(), PlatepickError> {
    let conn_id = rx.id();
    tracing::debug!(%conn_id, "handling new connection");

    let (out, out_rx) = mpsc::channel(OUTBOUND_CAPACITY);
    let writer = tokio::spawn(write_loop(tx, out_rx, state.codec));
    let mut subscriptions: HashMap<String, JoinHandle<()>> = HashMap::new();

    let result = read_loop(conn_id, &mut rx, &state, &out, &mut subscriptions).await;

    for (topic, forwarder) in subscriptions {
        forwarder.abort();
        // let the aborted task drop its receiver before releasing the topic
        let _ = forwarder.await;
        state.bus.release(&topic);
    }
    drop(out);
    match writer.await {
        Ok(Err(e)) => tracing::debug!(%conn_id, error = %e, "writer ended with error"),
        Err(e) => tracing::debug!(%conn_id, error = %e, "writer task failed"),
        Ok(Ok(())) => {}
    }
    tracing::info!(%conn_id, "connection closed");
    result
}

async fn read_loop<P: SuggestionProvider>(
    conn_id: ConnectionId,
    rx: &mut WsReceiver,
    state: &ServerState<P>,
    out: &mpsc::Sender<ServerFrame>,
    subscriptions: &mut HashMap<String, JoinHandle<()>>,
) -> Result<(), PlatepickError> {
    loop {
        let data = match tokio::time::timeout(state.idle_timeout, rx.recv()).await {
            Ok(Ok(Some(data))) => data,
            Ok(Ok(None)) => {
                tracing::debug!(%conn_id, "connection closed cleanly");
                return Ok(());
            }
            Ok(Err(e)) => return Err(e.into()),
            Err(_) => {
                tracing::info!(%conn_id, "connection idle, closing");
                return Ok(());
            }
        };

        let frame: ClientFrame = match state.codec.decode(&data) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "failed to decode frame");
                reply(out, ServerFrame::Error { message: e.to_string() }).await?;
                continue;
            }
        };

        if let Some(response) = dispatch(conn_id, frame, state, out, subscriptions).await {
            reply(out, response).await?;
        }
    }
}

/// Routes one client frame. Returns the direct reply, if any.
async fn dispatch<P: SuggestionProvider>(
    conn_id: ConnectionId,
    frame: ClientFrame,
    state: &ServerState<P>,
    out: &mpsc::Sender<ServerFrame>,
    subscriptions: &mut HashMap<String, JoinHandle<()>>,
) -> Option<ServerFrame> {
    match frame {
        ClientFrame::Subscribe { invite_code } => {
            let topic = room_topic(invite_code.as_str());
            if !subscriptions.contains_key(&topic) {
                let events = state.bus.subscribe(&topic);
                // Subscribed is queued before the forwarder can queue events.
                if reply(out, ServerFrame::Subscribed { topic: topic.clone() })
                    .await
                    .is_err()
                {
                    return None;
                }
                let forwarder = spawn_forwarder(conn_id, topic.clone(), events, out.clone());
                subscriptions.insert(topic, forwarder);
                return None;
            }
            Some(ServerFrame::Subscribed { topic })
        }

        ClientFrame::Unsubscribe { invite_code } => {
            let topic = room_topic(invite_code.as_str());
            if let Some(forwarder) = subscriptions.remove(&topic) {
                forwarder.abort();
                let _ = forwarder.await;
                state.bus.release(&topic);
                tracing::debug!(%conn_id, %topic, "unsubscribed");
            }
            None
        }

        ClientFrame::CreateRoom { creator } => match state.session.create_room(creator) {
            Ok(room) => Some(ServerFrame::RoomCreated {
                room_id: room.id,
                invite_code: room.invite_code,
            }),
            Err(e) => Some(ServerFrame::Error { message: e.to_string() }),
        },

        ClientFrame::Action { invite_code, action } => {
            state.session.handle(invite_code.as_str(), action).await;
            None
        }

        ClientFrame::CastVote { room_id, candidate } => {
            match state.session.cast_vote(room_id, &candidate) {
                Ok(count) => Some(ServerFrame::Voted {
                    room_id,
                    candidate,
                    count,
                }),
                Err(e) => Some(ServerFrame::Error { message: e.to_string() }),
            }
        }

        ClientFrame::BestRestaurant { room_id } => Some(ServerFrame::Best {
            room_id,
            candidate: state.session.best(room_id),
        }),

        ClientFrame::Ping => Some(ServerFrame::Pong),
    }
}

/// Copies bus events for `topic` into the connection's outbound queue.
fn spawn_forwarder(
    conn_id: ConnectionId,
    topic: String,
    mut events: broadcast::Receiver<RoomEvent>,
    out: mpsc::Sender<ServerFrame>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => {
                    let frame = ServerFrame::Event {
                        topic: topic.clone(),
                        event,
                    };
                    if out.send(frame).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    tracing::warn!(%conn_id, %topic, missed, "subscriber lagged, events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

/// Drains the outbound queue onto the socket.
async fn write_loop(
    mut tx: WsSender,
    mut frames: mpsc::Receiver<ServerFrame>,
    codec: JsonCodec,
) -> Result<(), PlatepickError> {
    while let Some(frame) = frames.recv().await {
        let text = codec.encode_text(&frame)?;
        tx.send_text(text).await?;
    }
    tx.close().await?;
    Ok(())
}

async fn reply(out: &mpsc::Sender<ServerFrame>, frame: ServerFrame) -> Result<(), PlatepickError> {
    out.send(frame)
        .await
        .map_err(|_| TransportError::ConnectionClosed.into())
}
