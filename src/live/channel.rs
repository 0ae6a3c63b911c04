// src/live/channel.rs
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use log::{debug, info, warn};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use super::protocol::{self, LiveEvent, SubscribeFrame};
use super::retry::{ChannelLifecycle, ConnectionState, ReconnectPolicy};
use crate::domain::ItemId;
use crate::session::Session;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Debug, Clone)]
pub struct ChannelConfig {
    /// `ws://host` or `wss://host`, without a path.
    pub ws_base: String,
    pub policy: ReconnectPolicy,
}

impl ChannelConfig {
    pub fn new(ws_base: impl Into<String>) -> Self {
        ChannelConfig {
            ws_base: ws_base.into(),
            policy: ReconnectPolicy::default(),
        }
    }
}

/// Handle to the background connection task. Events arrive on the
/// receiver returned by `open`; the connection state is readable at any
/// time; `close` is the explicit terminal transition for navigation
/// away.
pub struct LiveUpdateChannel {
    close_tx: watch::Sender<bool>,
    state_rx: watch::Receiver<ConnectionState>,
    task: tokio::task::JoinHandle<()>,
}

impl LiveUpdateChannel {
    pub fn open(
        config: ChannelConfig,
        session: &Session,
        item_id: ItemId,
    ) -> (Self, mpsc::Receiver<LiveEvent>) {
        let (event_tx, event_rx) = mpsc::channel(64);
        let (close_tx, close_rx) = watch::channel(false);
        let (state_tx, state_rx) = watch::channel(ConnectionState::Disconnected);

        let url = format!(
            "{}/ws/auction/{}?token={}",
            config.ws_base.trim_end_matches('/'),
            item_id,
            session.token
        );
        let subscribe = SubscribeFrame::new(item_id, session.user_id);

        let task = tokio::spawn(run_channel(
            config.policy,
            url,
            subscribe,
            event_tx,
            close_rx,
            state_tx,
        ));

        (
            LiveUpdateChannel {
                close_tx,
                state_rx,
                task,
            },
            event_rx,
        )
    }

    pub fn state(&self) -> ConnectionState {
        *self.state_rx.borrow()
    }

    /// Tears the connection down and suppresses any pending reconnect.
    pub async fn close(self) {
        let _ = self.close_tx.send(true);
        let _ = self.task.await;
    }
}

async fn run_channel(
    policy: ReconnectPolicy,
    url: String,
    subscribe: SubscribeFrame,
    events: mpsc::Sender<LiveEvent>,
    mut close_rx: watch::Receiver<bool>,
    state_tx: watch::Sender<ConnectionState>,
) {
    let mut lifecycle = ChannelLifecycle::new(policy);

    loop {
        if *close_rx.borrow() {
            lifecycle.on_explicit_close();
            let _ = state_tx.send(lifecycle.state());
            return;
        }

        lifecycle.on_connecting();
        let _ = state_tx.send(lifecycle.state());

        if let Err(err) =
            connect_and_pump(&url, &subscribe, &events, &mut close_rx, &mut lifecycle, &state_tx)
                .await
        {
            warn!("live channel: {}", err);
        }

        if *close_rx.borrow() {
            lifecycle.on_explicit_close();
            let _ = state_tx.send(lifecycle.state());
            return;
        }

        match lifecycle.on_close() {
            Some(delay) => {
                let _ = state_tx.send(lifecycle.state());
                debug!("live channel reconnecting in {:?}", delay);
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = close_rx.changed() => {}
                }
            }
            None => {
                let _ = state_tx.send(lifecycle.state());
                if lifecycle.has_failed() {
                    info!("live channel gave up; polling is now the only update source");
                }
                return;
            }
        }
    }
}

async fn connect_and_pump(
    url: &str,
    subscribe: &SubscribeFrame,
    events: &mpsc::Sender<LiveEvent>,
    close_rx: &mut watch::Receiver<bool>,
    lifecycle: &mut ChannelLifecycle,
    state_tx: &watch::Sender<ConnectionState>,
) -> Result<(), String> {
    let (mut ws, _): (WsStream, _) = timeout(CONNECT_TIMEOUT, connect_async(url))
        .await
        .map_err(|_| "connect timed out".to_string())?
        .map_err(|err| format!("connect: {}", err))?;

    lifecycle.on_open();
    let _ = state_tx.send(lifecycle.state());

    let handshake =
        serde_json::to_string(subscribe).map_err(|err| format!("encode subscribe: {}", err))?;
    ws.send(Message::Text(handshake))
        .await
        .map_err(|err| format!("send subscribe: {}", err))?;

    loop {
        tokio::select! {
            _ = close_rx.changed() => {
                if *close_rx.borrow() {
                    let _ = ws.close(None).await;
                    return Ok(());
                }
            }
            inbound = ws.next() => {
                let message = match inbound {
                    None => return Ok(()),
                    Some(Err(err)) => return Err(format!("read: {}", err)),
                    Some(Ok(message)) => message,
                };
                match message {
                    Message::Text(text) => {
                        if let Some(event) = protocol::parse_frame(&text) {
                            if events.send(event).await.is_err() {
                                // receiver went away with the page
                                return Ok(());
                            }
                        }
                    }
                    Message::Ping(payload) => {
                        let _ = ws.send(Message::Pong(payload)).await;
                    }
                    Message::Close(_) => return Ok(()),
                    _ => {}
                }
            }
        }
    }
}
