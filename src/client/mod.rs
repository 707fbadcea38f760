//! Cable client: callback registration and connection lifecycle.
//!
//! # Lifecycle
//!
//! ```text
//!   Client::new ──► Constructed ──serve()──► Serving ──close()──► Closed
//!                   (register)              (decode loop +
//!                                            dispatch tasks)
//! ```
//!
//! Callbacks are registered while `Constructed` and each becomes a dispatch
//! task that starts when `serve()` succeeds. Calling `serve()` twice,
//! `close()` twice, or registering after `serve()` fails with
//! [`ClientError::InvalidState`].
//!
//! # Usage
//!
//! ```ignore
//! let mut client = Client::new("wss://example.com/cable");
//!
//! client.on_connect(|_conn| async { log::info!("welcome"); Ok(()) })?;
//! client.on_event("AgentChannel", |_conn, payload| async move {
//!     let payload = payload?;
//!     let data: serde_json::Value = payload.data()?;
//!     log::info!("AgentChannel: {data}");
//!     Ok(())
//! })?;
//!
//! client.serve().await?;
//! // ...
//! client.close().await?;
//! ```
//!
//! # Dispatch semantics
//!
//! Frames of one category are handed to exactly one waiting task (see
//! [`crate::hub`]). Two `on_event` registrations therefore compete for event
//! frames, and a frame taken by the task for another channel is dropped.
//! Register one callback per category when every frame matters.
//!
//! A callback that does not return holds its category slot, which in turn
//! holds up the decode loop for every category.

// Rust guideline compliant 2026-02

pub mod connection;
mod decode_loop;
mod dispatch;

use std::future::Future;
use std::sync::Arc;

use futures_util::FutureExt;
use tokio::task::JoinHandle;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientState};
use crate::hub::DispatchHub;
use crate::protocol::{FrameKind, Payload};
use crate::transport::ws::WsConnector;
use crate::transport::Connector;

pub use connection::Connection;
use dispatch::{DispatchTask, TaskContext};

/// Client for one cable connection.
pub struct Client {
    address: String,
    config: ClientConfig,
    connector: Arc<dyn Connector>,
    hub: Arc<DispatchHub>,
    state: ClientState,
    /// Registered callbacks not yet started.
    pending: Vec<DispatchTask>,
    /// Decode loop and started dispatch tasks.
    running: Vec<JoinHandle<()>>,
    connection: Option<Connection>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("address", &self.address)
            .field("state", &self.state)
            .field("pending", &self.pending.len())
            .field("running", &self.running.len())
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Create a client for `address` using the WebSocket transport and the
    /// default config. `http(s)://` addresses are dialed as `ws(s)://`.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            config: ClientConfig::default(),
            connector: Arc::new(WsConnector),
            hub: Arc::new(DispatchHub::new()),
            state: ClientState::Constructed,
            pending: Vec::new(),
            running: Vec::new(),
            connection: None,
        }
    }

    /// Replace the transport configuration.
    #[must_use]
    pub fn with_config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the transport.
    #[must_use]
    pub fn with_connector(mut self, connector: impl Connector + 'static) -> Self {
        self.connector = Arc::new(connector);
        self
    }

    /// Address passed to the connector.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Transport configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ClientState {
        self.state
    }

    /// Handle to the live connection, once serving.
    #[must_use]
    pub fn connection(&self) -> Option<Connection> {
        self.connection.clone()
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Run `callback` for every connection-ack (`welcome`) frame.
    pub fn on_connect<F, Fut>(&mut self, callback: F) -> Result<(), ClientError>
    where
        F: Fn(Connection) -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.ensure_registrable("register on_connect")?;
        let rx = self.hub.slot(FrameKind::ConnectAck).receiver();
        self.pending.push(Box::new(move |ctx: TaskContext| {
            dispatch::run_slot_loop("on_connect", rx, ctx, move |conn, _frame| {
                Some(callback(conn))
            })
            .boxed()
        }));
        Ok(())
    }

    /// Run `callback` for every liveness (`ping`) frame.
    pub fn on_heartbeat<F, Fut>(&mut self, callback: F) -> Result<(), ClientError>
    where
        F: Fn(Connection, Payload) -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.ensure_registrable("register on_heartbeat")?;
        let rx = self.hub.slot(FrameKind::Liveness).receiver();
        self.pending.push(Box::new(move |ctx: TaskContext| {
            dispatch::run_slot_loop("on_heartbeat", rx, ctx, move |conn, frame| {
                Some(callback(conn, Payload::new(frame)))
            })
            .boxed()
        }));
        Ok(())
    }

    /// Subscribe to `channel` once serving, then run `callback` for every
    /// event frame this task takes whose identifier names `channel`.
    ///
    /// If the subscribe write fails, `callback` is invoked once with the
    /// error and the task keeps listening.
    pub fn on_event<F, Fut>(
        &mut self,
        channel: impl Into<String>,
        callback: F,
    ) -> Result<(), ClientError>
    where
        F: Fn(Connection, Result<Payload, ClientError>) -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.ensure_registrable("register on_event")?;
        let channel = channel.into();
        let rx = self.hub.slot(FrameKind::ChannelData).receiver();
        self.pending.push(Box::new(move |ctx: TaskContext| {
            async move {
                if let Err(e) = ctx.conn.subscribe(&channel).await {
                    log::warn!("[Cable] Subscribe to {} failed: {}", channel, e);
                    dispatch::log_failure("on_event", callback(ctx.conn.clone(), Err(e)).await);
                }

                dispatch::run_slot_loop("on_event", rx, ctx, move |conn, frame| {
                    if dispatch::is_for_channel(&frame, &channel) {
                        Some(callback(conn, Ok(Payload::new(frame))))
                    } else {
                        log::trace!(
                            "[Cable] on_event({}) dropping frame for {:?}",
                            channel,
                            frame.identifier().map(|id| id.channel().to_string())
                        );
                        None
                    }
                })
                .await;
            }
            .boxed()
        }));
        Ok(())
    }

    /// Run `callback` once, when the client is closed.
    pub fn on_disconnect<F, Fut>(&mut self, callback: F) -> Result<(), ClientError>
    where
        F: FnOnce(Connection) -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.ensure_registrable("register on_disconnect")?;
        self.pending.push(Box::new(move |ctx: TaskContext| {
            async move {
                ctx.shutdown.cancelled().await;
                dispatch::log_failure("on_disconnect", callback(ctx.conn).await);
            }
            .boxed()
        }));
        Ok(())
    }

    /// Run `callback` for every error the decode loop reports (read
    /// failures, undecodable frames, end of stream). Without an error
    /// callback those errors are only logged.
    pub fn on_error<F, Fut>(&mut self, callback: F) -> Result<(), ClientError>
    where
        F: Fn(ClientError) -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.ensure_registrable("register on_error")?;
        let rx = self.hub.errors().receiver();
        self.pending.push(Box::new(move |ctx: TaskContext| {
            dispatch::run_slot_loop("on_error", rx, ctx, move |_conn, error| {
                Some(callback(error))
            })
            .boxed()
        }));
        Ok(())
    }

    fn ensure_registrable(&self, operation: &'static str) -> Result<(), ClientError> {
        if self.state == ClientState::Constructed {
            Ok(())
        } else {
            Err(ClientError::invalid_state(operation, self.state))
        }
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Dial the transport, then start the decode loop and every registered
    /// dispatch task.
    ///
    /// On a connect error the client stays `Constructed`.
    pub async fn serve(&mut self) -> Result<(), ClientError> {
        if self.state != ClientState::Constructed {
            return Err(ClientError::invalid_state("serve", self.state));
        }

        log::info!("[Cable] Dialing {}", self.address);
        let (sink, source) = self.connector.connect(&self.address, &self.config).await?;
        let conn = Connection::new(&self.address, sink);

        let ctx = TaskContext {
            conn: conn.clone(),
            shutdown: self.hub.shutdown_token(),
        };
        let task_count = self.pending.len();
        for task in self.pending.drain(..) {
            self.running.push(tokio::spawn(task(ctx.clone())));
        }
        self.running
            .push(tokio::spawn(decode_loop::run(source, Arc::clone(&self.hub))));

        self.connection = Some(conn);
        self.state = ClientState::Serving;
        log::info!(
            "[Cable] Serving {} with {} dispatch task(s)",
            self.address,
            task_count
        );
        Ok(())
    }

    /// Fire the shutdown broadcast and close the transport write side.
    ///
    /// Every running dispatch task observes the shutdown: looping tasks stop
    /// without further callbacks, `on_disconnect` callbacks fire once, and
    /// the decode loop stops reading. Callbacks registered on a client that
    /// never served are discarded without running.
    pub async fn close(&mut self) -> Result<(), ClientError> {
        match self.state {
            ClientState::Closed => return Err(ClientError::invalid_state("close", self.state)),
            ClientState::Constructed => self.pending.clear(),
            ClientState::Serving => {}
        }

        self.state = ClientState::Closed;
        self.hub.shutdown();
        log::info!("[Cable] Closed {}", self.address);

        if let Some(conn) = &self.connection {
            conn.close().await?;
        }
        Ok(())
    }

    /// Wait for the decode loop and every dispatch task to finish.
    ///
    /// Only returns once the client is closed (or the peer ended the stream
    /// and no dispatch task is registered).
    pub async fn join(&mut self) {
        let handles = std::mem::take(&mut self.running);
        for result in futures_util::future::join_all(handles).await {
            if let Err(e) = result {
                log::warn!("[Cable] Task ended abnormally: {}", e);
            }
        }
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Subscribe to `channel`.
    pub async fn subscribe(&self, channel: &str) -> Result<(), ClientError> {
        self.live_connection("subscribe")?.subscribe(channel).await
    }

    /// Cancel the subscription to `channel`.
    pub async fn unsubscribe(&self, channel: &str) -> Result<(), ClientError> {
        self.live_connection("unsubscribe")?
            .unsubscribe(channel)
            .await
    }

    /// Invoke `action` on `channel`.
    pub async fn perform(
        &self,
        channel: &str,
        action: &str,
        data: serde_json::Value,
    ) -> Result<(), ClientError> {
        self.live_connection("perform")?
            .perform(channel, action, data)
            .await
    }

    fn live_connection(&self, operation: &'static str) -> Result<&Connection, ClientError> {
        match (self.state, &self.connection) {
            (ClientState::Serving, Some(conn)) => Ok(conn),
            (ClientState::Closed, _) => Err(ClientError::invalid_state(operation, self.state)),
            _ => Err(ClientError::NotConnected),
        }
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        self.hub.shutdown();
    }
}
