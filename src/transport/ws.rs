//! WebSocket transport.
//!
//! Thin wrapper around `tokio-tungstenite` providing split reader/writer
//! halves that implement [`FrameSource`] and [`FrameSink`].
//!
//! [`handshake_request`] turns a cable address plus configured headers into
//! the upgrade request; [`connect`] runs the handshake under a deadline and
//! splits the stream.

// Rust guideline compliant 2026-02

use std::borrow::Cow;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite;

use super::{Connector, FrameSink, FrameSource, TransportPair};
use crate::config::ClientConfig;
use crate::error::ClientError;

/// Concrete WebSocket stream type (avoids repeating the generic everywhere).
type WsStream = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

/// Write half of a WebSocket connection.
#[derive(Debug)]
pub struct WsWriter {
    sink: futures_util::stream::SplitSink<WsStream, tungstenite::Message>,
}

#[async_trait]
impl FrameSink for WsWriter {
    async fn send_text(&mut self, text: &str) -> Result<(), ClientError> {
        self.sink
            .send(tungstenite::Message::Text(text.to_string()))
            .await
            .map_err(|e| ClientError::Write(format!("WebSocket send failed: {e}")))
    }

    async fn close(&mut self) -> Result<(), ClientError> {
        self.sink
            .close()
            .await
            .map_err(|e| ClientError::Write(format!("WebSocket close failed: {e}")))
    }
}

/// Read half of a WebSocket connection.
#[derive(Debug)]
pub struct WsReader {
    stream: futures_util::stream::SplitStream<WsStream>,
}

#[async_trait]
impl FrameSource for WsReader {
    /// Control and raw frames are skipped; binary frames must be UTF-8.
    async fn receive(&mut self) -> Option<Result<String, ClientError>> {
        loop {
            match self.stream.next().await {
                Some(Ok(tungstenite::Message::Text(text))) => {
                    return Some(Ok(text.to_string()));
                }
                Some(Ok(tungstenite::Message::Binary(data))) => {
                    return Some(String::from_utf8(data.to_vec()).map_err(|e| {
                        ClientError::Read(format!("binary frame is not UTF-8: {e}"))
                    }));
                }
                Some(Ok(tungstenite::Message::Close(close_frame))) => {
                    log::debug!("[Cable] WebSocket close frame: {:?}", close_frame);
                    return None;
                }
                Some(Ok(
                    tungstenite::Message::Ping(_)
                    | tungstenite::Message::Pong(_)
                    | tungstenite::Message::Frame(_),
                )) => {}
                Some(Err(
                    tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed,
                ))
                | None => return None,
                Some(Err(e)) => {
                    return Some(Err(ClientError::Read(format!("WebSocket read error: {e}"))));
                }
            }
        }
    }
}

/// Handshake request for a cable address.
pub type HandshakeRequest = tungstenite::handshake::client::Request;

/// Build the handshake request for `address` with extra `headers`.
///
/// `http(s)://` addresses are dialed as `ws(s)://`; see [`cable_url`].
///
/// # Errors
///
/// Returns an error if the address is not a valid WebSocket URL or a header
/// name or value is malformed.
pub fn handshake_request(address: &str, headers: &[(String, String)]) -> Result<HandshakeRequest> {
    use tungstenite::client::IntoClientRequest;
    use tungstenite::http::{HeaderName, HeaderValue};

    let url: &str = &cable_url(address);
    let mut request = url
        .into_client_request()
        .with_context(|| format!("invalid cable address: {address}"))?;

    let request_headers = request.headers_mut();
    for (name, value) in headers {
        let header: HeaderName = name
            .parse()
            .with_context(|| format!("invalid header name: {name}"))?;
        let value: HeaderValue = value
            .parse()
            .with_context(|| format!("invalid value for header {name}"))?;
        request_headers.insert(header, value);
    }
    Ok(request)
}

/// Perform the handshake for `request`, giving up after `timeout`.
///
/// Returns split (writer, reader) halves.
///
/// # Errors
///
/// Returns an error if the handshake fails or does not complete in time.
pub async fn connect(request: HandshakeRequest, timeout: Duration) -> Result<(WsWriter, WsReader)> {
    let uri = request.uri().clone();
    let Ok(handshake) =
        tokio::time::timeout(timeout, tokio_tungstenite::connect_async(request)).await
    else {
        anyhow::bail!("handshake with {uri} timed out after {timeout:?}");
    };
    let (ws_stream, response) = handshake.with_context(|| format!("handshake with {uri} failed"))?;
    log::debug!("[Cable] Handshake with {} answered {}", uri, response.status());

    let (sink, stream) = ws_stream.split();
    Ok((WsWriter { sink }, WsReader { stream }))
}

/// Map an `http://` or `https://` address onto `ws://` or `wss://`.
///
/// Only the scheme prefix is rewritten; any other address is returned as is.
#[must_use]
pub fn cable_url(address: &str) -> Cow<'_, str> {
    if let Some(rest) = address.strip_prefix("https://") {
        Cow::Owned(format!("wss://{rest}"))
    } else if let Some(rest) = address.strip_prefix("http://") {
        Cow::Owned(format!("ws://{rest}"))
    } else {
        Cow::Borrowed(address)
    }
}

/// [`Connector`] that dials over WebSocket.
#[derive(Debug, Default, Clone, Copy)]
pub struct WsConnector;

#[async_trait]
impl Connector for WsConnector {
    async fn connect(
        &self,
        address: &str,
        config: &ClientConfig,
    ) -> Result<TransportPair, ClientError> {
        let request = handshake_request(address, &config.headers)
            .map_err(|e| ClientError::Connect(format!("{e:#}")))?;
        let uri = request.uri().clone();
        log::debug!("[Cable] Connecting to {}", uri);

        let (writer, reader) = connect(request, config.handshake_timeout())
            .await
            .map_err(|e| ClientError::Connect(format!("{e:#}")))?;

        log::info!("[Cable] WebSocket connected to {}", uri);
        Ok((Box::new(writer), Box::new(reader)))
    }
}
