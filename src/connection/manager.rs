//! Connection manager: lifecycle state machine, background workers and the
//! event bridge back to the control context
//!
//! Three independently-scheduled actors touch the link: the caller, a
//! connect worker performing the handshake, and an I/O worker driving the
//! open stream. All state transitions happen under one lock; everything the
//! workers report back crosses either the pending-connect oneshot or the
//! event channel, so callers never synchronize with worker tasks directly.

use std::sync::Arc;

use bytes::Bytes;
use tokio::io::{AsyncReadExt, AsyncWriteExt, WriteHalf};
use tokio::sync::{mpsc, oneshot, RwLock};
use tracing::{debug, info, warn};

use crate::buffer::ReceiveBuffer;
use crate::connection::state::ConnectionState;
use crate::device::RemoteDevice;
use crate::error::LinkError;
use crate::transport::traits::{TransportConnector, TransportStream};

/// Push notifications delivered to the control context.
///
/// Connect outcomes are not events: they resolve the `connect` call itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent {
    /// The episode's stream terminated, locally or remotely. Emitted exactly
    /// once per connected episode, after all of its data events.
    ConnectionLost { device_name: String },
    /// Bytes were appended to the receive buffer; `available` is the buffer
    /// length observed right after the append.
    DataAvailable { available: usize },
}

/// Configuration for the connection manager
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Maximum bytes per stream read
    pub read_chunk_size: usize,
    /// Depth of the per-episode write queue
    pub write_queue_depth: usize,
    /// Request an authenticated handshake from the transport
    pub secure: bool,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            read_chunk_size: 1024,
            write_queue_depth: 32,
            secure: true,
        }
    }
}

/// A write shipped to the I/O worker, answered with the write outcome.
struct WriteRequest {
    data: Bytes,
    reply: oneshot::Sender<Result<(), LinkError>>,
}

/// Mutable link record; every transition takes the write lock.
///
/// `epoch` counts connection attempts and disconnects. Workers capture the
/// epoch they were spawned under and discard their result if it has moved
/// on, which is how a disconnect issued mid-handshake wins.
struct Link {
    state: ConnectionState,
    epoch: u64,
    pending: Option<oneshot::Sender<Result<String, LinkError>>>,
    cmd_tx: Option<mpsc::Sender<WriteRequest>>,
}

/// Manages the single logical serial connection.
///
/// Explicitly constructed and explicitly shut down; composes the state
/// machine, the receive buffer and the event channel. The only component
/// external callers interact with.
pub struct ConnectionManager<C: TransportConnector> {
    config: ConnectionConfig,
    connector: Arc<C>,
    link: Arc<RwLock<Link>>,
    buffer: Arc<ReceiveBuffer>,
    event_tx: mpsc::UnboundedSender<LinkEvent>,
    event_rx: mpsc::UnboundedReceiver<LinkEvent>,
}

impl<C: TransportConnector> ConnectionManager<C> {
    /// Create a new manager around the given transport.
    pub fn new(connector: C, config: ConnectionConfig) -> Self {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        Self {
            config,
            connector: Arc::new(connector),
            link: Arc::new(RwLock::new(Link {
                state: ConnectionState::Disconnected,
                epoch: 0,
                pending: None,
                cmd_tx: None,
            })),
            buffer: Arc::new(ReceiveBuffer::new()),
            event_tx,
            event_rx,
        }
    }

    /// Connect to the device at `address`, returning its display name once
    /// the handshake completes.
    ///
    /// Fails immediately with [`LinkError::UnknownDevice`] when the address
    /// does not resolve, or with [`LinkError::AlreadyConnecting`] /
    /// [`LinkError::AlreadyConnected`] on a state conflict; callers must
    /// `disconnect` first. The handshake itself has no internal timeout;
    /// wrap this call in `tokio::time::timeout` for bounded latency.
    pub async fn connect(&self, address: &str) -> Result<String, LinkError> {
        // Resolution touches no core state, so it runs outside the lock.
        let device = self.connector.resolve(address).await?;

        let outcome_rx = {
            let mut link = self.link.write().await;
            match link.state {
                ConnectionState::Connecting(_) => return Err(LinkError::AlreadyConnecting),
                ConnectionState::Connected(_) => return Err(LinkError::AlreadyConnected),
                _ => {}
            }

            link.epoch += 1;
            link.state = ConnectionState::Connecting(device.clone());
            let (outcome_tx, outcome_rx) = oneshot::channel();
            link.pending = Some(outcome_tx);

            info!("[LINK] Connecting to {}", device);
            tokio::spawn(connect_worker(
                self.connector.clone(),
                device,
                self.config.clone(),
                link.epoch,
                self.link.clone(),
                self.buffer.clone(),
                self.event_tx.clone(),
            ));
            outcome_rx
        };

        match outcome_rx.await {
            Ok(outcome) => outcome,
            // Pending slot dropped: a disconnect superseded this attempt
            Err(_) => Err(LinkError::TransportFailure(
                "connection attempt aborted".into(),
            )),
        }
    }

    /// Tear down the active connection, if any. Idempotent; never errors.
    ///
    /// Dropping the write sender terminates the I/O worker, whose exit emits
    /// the episode's single `ConnectionLost` event.
    pub async fn disconnect(&self) {
        let mut link = self.link.write().await;
        if matches!(link.state, ConnectionState::Disconnected) {
            return;
        }
        info!("[LINK] Disconnecting ({})", link.state);
        link.epoch += 1;
        link.pending = None;
        link.cmd_tx = None;
        link.state = ConnectionState::Disconnected;
    }

    /// Write bytes to the peer, completing when the transport write has.
    ///
    /// Valid only while connected; never touches the receive buffer or the
    /// event channel.
    pub async fn send(&self, data: &[u8]) -> Result<(), LinkError> {
        let cmd_tx = {
            let link = self.link.read().await;
            match (&link.state, &link.cmd_tx) {
                (ConnectionState::Connected(_), Some(tx)) => tx.clone(),
                _ => return Err(LinkError::NotConnected),
            }
        };

        let (reply_tx, reply_rx) = oneshot::channel();
        cmd_tx
            .send(WriteRequest {
                data: Bytes::copy_from_slice(data),
                reply: reply_tx,
            })
            .await
            .map_err(|_| LinkError::NotConnected)?;

        // Worker gone between queueing and writing counts as disconnected
        reply_rx.await.map_err(|_| LinkError::NotConnected)?
    }

    /// Whether an episode is currently active.
    pub async fn is_connected(&self) -> bool {
        self.link.read().await.state.is_connected()
    }

    /// Snapshot of the current lifecycle state.
    pub async fn state(&self) -> ConnectionState {
        self.link.read().await.state.clone()
    }

    /// Drain all buffered inbound bytes as UTF-8 text.
    pub async fn drain_received(&self) -> Result<String, LinkError> {
        self.buffer.drain_utf8().await
    }

    /// Drain all buffered inbound bytes raw.
    pub async fn drain_bytes(&self) -> Bytes {
        self.buffer.drain_all().await
    }

    /// Non-destructive peek at the buffered byte count.
    pub async fn available(&self) -> usize {
        self.buffer.len().await
    }

    /// Receive the next push notification, in arrival order.
    pub async fn recv(&mut self) -> Option<LinkEvent> {
        self.event_rx.recv().await
    }

    /// Release the connection; the manager itself is dropped afterwards.
    pub async fn shutdown(&self) {
        self.disconnect().await;
    }
}

/// One-shot handshake task.
///
/// Performs the open exactly once, then applies the resulting transition if
/// the link has not moved on since it was spawned.
async fn connect_worker<C: TransportConnector>(
    connector: Arc<C>,
    device: RemoteDevice,
    config: ConnectionConfig,
    epoch: u64,
    link: Arc<RwLock<Link>>,
    buffer: Arc<ReceiveBuffer>,
    event_tx: mpsc::UnboundedSender<LinkEvent>,
) {
    let result = connector.open(&device, config.secure).await;

    let mut guard = link.write().await;
    if guard.epoch != epoch || !matches!(guard.state, ConnectionState::Connecting(_)) {
        // A disconnect (or newer attempt) won the race; drop the socket.
        debug!("[LINK] Discarding stale handshake result for {}", device);
        return;
    }

    match result {
        Ok(stream) => {
            let (cmd_tx, cmd_rx) = mpsc::channel(config.write_queue_depth);
            guard.state = ConnectionState::Connected(device.clone());
            guard.cmd_tx = Some(cmd_tx);
            info!("[LINK] Connected to {} via {}", device, connector.name());

            // Resolve the caller before the I/O worker can emit anything,
            // so the connect outcome precedes every episode event.
            if let Some(pending) = guard.pending.take() {
                let _ = pending.send(Ok(device.name.clone()));
            }
            tokio::spawn(io_worker(
                stream,
                cmd_rx,
                device,
                config.read_chunk_size,
                epoch,
                link.clone(),
                buffer,
                event_tx,
            ));
        }
        Err(e) => {
            warn!("[LINK] Connect to {} failed: {}", device, e);
            guard.state = ConnectionState::Disconnected;
            if let Some(pending) = guard.pending.take() {
                let _ = pending.send(Err(e));
            }
        }
    }
}

/// Per-episode stream driver.
///
/// Owns the socket for exactly one connected episode: reads chunks into the
/// receive buffer, executes queued writes, and on any termination settles
/// the state machine and emits the episode's single `ConnectionLost`.
#[allow(clippy::too_many_arguments)]
async fn io_worker<S: TransportStream>(
    stream: S,
    mut cmd_rx: mpsc::Receiver<WriteRequest>,
    device: RemoteDevice,
    read_chunk_size: usize,
    epoch: u64,
    link: Arc<RwLock<Link>>,
    buffer: Arc<ReceiveBuffer>,
    event_tx: mpsc::UnboundedSender<LinkEvent>,
) {
    let (mut reader, mut writer) = tokio::io::split(stream);
    let mut chunk = vec![0u8; read_chunk_size];

    let loss_reason: Option<String> = loop {
        tokio::select! {
            cmd = cmd_rx.recv() => match cmd {
                Some(req) => {
                    let result = write_chunk(&mut writer, &req.data).await;
                    if let Err(ref e) = result {
                        // Report to the sender only; the read side observes
                        // the actual closure and ends the episode.
                        debug!("[LINK] Write to {} failed: {}", device, e);
                    }
                    let _ = req.reply.send(
                        result.map_err(|e| LinkError::TransportFailure(e.to_string())),
                    );
                }
                // Manager dropped the sender: caller-initiated disconnect
                None => break None,
            },

            read = reader.read(&mut chunk) => match read {
                Ok(0) => break Some("peer closed the connection".into()),
                Ok(n) => {
                    // Bytes are committed before the event is emitted
                    buffer.append(&chunk[..n]).await;
                    let available = buffer.len().await;
                    debug!("[LINK] Read {} bytes from {} ({} buffered)", n, device, available);
                    let _ = event_tx.send(LinkEvent::DataAvailable { available });
                }
                Err(e) => break Some(e.to_string()),
            },
        }
    };

    match &loss_reason {
        Some(reason) => warn!("[LINK] Connection to {} lost: {}", device, reason),
        None => debug!("[LINK] Episode with {} closed by disconnect", device),
    }

    {
        let mut guard = link.write().await;
        // On a local disconnect the epoch has already moved on and the
        // state is settled; only a remote termination lands in Lost.
        if guard.epoch == epoch {
            guard.state = ConnectionState::Lost(device.clone());
            guard.cmd_tx = None;
        }
    }

    let _ = writer.shutdown().await;
    drop(reader);

    let _ = event_tx.send(LinkEvent::ConnectionLost {
        device_name: device.name,
    });
}

async fn write_chunk<S: TransportStream>(
    writer: &mut WriteHalf<S>,
    data: &[u8],
) -> std::io::Result<()> {
    writer.write_all(data).await?;
    writer.flush().await
}
