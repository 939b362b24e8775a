//! Connection manager (spec section 4.5): a TCP accept loop, one task per
//! connection with idle-expiry, and a single response-dispatch worker that
//! routes `response`-topic events back to the connection that asked for them.
//!
//! Grounded on the teacher's `dbnet::listener`/`dbnet::tcp` shape -- a
//! `BaseListener` owning a semaphore-bounded `TcpListener`, accepted via a
//! backing-off loop, with a `broadcast` shutdown signal -- but with the
//! teacher's TLS and dual-protocol-version machinery dropped: this system
//! has one protocol (RESP) and no TLS.

mod connection;

pub use connection::Connection;

use std::cell::Cell;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, mpsc, Semaphore};
use tokio::time;
use uuid::Uuid;

use crate::error::VResult;
use crate::fabric::{Event, EventBus};
use crate::resp::Resp;

pub const MAXIMUM_CONNECTION_LIMIT: usize = 50_000;
/// Default idle duration before a quiet connection is closed (spec section
/// 4.5).
pub const DEFAULT_IDLE_DURATION: Duration = Duration::from_secs(600);
/// Subscriber name the response-dispatch worker registers under.
const DISPATCHER_SUBSCRIBER: &str = "dbnet-dispatcher";

/// Per-connection outbound channel, keyed by connection id, so the single
/// response-dispatch worker can hand a frame to the right connection (spec
/// section 5: "the response writer runs on a separate worker consuming the
/// `response` topic").
pub type ConnectionRegistry = DashMap<Uuid, mpsc::Sender<Resp>>;

/// Exponential backoff for the accept loop, matching the teacher's
/// `NetBackoff` in `dbnet/mod.rs`.
struct NetBackoff {
    c: Cell<u8>,
}

impl NetBackoff {
    const MAX_BACKOFF: u8 = 64;

    fn new() -> Self {
        Self { c: Cell::new(1) }
    }

    async fn spin(&self) {
        time::sleep(Duration::from_secs(self.c.get() as u64)).await;
        self.c.set(self.c.get().saturating_mul(2));
    }

    fn should_disconnect(&self) -> bool {
        self.c.get() > Self::MAX_BACKOFF
    }
}

/// The bound TCP listener plus the shared state every accepted connection
/// needs.
pub struct Listener {
    listener: TcpListener,
    climit: Arc<Semaphore>,
    signal: broadcast::Sender<()>,
    registry: Arc<ConnectionRegistry>,
    bus: Arc<EventBus>,
    idle_duration: Duration,
    terminate_tx: mpsc::Sender<()>,
    terminate_rx: mpsc::Receiver<()>,
}

impl Listener {
    pub async fn bind(
        host: std::net::IpAddr,
        port: u16,
        max_connections: usize,
        bus: Arc<EventBus>,
        idle_duration: Duration,
    ) -> VResult<Self> {
        let listener = TcpListener::bind((host, port)).await?;
        let (signal, _) = broadcast::channel(1);
        let (terminate_tx, terminate_rx) = mpsc::channel(1);
        Ok(Self {
            listener,
            climit: Arc::new(Semaphore::new(max_connections)),
            signal,
            registry: Arc::new(DashMap::new()),
            bus,
            idle_duration,
            terminate_tx,
            terminate_rx,
        })
    }

    pub fn registry(&self) -> Arc<ConnectionRegistry> {
        self.registry.clone()
    }

    pub fn shutdown_signal(&self) -> broadcast::Sender<()> {
        self.signal.clone()
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    async fn accept(&self) -> io::Result<(TcpStream, SocketAddr)> {
        let backoff = NetBackoff::new();
        loop {
            match self.listener.accept().await {
                Ok(pair) => return Ok(pair),
                Err(e) => {
                    if backoff.should_disconnect() {
                        return Err(e);
                    }
                }
            }
            backoff.spin().await;
        }
    }

    /// Runs the accept loop until the listener errors out permanently or is
    /// dropped as part of shutdown. Each accepted connection gets its own
    /// task and a clone of `_term_sig_tx`, so `terminate_rx` only observes
    /// `None` once every in-flight connection has finished (spec section 5's
    /// shutdown step "(b) closing the TCP listener").
    pub async fn run(&mut self) -> io::Result<()> {
        loop {
            self.climit.acquire().await.unwrap().forget();
            let (stream, peer_addr) = match self.accept().await {
                Ok(pair) => pair,
                Err(e) => return Err(e),
            };
            let conn = Connection::new(
                stream,
                peer_addr,
                self.bus.clone(),
                self.registry.clone(),
                self.idle_duration,
            );
            let mut shutdown = self.signal.subscribe();
            let climit = self.climit.clone();
            let _term_sig_tx = self.terminate_tx.clone();
            tokio::spawn(async move {
                conn.serve(&mut shutdown).await;
                climit.add_permits(1);
                drop(_term_sig_tx);
            });
        }
    }

    /// Waits for every in-flight connection task to drop its terminate
    /// sender, signalling that the accept loop and all connections have
    /// wound down.
    pub async fn wait_for_drain(self) {
        let Self {
            mut terminate_rx,
            terminate_tx,
            signal,
            ..
        } = self;
        drop(signal);
        drop(terminate_tx);
        let _ = terminate_rx.recv().await;
    }
}

/// Spawns the single worker that consumes the `response` topic and routes
/// each event to its connection's outbound channel via `registry` (spec
/// section 5's dedicated response-writer worker).
pub fn spawn_response_dispatcher(
    bus: Arc<EventBus>,
    registry: Arc<ConnectionRegistry>,
) -> VResult<tokio::task::JoinHandle<()>> {
    let mut rx = bus.subscribe("response", DISPATCHER_SUBSCRIBER)?;
    Ok(tokio::spawn(async move {
        loop {
            match rx.receive().await {
                Ok(Event::Response {
                    connection_id,
                    frame,
                }) => {
                    if let Some(tx) = registry.get(&connection_id) {
                        let _ = tx.send(frame).await;
                    }
                }
                Ok(_) => {}
                Err(_) => break,
            }
        }
    }))
}
