//! A single client connection (spec section 4.5). Grounded on the teacher's
//! `dbnet::connection::Connection`, shorn of the teacher's protocol
//! versioning: here the reader and writer halves of the socket are driven
//! for one request/response round at a time, racing an idle deadline that is
//! pushed forward by every read and write.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::tcp::WriteHalf;
use tokio::net::TcpStream;
use tokio::sync::{broadcast, mpsc};
use tokio::time::Instant;
use uuid::Uuid;

use super::ConnectionRegistry;
use crate::fabric::{Event, EventBus};
use crate::resp::{Decoder, Resp};

/// The connection's own response queue only ever needs to hold a single
/// in-flight response, since requests are handled one at a time per
/// connection; a little slack avoids unnecessary backpressure.
const RESPONSE_BUFFER: usize = 4;

pub struct Connection {
    id: Uuid,
    peer_addr: SocketAddr,
    stream: TcpStream,
    bus: Arc<EventBus>,
    registry: Arc<ConnectionRegistry>,
    idle_duration: Duration,
    closed: AtomicBool,
}

impl Connection {
    pub fn new(
        stream: TcpStream,
        peer_addr: SocketAddr,
        bus: Arc<EventBus>,
        registry: Arc<ConnectionRegistry>,
        idle_duration: Duration,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            peer_addr,
            stream,
            bus,
            registry,
            idle_duration,
            closed: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    /// Drives this connection until end-of-stream, idle expiry, or a
    /// shutdown signal, then closes it.
    pub async fn serve(mut self, shutdown: &mut broadcast::Receiver<()>) {
        let (response_tx, mut response_rx) = mpsc::channel(RESPONSE_BUFFER);
        self.registry.insert(self.id, response_tx);

        let id = self.id;
        let bus = self.bus.clone();
        let idle_duration = self.idle_duration;
        let (mut read_half, mut write_half) = self.stream.split();
        let mut decoder = Decoder::new(&mut read_half);
        let mut deadline = Instant::now() + idle_duration;

        loop {
            tokio::select! {
                biased;
                _ = shutdown.recv() => break,
                _ = tokio::time::sleep_until(deadline) => break,
                frame = decoder.decode() => {
                    match frame {
                        Ok(Some(Resp::Array(Some(items)))) => {
                            deadline = Instant::now() + idle_duration;
                            let event = Event::Request {
                                connection_id: id,
                                frame: Resp::Array(Some(items)),
                            };
                            // `get()` resolves to the count of successful
                            // deliveries; a send that exceeded the topic's
                            // expiry still resolves `Ok(0)` (spec section
                            // 4.4.1, "Expired"), so a delivery count of zero
                            // is treated the same as a closed/removed topic
                            // rather than silently waiting on a response
                            // that will never arrive.
                            let published = match bus.publish("request", event) {
                                Ok(fut) => fut.get().await.map_or(false, |n| n > 0),
                                Err(_) => false,
                            };
                            if !published {
                                break;
                            }
                            match response_rx.recv().await {
                                Some(resp) => {
                                    if write_frame(&mut write_half, &resp).await.is_err() {
                                        break;
                                    }
                                    deadline = Instant::now() + idle_duration;
                                }
                                None => break,
                            }
                        }
                        // A request must be a RESP array; anything else is a
                        // protocol violation and ends the connection.
                        Ok(Some(_)) | Ok(None) => break,
                        Err(_) => break,
                    }
                }
            }
        }

        self.registry.remove(&id);
        close(&self.closed, &mut write_half).await;
    }
}

async fn write_frame(write_half: &mut WriteHalf<'_>, frame: &Resp) -> std::io::Result<()> {
    let encoded = frame.encode();
    write_half.write_all(&encoded).await?;
    write_half.flush().await
}

/// Idempotent: attempts a trailing "TTL expired" line, then lets the socket
/// drop (spec section 4.5).
async fn close(closed: &AtomicBool, write_half: &mut WriteHalf<'_>) {
    if closed.swap(true, Ordering::AcqRel) {
        return;
    }
    let _ = write_half
        .write_all(&Resp::error("TTL expired").encode())
        .await;
    let _ = write_half.flush().await;
    let _ = write_half.shutdown().await;
}
