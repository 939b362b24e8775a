//! End-to-end wire-protocol scenarios (spec section 8, "End-to-end
//! scenarios (literal bytes)"): boot a real `vertexd::run` instance on a
//! loopback port, drive it with a raw `TcpStream`, and assert on the exact
//! bytes it writes back. Grounded on the teacher's top-level integration
//! test style of driving the server over a real socket rather than calling
//! into `actions`/`coredb` directly.

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio::time::sleep;

use vertexd::config::Config;

/// Starts `vertexd::run` on `port` with the given `database_file` and
/// returns a handle that, when dropped... no -- returns a shutdown sender
/// and the join handle, since the server only winds down when its
/// `shutdown` future resolves (spec section 5).
async fn spawn_server(port: u16, database_file: Option<String>) -> (oneshot::Sender<()>, tokio::task::JoinHandle<()>) {
    let config = Config {
        port,
        database_file,
        ..Config::default()
    };
    let (tx, rx) = oneshot::channel();
    let handle = tokio::spawn(async move {
        let shutdown = async {
            let _ = rx.await;
        };
        vertexd::run(config, shutdown).await.expect("server run failed");
    });
    // The accept loop binds synchronously near the start of `run`; a short
    // settle avoids a racy first connection attempt.
    sleep(Duration::from_millis(100)).await;
    (tx, handle)
}

async fn stop_server(tx: oneshot::Sender<()>, handle: tokio::task::JoinHandle<()>) {
    let _ = tx.send(());
    let _ = tokio::time::timeout(Duration::from_secs(5), handle).await;
}

async fn round_trip(stream: &mut TcpStream, request: &[u8], expect_len: usize) -> Vec<u8> {
    stream.write_all(request).await.unwrap();
    let mut buf = vec![0u8; expect_len];
    stream.read_exact(&mut buf).await.unwrap();
    buf
}

#[tokio::test]
async fn set_then_get_round_trip() {
    let (tx, handle) = spawn_server(18801, None).await;
    let mut stream = TcpStream::connect(("127.0.0.1", 18801)).await.unwrap();

    let reply = round_trip(
        &mut stream,
        b"*3\r\n$3\r\nSET\r\n$3\r\nfoo\r\n$3\r\nbar\r\n",
        b"+OK\r\n".len(),
    )
    .await;
    assert_eq!(reply, b"+OK\r\n");

    let reply = round_trip(
        &mut stream,
        b"*2\r\n$3\r\nGET\r\n$3\r\nfoo\r\n",
        b"$3\r\nbar\r\n".len(),
    )
    .await;
    assert_eq!(reply, b"$3\r\nbar\r\n");

    stop_server(tx, handle).await;
}

#[tokio::test]
async fn incr_on_missing_key_errors() {
    let (tx, handle) = spawn_server(18802, None).await;
    let mut stream = TcpStream::connect(("127.0.0.1", 18802)).await.unwrap();

    let reply = round_trip(
        &mut stream,
        b"*2\r\n$4\r\nINCR\r\n$7\r\ncounter\r\n",
        b"-ERR no such key\r\n".len(),
    )
    .await;
    assert_eq!(reply, b"-ERR no such key\r\n");

    stop_server(tx, handle).await;
}

#[tokio::test]
async fn lpush_then_lrange() {
    let (tx, handle) = spawn_server(18803, None).await;
    let mut stream = TcpStream::connect(("127.0.0.1", 18803)).await.unwrap();

    let reply = round_trip(
        &mut stream,
        b"*3\r\n$5\r\nLPUSH\r\n$1\r\nL\r\n$1\r\nx\r\n",
        b":1\r\n".len(),
    )
    .await;
    assert_eq!(reply, b":1\r\n");

    let reply = round_trip(
        &mut stream,
        b"*3\r\n$5\r\nLPUSH\r\n$1\r\nL\r\n$1\r\ny\r\n",
        b":2\r\n".len(),
    )
    .await;
    assert_eq!(reply, b":2\r\n");

    let expect = b"*2\r\n$1\r\ny\r\n$1\r\nx\r\n";
    let reply = round_trip(
        &mut stream,
        b"*4\r\n$6\r\nLRANGE\r\n$1\r\nL\r\n$1\r\n0\r\n$2\r\n-1\r\n",
        expect.len(),
    )
    .await;
    assert_eq!(reply, expect);

    stop_server(tx, handle).await;
}

#[tokio::test]
async fn sadd_then_smembers() {
    let (tx, handle) = spawn_server(18804, None).await;
    let mut stream = TcpStream::connect(("127.0.0.1", 18804)).await.unwrap();

    let reply = round_trip(
        &mut stream,
        b"*5\r\n$4\r\nSADD\r\n$1\r\ns\r\n$1\r\na\r\n$1\r\nb\r\n$1\r\nc\r\n",
        b":3\r\n".len(),
    )
    .await;
    assert_eq!(reply, b":3\r\n");

    let reply = round_trip(
        &mut stream,
        b"*4\r\n$4\r\nSADD\r\n$1\r\ns\r\n$1\r\nb\r\n$1\r\nd\r\n",
        b":1\r\n".len(),
    )
    .await;
    assert_eq!(reply, b":1\r\n");

    stream
        .write_all(b"*2\r\n$8\r\nSMEMBERS\r\n$1\r\ns\r\n")
        .await
        .unwrap();
    // Unordered array of 4 single-byte bulk strings: "*4\r\n" + 4 * "$1\r\nX\r\n".
    let mut buf = vec![0u8; "*4\r\n".len() + 4 * "$1\r\nX\r\n".len()];
    stream.read_exact(&mut buf).await.unwrap();
    let text = String::from_utf8(buf).unwrap();
    assert!(text.starts_with("*4\r\n"));
    for member in ["a", "b", "c", "d"] {
        assert!(
            text.contains(&format!("$1\r\n{member}\r\n")),
            "missing member {member} in {text:?}"
        );
    }

    stop_server(tx, handle).await;
}

#[tokio::test]
async fn restart_replays_the_log() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("vertex.wal").to_str().unwrap().to_owned();

    let (tx, handle) = spawn_server(18805, Some(log_path.clone())).await;
    let mut stream = TcpStream::connect(("127.0.0.1", 18805)).await.unwrap();
    let reply = round_trip(
        &mut stream,
        b"*5\r\n$4\r\nMSET\r\n$2\r\nk1\r\n$2\r\nv1\r\n$2\r\nk2\r\n$2\r\nv2\r\n",
        b"+OK\r\n".len(),
    )
    .await;
    assert_eq!(reply, b"+OK\r\n");
    drop(stream);
    stop_server(tx, handle).await;

    let (tx, handle) = spawn_server(18806, Some(log_path)).await;
    let mut stream = TcpStream::connect(("127.0.0.1", 18806)).await.unwrap();
    let reply = round_trip(
        &mut stream,
        b"*2\r\n$3\r\nGET\r\n$2\r\nk1\r\n",
        b"$2\r\nv1\r\n".len(),
    )
    .await;
    assert_eq!(reply, b"$2\r\nv1\r\n");

    stop_server(tx, handle).await;
}
