//! `vertexd`: an in-memory key-value data server speaking a Redis-compatible
//! wire protocol (RESP). See `SPEC_FULL.md` at the workspace root for the
//! full system specification this crate implements.

pub mod actions;
pub mod config;
pub mod coredb;
pub mod dbnet;
pub mod diskstore;
pub mod engine;
pub mod error;
pub mod fabric;
pub mod resp;
pub mod util;

use std::net::IpAddr;
use std::sync::Arc;

use config::Config;
use diskstore::Log;
use engine::Engine;
use error::VResult;
use fabric::EventBus;

/// Boots the server: opens the log (if configured), bootstraps from a
/// master (if configured), wires up the event bus's `request`/`response`
/// topics, starts the engine and response dispatcher, then runs the TCP
/// accept loop until `shutdown` fires.
///
/// Returns once the listener and every connection have wound down, after
/// running the shutdown sequence from spec section 5.
pub async fn run(config: Config, shutdown: impl std::future::Future<Output = ()>) -> VResult<()> {
    let log = match &config.database_file {
        Some(path) => Some(Arc::new(Log::open(path.as_str())?)),
        None => None,
    };

    let bus = Arc::new(EventBus::new());
    bus.create_topic("request");
    bus.create_topic("response");

    let host = local_host_identifier();
    let engine = Engine::new(bus.clone(), log.clone(), host.clone());

    if let Some(log) = &log {
        let records = Log::replay(log.path())?;
        if !records.is_empty() {
            log::info!("replaying {} record(s) from {}", records.len(), log.path().display());
            engine.replay(&records);
        }
    }

    if let Some(master_address) = &config.master_address {
        bootstrap_from_master(master_address, &engine).await?;
    }

    let replica_task = if config.enable_replica {
        let port = config.replica_port.unwrap_or(config.port + 1);
        let log = log.clone();
        match tokio::net::TcpListener::bind((IpAddr::from([0, 0, 0, 0]), port)).await {
            Ok(listener) => Some(tokio::spawn(serve_replica_bootstraps(listener, log))),
            Err(e) => {
                log::error!("failed to bind replica bootstrap port {port}: {e}");
                None
            }
        }
    } else {
        None
    };

    let engine_task = tokio::spawn(engine.clone().run());

    let listener = dbnet::Listener::bind(
        IpAddr::from([0, 0, 0, 0]),
        config.port,
        dbnet::MAXIMUM_CONNECTION_LIMIT,
        bus.clone(),
        dbnet::DEFAULT_IDLE_DURATION,
    )
    .await?;
    let shutdown_signal = listener.shutdown_signal();
    let registry = listener.registry();
    let dispatcher_task = dbnet::spawn_response_dispatcher(bus.clone(), registry)?;

    log::info!("{}", libvertex::BANNER);
    log::info!("vertex v{} listening on port {}", libvertex::VERSION, config.port);

    let mut listener = listener;
    tokio::select! {
        result = listener.run() => {
            if let Err(e) = result {
                log::error!("listener stopped with error: {e}");
            }
        }
        _ = shutdown => {
            log::info!("shutdown signal received");
        }
    }

    // Spec section 5's shutdown sequence: (a) remove request/response
    // topics, (b) close the TCP listener, (c) flush the log, (d) close all
    // live connections.
    let _ = shutdown_signal.send(());
    engine.shutdown().await;
    listener.wait_for_drain().await;
    engine_task.abort();
    dispatcher_task.abort();
    if let Some(task) = replica_task {
        task.abort();
    }

    Ok(())
}

/// Serves one-shot bootstrap snapshots to replicas as they connect (spec
/// section 4.7, "Master→replica bootstrap"). Each accepted connection gets
/// exactly one snapshot send, then the master closes it -- there is no
/// incremental replication after bootstrap.
async fn serve_replica_bootstraps(listener: tokio::net::TcpListener, log: Option<Arc<Log>>) {
    loop {
        let (mut stream, peer) = match listener.accept().await {
            Ok(pair) => pair,
            Err(e) => {
                log::error!("replica bootstrap accept failed: {e}");
                continue;
            }
        };
        let Some(log) = log.clone() else {
            log::warn!("replica connected from {peer} but no database-file is configured; nothing to bootstrap");
            continue;
        };
        tokio::spawn(async move {
            if let Err(e) = diskstore::replication::send_snapshot(&log, &mut stream).await {
                log::error!("failed to send bootstrap snapshot to {peer}: {e}");
            }
        });
    }
}

/// Best-effort host identifier for log records (spec section 3, "Log
/// record": "origin host identifier"), mirroring the Go source's use of the
/// local machine's own address rather than DNS hostname.
fn local_host_identifier() -> String {
    std::net::UdpSocket::bind("0.0.0.0:0")
        .and_then(|s| {
            s.connect("8.8.8.8:80")?;
            s.local_addr()
        })
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|_| "unknown".to_owned())
}

async fn bootstrap_from_master(master_address: &str, engine: &Arc<Engine>) -> VResult<()> {
    log::info!("bootstrapping from master at {master_address}");
    let mut stream = tokio::net::TcpStream::connect(master_address).await?;
    let records = diskstore::replication::receive_snapshot(&mut stream).await?;
    log::info!("received {} record(s) from master", records.len());
    engine.replay(&records);
    Ok(())
}
