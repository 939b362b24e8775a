//! `vertexd` entry point: parse CLI flags, load configuration, initialize
//! logging, print the banner, and run the server until Ctrl+C.

use std::env;

use vertexd::config::{self, Config};

fn main() {
    let flags = config::parse_cli_flags(env::args().skip(1));
    let config_path = flags.get("config").map(std::path::PathBuf::from);

    let config = match Config::load(config_path.as_deref(), &flags) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    env_logger::Builder::new()
        .filter_level(config.log_level.as_filter())
        .init();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .thread_name("vertexd")
        .enable_all()
        .build()
        .expect("failed to build the tokio runtime");

    let result = runtime.block_on(vertexd::run(config, async {
        let _ = tokio::signal::ctrl_c().await;
    }));

    if let Err(e) = result {
        log::error!("server exited with error: {e}");
        std::process::exit(1);
    }
}
