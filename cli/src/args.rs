//! Command-line argument parsing (spec section 6's wire protocol defaults:
//! `127.0.0.1:6789`). Grounded on the teacher's `cli::args` for the
//! endpoint/one-shot-eval split, with the `--endpoint protocol@host:port`
//! scheme and TLS branch dropped (this system has one transport, plain
//! TCP), and `clap` used directly instead of the teacher's hand-rolled
//! `libsky::parse_cli_args_disallow_duplicate`, since this crate has no
//! `libsky`-equivalent argument parser of its own.

use clap::{App, Arg};

use crate::error::{CliError, CliResult};

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug)]
pub enum Task {
    OpenShell(ClientConfig),
    ExecOnce(ClientConfig, String),
}

pub fn parse() -> CliResult<Task> {
    let matches = App::new("vsh")
        .version(libvertex::VERSION)
        .about("Interactive shell and one-shot client for vertex")
        .arg(
            Arg::with_name("host")
                .long("host")
                .takes_value(true)
                .help("server host")
                .default_value("127.0.0.1"),
        )
        .arg(
            Arg::with_name("port")
                .long("port")
                .short("p")
                .takes_value(true)
                .help("server port"),
        )
        .arg(
            Arg::with_name("eval")
                .long("eval")
                .short("e")
                .takes_value(true)
                .help("run a single command and exit"),
        )
        .get_matches();

    let host = matches.value_of("host").unwrap_or("127.0.0.1").to_owned();
    let port = match matches.value_of("port") {
        Some(p) => p
            .parse()
            .map_err(|_| CliError::ArgsErr("invalid value for --port".into()))?,
        None => libvertex::DEFAULT_PORT,
    };
    let cfg = ClientConfig { host, port };

    match matches.value_of("eval") {
        Some(cmd) => Ok(Task::ExecOnce(cfg, cmd.to_owned())),
        None => Ok(Task::OpenShell(cfg)),
    }
}
