//! `vsh`: an interactive shell and one-shot client for `vertexd`. Grounded
//! on the teacher's `cli::main`'s `run()`-returning-a-`CliResult` shape,
//! with the SQ-query-builder one-shot path replaced by a single tokenized
//! command.

mod args;
mod client;
mod error;
mod repl;
mod resp;
mod tokenizer;

use args::Task;

fn main() {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("failed to build the tokio runtime");
    if let Err(e) = runtime.block_on(run()) {
        eprintln!("vsh error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> error::CliResult<()> {
    match args::parse()? {
        Task::OpenShell(cfg) => repl::start(cfg).await,
        Task::ExecOnce(cfg, cmd) => {
            let tokens = tokenizer::tokenize(&cmd)?;
            if tokens.is_empty() {
                return Err(error::CliError::ArgsErr("empty command".into()));
            }
            let mut client = client::Client::connect(&cfg.host, cfg.port).await?;
            let value = client.run(&tokens).await?;
            resp::print_value(&value);
            Ok(())
        }
    }
}
