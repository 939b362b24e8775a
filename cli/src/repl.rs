//! The interactive shell. Grounded on the teacher's `cli::repl::start`:
//! a `rustyline` editor with history persisted to a dotfile, `exit`/`clear`
//! built-ins, everything else tokenized and sent as a command. TLS and the
//! bracketed-paste key binding workaround are dropped -- this shell has no
//! TLS connection variant and doesn't fight the teacher's specific paste
//! bug.

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::args::ClientConfig;
use crate::client::Client;
use crate::error::CliResult;
use crate::{resp, tokenizer};

const HISTORY_FILE: &str = ".vertex_history";

pub async fn start(cfg: ClientConfig) -> CliResult<()> {
    let mut client = Client::connect(&cfg.host, cfg.port).await?;
    let mut editor = DefaultEditor::new().map_err(|e| {
        crate::error::CliError::IoError(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))
    })?;
    let _ = editor.load_history(HISTORY_FILE);

    println!("{}", libvertex::BANNER);
    println!("vertex v{} -- connected to {}:{}", libvertex::VERSION, cfg.host, cfg.port);

    let prompt = format!("{}:{}> ", cfg.host, cfg.port);
    loop {
        match editor.readline(&prompt) {
            Ok(line) => {
                let _ = editor.add_history_entry(line.as_str());
                match line.trim() {
                    "" => continue,
                    "exit" => break,
                    "clear" => {
                        print!("\x1b[2J\x1b[H");
                        continue;
                    }
                    _ => {}
                }
                match tokenizer::tokenize(&line) {
                    Ok(tokens) if tokens.is_empty() => continue,
                    Ok(tokens) => match client.run(&tokens).await {
                        Ok(value) => resp::print_value(&value),
                        Err(e) => eprintln!("[vsh error]: {e}"),
                    },
                    Err(e) => eprintln!("[vsh error]: {e}"),
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("[vsh error]: failed to read line: {e}");
                break;
            }
        }
    }
    let _ = editor.save_history(HISTORY_FILE);
    println!("Goodbye!");
    Ok(())
}
