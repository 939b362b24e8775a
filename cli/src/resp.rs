//! Client-side half of the wire protocol: encode a tokenized command as a
//! RESP array of bulk strings, decode and pretty-print the server's
//! response. Grounded on the teacher's `cli::resp::format_response`'s shape
//! (match on each response kind, recurse into nested arrays) but rebuilt
//! against this system's RESP grammar (spec section 4.1) instead of the
//! teacher's own `skytable::response` types, and with `crossterm` dropped
//! in favor of plain text -- the teacher colors its output because its own
//! terminal module owns the whole screen (REPL plus a live status line);
//! this shell only ever prints one response at a time.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

use crate::error::{CliError, CliResult};

/// A decoded server response, mirroring `vertexd::resp::Resp`'s five wire
/// types without depending on the server crate.
#[derive(Debug)]
pub enum Value {
    Simple(String),
    Error(String),
    Integer(i64),
    Bulk(Option<Vec<u8>>),
    Array(Option<Vec<Value>>),
}

/// Encodes a tokenized command line as a RESP array of bulk strings, the
/// only request shape the engine accepts (spec section 4.6, step 1).
pub fn encode_command(tokens: &[String]) -> Vec<u8> {
    let mut out = format!("*{}\r\n", tokens.len()).into_bytes();
    for tok in tokens {
        out.extend_from_slice(format!("${}\r\n", tok.len()).as_bytes());
        out.extend_from_slice(tok.as_bytes());
        out.extend_from_slice(b"\r\n");
    }
    out
}

pub async fn decode<R: AsyncBufRead + Unpin>(r: &mut R) -> CliResult<Value> {
    let line = read_line(r).await?;
    if line.is_empty() {
        return Err(CliError::ProtocolError("empty frame line".into()));
    }
    let (tag, rest) = (&line[..1], &line[1..]);
    match tag.as_bytes()[0] {
        b'+' => Ok(Value::Simple(rest.to_owned())),
        b'-' => Ok(Value::Error(rest.to_owned())),
        b':' => rest
            .parse()
            .map(Value::Integer)
            .map_err(|_| CliError::ProtocolError(format!("bad integer frame: {rest}"))),
        b'$' => {
            let len: i64 = rest
                .parse()
                .map_err(|_| CliError::ProtocolError(format!("bad bulk length: {rest}")))?;
            if len < 0 {
                return Ok(Value::Bulk(None));
            }
            let mut buf = vec![0u8; len as usize + 2];
            r.read_exact(&mut buf).await?;
            buf.truncate(len as usize);
            Ok(Value::Bulk(Some(buf)))
        }
        b'*' => {
            let len: i64 = rest
                .parse()
                .map_err(|_| CliError::ProtocolError(format!("bad array length: {rest}")))?;
            if len < 0 {
                return Ok(Value::Array(None));
            }
            let mut items = Vec::with_capacity(len as usize);
            for _ in 0..len {
                items.push(Box::pin(decode(r)).await?);
            }
            Ok(Value::Array(Some(items)))
        }
        other => Err(CliError::ProtocolError(format!(
            "unrecognized frame tag: {}",
            other as char
        ))),
    }
}

async fn read_line<R: AsyncBufRead + Unpin>(r: &mut R) -> CliResult<String> {
    let mut line = String::new();
    let n = r.read_line(&mut line).await?;
    if n == 0 {
        return Err(CliError::ProtocolError("connection closed by server".into()));
    }
    while line.ends_with('\n') || line.ends_with('\r') {
        line.pop();
    }
    Ok(line)
}

pub fn print_value(v: &Value) {
    print_value_at(v, 0);
    println!();
}

fn print_value_at(v: &Value, depth: usize) {
    match v {
        Value::Simple(s) => print!("{s}"),
        Value::Error(e) => print!("(error) {e}"),
        Value::Integer(i) => print!("(integer) {i}"),
        Value::Bulk(None) => print!("(nil)"),
        Value::Bulk(Some(b)) => print!("\"{}\"", String::from_utf8_lossy(b)),
        Value::Array(None) => print!("(nil)"),
        Value::Array(Some(items)) => {
            if items.is_empty() {
                print!("(empty array)");
                return;
            }
            for (idx, item) in items.iter().enumerate() {
                if idx > 0 {
                    print!("\n{}", "  ".repeat(depth + 1));
                }
                print!("{}) ", idx + 1);
                print_value_at(item, depth + 1);
            }
        }
    }
}
