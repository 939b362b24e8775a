//! A single TCP connection to a `vertexd` server. Grounded on the
//! teacher's `cli::client::Client` (connect, then a `run_query` round trip
//! over a `BufReader` wrapping the same socket), rebuilt against this
//! system's RESP grammar instead of the teacher's terrapipe metaline
//! format.

use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

use crate::error::CliResult;
use crate::resp::{self, Value};

pub struct Client {
    reader: BufReader<TcpStream>,
}

impl Client {
    pub async fn connect(host: &str, port: u16) -> CliResult<Self> {
        let stream = TcpStream::connect((host, port)).await?;
        Ok(Self {
            reader: BufReader::new(stream),
        })
    }

    pub async fn run(&mut self, tokens: &[String]) -> CliResult<Value> {
        let request = resp::encode_command(tokens);
        self.reader.get_mut().write_all(&request).await?;
        self.reader.get_mut().flush().await?;
        resp::decode(&mut self.reader).await
    }
}
