//! Configuration loading (spec section 6, "Config"): a TOML file overlaid by
//! CLI flags, overlaid by environment variables, in that precedence order.
//! Grounded on the teacher's three-source layering in `config/cfgfile.rs` /
//! `config/cfgcli.rs` / `config/cfgenv.rs`, collapsed into one module since
//! this spec's config surface is eight scalar fields rather than the
//! teacher's full keyspace/snapshot/TLS configuration tree.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{VResult, VertexError};
use libvertex::DEFAULT_PORT;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
}

impl LogLevel {
    pub fn as_filter(&self) -> log::LevelFilter {
        match self {
            Self::Debug => log::LevelFilter::Debug,
            Self::Info => log::LevelFilter::Info,
            Self::Warn => log::LevelFilter::Warn,
            Self::Error => log::LevelFilter::Error,
            Self::Fatal => log::LevelFilter::Error,
        }
    }
}

/// The resolved configuration (spec section 6's "Config" table).
#[derive(Debug, Clone)]
pub struct Config {
    pub log_path: Option<String>,
    /// In debug builds this is always `Debug`, regardless of what the file,
    /// CLI flags or environment say (spec section 6).
    pub log_level: LogLevel,
    pub port: u16,
    /// WAL is enabled whenever this is non-empty.
    pub database_file: Option<String>,
    pub enable_replica: bool,
    pub replica_port: Option<u16>,
    /// Bootstrap from a master whenever this is non-empty.
    pub master_address: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_path: None,
            log_level: LogLevel::Info,
            port: DEFAULT_PORT,
            database_file: None,
            enable_replica: false,
            replica_port: None,
            master_address: None,
        }
    }
}

/// The file-layer shape deserialized directly via `serde`/`toml`, mirroring
/// the teacher's `cfgfile.rs` pattern of a `#[derive(Deserialize)]` struct
/// over the TOML document.
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    #[serde(rename = "log-path")]
    log_path: Option<String>,
    #[serde(rename = "log-level")]
    log_level: Option<LogLevel>,
    port: Option<u16>,
    #[serde(rename = "database-file")]
    database_file: Option<String>,
    #[serde(rename = "enable-replica")]
    enable_replica: Option<bool>,
    #[serde(rename = "replica-port")]
    replica_port: Option<u16>,
    #[serde(rename = "master-address")]
    master_address: Option<String>,
}

impl Config {
    fn apply_file(&mut self, f: FileConfig) {
        if let Some(v) = f.log_path {
            self.log_path = Some(v);
        }
        if let Some(v) = f.log_level {
            self.log_level = v;
        }
        if let Some(v) = f.port {
            self.port = v;
        }
        if let Some(v) = f.database_file {
            self.database_file = Some(v);
        }
        if let Some(v) = f.enable_replica {
            self.enable_replica = v;
        }
        if let Some(v) = f.replica_port {
            self.replica_port = Some(v);
        }
        if let Some(v) = f.master_address {
            self.master_address = Some(v);
        }
    }

    fn apply_flags(&mut self, flags: &HashMap<String, String>) -> VResult<()> {
        if let Some(v) = flags.get("log-path") {
            self.log_path = Some(v.clone());
        }
        if let Some(v) = flags.get("log-level") {
            self.log_level = parse_log_level(v)?;
        }
        if let Some(v) = flags.get("port") {
            self.port = v.parse().map_err(|_| VertexError::ArgumentInvalid)?;
        }
        if let Some(v) = flags.get("database-file") {
            self.database_file = Some(v.clone());
        }
        if let Some(v) = flags.get("enable-replica") {
            self.enable_replica = v.parse().map_err(|_| VertexError::ArgumentInvalid)?;
        }
        if let Some(v) = flags.get("replica-port") {
            self.replica_port = Some(v.parse().map_err(|_| VertexError::ArgumentInvalid)?);
        }
        if let Some(v) = flags.get("master-address") {
            self.master_address = Some(v.clone());
        }
        Ok(())
    }

    fn apply_env(&mut self) -> VResult<()> {
        const PREFIX: &str = "VERTEX_";
        for (key, val) in std::env::vars() {
            let Some(field) = key.strip_prefix(PREFIX) else {
                continue;
            };
            match field.to_ascii_lowercase().replace('_', "-").as_str() {
                "log-path" => self.log_path = Some(val),
                "log-level" => self.log_level = parse_log_level(&val)?,
                "port" => self.port = val.parse().map_err(|_| VertexError::ArgumentInvalid)?,
                "database-file" => self.database_file = Some(val),
                "enable-replica" => {
                    self.enable_replica = val.parse().map_err(|_| VertexError::ArgumentInvalid)?
                }
                "replica-port" => {
                    self.replica_port = Some(val.parse().map_err(|_| VertexError::ArgumentInvalid)?)
                }
                "master-address" => self.master_address = Some(val),
                _ => {}
            }
        }
        Ok(())
    }

    /// Load the file (if present), overlay CLI flags, then overlay
    /// environment variables (spec section 6's declared precedence order).
    pub fn load(file_path: Option<&Path>, flags: &HashMap<String, String>) -> VResult<Self> {
        let mut config = Config::default();
        if let Some(path) = file_path {
            let raw = fs::read_to_string(path)?;
            let file: FileConfig = toml::from_str(&raw).map_err(|_| VertexError::ArgumentInvalid)?;
            config.apply_file(file);
        }
        config.apply_flags(flags)?;
        config.apply_env()?;
        if cfg!(debug_assertions) {
            config.log_level = LogLevel::Debug;
        }
        Ok(config)
    }
}

fn parse_log_level(s: &str) -> VResult<LogLevel> {
    match s.to_ascii_uppercase().as_str() {
        "DEBUG" => Ok(LogLevel::Debug),
        "INFO" => Ok(LogLevel::Info),
        "WARN" => Ok(LogLevel::Warn),
        "ERROR" => Ok(LogLevel::Error),
        "FATAL" => Ok(LogLevel::Fatal),
        _ => Err(VertexError::ArgumentInvalid),
    }
}

/// Hand-rolled `--flag value` / `--flag=value` parser, matching the
/// teacher's dependency-free parsing in `config/cfgcli.rs` rather than
/// introducing `clap`, which `server` doesn't otherwise depend on.
pub fn parse_cli_flags(args: impl Iterator<Item = String>) -> HashMap<String, String> {
    let mut flags = HashMap::new();
    let mut args = args.peekable();
    while let Some(arg) = args.next() {
        let Some(name) = arg.strip_prefix("--") else {
            continue;
        };
        if let Some((key, value)) = name.split_once('=') {
            flags.insert(key.to_owned(), value.to_owned());
        } else if let Some(value) = args.peek() {
            if !value.starts_with("--") {
                flags.insert(name.to_owned(), value.clone());
                args.next();
            } else {
                flags.insert(name.to_owned(), "true".to_owned());
            }
        } else {
            flags.insert(name.to_owned(), "true".to_owned());
        }
    }
    flags
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_defaults() {
        let mut flags = HashMap::new();
        flags.insert("port".to_owned(), "7000".to_owned());
        let config = Config::load(None, &flags).unwrap();
        assert_eq!(config.port, 7000);
    }

    #[test]
    fn cli_flag_parsing_handles_equals_and_space_forms() {
        let args = vec![
            "--port=7000".to_owned(),
            "--enable-replica".to_owned(),
            "true".to_owned(),
        ];
        let flags = parse_cli_flags(args.into_iter());
        assert_eq!(flags.get("port").map(String::as_str), Some("7000"));
        assert_eq!(flags.get("enable-replica").map(String::as_str), Some("true"));
    }
}
