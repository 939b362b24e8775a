//! Shared types and helpers used by both the `server` and `cli` crates:
//! version/banner strings and colored terminal output.

pub mod util;

/// Crate version, shared by the server's startup banner and the CLI's `--version`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default TCP port the server listens on.
pub const DEFAULT_PORT: u16 = 6789;

/// The ascii banner printed by the server on a non-quiet startup.
pub const BANNER: &str = r#"
██╗   ██╗███████╗██████╗ ████████╗███████╗██╗  ██╗
██║   ██║██╔════╝██╔══██╗╚══██╔══╝██╔════╝╚██╗██╔╝
██║   ██║█████╗  ██████╔╝   ██║   █████╗   ╚███╔╝
╚██╗ ██╔╝██╔══╝  ██╔══██╗   ██║   ██╔══╝   ██╔██╗
 ╚████╔╝ ███████╗██║  ██║   ██║   ███████╗██╔╝ ██╗
  ╚═══╝  ╚══════╝╚═╝  ╚═╝   ╚═╝   ╚══════╝╚═╝  ╚═╝
"#;
