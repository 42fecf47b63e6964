//! Command-line interface for remote-relay.
//!
//! Uses lexopt for minimal binary size overhead.

use std::ffi::OsString;
use std::path::PathBuf;

/// Command-line arguments.
#[derive(Debug, Clone, Default)]
pub struct Args {
    /// Remote host name or address.
    pub host: Option<String>,
    /// Remote port.
    pub port: Option<u16>,
    /// Login user.
    pub user: Option<String>,
    /// Private key file.
    pub identity: Option<PathBuf>,
    /// ssh config file to consult for host overrides.
    pub ssh_config: Option<PathBuf>,
    /// Path to configuration file.
    pub config: Option<PathBuf>,
    /// Per-iteration wait timeout in seconds.
    pub wait_timeout_secs: Option<u64>,
    /// Discard stderr instead of capturing it.
    pub no_capture_stderr: bool,
    /// Transfer directories recursively.
    pub recursive: bool,
    /// Preserve timestamps on transferred files.
    pub preserve_times: bool,
    /// Local paths to upload.
    pub put: Vec<PathBuf>,
    /// Remote path to download.
    pub get: Option<String>,
    /// Destination directory for transfers.
    pub dest: Option<String>,
    /// Log level (error, warn, info, debug, trace).
    pub log_level: Option<String>,
    /// Commands to execute on the remote host, in order.
    pub commands: Vec<String>,
    /// Show version and exit.
    pub version: bool,
    /// Show help and exit.
    pub help: bool,
}

/// Parse command-line arguments.
pub fn parse_args() -> Result<Args, ArgsError> {
    parse_args_from(std::env::args_os())
}

/// Parse arguments from an iterator (for testing).
pub fn parse_args_from<I>(args: I) -> Result<Args, ArgsError>
where
    I: IntoIterator<Item = OsString>,
{
    use lexopt::prelude::*;

    let mut result = Args::default();
    let mut parser = lexopt::Parser::from_iter(args);

    while let Some(arg) = parser.next()? {
        match arg {
            Short('h') | Long("help") => {
                result.help = true;
            }
            Short('V') | Long("version") => {
                result.version = true;
            }
            Short('H') | Long("host") => {
                result.host = Some(parser.value()?.parse()?);
            }
            Short('p') | Long("port") => {
                let value: String = parser.value()?.parse()?;
                result.port = Some(
                    value
                        .parse()
                        .map_err(|_| ArgsError::InvalidValue("port", value))?,
                );
            }
            Short('u') | Long("user") => {
                result.user = Some(parser.value()?.parse()?);
            }
            Short('i') | Long("identity") => {
                result.identity = Some(parser.value()?.parse()?);
            }
            Short('F') | Long("ssh-config") => {
                result.ssh_config = Some(parser.value()?.parse()?);
            }
            Short('c') | Long("config") => {
                result.config = Some(parser.value()?.parse()?);
            }
            Short('t') | Long("wait-timeout") => {
                let value: String = parser.value()?.parse()?;
                result.wait_timeout_secs = Some(
                    value
                        .parse()
                        .map_err(|_| ArgsError::InvalidValue("wait-timeout", value))?,
                );
            }
            Long("no-capture-stderr") => {
                result.no_capture_stderr = true;
            }
            Short('r') | Long("recursive") => {
                result.recursive = true;
            }
            Long("preserve-times") => {
                result.preserve_times = true;
            }
            Long("put") => {
                result.put.push(parser.value()?.parse()?);
            }
            Long("get") => {
                result.get = Some(parser.value()?.parse()?);
            }
            Short('d') | Long("dest") => {
                result.dest = Some(parser.value()?.parse()?);
            }
            Short('l') | Long("log-level") => {
                result.log_level = Some(parser.value()?.parse()?);
            }
            Value(val) => {
                result.commands.push(val.to_string_lossy().into());
            }
            _ => return Err(arg.unexpected().into()),
        }
    }

    Ok(result)
}

/// Print help message.
pub fn print_help() {
    let version = env!("CARGO_PKG_VERSION");
    println!(
        r#"remote-relay {version}
Lightweight remote command execution and file transfer over SSH

USAGE:
    remote-relay [OPTIONS] [COMMAND]...

ARGS:
    [COMMAND]...            Commands to run on the remote host, in order

OPTIONS:
    -H, --host <HOST>       Remote host name or address
    -p, --port <PORT>       Remote port [default: 22]
    -u, --user <USER>       Login user
    -i, --identity <FILE>   Private key file [default: ~/.ssh/id_rsa]
    -F, --ssh-config <FILE> ssh config file for host overrides
    -c, --config <FILE>     Path to configuration file (JSON)
    -t, --wait-timeout <S>  Per-iteration wait timeout in seconds [default: 5]
        --no-capture-stderr Discard stderr instead of capturing it
        --put <PATH>        Upload a local path (repeatable)
        --get <PATH>        Download a remote path
    -d, --dest <DIR>        Destination directory for transfers [default: .]
    -r, --recursive         Transfer directories recursively
        --preserve-times    Preserve timestamps on transferred files
    -l, --log-level <LVL>   Log level (error, warn, info, debug, trace)
    -h, --help              Print help
    -V, --version           Print version

ENVIRONMENT VARIABLES:
    REMOTE_RELAY_HOST       Remote host (overrides config)
    REMOTE_RELAY_PORT       Remote port (overrides config)
    REMOTE_RELAY_USER       Login user (overrides config)
    REMOTE_RELAY_PASSWORD   Password (overrides config)
    REMOTE_RELAY_IDENTITY   Private key file (overrides config)
    REMOTE_RELAY_LOG_LEVEL  Log level (overrides config)
    RUST_LOG                Alternative log level setting

EXAMPLES:
    # Run commands in sequence
    remote-relay -H lab04 -u tai "uname -a" "df -h"

    # Download a directory tree, preserving timestamps
    remote-relay -H lab04 -u tai --get /media/nas/output -d ./clips -r --preserve-times

    # Upload files via ssh config alias
    remote-relay -H lab04 -F ~/.ssh/config --put build.tar.gz -d /tmp
"#
    );
}

/// Print version.
pub fn print_version() {
    println!("remote-relay {}", env!("CARGO_PKG_VERSION"));
}

/// Argument parsing errors.
#[derive(Debug)]
pub enum ArgsError {
    /// Lexopt parsing error.
    Lexopt(lexopt::Error),
    /// Invalid argument value.
    InvalidValue(&'static str, String),
}

impl std::fmt::Display for ArgsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lexopt(e) => write!(f, "{}", e),
            Self::InvalidValue(name, value) => {
                write!(f, "invalid value for --{}: '{}'", name, value)
            }
        }
    }
}

impl std::error::Error for ArgsError {}

impl From<lexopt::Error> for ArgsError {
    fn from(e: lexopt::Error) -> Self {
        Self::Lexopt(e)
    }
}
