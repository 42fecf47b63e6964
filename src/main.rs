//! remote-relay binary entry point.

use std::path::PathBuf;

use remote_relay::config::Config;
use remote_relay::{cli, logging, CommandRunner, RemoteExecutor, RemoteRelayError, RemoteSession, TransferOptions};
use tracing::info;

#[tokio::main]
async fn main() {
    let args = match cli::parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("remote-relay: {}", e);
            std::process::exit(2);
        }
    };

    if args.help {
        cli::print_help();
        return;
    }
    if args.version {
        cli::print_version();
        return;
    }

    let config = match Config::load(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("remote-relay: {}", e);
            std::process::exit(2);
        }
    };

    logging::init_with_filter(config.log_filter());
    info!("remote-relay v{}", env!("CARGO_PKG_VERSION"));

    let put = args.put.clone();
    let get = args.get.clone();
    let dest = args.dest.clone().unwrap_or_else(|| ".".to_string());
    let commands = args.commands.clone();

    // All session work is blocking; keep it off the async runtime threads.
    let outcome = tokio::task::spawn_blocking(move || run(config, put, get, dest, commands))
        .await
        .expect("session task panicked");

    match outcome {
        Ok(exit_code) => std::process::exit(exit_code),
        Err(e) => {
            eprintln!("remote-relay: {}", e);
            std::process::exit(1);
        }
    }
}

/// Connect, perform transfers, run commands, and report the last exit code.
fn run(
    config: Config,
    put: Vec<PathBuf>,
    get: Option<String>,
    dest: String,
    commands: Vec<String>,
) -> remote_relay::Result<i32> {
    let remote_config = config
        .to_remote_config()
        .map_err(|e| RemoteRelayError::Config(e.to_string()))?;
    let mut session = RemoteSession::connect(&remote_config)?;

    let options = TransferOptions {
        recursive: config.transfer.recursive,
        preserve_times: config.transfer.preserve_times,
    };

    if !put.is_empty() {
        session.upload(&put, &dest, &options)?;
    }
    if let Some(ref remote_path) = get {
        session.download(remote_path, std::path::Path::new(&dest), &options)?;
    }

    let mut exit_code = 0;
    if !commands.is_empty() {
        let executor = RemoteExecutor::new()
            .wait_timeout(config.wait_timeout())
            .capture_stderr(config.execution.capture_stderr);
        let runner = CommandRunner::new(executor);

        // Commands run strictly in sequence; output prints in input order.
        for result in runner.run_all(&mut session, &commands)? {
            print!("{}", result.stdout);
            if let Some(ref stderr) = result.stderr {
                eprint!("{}", stderr);
            }
            exit_code = result.exit_code;
        }
    }

    session.disconnect()?;
    Ok(exit_code)
}
