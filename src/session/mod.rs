//! Remote session management.
//!
//! Connection lifecycle (connect, authenticate, disconnect), per-command
//! channel dispatch, ssh config resolution, and SFTP file transfer.

mod client;
pub mod ssh_config;
mod transfer;

pub use client::{RemoteConfig, RemoteSession, CONNECTION_TIMEOUT};
pub use ssh_config::SshHostConfig;
pub use transfer::TransferOptions;
