//! SSH session lifecycle and command dispatch.

use std::net::{TcpStream, ToSocketAddrs};
use std::path::PathBuf;
use std::time::Duration;

use ssh2::Session;
use tracing::{debug, info, warn};

use super::ssh_config::{self, SshHostConfig};
use super::transfer::{self, TransferOptions};
use crate::channel::SshChannel;
use crate::error::RemoteRelayError;
use crate::execution::Dispatch;
use crate::Result;

/// Default TCP connect timeout.
pub const CONNECTION_TIMEOUT: Duration = Duration::from_secs(5);

/// Connection settings for one remote host.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Host name or address, possibly an alias resolved via ssh config.
    pub host: String,
    /// Port to connect to.
    pub port: u16,
    /// Login user.
    pub username: String,
    /// Password for password authentication.
    pub password: Option<String>,
    /// Private key path for public-key authentication.
    pub identity_file: Option<PathBuf>,
    /// Optional ssh config file consulted for host overrides.
    pub ssh_config_file: Option<PathBuf>,
    /// TCP connect timeout.
    pub connect_timeout: Duration,
}

impl RemoteConfig {
    /// Create a config for `user@host` on the default port.
    pub fn new(host: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: 22,
            username: username.into(),
            password: None,
            identity_file: None,
            ssh_config_file: None,
            connect_timeout: CONNECTION_TIMEOUT,
        }
    }

    /// Set the port.
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Use password authentication.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Use public-key authentication with the given private key.
    pub fn identity_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.identity_file = Some(path.into());
        self
    }

    /// Consult the given ssh config file for host overrides.
    pub fn ssh_config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.ssh_config_file = Some(path.into());
        self
    }

    /// Set the TCP connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Apply ssh config overrides for this host, if a config file is set.
    ///
    /// `HostName`, `User`, `Port` and `IdentityFile` from a matching block
    /// replace the corresponding fields, mirroring how OpenSSH applies them.
    fn resolved(&self) -> Result<RemoteConfig> {
        let mut resolved = self.clone();
        let Some(ref path) = self.ssh_config_file else {
            return Ok(resolved);
        };

        let overrides: SshHostConfig = ssh_config::resolve(path, &self.host)?;
        if let Some(host_name) = overrides.host_name {
            resolved.host = host_name;
        }
        if let Some(user) = overrides.user {
            resolved.username = user;
        }
        if let Some(port) = overrides.port {
            resolved.port = port;
        }
        if let Some(identity) = overrides.identity_file {
            resolved.identity_file = Some(identity);
        }
        if let Some(proxy) = overrides.proxy_command {
            warn!(
                host = %self.host,
                proxy_command = %proxy,
                "ProxyCommand in ssh config is not supported; connecting directly"
            );
        }
        Ok(resolved)
    }

    /// Private key to try when no password is configured.
    ///
    /// Falls back to `~/.ssh/id_rsa` when neither a password nor an explicit
    /// identity file was given.
    fn effective_identity(&self) -> Option<PathBuf> {
        if let Some(ref path) = self.identity_file {
            return Some(path.clone());
        }
        if self.password.is_some() {
            return None;
        }
        dirs::home_dir().map(|home| home.join(".ssh").join("id_rsa"))
    }
}

/// An authenticated SSH session to one remote host.
///
/// Dispatches each command on a fresh channel; channels are never shared or
/// reused. Transfer operations go over SFTP on the same transport.
pub struct RemoteSession {
    session: Session,
    host: String,
    username: String,
}

impl RemoteSession {
    /// Connect and authenticate against the configured host.
    pub fn connect(config: &RemoteConfig) -> Result<Self> {
        let config = config.resolved()?;

        debug!(
            host = %config.host,
            port = config.port,
            user = %config.username,
            "connecting"
        );

        let addr = (config.host.as_str(), config.port)
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| {
                RemoteRelayError::Transport(format!("cannot resolve host {}", config.host))
            })?;
        let tcp = TcpStream::connect_timeout(&addr, config.connect_timeout)
            .map_err(|e| RemoteRelayError::Transport(format!("connect {}: {}", addr, e)))?;

        let mut session = Session::new()?;
        session.set_tcp_stream(tcp);
        session.handshake()?;

        let auth_failed = || RemoteRelayError::Authentication {
            user: config.username.clone(),
            host: config.host.clone(),
        };

        if let Some(ref password) = config.password {
            session
                .userauth_password(&config.username, password)
                .map_err(|_| auth_failed())?;
        } else if let Some(key) = config.effective_identity() {
            session
                .userauth_pubkey_file(&config.username, None, &key, None)
                .map_err(|_| auth_failed())?;
        }

        if !session.authenticated() {
            return Err(auth_failed());
        }

        info!(host = %config.host, user = %config.username, "session established");

        Ok(Self {
            session,
            host: config.host,
            username: config.username,
        })
    }

    /// Host this session is connected to.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// User this session authenticated as.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Dispatch a command on a fresh channel.
    ///
    /// The command string goes to the remote side verbatim. The returned
    /// channel is ready for [`crate::execution::RemoteExecutor::execute`].
    pub fn dispatch(&self, command: &str) -> Result<SshChannel> {
        debug!(host = %self.host, command, "dispatching command");
        let mut channel = self.session.channel_session()?;
        channel.exec(command)?;
        Ok(SshChannel::new(self.session.clone(), channel))
    }

    /// Upload files or directories to the remote host.
    pub fn upload(
        &self,
        local_paths: &[PathBuf],
        remote_dir: &str,
        options: &TransferOptions,
    ) -> Result<u64> {
        let count = transfer::upload(&self.session, local_paths, remote_dir, options)?;
        info!(
            host = %self.host,
            files = count,
            remote_dir,
            "finished uploading"
        );
        Ok(count)
    }

    /// Download a file or directory from the remote host.
    pub fn download(
        &self,
        remote_path: &str,
        local_dir: &std::path::Path,
        options: &TransferOptions,
    ) -> Result<u64> {
        let count = transfer::download(&self.session, remote_path, local_dir, options)?;
        info!(
            host = %self.host,
            files = count,
            remote_path,
            "finished downloading"
        );
        Ok(count)
    }

    /// Politely close the SSH connection.
    pub fn disconnect(self) -> Result<()> {
        self.session.disconnect(None, "closing", None)?;
        Ok(())
    }
}

impl Dispatch for RemoteSession {
    type Channel = SshChannel;

    fn dispatch(&mut self, command: &str) -> Result<SshChannel> {
        RemoteSession::dispatch(self, command)
    }
}
