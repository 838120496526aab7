//! SSH infrastructure: implements `SshConnector` and `RemoteShell` on `ssh2`.
//!
//! libssh2 is blocking, so every call runs inside `spawn_blocking`. The
//! session timeout set at connect time bounds each blocking call.

use std::io::{self, Read};
use std::net::{TcpStream, ToSocketAddrs};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use ssh2::{Channel, ErrorCode, Session};

use crate::application::ports::{RemoteOutput, RemoteShell, SshConnector, SshTarget};
use crate::domain::{ConnectError, Credential};

// libssh2 error codes that decide retry behaviour.
const LIBSSH2_ERROR_SOCKET_SEND: i32 = -7;
const LIBSSH2_ERROR_TIMEOUT: i32 = -9;
const LIBSSH2_ERROR_SOCKET_DISCONNECT: i32 = -13;
const LIBSSH2_ERROR_FILE: i32 = -16;
const LIBSSH2_ERROR_AUTHENTICATION_FAILED: i32 = -18;
const LIBSSH2_ERROR_PUBLICKEY_UNVERIFIED: i32 = -19;
const LIBSSH2_ERROR_SOCKET_RECV: i32 = -43;

/// Production connector backed by libssh2.
pub struct Ssh2Connector;

impl SshConnector for Ssh2Connector {
    type Session = Ssh2Session;

    async fn connect(
        &self,
        target: &SshTarget,
        username: &str,
        credential: &Credential,
        timeout: Duration,
    ) -> Result<Ssh2Session, ConnectError> {
        let target = target.clone();
        let username = username.to_string();
        let credential = credential.clone();
        tokio::task::spawn_blocking(move || {
            open_session(&target, &username, &credential, timeout)
                .map(|session| Ssh2Session::new(session, target.host))
        })
        .await
        .map_err(|e| ConnectError::Transport(format!("ssh connect task failed: {e}")))?
    }
}

fn open_session(
    target: &SshTarget,
    username: &str,
    credential: &Credential,
    timeout: Duration,
) -> Result<Session, ConnectError> {
    let tcp = connect_tcp(target, timeout)?;
    tcp.set_read_timeout(Some(timeout)).ok();
    tcp.set_write_timeout(Some(timeout)).ok();

    let mut session =
        Session::new().map_err(|e| ConnectError::Protocol(format!("session init failed: {e}")))?;
    session.set_timeout(u32::try_from(timeout.as_millis()).unwrap_or(u32::MAX));
    session.set_tcp_stream(tcp);
    session.handshake().map_err(|e| classify(&e, "handshake"))?;

    let auth = match credential {
        Credential::PrivateKey(key) => {
            session.userauth_pubkey_file(username, None, key.path(), None)
        }
        Credential::Password(password) => session.userauth_password(username, password),
    };
    auth.map_err(|e| match e.code() {
        ErrorCode::Session(LIBSSH2_ERROR_FILE) => ConnectError::KeyLoad {
            path: credential_path(credential),
            reason: e.message().to_string(),
        },
        _ => classify(&e, "authentication"),
    })?;

    if !session.authenticated() {
        return Err(ConnectError::Authentication(format!(
            "server rejected credentials for {username}"
        )));
    }
    Ok(session)
}

fn connect_tcp(target: &SshTarget, timeout: Duration) -> Result<TcpStream, ConnectError> {
    let addrs = (target.host.as_str(), target.port)
        .to_socket_addrs()
        .map_err(|e| ConnectError::Transport(format!("cannot resolve {}: {e}", target.host)))?;

    let mut last_err = None;
    for addr in addrs {
        match TcpStream::connect_timeout(&addr, timeout) {
            Ok(stream) => return Ok(stream),
            Err(e) => last_err = Some(e),
        }
    }
    Err(ConnectError::Transport(match last_err {
        Some(e) => format!("cannot reach {}:{}: {e}", target.host, target.port),
        None => format!("no address found for {}", target.host),
    }))
}

fn classify(err: &ssh2::Error, stage: &str) -> ConnectError {
    match err.code() {
        ErrorCode::Session(
            LIBSSH2_ERROR_AUTHENTICATION_FAILED | LIBSSH2_ERROR_PUBLICKEY_UNVERIFIED,
        ) => ConnectError::Authentication(err.message().to_string()),
        ErrorCode::Session(
            LIBSSH2_ERROR_SOCKET_SEND
            | LIBSSH2_ERROR_TIMEOUT
            | LIBSSH2_ERROR_SOCKET_DISCONNECT
            | LIBSSH2_ERROR_SOCKET_RECV,
        ) => ConnectError::Transport(format!("{stage} failed: {}", err.message())),
        _ => ConnectError::Protocol(format!("{stage} failed: {}", err.message())),
    }
}

fn credential_path(credential: &Credential) -> String {
    match credential {
        Credential::PrivateKey(key) => key.path().display().to_string(),
        Credential::Password(_) => String::new(),
    }
}

/// An authenticated libssh2 session.
///
/// Dropping the handle without calling [`RemoteShell::close`] still
/// disconnects, so early returns cannot leak the connection.
pub struct Ssh2Session {
    session: Arc<Session>,
    host: String,
    detached: Mutex<Vec<Channel>>,
    closed: bool,
}

impl Ssh2Session {
    fn new(session: Session, host: String) -> Self {
        Self {
            session: Arc::new(session),
            host,
            detached: Mutex::new(Vec::new()),
            closed: false,
        }
    }
}

impl RemoteShell for Ssh2Session {
    async fn exec(&self, command: &str) -> Result<RemoteOutput> {
        tracing::debug!(host = %self.host, "exec: {command}");
        let session = Arc::clone(&self.session);
        let command = command.to_string();
        tokio::task::spawn_blocking(move || {
            let mut channel = session
                .channel_session()
                .context("cannot open ssh channel")?;
            channel
                .exec(&command)
                .with_context(|| format!("cannot run `{command}`"))?;

            let idle_timeout = match session.timeout() {
                0 => Duration::MAX,
                ms => Duration::from_millis(u64::from(ms)),
            };
            session.set_blocking(false);
            let drained = read_interleaved(&mut channel, idle_timeout);
            session.set_blocking(true);
            let (stdout, stderr) = drained.context("cannot read command output")?;
            channel.wait_close().context("cannot close ssh channel")?;
            let exit_status = channel
                .exit_status()
                .context("cannot read exit status")?;

            Ok::<RemoteOutput, anyhow::Error>(RemoteOutput {
                exit_status,
                stdout: String::from_utf8_lossy(&stdout).into_owned(),
                stderr: String::from_utf8_lossy(&stderr).into_owned(),
            })
        })
        .await
        .map_err(|e| anyhow::anyhow!("spawn_blocking panicked: {e}"))?
    }

    async fn spawn_detached(&self, command: &str) -> Result<()> {
        tracing::debug!(host = %self.host, "spawn detached: {command}");
        let session = Arc::clone(&self.session);
        let command = command.to_string();
        let channel = tokio::task::spawn_blocking(move || {
            let mut channel = session
                .channel_session()
                .context("cannot open ssh channel")?;
            channel
                .exec(&command)
                .with_context(|| format!("cannot start `{command}`"))?;
            Ok::<Channel, anyhow::Error>(channel)
        })
        .await
        .map_err(|e| anyhow::anyhow!("spawn_blocking panicked: {e}"))??;

        self.detached
            .lock()
            .map_err(|_| anyhow::anyhow!("detached channel list poisoned"))?
            .push(channel);
        Ok(())
    }

    async fn close(mut self) -> Result<()> {
        let session = Arc::clone(&self.session);
        let channels = self
            .detached
            .get_mut()
            .map(std::mem::take)
            .unwrap_or_default();
        self.closed = true;
        tokio::task::spawn_blocking(move || shutdown(&session, channels))
            .await
            .map_err(|e| anyhow::anyhow!("spawn_blocking panicked: {e}"))?
            .with_context(|| format!("cannot disconnect from {}", self.host))?;
        tracing::info!("SSH connection to {} closed.", self.host);
        Ok(())
    }
}

impl Drop for Ssh2Session {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        let channels = self
            .detached
            .get_mut()
            .map(std::mem::take)
            .unwrap_or_default();
        if let Err(e) = shutdown(&self.session, channels) {
            tracing::warn!("error disconnecting from {}: {e}", self.host);
        }
    }
}

/// Pause between polls when neither stream has data.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// The two output streams of a running remote command.
trait CommandStreams {
    fn read_stdout(&mut self, buf: &mut [u8]) -> io::Result<usize>;
    fn read_stderr(&mut self, buf: &mut [u8]) -> io::Result<usize>;
    fn at_eof(&self) -> bool;
}

impl CommandStreams for Channel {
    fn read_stdout(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.read(buf)
    }

    fn read_stderr(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stderr().read(buf)
    }

    fn at_eof(&self) -> bool {
        self.eof()
    }
}

/// Drain stdout and stderr together from a non-blocking channel.
///
/// stdout and stderr share one flow-control window, so reading only one of
/// them stalls a command that writes a lot to the other. Fails once
/// `idle_timeout` passes without data on either stream; `Duration::MAX`
/// waits forever.
fn read_interleaved(
    streams: &mut impl CommandStreams,
    idle_timeout: Duration,
) -> io::Result<(Vec<u8>, Vec<u8>)> {
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let mut buf = [0u8; 8192];
    let mut deadline = Instant::now().checked_add(idle_timeout);

    loop {
        let read = streams.read_stdout(&mut buf);
        let from_stdout = append(read, &buf, &mut stdout)?;
        let read = streams.read_stderr(&mut buf);
        let from_stderr = append(read, &buf, &mut stderr)?;

        if from_stdout + from_stderr > 0 {
            deadline = Instant::now().checked_add(idle_timeout);
            continue;
        }
        if streams.at_eof() {
            return Ok((stdout, stderr));
        }
        if deadline.is_some_and(|at| Instant::now() >= at) {
            return Err(io::Error::new(
                io::ErrorKind::TimedOut,
                format!("no output for {idle_timeout:?}"),
            ));
        }
        std::thread::sleep(POLL_INTERVAL);
    }
}

fn append(read: io::Result<usize>, buf: &[u8], sink: &mut Vec<u8>) -> io::Result<usize> {
    match read {
        Ok(n) => {
            sink.extend_from_slice(&buf[..n]);
            Ok(n)
        }
        Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(0),
        Err(e) => Err(e),
    }
}

fn shutdown(session: &Session, channels: Vec<Channel>) -> Result<(), ssh2::Error> {
    for mut channel in channels {
        channel.close().ok();
    }
    session.disconnect(None, "provcheck done", None)
}
