//! Application service: SSH connection with bounded retries.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use std::time::Duration;

use crate::application::ports::{SshConnector, SshTarget, Sleeper};
use crate::domain::{ConnectError, Credential, RetryPolicy};

/// Everything needed to open one session.
#[derive(Debug, Clone)]
pub struct ConnectRequest {
    pub target: SshTarget,
    pub username: String,
    pub credential: Credential,
    pub retry: RetryPolicy,
    /// Applied uniformly to connect, banner and auth.
    pub timeout: Duration,
}

/// Connect with exponential backoff.
///
/// Authentication and key failures abort at once. Protocol and transport
/// failures are retried until the attempt budget is spent; the delay grows by
/// the backoff factor after every failure and no sleep follows the final
/// attempt. The caller owns the returned session.
///
/// # Errors
///
/// Returns the terminal error, or the last retryable error once attempts are
/// exhausted.
pub async fn connect<C: SshConnector>(
    connector: &C,
    sleeper: &impl Sleeper,
    request: &ConnectRequest,
) -> Result<C::Session, ConnectError> {
    let attempts = request.retry.attempts();
    let mode = request.credential.connection_type().describe();
    let mut delays = request.retry.backoff();
    let mut attempt = 1;

    loop {
        let result = connector
            .connect(
                &request.target,
                &request.username,
                &request.credential,
                request.timeout,
            )
            .await;

        let err = match result {
            Ok(session) => {
                tracing::info!(
                    "Successfully connected to the server at {} with {mode}.",
                    request.target.host
                );
                return Ok(session);
            }
            Err(err) => err,
        };

        if !err.is_retryable() {
            tracing::error!(attempt, "connection to {} aborted: {err}", request.target.host);
            return Err(err);
        }
        if attempt >= attempts {
            tracing::error!(
                attempts,
                "giving up on {} after {attempts} attempts: {err}",
                request.target.host
            );
            return Err(err);
        }
        let Some(delay) = delays.next() else {
            return Err(err);
        };
        tracing::warn!(
            attempt,
            attempts,
            "connection to {} failed: {err}; retrying in {delay:?}",
            request.target.host
        );
        sleeper.sleep(delay).await;
        attempt += 1;
    }
}
