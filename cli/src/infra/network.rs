//! Network infrastructure: implements `InboundProbe` using `spawn_blocking`.

use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use anyhow::Result;

use crate::application::ports::InboundProbe;

/// Production implementation that opens real TCP connections.
pub struct TcpInboundProbe;

impl InboundProbe for TcpInboundProbe {
    async fn check_tcp_port(&self, host: &str, port: u16, timeout: Duration) -> Result<bool> {
        let host = host.to_string();
        let result = tokio::task::spawn_blocking(move || {
            let addrs = (host.as_str(), port)
                .to_socket_addrs()
                .map_err(|e| anyhow::anyhow!("cannot resolve {host}: {e}"))?;
            // Each probe uses a fresh socket; the stream is dropped right away.
            Ok::<bool, anyhow::Error>(
                addrs
                    .into_iter()
                    .any(|addr| TcpStream::connect_timeout(&addr, timeout).is_ok()),
            )
        })
        .await
        .map_err(|e| anyhow::anyhow!("spawn_blocking panicked: {e}"))??;
        Ok(result)
    }
}
